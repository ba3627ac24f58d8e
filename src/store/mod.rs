//! Document store: collections, keys and the transaction primitive

pub mod collection;
pub mod doc_store;

pub use collection::{user_prefix, user_scoped_key, Collection};
pub use doc_store::{DocStore, StoreTx, TxResult};
pub use sled::transaction::abort;
