//! Embedded document store
//!
//! Each collection is a sled tree holding JSON documents. Multi-document
//! updates go through [`DocStore::with_transaction`], a serializable sled
//! transaction over the listed trees: the closure may be re-run on conflict,
//! and any error it returns aborts every write it made.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{
    abort, ConflictableTransactionResult, TransactionError, TransactionalTree,
};
use sled::{Db, Transactional, Tree};

use crate::models::WalletError;
use crate::store::collection::Collection;

/// Result type inside a transaction closure
pub type TxResult<T> = ConflictableTransactionResult<T, WalletError>;

pub struct DocStore {
    db: Db,
    trees: HashMap<Collection, Tree>,
}

impl DocStore {
    pub fn open(path: &str) -> Result<Self, WalletError> {
        Self::from_db(sled::open(path)?)
    }

    /// Throwaway store, removed on drop
    pub fn temporary() -> Result<Self, WalletError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, WalletError> {
        let mut trees = HashMap::new();
        for collection in Collection::ALL {
            trees.insert(collection, db.open_tree(collection.as_ref())?);
        }
        Ok(Self { db, trees })
    }

    fn tree(&self, collection: Collection) -> &Tree {
        // every collection is opened in from_db
        &self.trees[&collection]
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<T>, WalletError> {
        match self.tree(collection).get(key.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// All documents of a collection in key order
    pub fn scan<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, WalletError> {
        self.tree(collection)
            .iter()
            .values()
            .map(|raw| -> Result<T, WalletError> { Ok(serde_json::from_slice(&raw?)?) })
            .collect()
    }

    /// Documents whose key starts with `prefix`, in key order
    pub fn scan_prefix<T: DeserializeOwned>(
        &self,
        collection: Collection,
        prefix: &str,
    ) -> Result<Vec<T>, WalletError> {
        self.tree(collection)
            .scan_prefix(prefix.as_bytes())
            .values()
            .map(|raw| -> Result<T, WalletError> { Ok(serde_json::from_slice(&raw?)?) })
            .collect()
    }

    /// Run `f` atomically over `collections`.
    ///
    /// `f` must only read and write through the given [`StoreTx`]; it can be
    /// called more than once when sled detects a conflicting writer.
    pub fn with_transaction<T, F>(&self, collections: &[Collection], f: F) -> Result<T, WalletError>
    where
        F: Fn(&StoreTx<'_>) -> TxResult<T>,
    {
        let trees: Vec<Tree> = collections.iter().map(|c| self.tree(*c).clone()).collect();

        let result = trees.as_slice().transaction(|view| {
            let tx = StoreTx { collections, trees: view };
            f(&tx)
        });

        match result {
            Ok(value) => Ok(value),
            Err(TransactionError::Abort(err)) => Err(err),
            Err(TransactionError::Storage(err)) => Err(WalletError::from(err)),
        }
    }

    pub fn flush(&self) -> Result<usize, WalletError> {
        Ok(self.db.flush()?)
    }
}

/// Transactional view over the collections passed to `with_transaction`
pub struct StoreTx<'a> {
    collections: &'a [Collection],
    trees: &'a [TransactionalTree],
}

impl StoreTx<'_> {
    fn tree(&self, collection: Collection) -> TxResult<&TransactionalTree> {
        match self.collections.iter().position(|c| *c == collection) {
            Some(index) => Ok(&self.trees[index]),
            None => abort(WalletError::Storage(format!(
                "collection {} is not part of this transaction",
                collection
            ))),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, collection: Collection, key: &str) -> TxResult<Option<T>> {
        match self.tree(collection)?.get(key.as_bytes())? {
            Some(raw) => match serde_json::from_slice(&raw) {
                Ok(doc) => Ok(Some(doc)),
                Err(e) => abort(WalletError::from(e)),
            },
            None => Ok(None),
        }
    }

    pub fn put<T: Serialize>(&self, collection: Collection, key: &str, doc: &T) -> TxResult<()> {
        let raw = match serde_json::to_vec(doc) {
            Ok(raw) => raw,
            Err(e) => return abort(WalletError::from(e)),
        };
        self.tree(collection)?.insert(key.as_bytes(), raw)?;
        Ok(())
    }

    /// Insert-only write for append-only collections
    pub fn append<T: Serialize>(&self, collection: Collection, key: &str, doc: &T) -> TxResult<()> {
        if self.tree(collection)?.get(key.as_bytes())?.is_some() {
            return abort(WalletError::Storage(format!(
                "{} record {} already exists",
                collection, key
            )));
        }
        self.put(collection, key, doc)
    }
}
