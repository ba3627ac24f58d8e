pub mod record_id;

pub use record_id::{generate_record_id, new_record_id};
