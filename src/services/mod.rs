//! Clients of external services: object storage, payment processor, odds provider

pub mod game_assets;
pub mod mock;
pub mod object_store;
pub mod odds_api;
pub mod paypal;

pub use game_assets::GameAssetService;
pub use object_store::{random_object_name, upload_file, ObjectStore, S3Service};
pub use odds_api::{League, OddsClient, Sport, SportEvent};
pub use paypal::{CaptureOutcome, PayPalClient, PaymentProcessor, ProcessorOrder};
