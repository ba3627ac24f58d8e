pub mod api;
pub mod common_utils;
pub mod configure;
pub mod logger;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;
pub mod wallet;
