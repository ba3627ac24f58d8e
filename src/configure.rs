use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub wallet: WalletConfig,
    pub object_store: ObjectStoreConfig,
    pub paypal: PaypalConfig,
    pub odds_api: OddsApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory of the embedded document store
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Part of the balance that can never be withdrawn
    pub welcome_bonus: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Prefix of the public download URL, bucket and key are appended
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaypalConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OddsApiConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_ms: u64,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    let s = Config::builder()
        // Set defaults
        .set_default("log_level", "info")?
        .set_default("log_to_file", false)?
        .set_default("log_file", "log/sportsbook.log")?
        .set_default("server.listen_addr", "0.0.0.0:8080")?
        .set_default("store.path", "data/sportsbook")?
        .set_default("wallet.welcome_bonus", "100")?
        .set_default("object_store.bucket", "")?
        .set_default("object_store.region", "us-east-005")?
        .set_default("object_store.endpoint", "")?
        .set_default("object_store.access_key_id", "")?
        .set_default("object_store.secret_access_key", "")?
        .set_default("object_store.public_base_url", "https://f005.backblazeb2.com/file")?
        .set_default("paypal.base_url", "https://api-m.paypal.com")?
        .set_default("paypal.client_id", "")?
        .set_default("paypal.client_secret", "")?
        .set_default("paypal.currency", "USD")?
        .set_default("odds_api.base_url", "https://api.b365api.com/v3")?
        .set_default("odds_api.token", "")?
        .set_default("odds_api.timeout_ms", 10_000)?
        // Add configuration from a file
        .add_source(File::with_name(path).required(false))
        // Add configuration from environment variables, e.g. APP_PAYPAL__CLIENT_ID
        .add_source(Environment::with_prefix("APP").prefix_separator("_").separator("__"))
        .build()?;

    s.try_deserialize()
}
