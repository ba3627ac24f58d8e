use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sportsbook::api::{create_app, AppState};
use sportsbook::configure;
use sportsbook::logger::setup_logger;
use sportsbook::services::mock::MemoryObjectStore;
use sportsbook::services::{ObjectStore, OddsClient, PayPalClient, S3Service};
use sportsbook::store::DocStore;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(long, default_value = configure::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Listen address, overrides server.listen_addr
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let config = configure::load_config_from(&args.config).context("Failed to load config")?;
    setup_logger(&config)?;

    let store = Arc::new(
        DocStore::open(&config.store.path)
            .with_context(|| format!("cannot open store at {}", config.store.path))?,
    );

    let objects: Arc<dyn ObjectStore> = match S3Service::new(&config.object_store) {
        Ok(s3) => Arc::new(s3),
        Err(e) => {
            log::warn!("object store unavailable ({:#}), uploads are kept in memory", e);
            Arc::new(MemoryObjectStore::new())
        }
    };
    let processor = Arc::new(PayPalClient::new(config.paypal.clone())?);
    let odds = Arc::new(OddsClient::new(&config.odds_api)?);
    if !odds.is_configured() {
        log::warn!("odds API token not configured, sports data falls back to defaults");
    }

    let state = Arc::new(AppState::new(
        store.clone(),
        objects,
        processor,
        odds,
        config.wallet.welcome_bonus,
    ));
    let app = create_app(state);

    let listen_addr = args.listen.unwrap_or(config.server.listen_addr.clone());
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    log::info!("sportsbook server listening on {}", listen_addr);

    axum::serve(listener, app).await?;
    store.flush()?;
    Ok(())
}
