//! Preview binary - runs a listing against the local store and prints the
//! records as JSON, without going through any transport layer.
//!
//! Usage:
//!   cargo run --bin preview                       # list territories
//!   MODULE=languages cargo run --bin preview      # pick another module
//!
//! Required environment variables:
//! - CLDR_DATA_DIR (for the default locale catalog)
//!
//! Optional:
//! - DATABASE_PATH (defaults to cldr-records.db)
//! - MODULE (defaults to territories)
//! - TAGS, LOCALES, FILTERS (comma lists)
//! - LIMIT (defaults to 25), PAGE (defaults to 1)

use anyhow::{bail, Context, Result};
use tracing::info;

use cldr_record_store::config::Config;
use cldr_record_store::modules::{ListQuery, ModuleService, ModuleType, SourceDataProvider};
use cldr_record_store::store::Store;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cldr_record_store=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let module_name =
        std::env::var("MODULE").unwrap_or_else(|_| "territories".to_string());
    let Some(module) = ModuleType::from_collection(&module_name) else {
        bail!("Unknown module '{}'", module_name);
    };

    let query = ListQuery {
        limit: std::env::var("LIMIT").ok(),
        page: std::env::var("PAGE").ok(),
        tags: std::env::var("TAGS").ok(),
        locales: std::env::var("LOCALES").ok(),
        filters: std::env::var("FILTERS").ok(),
    };

    let store = Store::new(&config.database_path)?;
    let provider = SourceDataProvider::new(&config.cldr_root);
    let service = ModuleService::new(&store, provider, module);

    let records = service.list(&query)?;
    info!(module = module.collection(), count = records.len(), "Listed records");

    let output =
        serde_json::to_string_pretty(&records).context("Failed to serialize records")?;
    println!("{}", output);

    Ok(())
}
