use anyhow::Result;
use tracing::info;

use cldr_record_store::config::Config;
use cldr_record_store::modules::pipeline::log_progress;
use cldr_record_store::modules::{CollectionSeeder, ModuleType, SourceDataProvider};
use cldr_record_store::store::Store;

fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cldr_record_store=info".parse()?),
        )
        .init();

    info!("Starting CLDR record seeding job");

    // Load configuration from environment
    let config = Config::from_env()?;

    let store = Store::new(&config.database_path)?;
    let provider = SourceDataProvider::new(&config.cldr_root);
    let seeder = CollectionSeeder::new(&store, &provider);

    // Each module's collection is dropped and repopulated in full
    for module in ModuleType::ALL {
        let mut progress = log_progress(module);
        let report = seeder.seed(module, &mut progress)?;
        info!("{}", report.summary());
    }

    info!("Seeding finished");
    Ok(())
}
