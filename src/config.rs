use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // CLDR source data
    pub cldr_root: String,

    // Storage
    pub database_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Root of the CLDR JSON tree (contains cldr-core and
            // cldr-localenames-modern)
            cldr_root: std::env::var("CLDR_DATA_DIR").context("CLDR_DATA_DIR not set")?,

            // SQLite database file
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "cldr-records.db".to_string()),
        })
    }
}
