//! Lenient access to the on-disk CLDR JSON tree.
//!
//! Per-locale source documents are best-effort: a missing or malformed file
//! yields an empty document so that generation keeps going. The locale
//! catalog, by contrast, is required — without it there is nothing to
//! iterate.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ModuleType;

#[derive(Debug, Clone)]
pub struct SourceDataProvider {
    root: PathBuf,
}

impl SourceDataProvider {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Raw source document for one module type and locale.
    ///
    /// Returns an empty JSON object when the file is missing or malformed;
    /// generation must stay resilient to gaps in per-locale data.
    pub fn fetch(&self, module: ModuleType, locale: &str) -> Value {
        let path = self.document_path(module, locale);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Source document unreadable, using empty document");
                return Value::Object(Default::default());
            }
        };

        match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Source document malformed, using empty document");
                Value::Object(Default::default())
            }
        }
    }

    /// Resolved path of a module's source document for one locale.
    pub fn document_path(&self, module: ModuleType, locale: &str) -> PathBuf {
        self.root
            .join("cldr-localenames-modern")
            .join("main")
            .join(locale)
            .join(module.schema().source_file)
    }

    /// The "modern" locale catalog from cldr-core.
    pub fn modern_locales(&self) -> Result<Vec<String>> {
        let path = self.root.join("cldr-core").join("availableLocales.json");

        let contents = fs::read_to_string(&path)
            .context(format!("Failed to read locale catalog at {}", path.display()))?;
        let catalog: Value =
            serde_json::from_str(&contents).context("Failed to parse locale catalog")?;

        let locales = catalog
            .get("availableLocales")
            .and_then(|a| a.get("modern"))
            .and_then(Value::as_array)
            .context("Locale catalog has no availableLocales.modern list")?;

        Ok(locales
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }
}
