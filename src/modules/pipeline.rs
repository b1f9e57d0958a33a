//! Per-locale generation of a module's full record set.

use anyhow::Result;
use tracing::info;

use super::builder::RecordBuilder;
use super::source::SourceDataProvider;
use super::{ModuleType, RecordDraft};

/// Phase of a generation run a progress tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Build,
    Insert,
}

impl GenerationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationPhase::Build => "build",
            GenerationPhase::Insert => "insert",
        }
    }
}

/// Everything a generation run produced, in catalog order.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub records_by_locale: Vec<(String, Vec<RecordDraft>)>,
}

impl GenerationOutput {
    pub fn record_count(&self) -> usize {
        self.records_by_locale
            .iter()
            .map(|(_, records)| records.len())
            .sum()
    }
}

/// Sequential fetch + build across the modern locale catalog.
///
/// Sequential by design: throughput is bounded by source I/O, and in-order
/// execution keeps progress reporting deterministic. The progress callback
/// is scoped to one run; it receives one tick per locale per phase.
pub struct GenerationPipeline<'a> {
    provider: &'a SourceDataProvider,
}

impl<'a> GenerationPipeline<'a> {
    pub fn new(provider: &'a SourceDataProvider) -> Self {
        Self { provider }
    }

    pub fn run(
        &self,
        module: ModuleType,
        progress: &mut dyn FnMut(&str, GenerationPhase),
    ) -> Result<GenerationOutput> {
        let locales = self.provider.modern_locales()?;
        let mut records_by_locale = Vec::with_capacity(locales.len());

        for locale in locales {
            let doc = self.provider.fetch(module, &locale);
            let records = RecordBuilder::build(&doc, &locale, module);
            progress(&locale, GenerationPhase::Build);
            records_by_locale.push((locale, records));
        }

        Ok(GenerationOutput { records_by_locale })
    }
}

/// Default progress sink: one structured log line per tick.
pub fn log_progress(module: ModuleType) -> impl FnMut(&str, GenerationPhase) {
    move |locale: &str, phase: GenerationPhase| {
        info!(
            module = module.collection(),
            locale,
            phase = phase.as_str(),
            "generation progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    fn write_file(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(path, contents).expect("write");
    }

    fn variants_doc(locale: &str, entries: &[(&str, &str)]) -> String {
        let variants: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::json!({
            "main": {
                locale: {
                    "identity": {
                        "version": { "_cldrVersion": "41" },
                        "language": locale
                    },
                    "localeDisplayNames": { "variants": variants }
                }
            }
        })
        .to_string()
    }

    fn fixture_tree(locales: &[&str]) -> (SourceDataProvider, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let catalog = serde_json::json!({ "availableLocales": { "modern": locales } });
        write_file(
            temp_dir.path(),
            "cldr-core/availableLocales.json",
            &catalog.to_string(),
        );
        (SourceDataProvider::new(temp_dir.path()), temp_dir)
    }

    // ==================== run Tests ====================

    #[test]
    fn test_run_covers_catalog_in_order() {
        let (provider, temp_dir) = fixture_tree(&["de", "en", "fr"]);
        for locale in ["de", "en", "fr"] {
            write_file(
                temp_dir.path(),
                &format!("cldr-localenames-modern/main/{}/variants.json", locale),
                &variants_doc(locale, &[("POSIX", "Computer")]),
            );
        }

        let pipeline = GenerationPipeline::new(&provider);
        let mut ticks: Vec<String> = Vec::new();
        let output = pipeline
            .run(ModuleType::Variants, &mut |locale, phase| {
                ticks.push(format!("{}:{}", locale, phase.as_str()))
            })
            .expect("run");

        let order: Vec<&str> = output
            .records_by_locale
            .iter()
            .map(|(locale, _)| locale.as_str())
            .collect();
        assert_eq!(order, vec!["de", "en", "fr"]);
        assert_eq!(ticks, vec!["de:build", "en:build", "fr:build"]);
        assert_eq!(output.record_count(), 3);
    }

    #[test]
    fn test_run_tolerates_missing_locale_documents() {
        let (provider, temp_dir) = fixture_tree(&["en", "zz"]);
        write_file(
            temp_dir.path(),
            "cldr-localenames-modern/main/en/variants.json",
            &variants_doc("en", &[("POSIX", "Computer"), ("1901", "Traditional German")]),
        );
        // no document at all for "zz"

        let pipeline = GenerationPipeline::new(&provider);
        let output = pipeline
            .run(ModuleType::Variants, &mut |_, _| {})
            .expect("run");

        assert_eq!(output.records_by_locale.len(), 2);
        assert_eq!(output.records_by_locale[0].1.len(), 2);
        assert!(output.records_by_locale[1].1.is_empty());
    }

    #[test]
    fn test_run_fails_without_catalog() {
        let temp_dir = TempDir::new().expect("temp dir");
        let provider = SourceDataProvider::new(temp_dir.path());

        let pipeline = GenerationPipeline::new(&provider);
        let result = pipeline.run(ModuleType::Variants, &mut |_, _| {});
        assert!(result.is_err());
    }
}
