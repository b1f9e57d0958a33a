//! Idempotent bulk load of one module's collection.

use anyhow::Result;
use tracing::{info, warn};

use crate::store::Store;

use super::pipeline::{GenerationPhase, GenerationPipeline};
use super::repository::ModuleRepository;
use super::source::SourceDataProvider;
use super::ModuleType;

/// Outcome of one seeding run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub module: ModuleType,
    pub inserted_count: usize,
}

impl SeedReport {
    /// One human-readable line, e.g. `Territories: 1520 documents inserted.`
    pub fn summary(&self) -> String {
        let name = self.module.collection();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        };
        format!("{}: {} documents inserted.", capitalized, self.inserted_count)
    }
}

/// Drop-then-repopulate loader.
///
/// Not transactional across locales: a failed batch is logged and skipped,
/// records from other locales stay. Idempotent per full run because the
/// collection is cleared first — reseeding from the same source converges
/// to the same record set.
pub struct CollectionSeeder<'a> {
    store: &'a Store,
    provider: &'a SourceDataProvider,
}

impl<'a> CollectionSeeder<'a> {
    pub fn new(store: &'a Store, provider: &'a SourceDataProvider) -> Self {
        Self { store, provider }
    }

    pub fn seed(
        &self,
        module: ModuleType,
        progress: &mut dyn FnMut(&str, GenerationPhase),
    ) -> Result<SeedReport> {
        let repo = ModuleRepository::new(self.store.clone(), module);

        info!(module = module.collection(), "Seeding module collection");
        // A failed drop must not abort the run
        if let Err(e) = repo.clear() {
            warn!(
                module = module.collection(),
                error = %e,
                "Failed to drop collection, continuing"
            );
        }

        let output = GenerationPipeline::new(self.provider).run(module, &mut *progress)?;

        let mut inserted_count = 0usize;
        for (locale, drafts) in &output.records_by_locale {
            match repo.insert_many(drafts) {
                Ok(ids) => inserted_count += ids.len(),
                Err(e) => {
                    warn!(
                        module = module.collection(),
                        locale,
                        error = %e,
                        "Failed to insert locale batch, skipping"
                    );
                }
            }
            progress(locale, GenerationPhase::Insert);
        }

        info!(
            module = module.collection(),
            inserted = inserted_count,
            "Seeding complete"
        );

        Ok(SeedReport {
            module,
            inserted_count,
        })
    }
}
