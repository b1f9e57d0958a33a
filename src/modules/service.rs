//! Validated, transport-agnostic operation surface for one module type.
//!
//! This is the layer an HTTP frontend would call. Every operation validates
//! its inputs and returns a `ServiceError` the transport can map straight to
//! a status code; validation failures short-circuit before the store is
//! touched.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ServiceError;
use crate::store::Store;

use super::repository::{ListParams, ModuleRepository};
use super::source::SourceDataProvider;
use super::{ModuleRecord, ModuleType, RecordDraft, RecordPatch};

/// Raw, caller-supplied listing parameters before validation.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub tags: Option<String>,
    pub locales: Option<String>,
    pub filters: Option<String>,
}

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn locale_tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{1,8})*$").expect("valid locale tag regex")
    })
}

pub struct ModuleService {
    repo: ModuleRepository,
    provider: SourceDataProvider,
}

impl ModuleService {
    pub fn new(store: &Store, provider: SourceDataProvider, module: ModuleType) -> Self {
        Self {
            repo: ModuleRepository::new(store.clone(), module),
            provider,
        }
    }

    pub fn module(&self) -> ModuleType {
        self.repo.module()
    }

    /// Collection-wide listing with defaulted parameters.
    pub fn list(&self, query: &ListQuery) -> Result<Vec<ModuleRecord>, ServiceError> {
        let params = self.resolve(query, true)?;
        Ok(self.repo.list(&params)?)
    }

    /// Family view: one sub-entity across locales. The query is validated
    /// first; only then is the family tag checked against the known tags,
    /// unknown meaning not-found.
    pub fn list_by_family(
        &self,
        tag: &str,
        query: &ListQuery,
    ) -> Result<Vec<ModuleRecord>, ServiceError> {
        let params = self.resolve(query, false)?;

        let known = self.repo.distinct_sub_entity_tags()?;
        if !known.iter().any(|t| t == tag) {
            return Err(ServiceError::NotFound);
        }

        Ok(self.repo.list_by_family(tag, &params)?)
    }

    pub fn get_by_id(&self, id: i64) -> Result<ModuleRecord, ServiceError> {
        self.repo.get_by_id(id)?.ok_or(ServiceError::NotFound)
    }

    /// Create a record, rejecting a duplicate `(main.tag, identity)` for
    /// this module before anything is persisted.
    pub fn create(&self, draft: &RecordDraft) -> Result<i64, ServiceError> {
        self.validate_draft(draft)?;

        if self
            .repo
            .find_duplicate(draft.main_tag(), &draft.identity)?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "{} record for '{}' already exists for this locale",
                self.module().collection(),
                draft.main_tag()
            )));
        }

        Ok(self.repo.create(draft)?)
    }

    /// Full replace. Not-found when `id` is absent.
    pub fn replace_by_id(&self, id: i64, draft: &RecordDraft) -> Result<(), ServiceError> {
        self.validate_draft(draft)?;
        self.repo.get_by_id(id)?.ok_or(ServiceError::NotFound)?;
        Ok(self.repo.replace_by_id(id, draft)?)
    }

    /// Partial update. Not-found when `id` is absent.
    pub fn update_by_id(&self, id: i64, patch: &RecordPatch) -> Result<(), ServiceError> {
        self.validate_patch(patch)?;
        self.repo.get_by_id(id)?.ok_or(ServiceError::NotFound)?;
        Ok(self.repo.update_by_id(id, patch)?)
    }

    /// Idempotent delete.
    pub fn remove_by_id(&self, id: i64) -> Result<(), ServiceError> {
        Ok(self.repo.remove_by_id(id)?)
    }

    pub fn distinct_sub_entity_tags(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.repo.distinct_sub_entity_tags()?)
    }

    /// Parse and default the raw query. Unspecified `tags` means all known
    /// tags for the module, `locales` defaults to the modern catalog,
    /// `filters` to every schema filter field — never an empty result set
    /// by default.
    fn resolve(&self, query: &ListQuery, allow_tags: bool) -> Result<ListParams, ServiceError> {
        let limit = parse_count(query.limit.as_deref(), 25, "limit")?;
        let page = parse_count(query.page.as_deref(), 1, "page")?;
        if page < 1 {
            return Err(ServiceError::Validation(
                "page must be >= 1".to_string(),
            ));
        }

        let locales = match &query.locales {
            Some(raw) => Some(split_list(raw, "locales")?),
            None => Some(self.provider.modern_locales().map_err(ServiceError::Store)?),
        };

        let schema = self.module().schema();
        let filters = match &query.filters {
            Some(raw) => {
                let requested = split_list(raw, "filters")?;
                for field in &requested {
                    if !schema.filters.contains(&field.as_str()) {
                        return Err(ServiceError::Validation(format!(
                            "unknown filter field '{}' for {}",
                            field,
                            self.module().collection()
                        )));
                    }
                }
                Some(requested)
            }
            None => Some(schema.filters.iter().map(|f| f.to_string()).collect()),
        };

        let tags = match (&query.tags, allow_tags) {
            (Some(raw), true) => Some(split_list(raw, "tags")?),
            // None = unrestricted, i.e. all known tags for this module
            _ => None,
        };

        Ok(ListParams {
            tags,
            locales,
            filters,
            limit,
            page,
        })
    }

    fn validate_draft(&self, draft: &RecordDraft) -> Result<(), ServiceError> {
        if !locale_tag_regex().is_match(&draft.tag) {
            return Err(ServiceError::Validation(format!(
                "'{}' is not a valid locale tag",
                draft.tag
            )));
        }
        let main_tag = draft.main_tag();
        if main_tag.is_empty() {
            return Err(ServiceError::Validation(
                "main.tag must be a non-empty string".to_string(),
            ));
        }
        if !draft
            .main
            .get("displayName")
            .map(|v| v.is_string())
            .unwrap_or(false)
        {
            return Err(ServiceError::Validation(
                "main.displayName must be a string".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_patch(&self, patch: &RecordPatch) -> Result<(), ServiceError> {
        if let Some(tag) = &patch.tag {
            if !locale_tag_regex().is_match(tag) {
                return Err(ServiceError::Validation(format!(
                    "'{}' is not a valid locale tag",
                    tag
                )));
            }
        }
        if let Some(main) = &patch.main {
            let main_tag = main.get("tag").and_then(|v| v.as_str()).unwrap_or("");
            if main_tag.is_empty() {
                return Err(ServiceError::Validation(
                    "main.tag must be a non-empty string".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn parse_count(raw: Option<&str>, default: u32, name: &str) -> Result<u32, ServiceError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
            ServiceError::Validation(format!("{} must be a non-negative integer", name))
        }),
    }
}

fn split_list(raw: &str, name: &str) -> Result<Vec<String>, ServiceError> {
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        return Err(ServiceError::Validation(format!(
            "{} must be a non-empty comma-separated list",
            name
        )));
    }
    Ok(items)
}
