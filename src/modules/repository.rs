//! Generic query engine over the shared record store.
//!
//! One repository instance is scoped to a single module type; every module
//! uses the same engine. Listing applies the selection predicate in SQL,
//! then the field projection in memory against the module's filter schema.

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::OptionalExtension;
use serde_json::{Map, Value};

use crate::store::Store;

use super::{Identity, ModuleRecord, ModuleType, RecordDraft, RecordPatch};

/// Resolved listing parameters.
///
/// `None` for `tags`, `locales` or `filters` means "unrestricted": all known
/// sub-entity tags, all locales present in the collection, all schema filter
/// fields. Callers that want narrower defaults (e.g. the modern locale
/// catalog) resolve them before handing the parameters over. An explicit
/// empty set for `tags` or `locales` selects nothing.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub tags: Option<Vec<String>>,
    pub locales: Option<Vec<String>>,
    pub filters: Option<Vec<String>>,
    pub limit: u32,
    pub page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            tags: None,
            locales: None,
            filters: None,
            limit: 25,
            page: 1,
        }
    }
}

#[derive(Clone)]
pub struct ModuleRepository {
    store: Store,
    module: ModuleType,
}

impl ModuleRepository {
    pub fn new(store: Store, module: ModuleType) -> Self {
        Self { store, module }
    }

    pub fn module(&self) -> ModuleType {
        self.module
    }

    /// Filtered, projected, paginated listing.
    ///
    /// Predicate: `tag IN locales AND main.tag IN tags`. Sort is
    /// `(tag, main.tag)` ascending — a stable total order, so pagination is
    /// deterministic. `page` is 1-based.
    pub fn list(&self, params: &ListParams) -> Result<Vec<ModuleRecord>> {
        // An explicit empty set selects nothing; skip the query rather than
        // render an `IN ()` clause SQLite rejects.
        let empty_selection = params
            .locales
            .as_ref()
            .is_some_and(|locales| locales.is_empty())
            || params.tags.as_ref().is_some_and(|tags| tags.is_empty());
        if empty_selection {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            "SELECT id, tag, identity, main FROM records WHERE module_type = ?",
        );
        let mut values: Vec<String> = vec![self.module.collection().to_string()];

        if let Some(locales) = &params.locales {
            sql.push_str(&format!(" AND tag IN ({})", placeholders(locales.len())));
            values.extend(locales.iter().cloned());
        }
        if let Some(tags) = &params.tags {
            sql.push_str(&format!(" AND main_tag IN ({})", placeholders(tags.len())));
            values.extend(tags.iter().cloned());
        }

        let offset = u64::from(params.page.saturating_sub(1)) * u64::from(params.limit);
        sql.push_str(&format!(
            " ORDER BY tag ASC, main_tag ASC LIMIT {} OFFSET {}",
            params.limit, offset
        ));

        let rows = {
            let conn = self.store.conn();
            let mut stmt = conn.prepare(&sql).context("Failed to prepare list query")?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(values.iter()), |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })
                .context("Failed to run list query")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Failed to read list rows")?;
            rows
        };

        rows.into_iter()
            .map(|(id, tag, identity, main)| {
                let mut record = self.parse_record(id, tag, &identity, &main)?;
                record.main = self.project(record.main, params.filters.as_deref());
                Ok(record)
            })
            .collect()
    }

    /// Single sub-entity across many locales: `main.tag == tag AND tag IN
    /// locales`. Any `tags` value in `params` is ignored.
    pub fn list_by_family(&self, tag: &str, params: &ListParams) -> Result<Vec<ModuleRecord>> {
        let params = ListParams {
            tags: Some(vec![tag.to_string()]),
            ..params.clone()
        };
        self.list(&params)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<ModuleRecord>> {
        let row = {
            let conn = self.store.conn();
            conn.query_row(
                "SELECT id, tag, identity, main FROM records
                 WHERE id = ? AND module_type = ?",
                rusqlite::params![id, self.module.collection()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .context("Failed to query record by id")?
        };

        match row {
            Some((id, tag, identity, main)) => {
                Ok(Some(self.parse_record(id, tag, &identity, &main)?))
            }
            None => Ok(None),
        }
    }

    /// Insert one record and return its id. Uniqueness of
    /// `(module_type, tag, main.tag)` is the caller's responsibility.
    pub fn create(&self, draft: &RecordDraft) -> Result<i64> {
        let identity =
            serde_json::to_string(&draft.identity).context("Failed to serialize identity")?;
        let main = serde_json::to_string(&draft.main).context("Failed to serialize main")?;
        let now = Utc::now().to_rfc3339();

        let conn = self.store.conn();
        conn.execute(
            "INSERT INTO records (module_type, tag, main_tag, identity, main, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            rusqlite::params![
                self.module.collection(),
                draft.tag,
                draft.main_tag(),
                identity,
                main,
                now
            ],
        )
        .context("Failed to insert record")?;

        Ok(conn.last_insert_rowid())
    }

    /// Bulk-insert one locale's batch. Fails as a unit; the seeder decides
    /// whether a failed batch aborts the run.
    pub fn insert_many(&self, drafts: &[RecordDraft]) -> Result<Vec<i64>> {
        drafts.iter().map(|draft| self.create(draft)).collect()
    }

    /// Full replace of the mutable fields. No-op if `id` does not exist.
    pub fn replace_by_id(&self, id: i64, draft: &RecordDraft) -> Result<()> {
        let identity =
            serde_json::to_string(&draft.identity).context("Failed to serialize identity")?;
        let main = serde_json::to_string(&draft.main).context("Failed to serialize main")?;
        let now = Utc::now().to_rfc3339();

        let conn = self.store.conn();
        conn.execute(
            "UPDATE records SET tag = ?1, main_tag = ?2, identity = ?3, main = ?4, updated_at = ?5
             WHERE id = ?6 AND module_type = ?7",
            rusqlite::params![
                draft.tag,
                draft.main_tag(),
                identity,
                main,
                now,
                id,
                self.module.collection()
            ],
        )
        .context("Failed to replace record")?;

        Ok(())
    }

    /// Partial update: only the supplied fields are replaced. No-op if `id`
    /// does not exist; callers that need a not-found signal check first.
    pub fn update_by_id(&self, id: i64, patch: &RecordPatch) -> Result<()> {
        let existing = match self.get_by_id(id)? {
            Some(record) => record,
            None => return Ok(()),
        };

        let draft = RecordDraft {
            tag: patch.tag.clone().unwrap_or(existing.tag),
            identity: patch.identity.clone().unwrap_or(existing.identity),
            main: patch.main.clone().unwrap_or(existing.main),
        };
        self.replace_by_id(id, &draft)
    }

    /// Idempotent delete.
    pub fn remove_by_id(&self, id: i64) -> Result<()> {
        let conn = self.store.conn();
        conn.execute(
            "DELETE FROM records WHERE id = ? AND module_type = ?",
            rusqlite::params![id, self.module.collection()],
        )
        .context("Failed to delete record")?;
        Ok(())
    }

    /// All distinct `main.tag` values in this module's collection, sorted.
    pub fn distinct_sub_entity_tags(&self) -> Result<Vec<String>> {
        let conn = self.store.conn();
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT main_tag FROM records
                 WHERE module_type = ? ORDER BY main_tag ASC",
            )
            .context("Failed to prepare distinct-tag query")?;

        let tags = stmt
            .query_map([self.module.collection()], |row| row.get::<_, String>(0))
            .context("Failed to run distinct-tag query")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read distinct tags")?;

        Ok(tags)
    }

    /// Id of an existing record with the same sub-entity tag and an equal
    /// identity value, if any. Identity comparison is by value, not by
    /// object identity.
    pub fn find_duplicate(&self, main_tag: &str, identity: &Identity) -> Result<Option<i64>> {
        let rows = {
            let conn = self.store.conn();
            let mut stmt = conn
                .prepare(
                    "SELECT id, identity FROM records
                     WHERE module_type = ? AND main_tag = ?",
                )
                .context("Failed to prepare duplicate query")?;

            let rows = stmt
                .query_map(
                    rusqlite::params![self.module.collection(), main_tag],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
                )
                .context("Failed to run duplicate query")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("Failed to read duplicate rows")?;
            rows
        };

        for (id, raw) in rows {
            let existing: Identity =
                serde_json::from_str(&raw).context("Failed to parse stored identity")?;
            if existing == *identity {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Drop this module's collection. Returns the number of deleted rows.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.store.conn();
        let deleted = conn
            .execute(
                "DELETE FROM records WHERE module_type = ?",
                [self.module.collection()],
            )
            .context("Failed to clear collection")?;
        Ok(deleted)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.store.conn();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM records WHERE module_type = ?",
                [self.module.collection()],
                |row| row.get(0),
            )
            .context("Failed to count records")?;
        Ok(count as usize)
    }

    fn parse_record(&self, id: i64, tag: String, identity: &str, main: &str) -> Result<ModuleRecord> {
        let identity: Identity =
            serde_json::from_str(identity).context("Failed to parse stored identity")?;
        let main: Map<String, Value> =
            serde_json::from_str(main).context("Failed to parse stored main payload")?;

        Ok(ModuleRecord {
            id,
            tag,
            module_type: self.module,
            identity,
            main,
        })
    }

    /// Keep `main.tag` plus every requested filter field; `None` means all
    /// schema filter fields. Fields outside the schema never survive a
    /// listing projection.
    fn project(&self, mut main: Map<String, Value>, filters: Option<&[String]>) -> Map<String, Value> {
        let schema = self.module.schema();
        main.retain(|key, _| {
            if key == "tag" {
                return true;
            }
            match filters {
                Some(requested) => requested.iter().any(|f| f == key),
                None => schema.filters.contains(&key.as_str()),
            }
        });
        main
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
