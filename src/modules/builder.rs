//! Extraction of normalized records from one raw source document.

use serde_json::{Map, Value};

use super::{Identity, IdentityVersions, ModuleType, RecordDraft};

pub struct RecordBuilder;

impl RecordBuilder {
    /// Build zero or more records for `locale` from a raw document.
    ///
    /// One record per sub-entity key in the module's display-name section,
    /// skipping alt-name keys — alternate names are never materialized as
    /// standalone records. A document with no data for `locale` yields an
    /// empty list; that is expected, not an error.
    pub fn build(doc: &Value, locale: &str, module: ModuleType) -> Vec<RecordDraft> {
        let schema = module.schema();

        let locale_block = match doc.get("main").and_then(|m| m.get(locale)) {
            Some(block) => block,
            None => return Vec::new(),
        };

        let identity = match Self::extract_identity(locale_block) {
            Some(identity) => identity,
            None => return Vec::new(),
        };

        let display = locale_block.get("localeDisplayNames");
        let names = match walk(display, schema.name_section).and_then(Value::as_object) {
            Some(names) => names,
            None => return Vec::new(),
        };
        let types_table = schema
            .types_section
            .and_then(|path| walk(display, path))
            .and_then(Value::as_object);

        names
            .iter()
            .filter(|(key, _)| !key.contains("alt"))
            .map(|(key, display_name)| {
                let mut main = Map::new();
                main.insert("tag".to_string(), Value::String(key.clone()));
                main.insert("displayName".to_string(), display_name.clone());
                if let Some(types) = types_table.and_then(|t| t.get(key.as_str())) {
                    main.insert("types".to_string(), types.clone());
                }

                RecordDraft {
                    tag: locale.to_string(),
                    identity: identity.clone(),
                    main,
                }
            })
            .collect()
    }

    fn extract_identity(locale_block: &Value) -> Option<Identity> {
        let identity = locale_block.get("identity")?;
        let version = identity.get("version");

        Some(Identity {
            language: string_field(identity, "language"),
            script: string_field(identity, "script"),
            territory: string_field(identity, "territory"),
            variant: string_field(identity, "variant"),
            versions: IdentityVersions {
                cldr: version.and_then(|v| string_field(v, "_cldrVersion")),
                unicode: version.and_then(|v| string_field(v, "_unicodeVersion")),
            },
        })
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn walk<'a>(value: Option<&'a Value>, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value?, |v, key| v.get(key))
}
