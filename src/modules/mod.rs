//! Locale-reference record model shared by every module type.
//!
//! A "module" is one entity family served by the store. All five families
//! share one record shape (`ModuleRecord`) and one declarative schema
//! (`ModuleSchema`) describing where their data lives in the CLDR tree and
//! which `main` fields callers may project.

pub mod builder;
pub mod pipeline;
pub mod repository;
pub mod seeder;
pub mod service;
pub mod source;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use builder::RecordBuilder;
pub use pipeline::{GenerationPhase, GenerationPipeline};
pub use repository::{ListParams, ModuleRepository};
pub use seeder::{CollectionSeeder, SeedReport};
pub use service::{ListQuery, ModuleService};
pub use source::SourceDataProvider;

/// The entity family a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleType {
    Languages,
    Territories,
    Numbers,
    Extensions,
    Variants,
}

/// Declarative description of one module type: where its source data lives
/// and which `main` fields are exposed to projection.
#[derive(Debug, Clone, Copy)]
pub struct ModuleSchema {
    /// Storage collection name.
    pub collection: &'static str,

    /// Source file under `cldr-localenames-modern/main/{locale}/`.
    pub source_file: &'static str,

    /// Path of the display-name map inside `main.{locale}.localeDisplayNames`.
    pub name_section: &'static [&'static str],

    /// Path of the sub-classification table, for module types that have one.
    pub types_section: Option<&'static [&'static str]>,

    /// Allowed filter keys for field projection.
    pub filters: &'static [&'static str],
}

const LANGUAGES_SCHEMA: ModuleSchema = ModuleSchema {
    collection: "languages",
    source_file: "languages.json",
    name_section: &["languages"],
    types_section: None,
    filters: &["tag", "displayName"],
};

const TERRITORIES_SCHEMA: ModuleSchema = ModuleSchema {
    collection: "territories",
    source_file: "territories.json",
    name_section: &["territories"],
    types_section: None,
    filters: &[
        "tag",
        "displayName",
        "altDisplayNames",
        "languages",
        "gdp",
        "population",
        "literacyPercent",
        "parentTerritories",
        "contains",
        "currencies",
    ],
};

// Numbering-system display names live inside localeDisplayNames.json, under
// localeDisplayNames.types.numbers, not in a file of their own.
const NUMBERS_SCHEMA: ModuleSchema = ModuleSchema {
    collection: "numbers",
    source_file: "localeDisplayNames.json",
    name_section: &["types", "numbers"],
    types_section: None,
    filters: &["tag", "displayName"],
};

const EXTENSIONS_SCHEMA: ModuleSchema = ModuleSchema {
    collection: "extensions",
    source_file: "localeDisplayNames.json",
    name_section: &["keys"],
    types_section: Some(&["types"]),
    filters: &["tag", "displayName", "types"],
};

const VARIANTS_SCHEMA: ModuleSchema = ModuleSchema {
    collection: "variants",
    source_file: "variants.json",
    name_section: &["variants"],
    types_section: None,
    filters: &["tag", "displayName"],
};

impl ModuleType {
    pub const ALL: [ModuleType; 5] = [
        ModuleType::Languages,
        ModuleType::Territories,
        ModuleType::Numbers,
        ModuleType::Extensions,
        ModuleType::Variants,
    ];

    pub fn schema(&self) -> &'static ModuleSchema {
        match self {
            ModuleType::Languages => &LANGUAGES_SCHEMA,
            ModuleType::Territories => &TERRITORIES_SCHEMA,
            ModuleType::Numbers => &NUMBERS_SCHEMA,
            ModuleType::Extensions => &EXTENSIONS_SCHEMA,
            ModuleType::Variants => &VARIANTS_SCHEMA,
        }
    }

    /// Storage collection name, also used as the stable string form.
    pub fn collection(&self) -> &'static str {
        self.schema().collection
    }

    pub fn from_collection(name: &str) -> Option<ModuleType> {
        ModuleType::ALL
            .into_iter()
            .find(|m| m.collection() == name)
    }
}

/// CLDR source-version metadata carried inside every identity block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityVersions {
    pub cldr: Option<String>,
    pub unicode: Option<String>,
}

/// Locale breakdown a record was generated for. Fully determined by the
/// record's `tag`; immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub territory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    #[serde(default)]
    pub versions: IdentityVersions,
}

/// The unit of storage and the unit returned by every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub id: i64,
    pub tag: String,
    pub module_type: ModuleType,
    pub identity: Identity,
    pub main: Map<String, Value>,
}

impl ModuleRecord {
    /// The sub-entity code inside `main`, or `""` when absent.
    pub fn main_tag(&self) -> &str {
        main_tag_of(&self.main)
    }
}

/// A record body without a storage id: the output of the builder and the
/// input of create/put operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    pub tag: String,
    pub identity: Identity,
    pub main: Map<String, Value>,
}

impl RecordDraft {
    pub fn main_tag(&self) -> &str {
        main_tag_of(&self.main)
    }
}

/// Partial update body: only the supplied fields are replaced.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    pub tag: Option<String>,
    pub identity: Option<Identity>,
    pub main: Option<Map<String, Value>>,
}

fn main_tag_of(main: &Map<String, Value>) -> &str {
    main.get("tag").and_then(Value::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_type_collection_roundtrip() {
        for module in ModuleType::ALL {
            assert_eq!(
                ModuleType::from_collection(module.collection()),
                Some(module)
            );
        }
        assert_eq!(ModuleType::from_collection("scripts"), None);
    }

    #[test]
    fn test_module_type_wire_format() {
        let json = serde_json::to_string(&ModuleType::Territories).expect("serialize");
        assert_eq!(json, "\"TERRITORIES\"");

        let parsed: ModuleType = serde_json::from_str("\"EXTENSIONS\"").expect("deserialize");
        assert_eq!(parsed, ModuleType::Extensions);
    }

    #[test]
    fn test_every_schema_allows_tag_and_display_name() {
        for module in ModuleType::ALL {
            let schema = module.schema();
            assert!(schema.filters.contains(&"tag"), "{}", schema.collection);
            assert!(
                schema.filters.contains(&"displayName"),
                "{}",
                schema.collection
            );
        }
    }

    #[test]
    fn test_identity_value_equality() {
        let a = Identity {
            language: Some("en".to_string()),
            script: None,
            territory: Some("US".to_string()),
            variant: None,
            versions: IdentityVersions {
                cldr: Some("41".to_string()),
                unicode: Some("14.0.0".to_string()),
            },
        };
        let b = a.clone();
        assert_eq!(a, b);

        let mut c = a.clone();
        c.territory = Some("GB".to_string());
        assert_ne!(a, c);
    }

    #[test]
    fn test_record_wire_format_is_camel_case() {
        let record = ModuleRecord {
            id: 7,
            tag: "en".to_string(),
            module_type: ModuleType::Territories,
            identity: Identity {
                language: Some("en".to_string()),
                ..Identity::default()
            },
            main: json!({"tag": "US", "displayName": "United States"})
                .as_object()
                .unwrap()
                .clone(),
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["moduleType"], "TERRITORIES");
        assert_eq!(value["main"]["displayName"], "United States");
        assert_eq!(value["identity"]["language"], "en");
    }

    #[test]
    fn test_main_tag_accessor() {
        let draft = RecordDraft {
            tag: "en".to_string(),
            identity: Identity::default(),
            main: json!({"tag": "US", "displayName": "United States"})
                .as_object()
                .unwrap()
                .clone(),
        };
        assert_eq!(draft.main_tag(), "US");

        let empty = RecordDraft {
            tag: "en".to_string(),
            identity: Identity::default(),
            main: Map::new(),
        };
        assert_eq!(empty.main_tag(), "");
    }
}
