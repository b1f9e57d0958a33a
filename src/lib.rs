//! Queryable store for CLDR locale-reference data.
//!
//! Records for five entity families (languages, territories, numbering
//! systems, locale-extension keys, language variants) are generated from an
//! on-disk CLDR JSON tree and served through a uniform, generic query engine
//! with filtering, pagination and field projection.
//!
//! # Architecture
//!
//! - `modules::source`: reads raw per-locale source documents (lenient)
//! - `modules::builder`: turns a raw document into normalized records
//! - `modules::pipeline`: runs builds across the modern locale catalog
//! - `modules::seeder`: idempotent drop-then-bulk-insert per module
//! - `modules::repository`: generic CRUD + list/family/distinct-tag queries
//! - `modules::service`: validated, transport-agnostic operation surface

pub mod config;
pub mod error;
pub mod modules;
pub mod store;

pub use error::ServiceError;
pub use modules::{Identity, ModuleRecord, ModuleType};
pub use store::Store;
