//! The localization engine.
//!
//! - `schema`: schema documents, the registry and `$ref` resolution
//! - `mapping` and `template`: which schema and output path a document gets
//! - `walker`: extraction and localization passes over one document tree
//! - `document`: batch processing of the documents of a project
//! - `resource`, `locale`, `pointer`, `pseudo`: the values passed between them

pub mod document;
pub mod locale;
pub mod mapping;
pub mod parsers;
pub mod pointer;
pub mod pseudo;
pub mod resource;
pub mod schema;
pub mod template;
pub mod walker;

pub use document::{DocumentType, LocalizedDocument, WrittenDocument};
pub use resource::{Resource, ResourceSet};
