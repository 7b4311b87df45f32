//! Schema documents and `$ref` resolution.
//!
//! Schemas are parsed once into [`SchemaNode`] trees and indexed by every
//! reachable pointer, so reference lookups during a tree walk are a single
//! map access.

mod node;
mod registry;

pub use node::{
    BindingSource, Bindings, LocalizableTypeSpec, ScalarKind, SchemaNode, SchemaShape,
    TYPE_KEYWORDS,
};
pub use registry::{
    DEFAULT_SCHEMA_ID, ReferenceIndex, SchemaDocument, SchemaError, SchemaRegistry,
    default_strings_schema,
};
