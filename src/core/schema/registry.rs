use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde_json::{Value, json};
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::pointer::{ROOT_REF, escape_ref, unescape_ref};

use super::node::{SchemaNode, SchemaShape};

/// Id of the built-in schema used when a mapping names nothing we know.
pub const DEFAULT_SCHEMA_ID: &str = "strings-schema";

/// Origin recorded for the built-in default schema.
const BUILT_IN_ORIGIN: &str = "<built-in>";

/// Schema file extensions accepted when loading a directory.
const SCHEMA_EXTENSIONS: &[&str] = &["json", "jsn"];

/// Bound on chained `$ref` hops, so reference cycles terminate.
const MAX_REF_DEPTH: usize = 64;

/// Where a schema keeps its plural output templates, one per element name
/// plus `default`.
const PLURAL_TEMPLATES: &[&str] = &["$defs", "templates", "plurals"];

const DEFAULT_PLURAL_TEMPLATE: &str = "default";

/// Fatal schema loading failures.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema {origin} is not a JSON object")]
    NotAnObject { origin: String },

    #[error("Duplicate schema id \"{id}\" in {origin}")]
    DuplicateId { id: String, origin: String },
}

/// Every schema node of one document, keyed by its pointer path and by
/// `#anchor` for declared anchors.
///
/// Path segments are stored escaped (`~1`, `%20`, ...). Lookups through
/// [`SchemaDocument::resolve`] accept both escaped and raw segments; a raw
/// member name containing `/` cannot be told apart from two segments.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    refs: HashMap<String, SchemaNode>,
}

impl ReferenceIndex {
    /// Index a whole document in one pass.
    pub fn build(root: &Value) -> Self {
        let mut index = ReferenceIndex::default();
        index.visit(root, ROOT_REF.to_string());
        index
    }

    fn visit(&mut self, value: &Value, reference: String) {
        let Value::Object(map) = value else {
            return;
        };

        let node = SchemaNode::from_value(value);
        if let Some(anchor) = map.get("$anchor").and_then(Value::as_str) {
            self.refs.insert(format!("#{}", anchor), node.clone());
        }

        for (prop, child) in map {
            if prop == "$anchor" {
                continue;
            }
            let child_ref = format!("{}/{}", reference, escape_ref(prop));
            match child {
                Value::Array(elements) => {
                    for (i, element) in elements.iter().enumerate() {
                        self.visit(element, format!("{}[{}]", child_ref, i));
                    }
                }
                Value::Object(_) => self.visit(child, child_ref),
                _ => {}
            }
        }

        self.refs.insert(reference, node);
    }

    pub fn get(&self, reference: &str) -> Option<&SchemaNode> {
        self.refs.get(reference)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// A loaded schema: its id, its root node and its reference index.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub id: String,
    pub origin: String,
    pub root: SchemaNode,
    pub index: ReferenceIndex,
    plural_templates: IndexMap<String, Value>,
}

impl SchemaDocument {
    /// Parse and index a schema given as JSON text.
    pub fn parse(text: &str, origin: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text).map_err(|source| SchemaError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_value(value, origin)
    }

    /// Index an already-parsed schema. The id is `$id`, then `id`, then the
    /// origin's file stem.
    pub fn from_value(value: Value, origin: &str) -> Result<Self, SchemaError> {
        let Value::Object(map) = &value else {
            return Err(SchemaError::NotAnObject {
                origin: origin.to_string(),
            });
        };

        let id = map
            .get("$id")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                Path::new(origin)
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| origin.to_string())
            });

        let plural_templates = PLURAL_TEMPLATES
            .iter()
            .try_fold(&value, |node, member| node.get(*member))
            .and_then(Value::as_object)
            .map(|templates| {
                templates
                    .iter()
                    .map(|(name, template)| (name.clone(), template.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(SchemaDocument {
            id,
            origin: origin.to_string(),
            root: SchemaNode::from_value(&value),
            index: ReferenceIndex::build(&value),
            plural_templates,
        })
    }

    /// Output template for plurals held by `element`, else the default one.
    pub fn plural_template(&self, element: &str) -> Option<&Value> {
        self.plural_templates
            .get(element)
            .or_else(|| self.plural_templates.get(DEFAULT_PLURAL_TEMPLATE))
    }

    /// Look up a `$ref` target. Only references into this document resolve:
    /// `#/pointer`, `#anchor`, or either prefixed with this document's id.
    pub fn resolve(&self, reference: &str) -> Option<&SchemaNode> {
        let local = match reference.find('#') {
            Some(0) => reference,
            Some(pos) if reference[..pos] == self.id => &reference[pos..],
            Some(_) => return None,
            None if reference == self.id => ROOT_REF,
            None => return None,
        };
        self.index
            .get(local)
            .or_else(|| self.index.get(&canonical_ref(local)))
    }

    /// Follow `$ref` chains starting at `node` until a non-reference node is
    /// reached. Returns `Err` with the first reference that did not resolve.
    pub fn follow<'a>(&'a self, mut node: &'a SchemaNode) -> Result<&'a SchemaNode, String> {
        for _ in 0..MAX_REF_DEPTH {
            let SchemaShape::Ref(target) = &node.shape else {
                return Ok(node);
            };
            node = self.resolve(target).ok_or_else(|| target.clone())?;
        }
        match &node.shape {
            SchemaShape::Ref(target) => Err(target.clone()),
            _ => Ok(node),
        }
    }
}

/// Re-escape every segment of a `#/...` reference the way the index stores it.
fn canonical_ref(reference: &str) -> String {
    match reference.strip_prefix("#/") {
        Some(path) => {
            let segments: Vec<String> = path
                .split('/')
                .map(|segment| escape_ref(&unescape_ref(segment)))
                .collect();
            format!("#/{}", segments.join("/"))
        }
        None => reference.to_string(),
    }
}

/// The built-in schema: every top-level member is a localizable string.
pub fn default_strings_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": DEFAULT_SCHEMA_ID,
        "type": "object",
        "additionalProperties": {
            "type": "string",
            "localizable": true
        }
    })
}

/// All schema documents known to a project, by id.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    documents: HashMap<String, SchemaDocument>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// A registry holding only the built-in default schema.
    pub fn new() -> Self {
        let mut documents = HashMap::new();
        if let Ok(default) = SchemaDocument::from_value(default_strings_schema(), BUILT_IN_ORIGIN) {
            documents.insert(default.id.clone(), default);
        }
        Self { documents }
    }

    /// Register a document. Loaded schemas may replace the built-in default,
    /// but two loaded schemas may not share an id.
    pub fn add(&mut self, document: SchemaDocument) -> Result<(), SchemaError> {
        if let Some(existing) = self.documents.get(&document.id)
            && existing.origin != BUILT_IN_ORIGIN
        {
            return Err(SchemaError::DuplicateId {
                id: document.id,
                origin: document.origin,
            });
        }
        tracing::debug!(id = %document.id, refs = document.index.len(), "loaded schema");
        self.documents.insert(document.id.clone(), document);
        Ok(())
    }

    /// Load one schema file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), SchemaError> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = SchemaDocument::parse(&text, &path.to_string_lossy())?;
        self.add(document)
    }

    /// Load a schema file, or every `.json`/`.jsn` file below a directory.
    pub fn load_path(&mut self, path: &Path) -> Result<(), SchemaError> {
        if !path.is_dir() {
            return self.load_file(path);
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|file| {
                file.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| SCHEMA_EXTENSIONS.contains(&ext))
            })
            .collect();
        files.sort();

        for file in files {
            self.load_file(&file)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&SchemaDocument> {
        self.documents.get(id)
    }

    /// The schema registered under `id`, or the built-in default.
    pub fn get_or_default(&self, id: Option<&str>) -> Option<&SchemaDocument> {
        id.and_then(|id| self.get(id))
            .or_else(|| self.get(DEFAULT_SCHEMA_ID))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}
