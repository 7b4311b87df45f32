use std::{collections::HashMap, fmt};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Plural category used when none was bound.
pub const DEFAULT_CATEGORY: &str = "other";

/// Shape of a resource's source and target values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    String,
    Array,
    Plural,
}

impl ResourceKind {
    /// Unknown names fall back to `String`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "array" => ResourceKind::Array,
            "plural" => ResourceKind::Plural,
            _ => ResourceKind::String,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::String => write!(f, "string"),
            ResourceKind::Array => write!(f, "array"),
            ResourceKind::Plural => write!(f, "plural"),
        }
    }
}

/// A source or target value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    String(String),
    Array(Vec<String>),
    Plural(IndexMap<String, String>),
}

impl ResourceValue {
    pub fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::String => ResourceValue::String(String::new()),
            ResourceKind::Array => ResourceValue::Array(Vec::new()),
            ResourceKind::Plural => ResourceValue::Plural(IndexMap::new()),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceValue::String(_) => ResourceKind::String,
            ResourceValue::Array(_) => ResourceKind::Array,
            ResourceValue::Plural(_) => ResourceKind::Plural,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ResourceValue::String(s) => s.is_empty(),
            ResourceValue::Array(items) => items.is_empty(),
            ResourceValue::Plural(forms) => forms.is_empty(),
        }
    }

    /// Apply `f` to every string inside the value, keeping its shape.
    pub fn map_strings(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            ResourceValue::String(s) => ResourceValue::String(f(s)),
            ResourceValue::Array(items) => {
                ResourceValue::Array(items.iter().map(|item| f(item)).collect())
            }
            ResourceValue::Plural(forms) => ResourceValue::Plural(
                forms
                    .iter()
                    .map(|(category, text)| (category.clone(), f(text)))
                    .collect(),
            ),
        }
    }

    /// The piece of this value that belongs at one position of the document.
    ///
    /// Strings return themselves, arrays the element at `index`, plurals the
    /// form for `category` (or `other`).
    pub fn piece(&self, index: Option<usize>, category: Option<&str>) -> Option<&str> {
        match self {
            ResourceValue::String(s) => Some(s),
            ResourceValue::Array(items) => items.get(index.unwrap_or(0)).map(String::as_str),
            ResourceValue::Plural(forms) => forms
                .get(category.unwrap_or(DEFAULT_CATEGORY))
                .map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    #[default]
    New,
    Translated,
}

/// Build the lookup key of a resource in a [`ResourceSet`].
///
/// The key is stable across runs: it only depends on the project, the
/// locale the value is written in, the resource key and the datatype.
pub fn hash_key(project: &str, locale: &str, key: &str, datatype: &str) -> String {
    format!("{}_{}_{}_{}", project, locale, key, datatype)
}

/// One extracted or translated unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub key: String,
    pub source: ResourceValue,
    pub source_locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ResourceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_locale: Option<String>,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub datatype: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub state: ResourceState,
    #[serde(default)]
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        self.source.kind()
    }

    /// Key under which this resource is stored: the target locale for
    /// translations, the source locale otherwise.
    pub fn hash_key(&self) -> String {
        let locale = self.target_locale.as_deref().unwrap_or(&self.source_locale);
        hash_key(&self.project, locale, &self.key, &self.datatype)
    }

    /// Key under which the translation of this resource into `locale` is stored.
    pub fn hash_key_for_translation(&self, locale: &str) -> String {
        hash_key(&self.project, locale, &self.key, &self.datatype)
    }
}

/// An insertion-ordered collection of resources keyed by [`Resource::hash_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    resources: Vec<Resource>,
    by_hash: HashMap<String, usize>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash_key: &str) -> Option<&Resource> {
        self.by_hash.get(hash_key).map(|&i| &self.resources[i])
    }

    /// Add a resource. The first resource stored under a hash key wins;
    /// returns false when the key was already taken.
    pub fn add(&mut self, resource: Resource) -> bool {
        let hash = resource.hash_key();
        if self.by_hash.contains_key(&hash) {
            return false;
        }
        self.by_hash.insert(hash, self.resources.len());
        self.resources.push(resource);
        true
    }

    /// Add every resource of `other`, in its order.
    pub fn add_all(&mut self, other: impl IntoIterator<Item = Resource>) -> usize {
        other
            .into_iter()
            .map(|resource| self.add(resource))
            .filter(|added| *added)
            .count()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn into_vec(self) -> Vec<Resource> {
        self.resources
    }
}

impl IntoIterator for ResourceSet {
    type Item = Resource;
    type IntoIter = std::vec::IntoIter<Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut set = ResourceSet::new();
        set.add_all(iter);
        set
    }
}
