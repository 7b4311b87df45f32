use crate::{
    core::{
        locale::normalize_locale,
        pointer::key_from_ref,
        resource::{DEFAULT_CATEGORY, ResourceKind, ResourceValue},
        schema::{BindingSource, Bindings},
    },
    utils::base_name,
};

use super::fallback::Resolution;

/// What a binding can read its value from at one node.
pub struct BindingInput<'a> {
    /// Text of the node, empty for containers.
    pub text: &'a str,
    pub element: &'a str,
    pub pointer: &'a str,
    pub document_path: &'a str,
}

impl BindingInput<'_> {
    fn read(&self, source: &BindingSource) -> String {
        match source {
            BindingSource::Value => self.text.to_string(),
            BindingSource::Element => self.element.to_string(),
            BindingSource::Path => key_from_ref(self.pointer),
            BindingSource::PathName => self.document_path.to_string(),
            BindingSource::BaseName => base_name(self.document_path).to_string(),
            BindingSource::Literal(text) => text.clone(),
        }
    }
}

/// A resource being assembled while its subtree is walked.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingResource {
    pub kind: ResourceKind,
    pub element_name: String,
    /// Pointer of the node that started this resource.
    pub pointer: String,
    pub category: Option<String>,
    pub locale_override: Option<String>,
    pub key_override: Option<String>,
    pub comment: Option<String>,
    pub source: ResourceValue,
    /// Position inside the enclosing array while walking its elements.
    pub index: Option<usize>,
    /// Set before the rewriting pass of a localization.
    pub resolution: Option<Resolution>,
}

impl PendingResource {
    pub fn new(kind: ResourceKind, element_name: &str, pointer: &str) -> Self {
        Self {
            kind,
            element_name: element_name.to_string(),
            pointer: pointer.to_string(),
            category: None,
            locale_override: None,
            key_override: None,
            comment: None,
            source: ResourceValue::empty(kind),
            index: None,
            resolution: None,
        }
    }

    pub fn started_at(&self, pointer: &str) -> bool {
        self.pointer == pointer
    }

    /// Resource key: the bound key, else the pointer of the starting node.
    pub fn key(&self) -> String {
        self.key_override
            .clone()
            .unwrap_or_else(|| key_from_ref(&self.pointer))
    }

    /// Switch to another kind, dropping whatever was accumulated so far.
    pub fn set_kind(&mut self, kind: ResourceKind) {
        if self.kind != kind {
            self.kind = kind;
            self.source = ResourceValue::empty(kind);
        }
    }

    /// Accumulate one piece of source text according to the kind.
    pub fn add_source(&mut self, text: &str) {
        match &mut self.source {
            ResourceValue::String(source) => *source = text.to_string(),
            ResourceValue::Array(items) => items.push(text.to_string()),
            ResourceValue::Plural(forms) => {
                let category = self.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
                forms.insert(category.to_string(), text.to_string());
            }
        }
    }

    /// Apply satellite bindings. Non-source fields are bound first so that a
    /// category bound on the same node applies to its source text.
    pub fn hydrate(&mut self, bindings: &Bindings, input: &BindingInput, with_source: bool) {
        if let Some(source) = &bindings.category {
            self.category = Some(input.read(source));
        }
        if let Some(source) = &bindings.locale {
            self.locale_override = Some(normalize_locale(&input.read(source)));
        }
        if let Some(source) = &bindings.key {
            self.key_override = Some(input.read(source));
        }
        if let Some(source) = &bindings.comment {
            self.comment = Some(input.read(source));
        }
        if with_source && let Some(source) = &bindings.source {
            let text = input.read(source);
            self.add_source(&text);
        }
    }

    /// The piece of the resolved value that belongs at the current position.
    pub fn resolved_piece(&self, category: Option<&str>) -> Option<(&str, bool)> {
        let resolution = self.resolution.as_ref()?;
        let piece = resolution.value.piece(self.index, category)?;
        Some((piece, resolution.localized))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::walker::pending::*;
    use indexmap::IndexMap;

    fn input<'a>(text: &'a str, element: &'a str) -> BindingInput<'a> {
        BindingInput {
            text,
            element,
            pointer: "#/plurals/files",
            document_path: "res/strings.en.json",
        }
    }

    #[test]
    fn test_plural_accumulation_uses_bound_category() {
        let mut pending = PendingResource::new(ResourceKind::Plural, "files", "#/plurals/files");
        let bindings = Bindings {
            category: Some(BindingSource::Element),
            source: Some(BindingSource::Value),
            ..Bindings::default()
        };

        pending.hydrate(&bindings, &input("one file", "one"), true);
        pending.hydrate(&bindings, &input("{n} files", "other"), true);

        assert_eq!(
            pending.source,
            ResourceValue::Plural(IndexMap::from([
                ("one".to_string(), "one file".to_string()),
                ("other".to_string(), "{n} files".to_string()),
            ]))
        );
        assert_eq!(pending.key(), "plurals/files");
    }

    #[test]
    fn test_plural_without_category_lands_in_other() {
        let mut pending = PendingResource::new(ResourceKind::Plural, "x", "#/x");
        pending.add_source("things");
        assert_eq!(pending.source.piece(None, None), Some("things"));
    }

    #[test]
    fn test_binding_sources() {
        let mut pending = PendingResource::new(ResourceKind::String, "title", "#/a");
        let bindings = Bindings {
            key: Some(BindingSource::BaseName),
            comment: Some(BindingSource::PathName),
            locale: Some(BindingSource::Literal("de_de".to_string())),
            source: Some(BindingSource::Path),
            ..Bindings::default()
        };
        pending.hydrate(&bindings, &input("ignored", "title"), true);

        assert_eq!(pending.key(), "strings");
        assert_eq!(pending.comment.as_deref(), Some("res/strings.en.json"));
        assert_eq!(pending.locale_override.as_deref(), Some("de-DE"));
        assert_eq!(pending.source, ResourceValue::String("plurals/files".to_string()));
    }

    #[test]
    fn test_hydrate_without_source() {
        let mut pending = PendingResource::new(ResourceKind::String, "a", "#/a");
        let bindings = Bindings {
            source: Some(BindingSource::Value),
            comment: Some(BindingSource::Value),
            ..Bindings::default()
        };
        pending.hydrate(&bindings, &input("text", "a"), false);
        assert!(pending.source.is_empty());
        assert_eq!(pending.comment.as_deref(), Some("text"));
    }

    #[test]
    fn test_set_kind_resets_source() {
        let mut pending = PendingResource::new(ResourceKind::String, "a", "#/a");
        pending.add_source("x");
        pending.set_kind(ResourceKind::Array);
        assert_eq!(pending.source, ResourceValue::Array(Vec::new()));
    }
}
