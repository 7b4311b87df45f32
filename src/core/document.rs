//! Per-project document handling.
//!
//! [`DocumentType`] owns everything needed to process the JSON documents of
//! a project: the schema registry, the path mapper and the pseudo
//! generators. Walks borrow it immutably, so documents can be processed in
//! parallel; resources discovered while localizing are returned per
//! document and merged into the shared set by a single caller.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::{
    config::Config,
    core::{
        locale::Locale,
        mapping::{Mapping, PathMapper},
        parsers::json::{read_document, write_document},
        pseudo::PseudoRegistry,
        resource::ResourceSet,
        schema::{SchemaDocument, SchemaRegistry},
        walker::{self, Extraction, Localization, ProjectSettings, WalkContext},
    },
    issues::{DocumentReadIssue, DocumentWriteIssue, Issue, IssueLocation},
};

/// One localized file written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    pub locale: String,
    /// Output path relative to the target root.
    pub relative: String,
    pub path: PathBuf,
}

/// Output of localizing one source document into every target locale.
#[derive(Debug, Default)]
pub struct LocalizedDocument {
    /// Files written, in target locale order.
    pub written: Vec<WrittenDocument>,
    pub new_resources: ResourceSet,
    pub issues: Vec<Issue>,
}

#[derive(Debug)]
pub struct DocumentType {
    settings: ProjectSettings,
    registry: SchemaRegistry,
    mapper: PathMapper,
    pseudos: PseudoRegistry,
    /// Used for paths no mapping selects.
    default_mapping: Mapping,
    new_resources: ResourceSet,
}

impl DocumentType {
    pub fn new(
        settings: ProjectSettings,
        registry: SchemaRegistry,
        mapper: PathMapper,
        pseudos: PseudoRegistry,
    ) -> Self {
        Self {
            settings,
            registry,
            mapper,
            pseudos,
            default_mapping: Mapping::default(),
            new_resources: ResourceSet::new(),
        }
    }

    /// Build from project configuration. Schema paths are relative to
    /// `base_dir`; a schema that fails to load aborts the whole setup.
    pub fn from_config(config: &Config, base_dir: &Path) -> Result<Self> {
        let settings = config.project_settings();

        let mut registry = SchemaRegistry::new();
        for schema in &config.schemas {
            let path = base_dir.join(schema);
            registry
                .load_path(&path)
                .with_context(|| format!("Failed to load schemas from {}", path.display()))?;
        }

        let mapper = PathMapper::new(
            &config.mappings,
            &settings.source_locale,
            config.locale_map.clone(),
        )
        .context("Invalid glob pattern in 'mappings'")?;
        let pseudos = PseudoRegistry::from_settings(&config.pseudo_locales, &settings.source_locale);

        Ok(Self::new(settings, registry, mapper, pseudos))
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    pub fn mapping(&self, path: &str) -> &Mapping {
        self.mapper
            .select_mapping(path)
            .unwrap_or(&self.default_mapping)
    }

    /// Schema for `path`: the one its mapping names, or the built-in default.
    pub fn schema(&self, path: &str) -> Option<&SchemaDocument> {
        let mapping = self.mapping(path);
        let schema = self.registry.get_or_default(mapping.schema.as_deref());
        if let Some(id) = &mapping.schema
            && schema.is_some_and(|found| &found.id != id)
        {
            tracing::debug!(path, schema = %id, "unknown schema, using the default");
        }
        schema
    }

    pub fn extract_tree(&self, tree: &Value, path: &str) -> Extraction {
        let Some(schema) = self.schema(path) else {
            return Extraction::default();
        };
        let ctx = self.context(schema, path);
        walker::extract(tree, &ctx)
    }

    pub fn localize_tree(
        &self,
        tree: &Value,
        path: &str,
        locale: &str,
        translations: &ResourceSet,
    ) -> Option<Localization> {
        let schema = self.schema(path)?;
        let ctx = self.context(schema, path);
        Some(walker::localize(tree, &ctx, locale, translations))
    }

    /// Read and extract the document at `root/path`. A document that cannot
    /// be read yields no resources and one issue.
    pub fn extract_file(&self, root: &Path, path: &str) -> Extraction {
        match read_document(&root.join(path)) {
            Ok(Some(tree)) => self.extract_tree(&tree, path),
            Ok(None) => Extraction::default(),
            Err(err) => Extraction {
                resources: ResourceSet::new(),
                issues: vec![read_issue(path, &err)],
            },
        }
    }

    /// Localize the document at `source_root/path` into each of `locales`,
    /// writing the results under `target_root`.
    ///
    /// The source locale and locales with a variant are skipped. An empty
    /// source document is written as an empty object.
    pub fn localize_file(
        &self,
        source_root: &Path,
        target_root: &Path,
        path: &str,
        locales: &[String],
        translations: &ResourceSet,
    ) -> LocalizedDocument {
        let mut result = LocalizedDocument::default();

        let tree = match read_document(&source_root.join(path)) {
            Ok(tree) => tree.unwrap_or_else(|| Value::Object(Default::default())),
            Err(err) => {
                result.issues.push(read_issue(path, &err));
                return result;
            }
        };

        let mapping = self.mapping(path);
        for locale in locales {
            let parsed = Locale::parse(locale);
            if parsed.has_variant() || parsed == *self.mapper.source_locale() {
                tracing::debug!(path, locale = %locale, "locale skipped");
                continue;
            }
            let Some(localized) = self.localize_tree(&tree, path, locale, translations) else {
                continue;
            };
            result.new_resources.add_all(localized.new_resources);
            result.issues.extend(localized.issues);

            let relative = self.mapper.build_output_path(mapping, path, &parsed.spec());
            let output = target_root.join(&relative);
            match write_document(&output, &localized.tree) {
                Ok(()) => result.written.push(WrittenDocument {
                    locale: parsed.spec(),
                    relative,
                    path: output,
                }),
                Err(err) => result.issues.push(Issue::DocumentWrite(DocumentWriteIssue {
                    location: IssueLocation::file(path),
                    locale: parsed.spec(),
                    error: format!("{:#}", err),
                })),
            }
        }

        result
    }

    /// Merge resources discovered by a localize pass. Returns how many were
    /// not already known.
    pub fn add_new_resources(&mut self, resources: ResourceSet) -> usize {
        self.new_resources.add_all(resources)
    }

    pub fn new_resources(&self) -> &ResourceSet {
        &self.new_resources
    }

    pub fn take_new_resources(&mut self) -> ResourceSet {
        std::mem::take(&mut self.new_resources)
    }

    fn context<'a>(&'a self, schema: &'a SchemaDocument, path: &'a str) -> WalkContext<'a> {
        WalkContext {
            schema,
            document_path: path,
            method: self.mapping(path).method,
            settings: &self.settings,
            pseudos: &self.pseudos,
        }
    }
}

fn read_issue(path: &str, err: &anyhow::Error) -> Issue {
    Issue::DocumentRead(DocumentReadIssue {
        location: IssueLocation::file(path),
        error: format!("{:#}", err),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    use crate::core::document::*;
    use crate::core::mapping::OutputMode;
    use crate::core::resource::{Resource, ResourceState, ResourceValue};
    use crate::issues::Rule;

    fn document_type(config: &Config, base_dir: &Path) -> DocumentType {
        DocumentType::from_config(config, base_dir).unwrap()
    }

    fn translation(key: &str, locale: &str, text: &str) -> Resource {
        Resource {
            key: key.to_string(),
            source: ResourceValue::String(String::new()),
            source_locale: "en-US".to_string(),
            target: Some(ResourceValue::String(text.to_string())),
            target_locale: Some(locale.to_string()),
            project: "project".to_string(),
            datatype: "json".to_string(),
            path: String::new(),
            state: ResourceState::Translated,
            index: 0,
            comment: None,
        }
    }

    #[test]
    fn test_extract_file_with_default_schema() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("strings.json"), r#"{"hello": "Hello", "bye": "Bye"}"#).unwrap();

        let docs = document_type(&Config::default(), dir.path());
        let extraction = docs.extract_file(dir.path(), "strings.json");

        let keys: Vec<_> = extraction.resources.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["hello", "bye"]);
        assert_eq!(extraction.resources.iter().next().unwrap().path, "strings.json");
        assert!(extraction.issues.is_empty());
    }

    #[test]
    fn test_extract_file_read_error_is_an_issue() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        let docs = document_type(&Config::default(), dir.path());
        let extraction = docs.extract_file(dir.path(), "broken.json");

        assert!(extraction.resources.is_empty());
        assert_eq!(extraction.issues.len(), 1);
        assert_eq!(extraction.issues[0].rule(), Rule::DocumentRead);
    }

    #[test]
    fn test_schema_from_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("schemas")).unwrap();
        fs::write(
            dir.path().join("schemas/menu.json"),
            json!({
                "$id": "menu",
                "type": "object",
                "properties": {"title": {"type": "string", "localizable": true}}
            })
            .to_string(),
        )
        .unwrap();

        let config: Config = serde_json::from_value(json!({
            "schemas": ["schemas"],
            "mappings": {
                "menus/*.json": {"schema": "menu"},
                "**/*.json": {"schema": "nope"}
            }
        }))
        .unwrap();
        let docs = document_type(&config, dir.path());

        assert_eq!(docs.schema("menus/main.json").unwrap().id, "menu");
        assert_eq!(docs.schema("other/x.json").unwrap().id, "strings-schema");

        let tree = json!({"title": "File", "skip": "me"});
        let extraction = docs.extract_tree(&tree, "menus/main.json");
        assert_eq!(extraction.resources.len(), 1);
    }

    #[test]
    fn test_missing_schema_path_fails() {
        let dir = tempdir().unwrap();
        let config = Config {
            schemas: vec!["missing.json".to_string()],
            ..Default::default()
        };
        let err = DocumentType::from_config(&config, dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to load schemas"));
    }

    #[test]
    fn test_localize_file_writes_each_locale() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src");
        let target = dir.path().join("out");
        fs::create_dir_all(source.join("res")).unwrap();
        fs::write(source.join("res/strings.json"), r#"{"a": "Apple", "b": "Banana"}"#).unwrap();

        let docs = document_type(&Config::default(), dir.path());
        let translations: ResourceSet = [translation("a", "de-DE", "Apfel")].into_iter().collect();
        let locales = vec![
            "de-DE".to_string(),
            "en-US".to_string(),
            "sr-Latn-RS-x-variant".to_string(),
            "fr-FR".to_string(),
        ];

        let result = docs.localize_file(&source, &target, "res/strings.json", &locales, &translations);

        let written: Vec<_> = result.written.iter().map(|w| w.relative.as_str()).collect();
        assert_eq!(written, vec!["res/de/DE/strings.json", "res/fr/FR/strings.json"]);
        assert_eq!(result.written[0].locale, "de-DE");
        assert_eq!(result.written[1].path, target.join("res/fr/FR/strings.json"));

        let german: Value =
            serde_json::from_str(&fs::read_to_string(&result.written[0].path).unwrap()).unwrap();
        assert_eq!(german, json!({"a": "Apfel", "b": "Banana"}));

        // "b" in de-DE, "a" and "b" in fr-FR
        assert_eq!(result.new_resources.len(), 3);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_localize_sparse_mapping() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("strings.json"), r#"{"a": "Apple", "b": "Banana"}"#).unwrap();

        let mut config = Config::default();
        for mapping in config.mappings.values_mut() {
            mapping.method = OutputMode::Sparse;
            mapping.template = "[locale]/[filename]".to_string();
        }
        let docs = document_type(&config, dir.path());
        let translations: ResourceSet = [translation("b", "de-DE", "Banane")].into_iter().collect();

        let result = docs.localize_file(
            dir.path(),
            dir.path(),
            "strings.json",
            &["de-DE".to_string()],
            &translations,
        );

        let written = fs::read_to_string(dir.path().join("de-DE/strings.json")).unwrap();
        assert_eq!(written, "{\n    \"b\": \"Banane\"\n}\n");
        assert_eq!(result.new_resources.len(), 1);
    }

    #[test]
    fn test_new_resources_are_merged_once() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("strings.json"), r#"{"a": "Apple"}"#).unwrap();

        let mut docs = document_type(&Config::default(), dir.path());
        let locales = ["de-DE".to_string()];
        let first = docs.localize_file(dir.path(), dir.path(), "strings.json", &locales, &ResourceSet::new());
        let again = docs.localize_file(dir.path(), dir.path(), "strings.json", &locales, &ResourceSet::new());

        assert_eq!(docs.add_new_resources(first.new_resources), 1);
        assert_eq!(docs.add_new_resources(again.new_resources), 0);
        assert_eq!(docs.new_resources().len(), 1);
        assert_eq!(docs.take_new_resources().len(), 1);
        assert!(docs.new_resources().is_empty());
    }
}
