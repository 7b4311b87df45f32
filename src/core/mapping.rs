use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use glob::{MatchOptions, Pattern, PatternError};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        locale::Locale,
        template::{Template, locale_from_match},
    },
    utils::{normalize_path, replace_extension},
};

/// Extensions treated as aliases of `.json` when selecting a mapping.
pub const ALTERNATE_EXTENSIONS: &[&str] = &["jsn", "jso"];

pub const CANONICAL_EXTENSION: &str = "json";

pub const DEFAULT_TEMPLATE: &str = "[dir]/[localeDir]/[filename]";

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// How a localized document is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Every value is written; untranslated ones keep their source text.
    #[default]
    Copy,
    /// Only localized values are written.
    Sparse,
    /// Accepted for compatibility, written like `Copy`.
    Spread,
}

impl OutputMode {
    pub fn is_sparse(self) -> bool {
        self == OutputMode::Sparse
    }
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// One entry of the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub method: OutputMode,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub locale_map: IndexMap<String, String>,
}

impl Default for Mapping {
    fn default() -> Self {
        Self {
            schema: None,
            method: OutputMode::Copy,
            template: default_template(),
            locale_map: IndexMap::new(),
        }
    }
}

/// Ordered glob pattern to mapping table. Order is priority.
pub type MappingTable = IndexMap<String, Mapping>;

/// Chooses mappings for document paths and converts between source paths
/// and locale-qualified output paths.
#[derive(Debug)]
pub struct PathMapper {
    patterns: Vec<(Pattern, Mapping)>,
    source_locale: Locale,
    locale_map: IndexMap<String, String>,
    compiled: Mutex<HashMap<String, Regex>>,
}

impl PathMapper {
    pub fn new(
        table: &MappingTable,
        source_locale: &str,
        locale_map: IndexMap<String, String>,
    ) -> Result<Self, PatternError> {
        let patterns = table
            .iter()
            .map(|(glob, mapping)| Ok((Pattern::new(glob)?, mapping.clone())))
            .collect::<Result<Vec<_>, PatternError>>()?;

        Ok(Self {
            patterns,
            source_locale: Locale::parse(source_locale),
            locale_map,
            compiled: Mutex::new(HashMap::new()),
        })
    }

    /// First mapping whose pattern matches the path, or the path with its
    /// alternate extension replaced by `.json`.
    pub fn select_mapping(&self, path: &str) -> Option<&Mapping> {
        let normalized = normalize_path(path);
        let canonical = replace_extension(&normalized, ALTERNATE_EXTENSIONS, CANONICAL_EXTENSION);

        self.patterns
            .iter()
            .find(|(pattern, _)| {
                pattern.matches_with(&normalized, GLOB_OPTIONS)
                    || canonical
                        .as_deref()
                        .is_some_and(|c| pattern.matches_with(c, GLOB_OPTIONS))
            })
            .map(|(_, mapping)| mapping)
    }

    /// True for source documents: a mapping matches and the path does not
    /// already carry a locale other than the source locale.
    pub fn is_handled(&self, path: &str) -> bool {
        let Some(mapping) = self.select_mapping(path) else {
            return false;
        };
        match self.extract_locale(&mapping.template, &normalize_path(path)) {
            Some(locale) => locale == self.source_locale,
            None => true,
        }
    }

    /// Locale embedded in `path` according to `template`, if any.
    pub fn extract_locale(&self, template: &str, path: &str) -> Option<Locale> {
        let pattern = Template::parse(template).pattern(path);

        let mut compiled = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);
        if !compiled.contains_key(&pattern) {
            match Regex::new(&pattern) {
                Ok(regex) => {
                    compiled.insert(pattern.clone(), regex);
                }
                Err(err) => {
                    tracing::warn!(template, %err, "cannot compile path template");
                    return None;
                }
            }
        }
        locale_from_match(compiled.get(&pattern)?, path)
    }

    /// Output path of `path` for `locale`. The locale is renamed through the
    /// mapping's own locale map, then through the global one.
    pub fn build_output_path(&self, mapping: &Mapping, path: &str, locale: &str) -> String {
        let mapped = mapping
            .locale_map
            .get(locale)
            .map(String::as_str)
            .unwrap_or(locale);
        let mapped = self.locale_map.get(mapped).map(String::as_str).unwrap_or(mapped);

        Template::parse(&mapping.template).render(&normalize_path(path), &Locale::parse(mapped))
    }

    pub fn source_locale(&self) -> &Locale {
        &self.source_locale
    }

    #[cfg(test)]
    fn compiled_count(&self) -> usize {
        self.compiled.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::mapping::*;
    use pretty_assertions::assert_eq;

    fn mapping(schema: &str, method: OutputMode, template: &str) -> Mapping {
        Mapping {
            schema: Some(schema.to_string()),
            method,
            template: template.to_string(),
            locale_map: IndexMap::new(),
        }
    }

    fn mapper() -> PathMapper {
        let mut table = MappingTable::new();
        table.insert(
            "resources/**/*.json".to_string(),
            mapping("resources", OutputMode::Sparse, "resources/[localeDir]/[filename]"),
        );
        table.insert(
            "**/*.json".to_string(),
            mapping("strings-schema", OutputMode::Copy, DEFAULT_TEMPLATE),
        );
        PathMapper::new(&table, "en-US", IndexMap::new()).unwrap()
    }

    #[test]
    fn test_select_mapping_first_match_wins() {
        let mapper = mapper();
        let found = mapper.select_mapping("resources/app.json").unwrap();
        assert_eq!(found.schema.as_deref(), Some("resources"));

        let found = mapper.select_mapping("./other/app.json").unwrap();
        assert_eq!(found.schema.as_deref(), Some("strings-schema"));

        assert!(mapper.select_mapping("other/app.xml").is_none());
    }

    #[test]
    fn test_select_mapping_alternate_extension() {
        let mapper = mapper();
        let found = mapper.select_mapping("resources/app.jsn").unwrap();
        assert_eq!(found.method, OutputMode::Sparse);
        assert!(mapper.select_mapping("x/app.jso").is_some());
    }

    #[test]
    fn test_is_handled() {
        let mapper = mapper();
        assert!(mapper.is_handled("resources/app.json"));
        assert!(mapper.is_handled("resources/en/US/app.json"));
        assert!(!mapper.is_handled("resources/de/DE/app.json"));
        assert!(!mapper.is_handled("resources/fr/app.json"));
        assert!(!mapper.is_handled("notes.txt"));
    }

    #[test]
    fn test_is_handled_short_top_level_directories() {
        let mut table = MappingTable::new();
        table.insert("**/*.json".to_string(), Mapping::default());
        let mapper = PathMapper::new(&table, "en-US", IndexMap::new()).unwrap();

        for path in ["src/strings.json", "res/strings.json", "app/strings.json", "strings.json"] {
            assert!(mapper.is_handled(path), "{}", path);
            assert_eq!(mapper.extract_locale(DEFAULT_TEMPLATE, path), None);
        }
        assert!(!mapper.is_handled("de/DE/strings.json"));
        assert!(!mapper.is_handled("src/fr/strings.json"));
    }

    #[test]
    fn test_build_output_path_with_locale_maps() {
        let mut table = MappingTable::new();
        let mut m = mapping("s", OutputMode::Copy, "[dir]/[locale]/[filename]");
        m.locale_map.insert("de-DE".to_string(), "de".to_string());
        table.insert("**/*.json".to_string(), m.clone());

        let global = IndexMap::from([("de".to_string(), "de-AT".to_string())]);
        let mapper = PathMapper::new(&table, "en-US", global).unwrap();

        assert_eq!(mapper.build_output_path(&m, "./a/b.json", "de-DE"), "a/de-AT/b.json");
        assert_eq!(mapper.build_output_path(&m, "a/b.json", "fr-FR"), "a/fr-FR/b.json");
    }

    #[test]
    fn test_compiled_patterns_are_cached() {
        let mapper = mapper();
        mapper.extract_locale(DEFAULT_TEMPLATE, "a/de/strings.json");
        mapper.extract_locale(DEFAULT_TEMPLATE, "b/fr/strings.json");
        assert_eq!(mapper.compiled_count(), 1);
        mapper.extract_locale(DEFAULT_TEMPLATE, "b/fr/other.json");
        assert_eq!(mapper.compiled_count(), 2);
    }

    #[test]
    fn test_mapping_json() {
        let json = r#"{ "schema": "menu", "method": "sparse" }"#;
        let m: Mapping = serde_json::from_str(json).unwrap();
        assert_eq!(m.method, OutputMode::Sparse);
        assert_eq!(m.template, DEFAULT_TEMPLATE);

        let err = serde_json::from_str::<Mapping>(r#"{ "method": "scatter" }"#);
        assert!(err.is_err());
    }
}
