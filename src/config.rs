use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{
    locale::Locale,
    mapping::{Mapping, MappingTable},
    pseudo::PseudoSettings,
    schema::DEFAULT_SCHEMA_ID,
    walker::{
        DEFAULT_DATATYPE, DEFAULT_PROJECT_ID, DEFAULT_PSEUDO_LOCALE, DEFAULT_SOURCE_LOCALE,
        ProjectSettings,
    },
};

pub const CONFIG_FILE_NAME: &str = ".treelocrc.json";

pub const DEFAULT_IGNORES: &[&str] = &["**/node_modules/**"];

pub const DEFAULT_MAPPING_PATTERN: &str = "**/*.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_project_id")]
    pub project_id: String,
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    #[serde(default = "default_pseudo_locale")]
    pub pseudo_locale: String,
    #[serde(default)]
    pub locales: Vec<String>,
    #[serde(default)]
    pub nopseudo: bool,
    #[serde(default = "default_datatype")]
    pub datatype: String,
    /// Schema files or directories, relative to the config file.
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(default = "default_mappings")]
    pub mappings: MappingTable,
    #[serde(default)]
    pub locale_map: IndexMap<String, String>,
    #[serde(default)]
    pub pseudo_locales: IndexMap<String, PseudoSettings>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_root")]
    pub source_root: String,
    #[serde(default = "default_root")]
    pub target_root: String,
}

fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}

fn default_source_locale() -> String {
    DEFAULT_SOURCE_LOCALE.to_string()
}

fn default_pseudo_locale() -> String {
    DEFAULT_PSEUDO_LOCALE.to_string()
}

fn default_datatype() -> String {
    DEFAULT_DATATYPE.to_string()
}

fn default_mappings() -> MappingTable {
    MappingTable::from([(
        DEFAULT_MAPPING_PATTERN.to_string(),
        Mapping {
            schema: Some(DEFAULT_SCHEMA_ID.to_string()),
            ..Mapping::default()
        },
    )])
}

fn default_ignores() -> Vec<String> {
    DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect()
}

fn default_root() -> String {
    ".".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            source_locale: default_source_locale(),
            pseudo_locale: default_pseudo_locale(),
            locales: Vec::new(),
            nopseudo: false,
            datatype: default_datatype(),
            schemas: Vec::new(),
            mappings: default_mappings(),
            locale_map: IndexMap::new(),
            pseudo_locales: IndexMap::new(),
            ignores: default_ignores(),
            source_root: default_root(),
            target_root: default_root(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Glob patterns in `ignores` and the `mappings` keys must compile, and
    /// every configured locale must have at least a language.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        for pattern in self.mappings.keys() {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'mappings': \"{}\"", pattern))?;
        }

        let locales = [&self.source_locale, &self.pseudo_locale]
            .into_iter()
            .map(|locale| ("sourceLocale/pseudoLocale", locale))
            .chain(self.locales.iter().map(|locale| ("locales", locale)))
            .chain(self.pseudo_locales.keys().map(|locale| ("pseudoLocales", locale)));
        for (field, locale) in locales {
            if Locale::parse(locale).language().is_empty() {
                bail!("Invalid locale in '{}': \"{}\"", field, locale);
            }
        }

        Ok(())
    }

    /// The values stamped on every resource of this project.
    pub fn project_settings(&self) -> ProjectSettings {
        ProjectSettings {
            project_id: self.project_id.clone(),
            datatype: self.datatype.clone(),
            source_locale: Locale::parse(&self.source_locale).spec(),
            pseudo_locale: Locale::parse(&self.pseudo_locale).spec(),
            nopseudo: self.nopseudo,
        }
    }

    pub fn ignore_patterns(&self) -> Vec<Pattern> {
        self.ignores
            .iter()
            .filter_map(|pattern| Pattern::new(pattern).ok())
            .collect()
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
    /// Directory relative paths in the config are resolved against.
    pub base_dir: PathBuf,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            tracing::debug!(path = %path.display(), "loaded config");

            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                from_file: true,
                base_dir,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
            base_dir: start_dir.to_path_buf(),
        }),
    }
}
