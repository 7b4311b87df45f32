use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};

use super::{CommandResult, CommandSummary};
use crate::{
    cli::args::CommonArgs,
    config::{CONFIG_FILE_NAME, Config, ConfigLoadResult, load_config},
    core::{
        DocumentType,
        parsers::{json::write_document, scan_documents},
        resource::{Resource, ResourceSet},
        walker::ProjectSettings,
    },
    issues::{Issue, Severity},
};

/// Everything a command needs to know about the project it runs in.
pub struct Project {
    pub config: Config,
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub documents: DocumentType,
    /// Source documents relative to `source_root`, sorted.
    pub files: Vec<String>,
    pub skipped_count: usize,
    cwd: PathBuf,
}

impl Project {
    /// Load the configuration, the schemas and the list of source documents.
    ///
    /// Roots given on the command line are relative to the working
    /// directory, roots from the config file to the file's directory.
    pub fn load(common: &CommonArgs, target_root: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().context("Failed to get current directory")?;
        let start_dir = common
            .source_root
            .as_ref()
            .map(|root| cwd.join(root))
            .unwrap_or_else(|| cwd.clone());

        let ConfigLoadResult {
            config,
            from_file,
            base_dir,
        } = load_config(&start_dir)?;
        if !from_file {
            tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
        }

        let source_root = match &common.source_root {
            Some(root) => cwd.join(root),
            None => base_dir.join(&config.source_root),
        };
        if !source_root.is_dir() {
            bail!("Source root is not a directory: {}", source_root.display());
        }
        let target_root = match target_root {
            Some(root) => cwd.join(root),
            None => base_dir.join(&config.target_root),
        };

        let documents = DocumentType::from_config(&config, &base_dir)?;
        let scan = scan_documents(&source_root, &config.ignore_patterns(), documents.mapper());
        tracing::debug!(
            root = %source_root.display(),
            documents = scan.files.len(),
            "scanned source root"
        );

        Ok(Self {
            config,
            source_root,
            target_root,
            documents,
            files: scan.files,
            skipped_count: scan.skipped_count,
            cwd,
        })
    }

    /// Source documents, without the files a command reads or writes itself.
    pub fn files_excluding(&self, paths: &[&Path]) -> Vec<String> {
        let excluded: Vec<PathBuf> = paths
            .iter()
            .map(|path| resolve(&self.cwd.join(path)))
            .collect();

        self.files
            .iter()
            .filter(|file| !excluded.contains(&resolve(&self.source_root.join(file))))
            .cloned()
            .collect()
    }
}

fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Read a resource file: a JSON array of resources. Resources without a
/// project or datatype get the project's own.
pub fn read_resources(path: &Path, settings: &ProjectSettings) -> Result<ResourceSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read resource file: {}", path.display()))?;
    let resources: Vec<Resource> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse resource file: {}", path.display()))?;

    Ok(resources
        .into_iter()
        .map(|mut resource| {
            if resource.project.is_empty() {
                resource.project = settings.project_id.clone();
            }
            if resource.datatype.is_empty() {
                resource.datatype = settings.datatype.clone();
            }
            resource
        })
        .collect())
}

/// Write resources as a JSON array, in insertion order.
pub fn write_resources(path: &Path, resources: &ResourceSet) -> Result<()> {
    let resources: Vec<&Resource> = resources.iter().collect();
    let value = serde_json::to_value(&resources).context("Failed to serialize resources")?;
    write_document(path, &value)
}

pub fn finish(
    summary: CommandSummary,
    mut issues: Vec<Issue>,
    skipped_count: usize,
) -> CommandResult {
    issues.sort();

    let error_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    CommandResult {
        summary,
        error_count,
        warning_count,
        issues,
        skipped_count,
    }
}
