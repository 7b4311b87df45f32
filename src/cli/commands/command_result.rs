use std::path::PathBuf;

use crate::cli::exit_status::ExitStatus;
use crate::issues::Issue;

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractSummary),
    Localize(LocalizeSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub document_count: usize,
    pub resource_count: usize,
    pub output: PathBuf,
}

/// A localized file, listed in verbose output.
#[derive(Debug)]
pub struct WrittenFile {
    /// Source document the file was generated from.
    pub source: String,
    pub locale: String,
    /// Path relative to the target root.
    pub output: String,
}

#[derive(Debug)]
pub struct LocalizeSummary {
    pub document_count: usize,
    pub locales: Vec<String>,
    pub written: Vec<WrittenFile>,
    pub new_resource_count: usize,
    /// Where new resources were written, if there were any.
    pub new_resources_output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
}

/// Result of running treeloc commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// All issues reported while processing documents, sorted.
    pub issues: Vec<Issue>,
    /// Directory entries the document scan could not access.
    pub skipped_count: usize,
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        if self.error_count > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}
