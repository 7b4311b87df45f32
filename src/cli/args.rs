//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Collect the localizable resources of every source document
//! - `localize`: Write a localized copy of every source document per locale
//! - `init`: Initialize a treeloc configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

/// Default file extracted resources are written to.
pub const DEFAULT_EXTRACT_OUTPUT: &str = "extracted.json";

/// Default file resources without a translation are written to.
pub const DEFAULT_NEW_RESOURCES_OUTPUT: &str = "new-resources.json";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.args.common.verbose,
            Some(Command::Localize(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Root directory scanned for source documents (overrides config file)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// File the extracted resources are written to
    #[arg(short, long, default_value = DEFAULT_EXTRACT_OUTPUT)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub args: ExtractArgs,
}

#[derive(Debug, Parser)]
pub struct LocalizeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// JSON file holding the translated resources
    #[arg(short, long)]
    pub translations: PathBuf,

    /// Target locale (default: `locales` from the config file)
    /// Can be specified multiple times: --locale de-DE --locale fr-FR
    #[arg(short, long = "locale")]
    pub locales: Vec<String>,

    /// Root directory localized documents are written under (overrides config file)
    #[arg(long)]
    pub target_root: Option<PathBuf>,

    /// File resources without a translation are written to
    #[arg(long, default_value = DEFAULT_NEW_RESOURCES_OUTPUT)]
    pub new_resources: PathBuf,
}

#[derive(Debug, Args)]
pub struct LocalizeCommand {
    #[command(flatten)]
    pub args: LocalizeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract localizable resources from the source documents
    Extract(ExtractCommand),
    /// Write localized documents for each target locale
    Localize(LocalizeCommand),
    /// Initialize a new .treelocrc.json configuration file
    Init,
}
