use anyhow::Result;
use rayon::prelude::*;

use super::super::args::ExtractCommand;
use super::{
    CommandResult, CommandSummary, ExtractSummary,
    helper::{Project, finish, write_resources},
};
use crate::core::{resource::ResourceSet, walker::Extraction};

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let project = Project::load(&args.common, None)?;
    let files = project.files_excluding(&[&args.output]);

    let extractions: Vec<Extraction> = files
        .par_iter()
        .map(|path| project.documents.extract_file(&project.source_root, path))
        .collect();

    let mut resources = ResourceSet::new();
    let mut issues = Vec::new();
    for extraction in extractions {
        let found = extraction.resources.len();
        let added = resources.add_all(extraction.resources);
        if added < found {
            tracing::debug!(duplicates = found - added, "resource keys already extracted");
        }
        issues.extend(extraction.issues);
    }

    write_resources(&args.output, &resources)?;

    Ok(finish(
        CommandSummary::Extract(ExtractSummary {
            document_count: files.len(),
            resource_count: resources.len(),
            output: args.output.clone(),
        }),
        issues,
        project.skipped_count,
    ))
}
