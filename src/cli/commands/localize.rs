use anyhow::{Result, bail};
use rayon::prelude::*;

use super::super::args::LocalizeCommand;
use super::{
    CommandResult, CommandSummary, LocalizeSummary, WrittenFile,
    helper::{Project, finish, read_resources, write_resources},
};
use crate::{config::CONFIG_FILE_NAME, core::LocalizedDocument};

pub fn localize(cmd: LocalizeCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let mut project = Project::load(&args.common, args.target_root.as_deref())?;

    let locales = if args.locales.is_empty() {
        project.config.locales.clone()
    } else {
        args.locales.clone()
    };
    if locales.is_empty() {
        bail!(
            "No target locales. Pass --locale or set 'locales' in {}",
            CONFIG_FILE_NAME
        );
    }

    let translations = read_resources(&args.translations, project.documents.settings())?;
    tracing::debug!(count = translations.len(), "loaded translations");

    let files = project.files_excluding(&[&args.translations, &args.new_resources]);
    let localized: Vec<(&String, LocalizedDocument)> = files
        .par_iter()
        .map(|path| {
            let result = project.documents.localize_file(
                &project.source_root,
                &project.target_root,
                path,
                &locales,
                &translations,
            );
            (path, result)
        })
        .collect();

    let mut written = Vec::new();
    let mut issues = Vec::new();
    for (path, result) in localized {
        written.extend(result.written.into_iter().map(|file| WrittenFile {
            source: path.clone(),
            locale: file.locale,
            output: file.relative,
        }));
        project.documents.add_new_resources(result.new_resources);
        issues.extend(result.issues);
    }

    let new_resources = project.documents.take_new_resources();
    let new_resources_output = if new_resources.is_empty() {
        None
    } else {
        write_resources(&args.new_resources, &new_resources)?;
        Some(args.new_resources.clone())
    };

    Ok(finish(
        CommandSummary::Localize(LocalizeSummary {
            document_count: files.len(),
            locales,
            written,
            new_resource_count: new_resources.len(),
            new_resources_output,
        }),
        issues,
        project.skipped_count,
    ))
}
