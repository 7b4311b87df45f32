//! Report formatting and printing utilities.
//!
//! Issues are printed cargo style, followed by a one-line summary of what
//! the command did. Kept apart from the commands so treeloc can be used as
//! a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandResult, CommandSummary, ExtractSummary, InitSummary, LocalizeSummary, WrittenFile,
};
use crate::issues::{Issue, Report, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print issues in cargo-style format to a writer, followed by a problem
/// count. Prints nothing when there are no issues.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    for issue in &sorted {
        print_issue(issue, writer);
    }

    print_summary(&sorted, writer);
}

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(result, verbose, &mut io::stdout().lock());
    print_skipped_warning(result.skipped_count, verbose, &mut io::stderr().lock());
}

/// Print a command's issues and summary to a custom writer.
pub fn print_to<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    report_to(&result.issues, writer);
    if !result.issues.is_empty() {
        let _ = writeln!(writer);
    }

    match &result.summary {
        CommandSummary::Extract(summary) => print_extract(summary, writer),
        CommandSummary::Localize(summary) => print_localize(summary, verbose, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

/// Warn about directory entries the scan could not read.
fn print_skipped_warning<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} path(s) could not be accessed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, writer: &mut W) {
    let severity_str = match issue.report_severity() {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        issue.message(),
        issue.report_rule().to_string().dimmed().cyan()
    );
    let _ = writeln!(writer, "  {} {}", "-->".blue(), issue.location());

    if let Some(details) = issue.details() {
        let _ = writeln!(writer, "  {} {} {}", "=".blue(), "note:".bold(), details);
    }

    let _ = writeln!(writer); // Empty line between issues
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} {} ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        plural(issues.len(), "problem", "problems"),
        total_errors,
        plural(total_errors, "error", "errors").red(),
        total_warnings,
        plural(total_warnings, "warning", "warnings").yellow()
    );
}

fn print_extract<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Extracted {} {} from {} {} into {}",
            summary.resource_count,
            plural(summary.resource_count, "resource", "resources"),
            summary.document_count,
            plural(summary.document_count, "document", "documents"),
            summary.output.display()
        )
        .green()
    );
}

fn print_localize<W: Write>(summary: &LocalizeSummary, verbose: bool, writer: &mut W) {
    if verbose {
        print_written(&summary.written, writer);
    }

    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Localized {} {} into {} {} ({} {} written)",
            summary.document_count,
            plural(summary.document_count, "document", "documents"),
            summary.locales.len(),
            plural(summary.locales.len(), "locale", "locales"),
            summary.written.len(),
            plural(summary.written.len(), "file", "files"),
        )
        .green()
    );

    if let Some(output) = &summary.new_resources_output {
        let _ = writeln!(
            writer,
            "{} {} without translation written to {}",
            summary.new_resource_count,
            plural(summary.new_resource_count, "resource", "resources"),
            output.display().to_string().cyan()
        );
    }
}

/// One line per written file, with the source paths padded to one column.
fn print_written<W: Write>(written: &[WrittenFile], writer: &mut W) {
    let width = written
        .iter()
        .map(|file| UnicodeWidthStr::width(file.source.as_str()))
        .max()
        .unwrap_or(0);

    for file in written {
        let padding = width - UnicodeWidthStr::width(file.source.as_str());
        let _ = writeln!(
            writer,
            "  {}{:padding$}  {} {} ({})",
            file.source,
            "",
            "->".blue(),
            file.output,
            file.locale.dimmed(),
            padding = padding
        );
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", summary.path.display()).green()
    );
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
