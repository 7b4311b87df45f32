//! Diagnostics produced while walking and writing documents.
//!
//! None of these stop a run. Walk anomalies skip one subtree of one
//! document; read and write failures skip one document (or one locale of
//! it). Each issue carries everything the reporter needs to print it.

use enum_dispatch::enum_dispatch;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    UnresolvedRef,
    ShapeMismatch,
    NoMatchingAlternative,
    DocumentRead,
    DocumentWrite,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::UnresolvedRef => write!(f, "unresolved-ref"),
            Rule::ShapeMismatch => write!(f, "shape-mismatch"),
            Rule::NoMatchingAlternative => write!(f, "no-matching-alternative"),
            Rule::DocumentRead => write!(f, "document-read"),
            Rule::DocumentWrite => write!(f, "document-write"),
        }
    }
}

// ============================================================
// Location
// ============================================================

/// Where an issue happened: a document, and a pointer inside it for walk
/// anomalies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IssueLocation {
    pub file_path: String,
    pub pointer: Option<String>,
}

impl IssueLocation {
    pub fn new(file_path: impl Into<String>, pointer: Option<&str>) -> Self {
        Self {
            file_path: file_path.into(),
            pointer: pointer.map(str::to_string),
        }
    }

    pub fn file(file_path: impl Into<String>) -> Self {
        Self::new(file_path, None)
    }
}

impl std::fmt::Display for IssueLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.pointer {
            Some(pointer) => write!(f, "{}{}", self.file_path, pointer),
            None => write!(f, "{}", self.file_path),
        }
    }
}

// ============================================================
// Issue Types - Tree Walk
// ============================================================

/// A `$ref` that names nothing in its schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRefIssue {
    pub location: IssueLocation,
    pub reference: String,
}

impl UnresolvedRefIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnresolvedRef
    }
}

/// A document value whose shape disagrees with its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatchIssue {
    pub location: IssueLocation,
    /// Shape declared by the schema (e.g., "array").
    pub expected: String,
    /// Shape found in the document (e.g., "string").
    pub found: String,
}

impl ShapeMismatchIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::ShapeMismatch
    }
}

/// An `anyOf` none of whose alternatives fit the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoMatchingAlternativeIssue {
    pub location: IssueLocation,
    pub alternatives: usize,
}

impl NoMatchingAlternativeIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::NoMatchingAlternative
    }
}

// ============================================================
// Issue Types - Documents
// ============================================================

/// A document could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReadIssue {
    pub location: IssueLocation,
    pub error: String,
}

impl DocumentReadIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::DocumentRead
    }
}

/// A localized document could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWriteIssue {
    pub location: IssueLocation,
    pub locale: String,
    pub error: String,
}

impl DocumentWriteIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::DocumentWrite
    }
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    UnresolvedRef(UnresolvedRefIssue),
    ShapeMismatch(ShapeMismatchIssue),
    NoMatchingAlternative(NoMatchingAlternativeIssue),
    DocumentRead(DocumentReadIssue),
    DocumentWrite(DocumentWriteIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        self.report_severity()
    }

    pub fn rule(&self) -> Rule {
        self.report_rule()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Trait for types that can be reported to the CLI.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> &IssueLocation;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for UnresolvedRefIssue {
    fn location(&self) -> &IssueLocation {
        &self.location
    }

    fn message(&self) -> String {
        format!("unresolved reference \"{}\"", self.reference)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some("the subtree was skipped".to_string())
    }
}

impl Report for ShapeMismatchIssue {
    fn location(&self) -> &IssueLocation {
        &self.location
    }

    fn message(&self) -> String {
        format!("expected {}, found {}", self.expected, self.found)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for NoMatchingAlternativeIssue {
    fn location(&self) -> &IssueLocation {
        &self.location
    }

    fn message(&self) -> String {
        format!("none of {} alternatives matched", self.alternatives)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for DocumentReadIssue {
    fn location(&self) -> &IssueLocation {
        &self.location
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for DocumentWriteIssue {
    fn location(&self) -> &IssueLocation {
        &self.location
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("while writing locale {}", self.locale))
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.location()
            .cmp(other.location())
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
