//! Path templates such as `[dir]/[localeDir]/[filename]`.
//!
//! A template is read once, left to right, into a list of parts. The same
//! parts are used to render an output path for a locale and to build a
//! matching pattern that finds the locale embedded in an existing path.

use regex::Regex;

use crate::{
    core::locale::Locale,
    utils::{basename, dirname, extension, normalize_path, stem},
};

const LANGUAGE: &str = "[a-z][a-z][a-z]?";
const SCRIPT: &str = "[A-Z][a-z][a-z][a-z]";
const REGION: &str = "[A-Z][A-Z]|[0-9][0-9][0-9]";
const SCRIPT_LOWER: &str = "[a-z][a-z][a-z][a-z]";
const REGION_LOWER: &str = "[a-z][a-z]|[0-9][0-9][0-9]";

/// Group capturing the directory matched by a leading `[dir]/`.
const DIR_GROUP: &str = "dir";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Dir,
    Filename,
    Basename,
    Extension,
    Locale,
    Language,
    Script,
    Region,
    LocaleDir,
    LocaleUnder,
    LocaleLower,
}

impl TemplatePart {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "dir" => TemplatePart::Dir,
            "filename" => TemplatePart::Filename,
            "basename" => TemplatePart::Basename,
            "extension" => TemplatePart::Extension,
            "locale" => TemplatePart::Locale,
            "language" => TemplatePart::Language,
            "script" => TemplatePart::Script,
            "region" => TemplatePart::Region,
            "localeDir" => TemplatePart::LocaleDir,
            "localeUnder" => TemplatePart::LocaleUnder,
            "localeLower" => TemplatePart::LocaleLower,
            other => {
                tracing::debug!(keyword = other, "unknown template keyword, using [locale]");
                TemplatePart::Locale
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    parts: Vec<TemplatePart>,
}

impl Template {
    pub fn parse(template: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            if c != '[' {
                literal.push(c);
                continue;
            }
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
            }
            let keyword: String = chars.by_ref().take_while(|&c| c != ']').collect();
            parts.push(TemplatePart::from_keyword(&keyword));
        }
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Self { parts }
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Output path for `source_path` in `locale`.
    pub fn render(&self, source_path: &str, locale: &Locale) -> String {
        let mut output = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => output.push_str(text),
                TemplatePart::Dir => output.push_str(dirname(source_path)),
                TemplatePart::Filename => output.push_str(basename(source_path)),
                TemplatePart::Basename => output.push_str(stem(source_path)),
                TemplatePart::Extension => output.push_str(extension(source_path)),
                TemplatePart::Locale => output.push_str(&locale.spec()),
                TemplatePart::Language => output.push_str(locale.language()),
                TemplatePart::Script => output.push_str(locale.script()),
                TemplatePart::Region => output.push_str(locale.region()),
                TemplatePart::LocaleDir => output.push_str(&locale.dir()),
                TemplatePart::LocaleUnder => output.push_str(&locale.under()),
                TemplatePart::LocaleLower => output.push_str(&locale.spec().to_lowercase()),
            }
        }
        normalize_path(&output)
    }

    /// Anchored pattern matching paths produced by this template.
    ///
    /// File name parts are substituted with the literal values taken from
    /// `path`. Locale parts become named groups `languageN`, `scriptN` and
    /// `regionN`, numbered per occurrence. The first `[dir]/` is optional and
    /// captured as `dir`, so [`locale_from_match`] can tell documents at the
    /// root apart.
    pub fn pattern(&self, path: &str) -> String {
        let mut pattern = String::from("^");
        let mut group = 0;
        let mut dir_captured = false;
        let mut parts = self.parts.iter().peekable();

        while let Some(part) = parts.next() {
            match part {
                TemplatePart::Literal(text) => pattern.push_str(&regex::escape(text)),
                TemplatePart::Dir => {
                    // "[dir]/" may be empty for documents at the root
                    if let Some(TemplatePart::Literal(next)) = parts.peek()
                        && let Some(rest) = next.strip_prefix('/')
                    {
                        if dir_captured {
                            pattern.push_str("(?:.*/)?");
                        } else {
                            pattern.push_str(&format!("(?P<{}>.*/)?", DIR_GROUP));
                            dir_captured = true;
                        }
                        pattern.push_str(&regex::escape(rest));
                        parts.next();
                    } else {
                        pattern.push_str(".*?");
                    }
                }
                TemplatePart::Filename => pattern.push_str(&regex::escape(basename(path))),
                TemplatePart::Basename => pattern.push_str(&regex::escape(stem(path))),
                TemplatePart::Extension => pattern.push_str(&regex::escape(extension(path))),
                TemplatePart::Language => {
                    pattern.push_str(&format!("(?P<language{}>{})", group, LANGUAGE));
                    group += 1;
                }
                TemplatePart::Script => {
                    pattern.push_str(&format!("(?P<script{}>{})", group, SCRIPT));
                    group += 1;
                }
                TemplatePart::Region => {
                    pattern.push_str(&format!("(?P<region{}>{})", group, REGION));
                    group += 1;
                }
                TemplatePart::Locale => {
                    pattern.push_str(&composite(group, "-", SCRIPT, REGION));
                    group += 1;
                }
                TemplatePart::LocaleDir => {
                    pattern.push_str(&composite(group, "/", SCRIPT, REGION));
                    group += 1;
                }
                TemplatePart::LocaleUnder => {
                    pattern.push_str(&composite(group, "_", SCRIPT, REGION));
                    group += 1;
                }
                TemplatePart::LocaleLower => {
                    pattern.push_str(&composite(group, "-", SCRIPT_LOWER, REGION_LOWER));
                    group += 1;
                }
            }
        }

        pattern.push('$');
        pattern
    }
}

fn composite(group: usize, sep: &str, script: &str, region: &str) -> String {
    let sep = regex::escape(sep);
    format!(
        "(?P<language{g}>{LANGUAGE})(?:{sep}(?P<script{g}>{script}))?(?:{sep}(?P<region{g}>{region}))?",
        g = group,
    )
}

/// Reassemble a locale from the named groups of a [`Template::pattern`]
/// match. The first populated group of each kind wins.
///
/// A bare language taken from the first directory of a document at the
/// root (`src/strings.json`) is not a locale.
pub fn locale_from_match(regex: &Regex, path: &str) -> Option<Locale> {
    let captures = regex.captures(path)?;

    let first = |prefix: &str| {
        regex
            .capture_names()
            .flatten()
            .filter(|name| {
                name.strip_prefix(prefix)
                    .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
            })
            .find_map(|name| captures.name(name))
            .map(|m| m.as_str())
    };

    let locale = Locale::new(first("language"), first("script"), first("region"));
    if locale.is_empty() {
        return None;
    }

    let at_root = regex.capture_names().flatten().any(|name| name == DIR_GROUP)
        && captures.name(DIR_GROUP).is_none();
    if at_root && locale.script().is_empty() && locale.region().is_empty() {
        return None;
    }
    Some(locale)
}
