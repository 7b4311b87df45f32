use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Serializer, Value, ser::PrettyFormatter};

/// Localized documents are written with four-space indentation.
const INDENT: &[u8] = b"    ";

/// Read a JSON document. A file holding only whitespace is an empty
/// document and yields `None`.
pub fn read_document(path: &Path) -> Result<Option<Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse document: {}", path.display()))?;
    Ok(Some(value))
}

/// Serialize a tree the way localized documents are written, with a
/// trailing newline.
pub fn to_pretty_string(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value
        .serialize(&mut serializer)
        .context("Failed to serialize document")?;

    let mut text = String::from_utf8(buf).context("Serialized document is not valid UTF-8")?;
    text.push('\n');
    Ok(text)
}

/// Write a tree to `path`, creating missing parent directories.
pub fn write_document(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, to_pretty_string(value)?)
        .with_context(|| format!("Failed to write document: {}", path.display()))
}
