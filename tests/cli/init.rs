use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert!(output.status.success());
    insta::assert_snapshot!(stdout(&output).trim_end(), @"✓ Created .treelocrc.json");

    let content = test.read_file(".treelocrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["sourceLocale"], "en-US");
    assert_eq!(parsed["pseudoLocale"], "zxx-XX");
    assert_eq!(parsed["mappings"]["**/*.json"]["schema"], "strings-schema");
    assert_eq!(parsed["mappings"]["**/*.json"]["method"], "copy");
    assert!(content.ends_with("}\n"));

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".treelocrc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr(&output), "Error: .treelocrc.json already exists\n");
    assert_eq!(test.read_file(".treelocrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("resources/strings.json", r#"{"title": "Welcome"}"#)?;

    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "Extract should work with initialized config. stderr: {}",
        stderr(&output)
    );

    let extracted = test.read_json("extracted.json")?;
    assert_eq!(extracted.as_array().map(Vec::len), Some(1));

    Ok(())
}
