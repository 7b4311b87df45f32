use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, stderr, stdout};

const MENU_SCHEMA: &str = r##"{
    "$id": "menu",
    "type": "object",
    "properties": {
        "title": {"type": "string", "localizable": true},
        "items": {"type": "array", "items": {"$ref": "#/definitions/item"}},
        "footer": {"$ref": "#/definitions/missing"},
        "version": {"type": "integer"}
    },
    "definitions": {
        "item": {
            "type": "object",
            "properties": {"label": {"type": "string", "localizable": true}}
        }
    }
}"##;

fn keys(extracted: &Value) -> Vec<&str> {
    extracted
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|resource| resource["key"].as_str())
        .collect()
}

#[test]
fn test_extract_with_default_schema() -> Result<()> {
    let test = CliTest::with_file(
        "resources/strings.json",
        r#"{"hello": "Hello", "bye": "Goodbye", "empty": ""}"#,
    )?;

    let output = test.extract_command().output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    insta::assert_snapshot!(
        stdout(&output).trim_end(),
        @"✓ Extracted 2 resources from 1 document into extracted.json"
    );

    let extracted = test.read_json("extracted.json")?;
    assert_eq!(
        extracted[0],
        json!({
            "key": "hello",
            "source": "Hello",
            "sourceLocale": "en-US",
            "project": "project",
            "datatype": "json",
            "path": "resources/strings.json",
            "state": "new",
            "index": 0
        })
    );
    assert_eq!(keys(&extracted), vec!["hello", "bye"]);

    Ok(())
}

#[test]
fn test_extract_with_configured_schema() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".treelocrc.json",
        r#"{
            "projectId": "webapp",
            "schemas": ["schemas"],
            "mappings": {
                "menus/**/*.json": {"schema": "menu"}
            }
        }"#,
    )?;
    test.write_file("schemas/menu.json", MENU_SCHEMA)?;
    test.write_file(
        "menus/main.json",
        r#"{
            "title": "File",
            "items": [{"label": "Open"}, {"label": "Save"}],
            "footer": "Copyright",
            "version": 3
        }"#,
    )?;

    let output = test.extract_command().output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "warning: unresolved reference \"#/definitions/missing\"  unresolved-ref\n  \
         --> menus/main.json#/footer\n  \
         = note: the subtree was skipped\n\
         \n\
         \u{2718} 1 problem (0 errors, 1 warning)\n\
         \n\
         \u{2713} Extracted 3 resources from 1 document into extracted.json\n"
    );

    let extracted = test.read_json("extracted.json")?;
    assert_eq!(keys(&extracted), vec!["title", "items/0/label", "items/1/label"]);
    assert_eq!(extracted[0]["project"], "webapp");

    Ok(())
}

#[test]
fn test_extract_reports_unreadable_documents() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("a/broken.json", r#"{"oops": "#)?;
    test.write_file("b/strings.json", r#"{"ok": "Fine"}"#)?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.starts_with("error: Failed to parse document: "), "{}", out);
    assert!(out.contains("  --> a/broken.json\n"));
    assert!(out.contains("1 problem (1 error, 0 warnings)"));
    assert!(out.ends_with("Extracted 1 resource from 2 documents into extracted.json\n"));

    assert_eq!(keys(&test.read_json("extracted.json")?), vec!["ok"]);

    Ok(())
}

#[test]
fn test_extract_skips_own_output_and_localized_documents() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("resources/strings.json", r#"{"a": "Apple"}"#)?;
    test.write_file("resources/de/DE/strings.json", r#"{"a": "Apfel"}"#)?;
    test.write_file("node_modules/pkg/strings.json", r#"{"x": "X"}"#)?;

    let first = test.extract_command().output()?;
    assert!(first.status.success());
    let second = test.extract_command().output()?;
    assert!(second.status.success());

    assert_eq!(stdout(&first), stdout(&second));
    assert_eq!(keys(&test.read_json("extracted.json")?), vec!["a"]);

    Ok(())
}

#[test]
fn test_extract_custom_output_and_source_root() -> Result<()> {
    let test = CliTest::with_file("content/strings.json", r#"{"a": "Apple"}"#)?;
    test.write_file("other/strings.json", r#"{"b": "Banana"}"#)?;

    let output = test
        .extract_command()
        .args(["--source-root", "content", "-o", "out/resources.json"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.root().join("out/resources.json").exists());

    let extracted = test.read_json("out/resources.json")?;
    assert_eq!(keys(&extracted), vec!["a"]);
    assert_eq!(extracted[0]["path"], "strings.json");

    Ok(())
}

#[test]
fn test_extract_fails_on_invalid_schema() -> Result<()> {
    let test = CliTest::with_file(".treelocrc.json", r#"{"schemas": ["schema.json"]}"#)?;
    test.write_file("schema.json", "{ not json")?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error: Failed to load schemas from"));
    assert!(!test.root().join("extracted.json").exists());

    Ok(())
}
