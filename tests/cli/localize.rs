use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, stderr, stdout};

const STRINGS: &str = r#"{"hello": "Hello", "bye": "Goodbye"}"#;

const TRANSLATIONS: &str = r#"[
    {
        "key": "hello",
        "source": "Hello",
        "sourceLocale": "en-US",
        "target": "Hallo",
        "targetLocale": "de-DE",
        "state": "translated"
    }
]"#;

fn project() -> Result<CliTest> {
    let test = CliTest::with_file("resources/strings.json", STRINGS)?;
    test.write_file("translations.json", TRANSLATIONS)?;
    Ok(test)
}

#[test]
fn test_localize_copy() -> Result<()> {
    let test = project()?;

    let output = test
        .localize_command()
        .args(["-t", "translations.json", "-l", "de-DE", "-l", "fr-FR"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "\u{2713} Localized 1 document into 2 locales (2 files written)\n\
         3 resources without translation written to new-resources.json\n"
    );

    assert_eq!(
        test.read_file("resources/de/DE/strings.json")?,
        "{\n    \"hello\": \"Hallo\",\n    \"bye\": \"Goodbye\"\n}\n"
    );
    assert_eq!(
        test.read_json("resources/fr/FR/strings.json")?,
        json!({"hello": "Hello", "bye": "Goodbye"})
    );

    let new_resources = test.read_json("new-resources.json")?;
    let found: Vec<(&str, &str)> = new_resources
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|r| Some((r["key"].as_str()?, r["targetLocale"].as_str()?)))
        .collect();
    assert_eq!(
        found,
        vec![("bye", "de-DE"), ("hello", "fr-FR"), ("bye", "fr-FR")]
    );
    assert_eq!(new_resources[0]["source"], "Goodbye");
    assert_eq!(new_resources[0]["state"], "new");
    assert_eq!(new_resources[0]["path"], "resources/strings.json");

    Ok(())
}

#[test]
fn test_localize_verbose_lists_written_files() -> Result<()> {
    let test = project()?;

    let output = test
        .localize_command()
        .args(["-t", "translations.json", "-l", "de-DE", "-v"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(
        out.starts_with("  resources/strings.json  -> resources/de/DE/strings.json (de-DE)\n"),
        "{}",
        out
    );

    Ok(())
}

#[test]
fn test_localize_uses_config_locales_and_pseudo() -> Result<()> {
    let test = project()?;
    test.write_file(
        ".treelocrc.json",
        r#"{
            "locales": ["de-DE", "zxx-XX", "en-US"],
            "pseudoLocales": {"zxx-XX": {"style": "bracketed"}},
            "mappings": {
                "resources/*.json": {"method": "sparse", "template": "[dir]/[locale]/[filename]"}
            }
        }"#,
    )?;

    let output = test
        .localize_command()
        .args(["--translations", "translations.json"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    insta::assert_snapshot!(stdout(&output).trim_end(), @r"
    ✓ Localized 1 document into 3 locales (2 files written)
    1 resource without translation written to new-resources.json
    ");

    assert_eq!(
        test.read_json("resources/de-DE/strings.json")?,
        json!({"hello": "Hallo", "bye": "[Goodbye]"})
    );
    assert_eq!(
        test.read_json("resources/zxx-XX/strings.json")?,
        json!({"hello": "[Hello]", "bye": "[Goodbye]"})
    );
    assert!(!test.root().join("resources/en-US/strings.json").exists());

    Ok(())
}

#[test]
fn test_localize_target_root() -> Result<()> {
    let test = project()?;

    let output = test
        .localize_command()
        .args(["-t", "translations.json", "-l", "de-DE"])
        .args(["--target-root", "build", "--new-resources", "build/new.json"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert!(test.root().join("build/resources/de/DE/strings.json").exists());
    assert!(!test.root().join("resources/de").exists());
    assert_eq!(test.read_json("build/new.json")?[0]["key"], "bye");

    Ok(())
}

#[test]
fn test_localize_write_failure_is_reported() -> Result<()> {
    let test = project()?;
    test.write_file("blocked", "not a directory")?;

    let output = test
        .localize_command()
        .args(["-t", "translations.json", "-l", "de-DE", "--target-root", "blocked"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.starts_with("error: Failed to create directory: "), "{}", out);
    assert!(out.contains("  --> resources/strings.json\n"));
    assert!(out.contains("  = note: while writing locale de-DE\n"));
    assert!(out.contains("Localized 1 document into 1 locale (0 files written)"));

    Ok(())
}

#[test]
fn test_localize_without_locales_fails() -> Result<()> {
    let test = project()?;

    let output = test
        .localize_command()
        .args(["-t", "translations.json"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stderr(&output),
        "Error: No target locales. Pass --locale or set 'locales' in .treelocrc.json\n"
    );

    Ok(())
}

#[test]
fn test_localize_with_missing_translations_fails() -> Result<()> {
    let test = CliTest::with_file("resources/strings.json", STRINGS)?;

    let output = test
        .localize_command()
        .args(["-t", "missing.json", "-l", "de-DE"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error: Failed to read resource file: missing.json"));
    assert!(!test.root().join("resources/de").exists());

    Ok(())
}
