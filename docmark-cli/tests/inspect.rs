use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn lists_renderers_for_both_directions() {
    let mut cmd = cargo_bin_cmd!("docmark");
    cmd.arg("--list-renderers");
    let output = predicate::str::contains("Rich text -> Markdown:")
        .and(predicate::str::contains("node: paragraph"))
        .and(predicate::str::contains("style: *"))
        .and(predicate::str::contains("Markdown -> rich text:"))
        .and(predicate::str::contains("directive: image"));
    cmd.assert().success().stdout(output);
}

#[test]
fn units_lists_titles_and_metadata() {
    let dir = tempdir().unwrap();
    let md_path = dir.path().join("module.md");
    fs::write(&md_path, "Preface.\n\n# First\n\nA.\n\n# Second\n\nB.\n").unwrap();

    let mut cmd = cargo_bin_cmd!("docmark");
    cmd.arg("units").arg(&md_path);
    let output = cmd.assert().success().get_output().stdout.clone();
    let units: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let titles: Vec<&str> = units
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["", "First", "Second"]);
}

#[test]
fn rejects_unknown_target() {
    let mut cmd = cargo_bin_cmd!("docmark");
    cmd.arg("convert").arg("doc.md").arg("--to").arg("pdf");
    cmd.assert().failure();
}
