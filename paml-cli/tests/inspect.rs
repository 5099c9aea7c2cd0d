use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn inspect_shows_outline_by_default() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("page.paml"), "<div.content\n  <p: Hello\n").unwrap();

    let mut cmd = cargo_bin_cmd!("paml");
    cmd.current_dir(dir.path()).args(["inspect", "page.paml"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("document\n└─ div class=\"content\""))
        .stdout(predicate::str::contains("└─ p"));
}

#[test]
fn inspect_json_view() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("page.paml"), "<p: Hello\n").unwrap();

    let mut cmd = cargo_bin_cmd!("paml");
    cmd.current_dir(dir.path())
        .args(["inspect", "page.paml", "json"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"root\""))
        .stdout(predicate::str::contains("\"name\": \"p\""));
}

#[test]
fn inspect_rejects_unknown_views() {
    let mut cmd = cargo_bin_cmd!("paml");
    cmd.args(["inspect", "page.paml", "tokens"]);
    cmd.assert().failure();
}

#[test]
fn inspect_reports_grammar_errors() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.paml"), "<div(class=x\n").unwrap();

    let mut cmd = cargo_bin_cmd!("paml");
    cmd.current_dir(dir.path()).args(["inspect", "bad.paml"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Grammar error"));
}

#[test]
fn list_formats_names_renderers_and_processors() {
    let mut cmd = cargo_bin_cmd!("paml");
    cmd.arg("--list-formats");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Output formats:"))
        .stdout(predicate::str::contains("  html"))
        .stdout(predicate::str::contains("  outline"))
        .stdout(predicate::str::contains("Foreign processors:"))
        .stdout(predicate::str::contains("raw"));
}

#[test]
fn no_arguments_prints_help() {
    let mut cmd = cargo_bin_cmd!("paml");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
