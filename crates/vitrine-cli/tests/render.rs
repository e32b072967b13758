//! End-to-end coverage of the render command.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn snippet(temp: &TempDir, source: &str) -> PathBuf {
    let path = temp.path().join("demo.vit");
    fs::write(&path, source).unwrap();
    path
}

fn vitrine() -> Command {
    Command::cargo_bin("vitrine").unwrap()
}

#[test]
fn render_prints_text_content() {
    let temp = TempDir::new().unwrap();
    let path = snippet(&temp, "<h1>Hi</h1>");

    vitrine()
        .arg("render")
        .arg(&path)
        .assert()
        .success()
        .stdout("Hi\n");
}

#[test]
fn render_html_prints_markup() {
    let temp = TempDir::new().unwrap();
    let path = snippet(&temp, "<h1>Hi</h1>");

    vitrine()
        .arg("render")
        .arg(&path)
        .arg("--html")
        .assert()
        .success()
        .stdout("<h1>Hi</h1>\n");
}

#[test]
fn broken_snippet_prints_the_descriptor_and_fails() {
    let temp = TempDir::new().unwrap();
    let path = snippet(&temp, "{");

    vitrine()
        .arg("render")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("evaluation failed"));
}

#[test]
fn scope_bindings_reach_the_program() {
    let temp = TempDir::new().unwrap();
    let path = snippet(&temp, "<p>{name} has {count: Int}</p>");

    vitrine()
        .arg("render")
        .arg(&path)
        .arg("--scope")
        .arg("name=Ada")
        .arg("--scope")
        .arg("count=3")
        .assert()
        .success()
        .stdout("Ada has 3\n");
}

#[test]
fn untyped_mode_rejects_annotations() {
    let temp = TempDir::new().unwrap();
    let path = snippet(&temp, "<p>{count: Int}</p>");

    vitrine()
        .arg("render")
        .arg(&path)
        .arg("--untyped")
        .arg("--scope")
        .arg("count=3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("type annotations require typed mode"));
}

#[test]
fn deferred_programs_drive_their_own_render() {
    let temp = TempDir::new().unwrap();
    let path = snippet(&temp, "let who = \"Ada\"; render(<h1>Hi {who}</h1>)");

    vitrine()
        .arg("render")
        .arg(&path)
        .arg("--no-inline")
        .assert()
        .success()
        .stdout("Hi Ada\n");
}

#[test]
fn deferred_program_that_never_renders_fails() {
    let temp = TempDir::new().unwrap();
    let path = snippet(&temp, "let unused = 1");

    vitrine()
        .arg("render")
        .arg(&path)
        .arg("--no-inline")
        .assert()
        .failure()
        .stderr(predicate::str::contains("never called render"));
}

#[test]
fn missing_file_is_an_error() {
    vitrine()
        .arg("render")
        .arg("does-not-exist.vit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}
