// Regression tests for the gomacro binary: exit status, output file and
// diagnostics on stderr.

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const TEMPLATE: &str = "package main

func MACRO_inc(v int) {
	v = v + 1
}

func MACRO_twice(w int) {
	inc(w)
	inc(w)
}

func main() {
	twice(n)
}
";

fn write_input(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("input.go.tmpl");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn cli_writes_expanded_program() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TEMPLATE);
    let output = dir.path().join("output.go");

    Command::cargo_bin("gomacro")
        .unwrap()
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "package main\n\nfunc main() {\n\tinc(n)\n\tinc(n)\n}\n"
    );
}

#[test]
fn cli_recursive_flag_pre_expands_macros() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TEMPLATE);
    let output = dir.path().join("output.go");

    Command::cargo_bin("gomacro")
        .unwrap()
        .arg("-r")
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "package main\n\nfunc main() {\n\tn = n + 1\n\tn = n + 1\n}\n"
    );
}

#[test]
fn cli_reports_diagnostics_on_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        concat!(
            "package main\n\n",
            "func MACRO_show(x int) {\n\tfmt.Println(x)\n}\n\n",
            "func main() {\n\tshow(1)\n}\n",
        ),
    );
    let output = dir.path().join("output.go");

    Command::cargo_bin("gomacro")
        .unwrap()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("gomacro::unsupported"));

    assert!(!output.exists(), "no partial output may be written");
}

#[test]
fn cli_reports_parse_errors() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "package main\n\nfunc main() {\n\tx := (1 + 2\n}\n");
    let output = dir.path().join("output.go");

    Command::cargo_bin("gomacro")
        .unwrap()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .stderr(contains("gomacro::parse"));

    assert!(!output.exists());
}

#[test]
fn cli_error_is_a_single_line_by_default() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "package main\n\nfunc main() {\n\tx := (1 + 2\n}\n");
    let output = dir.path().join("output.go");

    let assert = Command::cargo_bin("gomacro")
        .unwrap()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(1);

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_eq!(stderr.lines().count(), 1, "unexpected stderr:\n{}", stderr);
    assert!(stderr.contains(
        "input.go.tmpl:4:7: error[gomacro::parse]: Parse error: Missing closing parenthesis"
    ));
}

#[test]
fn cli_full_error_format_shows_the_report() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "package main\n\nfunc main() {\n\tx := (1 + 2\n}\n");
    let output = dir.path().join("output.go");

    Command::cargo_bin("gomacro")
        .unwrap()
        .args(["--error-format", "full"])
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("gomacro::parse").and(contains("never closed")));
}

#[test]
fn cli_reports_missing_input() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output.go");

    Command::cargo_bin("gomacro")
        .unwrap()
        .arg(dir.path().join("missing.go.tmpl"))
        .arg(&output)
        .assert()
        .failure()
        .stderr(contains("gomacro::io"));
}

#[test]
fn cli_requires_input_and_output() {
    Command::cargo_bin("gomacro")
        .unwrap()
        .arg("only-one.go")
        .assert()
        .failure();
}

#[test]
fn cli_emits_ast_as_json() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TEMPLATE);
    let output = dir.path().join("output.json");

    Command::cargo_bin("gomacro")
        .unwrap()
        .args(["--emit", "ast"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["package"], "main");
    assert_eq!(json["decls"].as_array().unwrap().len(), 1);
}

#[test]
fn cli_trace_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, TEMPLATE);
    let output = dir.path().join("output.go");

    Command::cargo_bin("gomacro")
        .unwrap()
        .args(["--trace", "-r"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stderr(contains("Step 0: inc").and(contains("+n = n + 1")));
}

#[test]
fn cli_custom_prefix() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, &TEMPLATE.replace("MACRO_", "TPL_"));
    let output = dir.path().join("output.go");

    Command::cargo_bin("gomacro")
        .unwrap()
        .args(["--prefix", "TPL_"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let expanded = fs::read_to_string(&output).unwrap();
    assert!(!expanded.contains("TPL_"));
    assert!(expanded.contains("\tinc(n)\n"));
}
