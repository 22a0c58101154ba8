//! Integration tests for the `s2w` binary.
//!
//! Each test launches the binary via `assert_cmd`, writes any required
//! fixture files to a temp directory, and asserts on exit code + output.

use std::fs;
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[allow(deprecated)]
fn s2w() -> Command {
    Command::cargo_bin("s2w").expect("binary not found")
}

/// Write `contents` to a temporary file with the given suffix and return it.
fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const WINDOWS_RULE: &str = r#"
title: Suspicious Whoami
id: 00000000-0000-0000-0000-000000000001
status: test
level: high
tags:
    - attack.discovery
logsource:
    product: windows
    category: process_creation
detection:
    selection:
        CommandLine: 'whoami*'
    condition: selection
"#;

const ZEEK_OR_RULE: &str = r#"
title: DNS Tunnel
id: 00000000-0000-0000-0000-000000000002
status: test
level: medium
logsource:
    product: zeek
    service: dns
detection:
    selection1:
        query: '*.tunnel.example'
    selection2:
        query: '*.exfil.example'
    condition: selection1 or selection2
"#;

const MIXED_CONDITION_RULE: &str = r#"
title: Broken Condition
id: 00000000-0000-0000-0000-000000000003
detection:
    a:
        EventID: 1
    b:
        EventID: 2
    c:
        EventID: 3
    condition: a and b or c
"#;

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[test]
fn convert_single_rule_writes_xml() {
    let rule = temp_file(".yml", WINDOWS_RULE);
    let out = TempDir::new().unwrap();

    s2w()
        .arg("convert")
        .arg(rule.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Written"));

    let xml = fs::read_to_string(
        out.path()
            .join("rule_00000000-0000-0000-0000-000000000001.xml"),
    )
    .unwrap();
    assert!(xml.contains("<group name=\"sigma,\">"));
    assert!(xml.contains("level=\"13\""));
    assert!(xml.contains(
        "<field name=\"win.eventdata.commandLine\" negate=\"no\" type=\"pcre2\">(?i)^whoami.*$</field>"
    ));
}

#[test]
fn convert_or_rule_writes_one_file_per_selection() {
    let rule = temp_file(".yml", ZEEK_OR_RULE);
    let out = TempDir::new().unwrap();

    s2w()
        .arg("convert")
        .arg(rule.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();

    assert!(
        out.path()
            .join("rule_00000000-0000-0000-0000-000000000002_selection1.xml")
            .exists()
    );
    assert!(
        out.path()
            .join("rule_00000000-0000-0000-0000-000000000002_selection2.xml")
            .exists()
    );
}

#[test]
fn convert_directory_isolates_per_document_failures() {
    let rules = TempDir::new().unwrap();
    fs::write(rules.path().join("good.yml"), WINDOWS_RULE).unwrap();
    fs::write(rules.path().join("bad.yml"), MIXED_CONDITION_RULE).unwrap();
    let out = TempDir::new().unwrap();

    // The bad document fails the run, but the good one still converts.
    s2w()
        .arg("convert")
        .arg(rules.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported condition expression"))
        .stdout(predicate::str::contains("Written"));

    assert!(
        out.path()
            .join("rule_00000000-0000-0000-0000-000000000001.xml")
            .exists()
    );
}

#[test]
fn convert_keep_field_case_flag() {
    let rule = temp_file(".yml", WINDOWS_RULE);
    let out = TempDir::new().unwrap();

    s2w()
        .arg("convert")
        .arg(rule.path())
        .arg("-o")
        .arg(out.path())
        .arg("--keep-field-case")
        .assert()
        .success();

    let xml = fs::read_to_string(
        out.path()
            .join("rule_00000000-0000-0000-0000-000000000001.xml"),
    )
    .unwrap();
    assert!(xml.contains("name=\"win.eventdata.CommandLine\""));
}

#[test]
fn convert_missing_input_fails() {
    let out = TempDir::new().unwrap();
    s2w()
        .arg("convert")
        .arg("does-not-exist.yml")
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error parsing"));
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

#[test]
fn query_prints_flat_expression() {
    let rule = temp_file(".yml", WINDOWS_RULE);
    s2w()
        .arg("query")
        .arg(rule.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "win.eventdata.commandLine:\\\"whoami*\\\"",
        ))
        .stdout(predicate::str::contains(
            "00000000-0000-0000-0000-000000000001",
        ));
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

#[test]
fn verify_passes_with_matching_sample_log() {
    let rule = temp_file(".yml", WINDOWS_RULE);
    let log = temp_file(
        ".json",
        r#"[{"win": {"eventdata": {"commandLine": "whoami /all"}}}]"#,
    );

    s2w()
        .arg("verify")
        .arg("-r")
        .arg(rule.path())
        .arg("-l")
        .arg(log.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("passed with sample log"));
}

#[test]
fn verify_fails_without_matching_sample_log() {
    let rule = temp_file(".yml", WINDOWS_RULE);
    let log = temp_file(
        ".json",
        r#"{"win": {"eventdata": {"commandLine": "notepad.exe"}}}"#,
    );

    s2w()
        .arg("verify")
        .arg("-r")
        .arg(rule.path())
        .arg("-l")
        .arg(log.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("no matching sample event"));
}

#[test]
fn verify_reads_ndjson_logs() {
    let rule = temp_file(".yml", ZEEK_OR_RULE);
    let log = temp_file(
        ".json",
        "{\"full_log\": \"www.example.test\"}\n{\"full_log\": \"c2.exfil.example\"}\n",
    );

    s2w()
        .arg("verify")
        .arg("-r")
        .arg(rule.path())
        .arg("-l")
        .arg(log.path())
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// condition
// ---------------------------------------------------------------------------

#[test]
fn condition_prints_ast_json() {
    s2w()
        .arg("condition")
        .arg("selection and not falsepositive")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conjunction"))
        .stdout(predicate::str::contains("falsepositive"));
}

#[test]
fn condition_rejects_mixed_connectives() {
    s2w()
        .arg("condition")
        .arg("a and b or c")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported condition expression"));
}
