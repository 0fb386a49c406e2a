//! CLI integration tests for pbxgen.
//!
//! These tests drive the binary through generation, incremental additions
//! and checks against real temporary project trees.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the pbxgen binary command.
fn pbxgen() -> Command {
    Command::cargo_bin("pbxgen").unwrap()
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn touch(root: &Path, files: &[&str]) {
    for rel in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "import SwiftUI\n").unwrap();
    }
}

/// Generate `TripBro` under `root` from a few sources.
fn generate_trip_bro(root: &Path) -> PathBuf {
    touch(
        &root.join("TripBro"),
        &["TripBroApp.swift", "Models/Trip.swift", "Views/TripListView.swift"],
    );
    pbxgen()
        .args(["generate", "--name", "TripBro", "--no-color"])
        .current_dir(root)
        .assert()
        .success();
    root.join("TripBro.xcodeproj/project.pbxproj")
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// ============================================================================
// pbxgen generate
// ============================================================================

#[test]
fn test_generate_writes_manifest() {
    let tmp = temp_dir();
    let manifest = generate_trip_bro(tmp.path());

    let text = fs::read_to_string(&manifest).unwrap();
    assert!(text.starts_with("// !$*UTF8*$!\n"));
    assert!(text.contains("/* Begin PBXBuildFile section */"));
    assert!(text.contains("/* End XCConfigurationList section */"));
    assert_eq!(count(&text, "isa = PBXBuildFile;"), 3);
    assert!(text.contains("/* TripBroApp.swift in Sources */"));
    assert!(text.contains("rootObject = "));
}

#[test]
fn test_generate_json_output() {
    let tmp = temp_dir();
    touch(&tmp.path().join("Demo"), &["Main.swift"]);

    let output = pbxgen()
        .args(["generate", "--name", "Demo", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "Demo");
    assert_eq!(json["files"], 1);
    assert_eq!(json["objects"]["configurations"], 4);
}

#[test]
fn test_generate_rejects_duplicate_sources() {
    let tmp = temp_dir();

    pbxgen()
        .args([
            "generate",
            "--name",
            "Dup",
            "--source",
            "A.swift",
            "--source",
            "A.swift",
        ])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("listed more than once"));

    assert!(!tmp.path().join("Dup.xcodeproj").exists());
}

#[test]
fn test_generate_missing_source_dir() {
    let tmp = temp_dir();

    pbxgen()
        .args(["generate", "--name", "Nothing"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

// ============================================================================
// pbxgen add
// ============================================================================

#[test]
fn test_add_patches_generated_project() {
    let tmp = temp_dir();
    let manifest = generate_trip_bro(tmp.path());
    let before = fs::read_to_string(&manifest).unwrap();

    pbxgen()
        .args(["add", "Store.swift", "Services/Api.swift", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Added"));

    let after = fs::read_to_string(&manifest).unwrap();
    assert_eq!(count(&after, "isa = PBXBuildFile;"), 5);
    assert_eq!(count(&after, "/* Store.swift in Sources */"), 2);
    // Every original line is still present.
    for line in before.lines() {
        assert!(after.contains(line), "lost line: {}", line);
    }

    pbxgen()
        .args(["check"])
        .current_dir(tmp.path())
        .assert()
        .success();
}

#[test]
fn test_add_skips_existing_paths() {
    let tmp = temp_dir();
    let manifest = generate_trip_bro(tmp.path());
    pbxgen()
        .args(["add", "Extra.swift"])
        .current_dir(tmp.path())
        .assert()
        .success();
    let before = fs::read_to_string(&manifest).unwrap();

    pbxgen()
        .args(["add", "Extra.swift", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already in the project"));

    assert_eq!(fs::read_to_string(&manifest).unwrap(), before);
}

#[test]
fn test_add_missing_anchor_warns() {
    let tmp = temp_dir();
    let manifest = generate_trip_bro(tmp.path());

    pbxgen()
        .args(["add", "Lost.swift", "--source-root", "Elsewhere", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "anchor not found: source group children list",
        ));

    // The other anchors were still patched.
    let text = fs::read_to_string(&manifest).unwrap();
    assert!(text.contains("/* Lost.swift in Sources */"));
}

#[test]
fn test_add_strict_fails_on_missing_anchor() {
    let tmp = temp_dir();
    generate_trip_bro(tmp.path());

    pbxgen()
        .args(["add", "Lost.swift", "--source-root", "Elsewhere", "--strict"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 anchor(s) not found"));
}

#[test]
fn test_add_json_report() {
    let tmp = temp_dir();
    generate_trip_bro(tmp.path());

    let output = pbxgen()
        .args(["add", "Store.swift", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["written"], true);
    assert_eq!(json["source_root"], "TripBro");
    assert_eq!(json["report"]["added"][0]["path"], "Store.swift");
    assert_eq!(json["report"]["anchors"].as_array().unwrap().len(), 4);
    assert_eq!(json["report"]["anchors"][3]["status"], "applied");
}

#[test]
fn test_add_without_project_fails() {
    let tmp = temp_dir();

    pbxgen()
        .args(["add", "A.swift"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no .xcodeproj found"));
}

// ============================================================================
// pbxgen check
// ============================================================================

#[test]
fn test_check_reports_dangling_reference() {
    let tmp = temp_dir();
    let manifest = generate_trip_bro(tmp.path());
    let text = fs::read_to_string(&manifest).unwrap();

    // Drop the first file reference record.
    let start = text.find("/* Begin PBXFileReference section */\n").unwrap()
        + "/* Begin PBXFileReference section */\n".len();
    let end = start + text[start..].find('\n').unwrap() + 1;
    let broken = format!("{}{}", &text[..start], &text[end..]);
    fs::write(&manifest, broken).unwrap();

    pbxgen()
        .args(["check", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("references missing object"));
}

#[test]
fn test_check_parse_error() {
    let tmp = temp_dir();
    let manifest = tmp.path().join("Broken.xcodeproj/project.pbxproj");
    fs::create_dir_all(manifest.parent().unwrap()).unwrap();
    fs::write(&manifest, "// !$*UTF8*$!\n{\n\tarchiveVersion = 1;\n").unwrap();

    pbxgen()
        .args(["check", "Broken.xcodeproj"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a valid manifest"));
}

// ============================================================================
// pbxgen completions
// ============================================================================

#[test]
fn test_completions_bash() {
    pbxgen()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pbxgen"));
}
