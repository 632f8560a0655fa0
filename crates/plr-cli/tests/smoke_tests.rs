//! Smoke tests for the plr CLI
//!
//! These tests run the built binary against snapshot files on disk.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get a command for the plr binary
fn plr() -> Command {
    Command::cargo_bin("plr").expect("plr binary should exist")
}

fn page(button_id: &str) -> String {
    serde_json::json!({
        "url": "https://shop.test/cart",
        "dom_structure": {
            "nodeName": "BODY",
            "children": [
                {"nodeName": "DIV", "attributes": {"class": "toolbar", "data-v-1f2e": ""}, "children": [
                    {"nodeName": "BUTTON", "attributes": {"id": button_id, "class": "btn"}, "nodeValue": "Checkout"}
                ]},
                {"nodeName": "A", "attributes": {"id": "help"}, "nodeValue": "Help"}
            ]
        }
    })
    .to_string()
}

fn write_pair(dir: &TempDir, old_id: &str, new_id: &str) -> (PathBuf, PathBuf) {
    let old = dir.path().join("old.json");
    let new = dir.path().join("new.json");
    fs::write(&old, page(old_id)).unwrap();
    fs::write(&new, page(new_id)).unwrap();
    (old, new)
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    plr()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    plr()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("locate"))
        .stdout(predicate::str::contains("fingerprint"));
}

#[test]
fn test_no_args_fails() {
    plr().assert().failure();
}

// ============================================================================
// diff
// ============================================================================

#[test]
fn test_diff_identical_snapshots() {
    let dir = TempDir::new().unwrap();
    let (old, new) = write_pair(&dir, "checkout", "checkout");
    plr()
        .args(["diff", "--format", "json"])
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"distance\": 0.0"));
}

#[test]
fn test_diff_reports_renamed_node() {
    let dir = TempDir::new().unwrap();
    let (old, new) = write_pair(&dir, "checkout", "checkout-v2");
    plr()
        .args(["--color", "never", "diff"])
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("button#checkout.btn -> button#checkout-v2.btn"));
}

#[test]
fn test_diff_missing_file() {
    plr()
        .args(["diff", "/nonexistent/a.json", "/nonexistent/b.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_diff_invalid_tree() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("old.json");
    fs::write(&old, r#"{"nodeName": "DIV", "children": [42]}"#).unwrap();
    plr()
        .arg("diff")
        .arg(&old)
        .arg(&old)
        .assert()
        .failure()
        .stderr(predicate::str::contains("/children/0"));
}

#[test]
fn test_diff_with_custom_dynamic_patterns() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("old.json");
    let new = dir.path().join("new.json");
    let snapshot = |build: &str| {
        serde_json::json!({
            "nodeName": "BODY",
            "children": [{"nodeName": "A", "attributes": {"id": "help", "data-build": build}}]
        })
        .to_string()
    };
    fs::write(&old, snapshot("101")).unwrap();
    fs::write(&new, snapshot("102")).unwrap();
    let config = dir.path().join("plr.yaml");
    fs::write(&config, "dynamic_attribute_patterns: [\"^data-build$\"]\n").unwrap();

    plr()
        .args(["diff", "--format", "json"])
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"distance\": 0.0").not());
    plr()
        .args(["diff", "--format", "json", "--config"])
        .arg(&config)
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"distance\": 0.0"));
}

// ============================================================================
// analyze
// ============================================================================

#[test]
fn test_analyze_remediates_changed_id() {
    let dir = TempDir::new().unwrap();
    let (old, new) = write_pair(&dir, "checkout", "checkout-v2");
    plr()
        .args(["--color", "never", "analyze"])
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("REMEDIATED"))
        .stdout(predicate::str::contains("//*[@id='checkout-v2']"))
        .stdout(predicate::str::contains("1 auto-apply, 0 for review"));
}

#[test]
fn test_analyze_json_output() {
    let dir = TempDir::new().unwrap();
    let (old, new) = write_pair(&dir, "checkout", "checkout-v2");
    let output = plr()
        .args(["analyze", "--format", "json"])
        .arg(&old)
        .arg(&new)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report"]["url"], "https://shop.test/cart");
    assert_eq!(json["report"]["entries"][0]["bundle"]["status"], "REMEDIATED");
    assert_eq!(json["plan"]["auto_apply"][0]["key"], "checkout");
}

#[test]
fn test_analyze_single_mode() {
    let dir = TempDir::new().unwrap();
    let (old, new) = write_pair(&dir, "checkout", "checkout");
    plr()
        .args(["--color", "never", "analyze", "--mode", "single", "--target-id", "help"])
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("STABLE"))
        .stdout(predicate::str::contains("nothing to patch"));
}

#[test]
fn test_analyze_single_mode_requires_target() {
    let dir = TempDir::new().unwrap();
    let (old, new) = write_pair(&dir, "a", "b");
    plr()
        .args(["analyze", "--mode", "single"])
        .arg(&old)
        .arg(&new)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--target-id"));
}

#[test]
fn test_analyze_with_review_threshold_config() {
    let dir = TempDir::new().unwrap();
    let (old, new) = write_pair(&dir, "checkout", "checkout-v2");
    let config = dir.path().join("plr.yaml");
    fs::write(&config, "remediated_confidence: 0.9\n").unwrap();
    plr()
        .args(["--color", "never", "analyze", "--config"])
        .arg(&config)
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 auto-apply, 1 for review"));
}

// ============================================================================
// locate and fingerprint
// ============================================================================

#[test]
fn test_locate_by_class() {
    let dir = TempDir::new().unwrap();
    let (old, _) = write_pair(&dir, "checkout", "checkout");
    plr()
        .args(["locate", "--class", "toolbar"])
        .arg(&old)
        .assert()
        .success()
        .stdout(predicate::str::contains("primary:   //div[@class='toolbar']"))
        .stdout(predicate::str::contains("secondary: .toolbar"));
}

#[test]
fn test_locate_unknown_id() {
    let dir = TempDir::new().unwrap();
    let (old, _) = write_pair(&dir, "checkout", "checkout");
    plr()
        .args(["locate", "--id", "missing"])
        .arg(&old)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_fingerprint_identical_texts() {
    plr()
        .args(["fingerprint", "Add to cart", "add to CART"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distance: 0/64"));
}

#[test]
fn test_fingerprint_width_from_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("plr.yaml");
    fs::write(&config, "fingerprint_width: 16\n").unwrap();
    plr()
        .args(["fingerprint", "Add to cart", "add to CART", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("distance: 0/16"));
}

#[test]
fn test_locate_skips_empty_id() {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("page.json");
    fs::write(
        &snapshot,
        serde_json::json!({
            "nodeName": "FORM",
            "children": [
                {"nodeName": "BUTTON", "attributes": {"id": "", "class": "btn"}},
                {"nodeName": "BUTTON"}
            ]
        })
        .to_string(),
    )
    .unwrap();
    plr()
        .args(["locate", "--class", "btn"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("primary:   //button[@class='btn']"))
        .stdout(predicate::str::contains("secondary: .btn"));
}

#[test]
fn test_fingerprint_invalid_width() {
    plr()
        .args(["fingerprint", "a", "b", "--width", "0"])
        .assert()
        .failure();
}
