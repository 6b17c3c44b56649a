//! Integration tests for the Provenant CLI.
//!
//! Each test creates fixture data in a temporary directory, invokes the
//! `provenant` binary via `assert_cmd`, and checks outputs and exit codes.

#![allow(deprecated)] // cargo_bin deprecation — macro replacement not yet stable

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const BINARY_DIGEST: &str = "15dc16c42a4ac9ed77f337a4a3065a63e444c29c18c8cf69d6a6b4ae678dca5c";
const REVISION: &str = "4c6a1b9d0e2f3a5b6c7d8e9f0a1b2c3d4e5f6a7b";

/// Convenience: get a `Command` for the `provenant` binary.
fn provenant() -> Command {
    Command::cargo_bin("provenant").expect("provenant binary not found")
}

fn provenance_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../provenant-intoto/testdata/amber_provenance.json")
}

fn put(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    std::fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
    std::fs::write(full, content).expect("write fixture");
}

fn summary(covered: u64, count: u64) -> String {
    let percent = covered as f64 * 100.0 / count as f64;
    serde_json::json!({
        "data": [{
            "totals": {
                "lines": {"count": count, "covered": covered, "percent": percent},
                "branches": {"count": count, "covered": covered, "percent": percent}
            }
        }]
    })
    .to_string()
}

/// Writes fuzz parameters and a bucket mirror; returns the parameters path.
fn create_fuzz_fixture(dir: &Path) -> PathBuf {
    let params = dir.join("params.toml");
    std::fs::write(
        &params,
        r#"
project_name = "oak"
project_git_repo = "https://github.com/project-oak/oak"
fuzz_engine = "libFuzzer"
sanitizer = "asan"
date = "20230115"

[[targets]]
name = "apply_policy"
path = "fuzz/fuzz_targets/apply_policy.rs"
"#,
    )
    .expect("write params");

    let root = dir.join("buckets");
    put(
        &root,
        "oss-fuzz-coverage/oak/srcmap/20230115.json",
        &format!(r#"{{"/src/oak": {{"type": "git", "rev": "{REVISION}"}}}}"#),
    );
    put(
        &root,
        "oss-fuzz-coverage/oak/reports/20230115/linux/summary.json",
        &summary(25, 100),
    );
    put(
        &root,
        "oss-fuzz-coverage/oak/fuzzer_stats/20230115/apply_policy.json",
        &summary(25, 100),
    );
    put(
        &root,
        "oak-logs.clusterfuzz-external.appspot.com/libFuzzer_oak_apply_policy/libfuzzer_asan_oak/2023-01-15/run.log",
        &format!(
            "Component revisions (build r{REVISION}):\n\
             stat::number_of_executed_units: 42\n\
             Time ran: 3600\n"
        ),
    );
    params
}

// ─── endorse tests ──────────────────────────────────────────

#[test]
fn endorse_writes_valid_endorsement() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("endorsement.json");

    provenant()
        .arg("endorse")
        .arg(provenance_fixture())
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Endorsed oak_functions_loader"));

    let endorsement: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&output).expect("read endorsement"))
            .expect("endorsement is JSON");
    assert_eq!(endorsement["subject"][0]["digest"]["sha256"], BINARY_DIGEST);
    assert_eq!(endorsement["predicate"]["evidence"][0]["role"], "Provenance");
    assert!(
        endorsement["predicate"]["evidence"][0]["uri"]
            .as_str()
            .is_some_and(|u| u.starts_with("file://"))
    );

    provenant()
        .arg("validate")
        .arg(&output)
        .arg("--claim-type")
        .arg("https://github.com/project-oak/transparent-release/endorsement/v2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation PASSED"));
}

#[test]
fn endorse_rejects_wrong_reference_digest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("endorsement.json");

    provenant()
        .arg("endorse")
        .arg(provenance_fixture())
        .arg("--binary-digest")
        .arg("00".repeat(32))
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatch"));
    assert!(!output.exists());
}

#[test]
fn endorse_checks_binary_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let binary = dir.path().join("oak_functions_loader");
    std::fs::write(&binary, b"not the built binary").expect("write binary");

    provenant()
        .arg("endorse")
        .arg(provenance_fixture())
        .arg("--binary")
        .arg(&binary)
        .arg("--output")
        .arg(dir.path().join("endorsement.json"))
        .assert()
        .failure();
}

#[test]
fn endorse_rejects_empty_window() {
    let dir = tempfile::tempdir().expect("tempdir");
    provenant()
        .arg("endorse")
        .arg(provenance_fixture())
        .args(["--not-before-days", "5", "--not-after-days", "5"])
        .arg("--output")
        .arg(dir.path().join("endorsement.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not after notBefore"));
}

// ─── validate tests ─────────────────────────────────────────

#[test]
fn validate_provenance() {
    provenant()
        .arg("validate")
        .arg(provenance_fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("provenance of oak_functions_loader"));
}

#[test]
fn validate_rejects_invalid_evidence_uri() {
    let dir = tempfile::tempdir().expect("tempdir");
    let claim = dir.path().join("claim.json");
    let statement = serde_json::json!({
        "_type": "https://in-toto.io/Statement/v0.1",
        "predicateType": "https://github.com/project-oak/transparent-release/claim/v1",
        "subject": [{"name": "bin", "digest": {"sha256": BINARY_DIGEST}}],
        "predicate": {
            "claimType": "https://github.com/project-oak/transparent-release/endorsement/v2",
            "issuedOn": "2023-01-01T00:00:00Z",
            "validity": {
                "notBefore": "2023-01-02T00:00:00Z",
                "notAfter": "2023-04-01T00:00:00Z"
            },
            "evidence": [{"role": "Provenance", "uri": "not-a-uri", "digest": {}}]
        }
    });
    std::fs::write(&claim, statement.to_string()).expect("write claim");

    provenant()
        .arg("validate")
        .arg(&claim)
        .assert()
        .failure()
        .stdout(
            predicate::str::contains("Validation FAILED")
                .and(predicate::str::contains("not-a-uri")),
        );
}

#[test]
fn validate_checks_instant_against_window() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("endorsement.json");
    provenant()
        .arg("endorse")
        .arg(provenance_fixture())
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    provenant()
        .arg("validate")
        .arg(&output)
        .args(["--at", "2000-01-01T00:00:00Z"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not valid before"));
}

#[test]
fn validate_rejects_malformed_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").expect("write");

    provenant()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Validation FAILED"));
}

// ─── inspect tests ──────────────────────────────────────────

#[test]
fn inspect_endorsement() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("endorsement.json");
    provenant()
        .arg("endorse")
        .arg(provenance_fixture())
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    provenant()
        .arg("inspect")
        .arg(&output)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Claim Summary")
                .and(predicate::str::contains("oak_functions_loader"))
                .and(predicate::str::contains("Evidence:        1")),
        );

    provenant()
        .arg("inspect")
        .arg(&output)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"evidenceCount\": 1"));
}

// ─── fuzz-claim tests ───────────────────────────────────────

#[test]
fn fuzz_claim_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let params = create_fuzz_fixture(dir.path());
    let output = dir.path().join("fuzz_claim.json");

    provenant()
        .arg("fuzz-claim")
        .arg("--params")
        .arg(&params)
        .arg("--blob-root")
        .arg(dir.path().join("buckets"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("fuzz tests:       42")
                .and(predicate::str::contains("25.00% (25/100)")),
        );

    let claim: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&output).expect("read claim")).expect("JSON");
    assert_eq!(claim["subject"][0]["digest"]["sha1"], REVISION);
    assert_eq!(
        claim["predicate"]["claimSpec"]["perProject"]["numberFuzzTests"],
        42
    );

    provenant()
        .arg("validate")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("fuzz claim over 1 target(s)"));
}

#[test]
fn fuzz_claim_without_matching_logs_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let params = create_fuzz_fixture(dir.path());
    std::fs::remove_dir_all(
        dir.path()
            .join("buckets/oak-logs.clusterfuzz-external.appspot.com"),
    )
    .expect("remove logs");

    provenant()
        .arg("fuzz-claim")
        .arg("--params")
        .arg(&params)
        .arg("--blob-root")
        .arg(dir.path().join("buckets"))
        .arg("--output")
        .arg(dir.path().join("fuzz_claim.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("apply_policy"));
}

#[test]
fn help_lists_subcommands() {
    provenant()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("endorse")
                .and(predicate::str::contains("validate"))
                .and(predicate::str::contains("inspect"))
                .and(predicate::str::contains("fuzz-claim")),
        );
}
