//! Behavioural smoke tests for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn cli_exits_successfully_without_output() {
    let mut cmd = cargo_bin_cmd!("gce-storage");
    cmd.assert().success().stdout("").stderr("");
}

#[test]
fn cli_rejects_unknown_subcommands() {
    let mut cmd = cargo_bin_cmd!("gce-storage");
    cmd.arg("resize")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn cli_reports_missing_configuration() {
    let mut cmd = cargo_bin_cmd!("gce-storage");
    cmd.arg("list")
        .env_remove("GCE_PROJECT_ID")
        .env_remove("GCE_ACCESS_TOKEN")
        .env_remove("GCE_REGION")
        .env("GCE_UUID", "6a3c0b8e-5a47-4d1f-9f62-3f1c0b9d2e11")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::is_empty().not());
}

#[test]
fn destroy_requires_volume_ids() {
    let mut cmd = cargo_bin_cmd!("gce-storage");
    cmd.arg("destroy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("VOLUME_ID"));
}
