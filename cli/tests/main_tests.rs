//! # KRODE CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `krode` binary: standard flags, subcommand
//! help and aliases.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    krode_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("rules"))
        .stdout(predicate::str::contains("srv"));
}

#[test]
fn test_version_flag() {
    krode_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_subcommand_help() {
    for sub in ["ask", "chat", "rules", "srv"] {
        krode_cmd().args([sub, "--help"]).assert().success();
    }
}

#[test]
fn test_missing_subcommand_fails() {
    krode_cmd().assert().failure();
}

#[test]
fn test_ask_alias() {
    let ws = workspace();
    isolated_cmd(ws.path())
        .args(["a", "horari"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Carrer Compositor Pep Ventura, 58"));
}
