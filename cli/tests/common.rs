//! # KRODE CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! is compiled as its own crate and runs the compiled `krode` binary.
//!
//! Commands built with [`isolated_cmd`] run inside a scratch directory that
//! is marked as a git root and used as the home directory, so neither a
//! user `config.toml` nor a stray `.krode.toml` in an ancestor directory
//! can change the replies under test.
//!

#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// The compiled `krode` binary for the current test run.
pub fn krode_cmd() -> Command {
    Command::cargo_bin("krode").expect("Failed to find krode binary for testing")
}

/// A scratch workspace: a temp directory containing an empty `.git`.
pub fn workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
    dir
}

/// `krode` running in `dir` with `dir` as home and config directory.
pub fn isolated_cmd(dir: &Path) -> Command {
    let mut cmd = krode_cmd();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}
