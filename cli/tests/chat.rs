//! # KRODE CLI Chat Integration Tests
//!
//! File: cli/tests/chat.rs
//!
//! ## Overview
//!
//! Integration tests for `krode chat`, driven through stdin with
//! `--no-delay` so replies arrive immediately.
//!

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_chat_greets_and_answers() {
    let ws = workspace();
    isolated_cmd(ws.path())
        .args(["chat", "--no-delay"])
        .write_stdin("porta\n/bye\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("assistent virtual de KRODE"))
        .stdout(predicate::str::contains("Portes Seccionals"))
        .stdout(predicate::str::contains("Fins aviat!"));
}

#[test]
fn test_chat_quick_reply() {
    let ws = workspace();
    isolated_cmd(ws.path())
        .args(["chat", "--no-delay"])
        .write_stdin("/3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tu: /3\nTu: On esteu ubicats?"))
        .stdout(predicate::str::contains("Tu: Tu:").not())
        .stdout(predicate::str::contains("Carrer Compositor Pep Ventura, 58"));
}

#[test]
fn test_chat_unknown_quick_reply() {
    let ws = workspace();
    isolated_cmd(ws.path())
        .args(["chat", "--no-delay"])
        .write_stdin("/9\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No quick reply /9"));
}

#[test]
fn test_chat_blank_lines_are_ignored() {
    let ws = workspace();
    isolated_cmd(ws.path())
        .args(["chat", "--no-delay", "--raw"])
        .write_stdin("\n   \n")
        .assert()
        .success()
        .stdout(predicate::str::contains("<strong>").not());
}

#[test]
fn test_chat_ends_at_end_of_input() {
    let ws = workspace();
    isolated_cmd(ws.path())
        .args(["chat", "--no-delay"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fins aviat!"));
}

#[test]
fn test_chat_shows_typing_indicator() {
    let ws = workspace();
    fs::write(
        ws.path().join(".krode.toml"),
        "[chat]\nmin_delay_ms = 10\nmax_delay_ms = 20\n",
    )
    .unwrap();

    isolated_cmd(ws.path())
        .arg("chat")
        .write_stdin("porta\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("PORTA està escrivint...\r"))
        .stdout(predicate::str::contains("Portes Seccionals"));
}

#[test]
fn test_chat_no_delay_has_no_indicator() {
    let ws = workspace();
    isolated_cmd(ws.path())
        .args(["chat", "--no-delay"])
        .write_stdin("porta\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("escrivint").not());
}
