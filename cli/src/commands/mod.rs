//! # KRODE Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the `krode` CLI. Each
//! command defines its own `*Args` struct (parsed by Clap) and an async
//! `handle_*` function called from `main.rs`.
//!
//! ## Commands
//!
//! - `ask`: one-shot reply to a single message
//! - `chat`: interactive chat session mirroring the website widget
//! - `rules`: validate and print the active rule table
//! - `srv`: static site server with the `/api/chat` endpoint
//!

/// One-shot reply to a single message.
pub mod ask;
/// Interactive terminal chat session with quick replies and typing delay.
pub mod chat;
/// Prints the active rule table after validating it.
pub mod rules;
/// Static site server exposing the responder over HTTP.
pub mod srv;
