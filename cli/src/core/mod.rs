//! # KRODE Core
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core components of the assistant: the rule
//! table and responder that produce chat replies, plus the configuration and
//! error infrastructure shared by every command.
//!
//! ## Architecture
//!
//! - `rules`: `Category`, `ReplyRule`, `RuleTable` (built-in table and TOML rule files)
//! - `responder`: the `respond` entry points and the quick-reply presets
//! - `config`: configuration loading, merging, and validation
//! - `error`: error types and the `Result` alias
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{KrodeError, Result}; // For error handling
//! use crate::core::responder; // For replies
//! ```
//!
pub mod config;
pub mod error;
pub mod responder;
pub mod rules;
