//! # KRODE Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared utilities used by several commands, kept apart from command
//! logic (`commands::`) and core infrastructure (`core::`).
//!
//! - **`ui`**: terminal presentation of replies (markup rendering, speaker prefixes).
//!

/// Utilities for terminal output of chat replies.
pub mod ui;
