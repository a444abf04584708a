//! # KRODE Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout the KRODE assistant.
//! The responder itself never fails; errors only come from the layers around
//! it: loading configuration, loading a custom rule table, rejecting blank
//! chat messages and running the HTTP server.
//!
//! ## Architecture
//!
//! The error system consists of three components:
//! - `KrodeError`: the application error enum, built with `thiserror`
//! - `RuleTableError`: validation failures for rule files, wrapped by `KrodeError::RuleTable`
//! - `Result<T>`: a type alias for `anyhow::Result<T>` for flexible propagation
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if message.trim().is_empty() {
//!     return Err(KrodeError::EmptyMessage.into());
//! }
//!
//! // Add context to errors using anyhow
//! let content = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
//! ```
//!
use crate::core::rules::Category;
use thiserror::Error;

/// Custom error type for the KRODE application.
#[derive(Error, Debug)]
pub enum KrodeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid rule table: {source}")]
    RuleTable {
        #[from]
        source: RuleTableError,
    },

    #[error("Message is empty; nothing to send.")]
    EmptyMessage,

    #[error("Server error: {0}")]
    Server(String),
}

/// Reasons a rule table is rejected when it is loaded from a file.
///
/// Every variant corresponds to a broken table invariant: exactly one
/// fallback rule, without terms, placed last; every other rule carries
/// at least one term; categories are unique; templates are non-blank.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleTableError {
    #[error("the rule table contains no rules")]
    Empty,

    #[error("no fallback rule is defined")]
    MissingFallback,

    #[error("more than one fallback rule is defined")]
    DuplicateFallback,

    #[error("the fallback rule must be the last rule (found at position {position})")]
    FallbackNotLast { position: usize },

    #[error("the fallback rule must not declare match terms")]
    FallbackHasTerms,

    #[error("rule '{category}' has no match terms")]
    NoTerms { category: Category },

    #[error("category '{category}' is defined more than once")]
    DuplicateCategory { category: Category },

    #[error("rule '{category}' has a blank template")]
    BlankTemplate { category: Category },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
