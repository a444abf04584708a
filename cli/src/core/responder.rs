//! # KRODE Canned-Response Responder
//!
//! File: cli/src/core/responder.rs
//!
//! ## Overview
//!
//! Maps free-text user input to one formatted reply. Matching is
//! deterministic: the input is lowercased and the first rule with a term
//! contained in it wins, in the order product → maintenance → location →
//! pricing → fallback. Each rule carries Catalan and Spanish terms, so no
//! language detection is needed.
//!
//! The responder is total: every string, the empty string included, yields
//! a non-empty reply. Suppressing blank sends is the caller's job (see
//! `commands::chat::session` and the `/api/chat` route).
//!
//! ## Examples
//!
//! ```rust
//! use crate::core::responder;
//!
//! let reply = responder::respond("On esteu ubicats?");
//! assert!(reply.contains("Carrer Compositor Pep Ventura, 58"));
//!
//! // With an explicitly supplied table:
//! let table = RuleTable::load(Path::new("rules.toml"))?;
//! let reply = responder::respond_with(&table, "necessito una reparació");
//! ```
//!
use crate::core::rules::RuleTable;

/// Preset messages offered as quick-reply buttons. They are routed through
/// the responder exactly like typed text.
pub const QUICK_REPLIES: &[&str] = &[
    "Quins productes oferiu?",
    "Necessito manteniment",
    "On esteu ubicats?",
    "Vull un pressupost",
];

/// Replies to `input` using the built-in rule table.
#[allow(dead_code)] // The commands always resolve a table first and call `respond_with`.
pub fn respond(input: &str) -> &'static str {
    RuleTable::builtin().respond(input)
}

/// Replies to `input` using `rules`.
pub fn respond_with<'a>(rules: &'a RuleTable, input: &str) -> &'a str {
    rules.respond(input)
}

/// Resolves a quick-reply selection (1-based) to its preset message.
pub fn quick_reply(index: usize) -> Option<&'static str> {
    index
        .checked_sub(1)
        .and_then(|i| QUICK_REPLIES.get(i))
        .copied()
}
