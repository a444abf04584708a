//! # KRODE Ask Command
//!
//! File: cli/src/commands/ask.rs
//!
//! ## Overview
//!
//! `krode ask <message...>` sends one message through the responder and
//! prints the reply. Words are joined with single spaces, so quoting is
//! optional:
//!
//! ```bash
//! krode ask On esteu ubicats?
//! krode ask --raw "Vull un pressupost"
//! krode ask --show-category --rules ./rules.toml "porta"
//! ```
//!
//! A blank message is rejected before the responder is called.
//!
use crate::common::ui;
use crate::core::config;
use crate::core::error::{KrodeError, Result};
use crate::core::responder;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// # Ask Command Arguments (`AskArgs`)
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The message to send. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,

    /// Print the reply markup unchanged instead of plain text.
    #[arg(long)]
    pub raw: bool,

    /// Print the matched reply category before the reply.
    #[arg(long)]
    pub show_category: bool,

    /// Rule file to use instead of the configured or built-in rule table.
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,
}

/// # Handle Ask Command (`handle_ask`)
///
/// Joins the message words, rejects blank input, resolves the rule table
/// (CLI `--rules`, then config, then built-in) and prints the reply.
pub async fn handle_ask(args: AskArgs) -> Result<()> {
    let message = args.message.join(" ");
    if message.trim().is_empty() {
        return Err(KrodeError::EmptyMessage.into());
    }

    let cfg = config::load_config()?;
    let table = cfg.rule_table(args.rules.as_deref())?;

    let reply = if args.show_category {
        let rule = table.classify(&message);
        info!(category = %rule.category(), "Answered message");
        println!("[{}]", rule.category());
        rule.template()
    } else {
        responder::respond_with(&table, &message)
    };
    println!("{}", ui::format_reply(reply, args.raw));
    Ok(())
}
