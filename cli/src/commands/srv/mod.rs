//! # KRODE Site Server
//!
//! File: cli/src/commands/srv/mod.rs
//!
//! ## Overview
//!
//! `krode srv` serves the company website from a local directory and backs
//! its chat widget with the same responder the terminal commands use.
//! Configurable options:
//! - CORS (Cross-Origin Resource Sharing)
//! - Port binding (with automatic fallback if the port is in use)
//! - Host interface binding
//! - Index file customization
//! - Rule table for `/api/chat`
//!
//! ## Architecture
//!
//! - `config.rs`: Configuration loading and validation
//! - `server_logic.rs`: Router, API handlers and the server loop
//! - `utils.rs`: Startup diagnostics
//!
//! ## Examples
//!
//! ```bash
//! # Serve the current directory
//! krode srv
//!
//! # Specify a port and host interface
//! krode srv --port 9000 --host 0.0.0.0 ./public
//!
//! # Answer the widget from a custom rule file
//! krode srv --rules ./rules.toml ./public
//! ```
//!
use crate::core::config as core_config;
use crate::core::error::Result;
use tracing::info;

pub use config::SrvArgs;

pub mod config;
pub mod server_logic;
pub mod utils;

/// # Handle Server Command (`handle_srv`)
///
/// Merges the server configuration, resolves the rule table (the server's
/// `rules_file`, then `.krode.toml`, then built-in) and runs the server.
pub async fn handle_srv(args: SrvArgs) -> Result<()> {
    info!("Handling srv command with args: {:?}", args);

    let config = config::load_and_merge_config(args).await?;
    info!("Effective server config: {:?}", config);

    let rules = core_config::load_config()?.rule_table(config.rules_file.as_deref())?;
    info!("Chat endpoint uses {} rules", rules.len());

    server_logic::run_server(config, rules).await
}
