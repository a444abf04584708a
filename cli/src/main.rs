//! # KRODE Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file is the main entry point for the `krode` CLI, the customer
//! assistant of KRODE (industrial and residential doors). It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - Each top-level command (`ask`, `chat`, `rules`, `srv`) is a variant of `Commands`
//! - Commands are mapped to handler functions in their respective modules
//! - All errors are propagated to this level for consistent handling
//!
//! ## Examples
//!
//! ```bash
//! # One question, one answer
//! krode ask On esteu ubicats?
//!
//! # Interactive chat with debug logging
//! krode -vv chat
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers (ask, chat, rules, srv)
mod common; // Terminal output helpers
mod core; // Responder, rule table, config and errors

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "krode",
    about = "🚪 KRODE: customer assistant for industrial and residential doors",
    long_about = "Answer customer questions about products, maintenance, location and pricing.\n\
                  Ask once, chat in the terminal, or serve the website with its chat endpoint.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Send one message and print the reply.
    #[command(alias = "a")]
    Ask(commands::ask::AskArgs),
    /// Chat with the assistant interactively.
    #[command(alias = "c")]
    Chat(commands::chat::ChatArgs),
    /// Validate and list the active rule table.
    Rules(commands::rules::RulesArgs),
    /// Serve the website and its chat endpoint.
    #[command(alias = "s")]
    Srv(commands::srv::SrvArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Ask(args) => commands::ask::handle_ask(args).await,
        Commands::Chat(args) => commands::chat::handle_chat(args).await,
        Commands::Rules(args) => commands::rules::handle_rules(args).await,
        Commands::Srv(args) => commands::srv::handle_srv(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use clap::CommandFactory;
    use predicates::prelude::*;

    fn krode_cmd() -> Command {
        Command::cargo_bin("krode").expect("Failed to find krode binary for testing")
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_alias_and_verbosity() {
        let cli = Cli::parse_from(["krode", "-vv", "a", "On", "esteu", "ubicats?"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask(args) => assert_eq!(args.message, ["On", "esteu", "ubicats?"]),
            other => panic!("expected ask, got {:?}", other),
        }
    }

    #[test]
    fn test_main_help_flag() {
        krode_cmd().arg("--help").assert().success();
    }

    #[test]
    fn test_main_version_flag() {
        krode_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
