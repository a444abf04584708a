//! # KRODE Chat Command
//!
//! File: cli/src/commands/chat/mod.rs
//!
//! ## Overview
//!
//! `krode chat` opens an interactive conversation with the assistant in the
//! terminal, behaving like the chat widget on the website:
//! - free text is answered by the responder after a short typing delay
//! - `/1` .. `/4` send the quick-reply presets
//! - blank lines are ignored
//! - Ctrl+C while a reply is pending cancels it and ends the session
//!
//! ## Architecture
//!
//! - `session.rs`: `ChatSession`, the stateful caller around the responder
//! - this file: argument parsing, the read/print loop and the slash commands
//!
//! ## Examples
//!
//! ```bash
//! krode chat
//! krode chat --no-delay --rules ./rules.toml
//! echo "On esteu ubicats?" | krode chat --no-delay
//! ```
//!
use crate::common::ui;
use crate::core::config;
use crate::core::error::Result;
use crate::core::responder::{self, QUICK_REPLIES};
use anyhow::Context;
use clap::Parser;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

pub mod session;

use session::{ChatMessage, ChatSession, SendOutcome, Sender, TypingDelay};

/// # Chat Command Arguments (`ChatArgs`)
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Rule file to use instead of the configured or built-in rule table.
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Reply immediately instead of simulating typing.
    #[arg(long)]
    pub no_delay: bool,

    /// Print reply markup unchanged instead of plain text.
    #[arg(long)]
    pub raw: bool,
}

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Quit,
    Help,
    ListQuickReplies,
    History,
    /// `/N`, 1-based.
    QuickReply(usize),
    UnknownCommand(String),
    Message(String),
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "bye" | "exit" | "quit" | "/bye" | "/exit" | "/quit" => return Input::Quit,
        "/help" | "/?" => return Input::Help,
        "/quick" => return Input::ListQuickReplies,
        "/history" => return Input::History,
        _ => {}
    }
    if let Some(rest) = trimmed.strip_prefix('/') {
        return match rest.parse::<usize>() {
            Ok(n) => Input::QuickReply(n),
            Err(_) => Input::UnknownCommand(trimmed.to_string()),
        };
    }
    Input::Message(trimmed.to_string())
}

fn help_text() -> String {
    let mut out = String::from("Commands:\n");
    out.push_str("  /quick      list the quick replies\n");
    out.push_str("  /1 .. /N    send a quick reply\n");
    out.push_str("  /history    show this conversation\n");
    out.push_str("  /help       show this help\n");
    out.push_str("  /bye        leave the chat (also: bye, exit, quit)\n");
    out
}

fn quick_reply_text() -> String {
    QUICK_REPLIES
        .iter()
        .enumerate()
        .map(|(i, q)| format!("  /{} {}\n", i + 1, q))
        .collect()
}

/// Shown while a reply is pending, like the widget's typing dots.
fn typing_indicator(bot_name: &str) -> String {
    format!("{} està escrivint...", bot_name)
}

/// Returns to the start of the line and blanks `text` out.
fn clear_line(text: &str) -> String {
    format!("\r{}\r", " ".repeat(text.chars().count()))
}

/// One `/history` entry: `[HH:MM:SS] speaker: text`, bot replies tagged
/// with their category.
fn history_line(msg: &ChatMessage, bot_name: &str, raw: bool) -> String {
    let who = match (msg.sender, msg.category) {
        (Sender::User, _) => "Tu".to_string(),
        (Sender::Bot, Some(category)) => format!("{} ({})", bot_name, category),
        (Sender::Bot, None) => bot_name.to_string(),
    };
    let body = ui::format_reply(&msg.text, raw);
    format!(
        "[{}] {}",
        msg.at.format("%H:%M:%S"),
        ui::speaker_block(&who, &body)
    )
}

/// # Handle Chat Command (`handle_chat`)
///
/// Runs the read/print loop until `/bye`, end of input or Ctrl+C.
pub async fn handle_chat(args: ChatArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let table = cfg.rule_table(args.rules.as_deref())?;
    let delay = if args.no_delay {
        TypingDelay::none()
    } else {
        TypingDelay::from_config(&cfg.chat)
    };
    let show_typing = !delay.is_none();
    let bot_name = cfg.chat.bot_name.clone();
    let mut session = ChatSession::new(table, delay);

    println!(
        "{}",
        ui::speaker_block(
            &bot_name,
            "Hola! Sóc l'assistent virtual de KRODE. En què et puc ajudar?"
        )
    );
    print!("{}", quick_reply_text());
    println!("(/help for commands, /bye to leave)");

    // Piped input is not echoed by the terminal; echo it so the
    // transcript on stdout stays readable.
    let echo_input = !std::io::stdin().is_terminal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Tu: ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };
        if echo_input {
            println!("{}", line);
        }

        let text = match parse_input(&line) {
            Input::Quit => break,
            Input::Help => {
                print!("{}", help_text());
                continue;
            }
            Input::ListQuickReplies => {
                print!("{}", quick_reply_text());
                continue;
            }
            Input::History => {
                for msg in session.transcript() {
                    println!("{}", history_line(msg, &bot_name, args.raw));
                }
                continue;
            }
            Input::QuickReply(n) => match responder::quick_reply(n) {
                Some(preset) => {
                    println!("Tu: {}", preset);
                    preset.to_string()
                }
                None => {
                    warn!("Unknown quick reply /{}", n);
                    println!("No quick reply /{}. Type /quick to list them.", n);
                    continue;
                }
            },
            Input::UnknownCommand(cmd) => {
                println!("Unknown command '{}'. Type /help for commands.", cmd);
                continue;
            }
            Input::Message(text) => text,
        };

        let indicator = typing_indicator(&bot_name);
        let pending = show_typing && !text.trim().is_empty();
        if pending {
            print!("{}", indicator);
            std::io::stdout().flush().context("Failed to flush stdout")?;
        }
        let cancel = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        let outcome = session.send(&text, cancel).await;
        if pending {
            print!("{}", clear_line(&indicator));
        }
        match outcome {
            SendOutcome::Ignored => {}
            SendOutcome::Replied(reply) => {
                let body = ui::format_reply(&reply.text, args.raw);
                println!("{}", ui::speaker_block(&bot_name, &body));
            }
            SendOutcome::Cancelled => {
                println!("\n(reply cancelled)");
                break;
            }
        }
    }

    info!(
        "Chat session ended after {} messages",
        session.transcript().len()
    );
    println!("{}", ui::speaker_block(&bot_name, "Fins aviat!"));
    Ok(())
}
