//! # KRODE Chat Session
//!
//! File: cli/src/commands/chat/session.rs
//!
//! ## Overview
//!
//! `ChatSession` is the terminal counterpart of the website chat widget. It
//! owns the caller-side duties around the responder:
//! - blank messages are dropped before the responder is called
//! - a cosmetic typing delay is waited out before the reply is delivered
//! - the delay can be cancelled, in which case no reply is recorded
//! - user and bot messages are kept in an in-memory transcript
//!
//! The responder itself stays synchronous; only the delay is async.
//!
//! ## Examples
//!
//! ```rust
//! let mut session = ChatSession::new(rules, TypingDelay::from_config(&cfg.chat));
//! match session.send("On esteu ubicats?", std::future::pending()).await {
//!     SendOutcome::Replied(msg) => println!("{}", msg.text),
//!     SendOutcome::Ignored | SendOutcome::Cancelled => {}
//! }
//! ```
//!
use crate::core::config::ChatConfig;
use crate::core::rules::{Category, RuleTable};
use chrono::{DateTime, Local};
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    /// Matched category, for bot replies.
    pub category: Option<Category>,
    pub at: DateTime<Local>,
}

/// Result of [`ChatSession::send`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The message was blank; nothing was sent.
    Ignored,
    /// The bot replied after the typing delay.
    Replied(ChatMessage),
    /// The session was cancelled while the reply was pending.
    Cancelled,
}

/// Bounds of the simulated typing delay. Each reply waits a duration drawn
/// uniformly from `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingDelay {
    min: Duration,
    max: Duration,
}

impl TypingDelay {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_none(&self) -> bool {
        self.max.is_zero()
    }

    pub fn from_config(chat: &ChatConfig) -> Self {
        Self::new(
            Duration::from_millis(chat.min_delay_ms),
            Duration::from_millis(chat.max_delay_ms),
        )
    }

    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }
}

/// A single interactive conversation.
pub struct ChatSession {
    rules: Arc<RuleTable>,
    delay: TypingDelay,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(rules: Arc<RuleTable>, delay: TypingDelay) -> Self {
        Self {
            rules,
            delay,
            transcript: Vec::new(),
        }
    }

    /// Sends `text` and waits for the reply.
    ///
    /// Blank text is ignored without calling the responder. Otherwise the
    /// user message is recorded, the typing delay runs, and the reply is
    /// recorded and returned, unless `cancel` completes first.
    pub async fn send<F>(&mut self, text: &str, cancel: F) -> SendOutcome
    where
        F: Future<Output = ()>,
    {
        let text = text.trim();
        if text.is_empty() {
            debug!("Ignoring blank message");
            return SendOutcome::Ignored;
        }

        self.transcript.push(ChatMessage {
            sender: Sender::User,
            text: text.to_string(),
            category: None,
            at: Local::now(),
        });

        let rule = self.rules.classify(text);
        let reply = ChatMessage {
            sender: Sender::Bot,
            text: rule.template().to_string(),
            category: Some(rule.category()),
            at: Local::now(),
        };

        let wait = self.delay.sample();
        debug!("Typing delay: {:?}", wait);
        tokio::select! {
            biased;
            _ = cancel => {
                info!("Pending reply cancelled");
                return SendOutcome::Cancelled;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        let reply = ChatMessage {
            at: Local::now(),
            ..reply
        };
        self.transcript.push(reply.clone());
        SendOutcome::Replied(reply)
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }
}
