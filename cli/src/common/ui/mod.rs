//! # KRODE UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Terminal presentation helpers shared by the `ask`, `chat` and `rules`
//! commands. Replies are produced as widget markup by the responder; this
//! module decides how they reach the terminal.
//!
//! ## Architecture
//!
//! - **`markup`**: renders reply markup (`<br>`, `<strong>`, `<a>`) as plain text.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::ui;
//!
//! let reply = responder::respond("On esteu ubicats?");
//! println!("{}", ui::format_reply(reply, false));
//! ```

pub mod markup;

/// Formats a reply for output. With `raw`, the widget markup is kept as-is.
pub fn format_reply(reply: &str, raw: bool) -> String {
    if raw {
        reply.to_string()
    } else {
        markup::render_plain(reply)
    }
}

/// Prefixes every line of `text` with `speaker: ` on the first line and
/// matching indentation on the following ones.
pub fn speaker_block(speaker: &str, text: &str) -> String {
    let prefix = format!("{}: ", speaker);
    let indent = " ".repeat(prefix.chars().count());
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{}{}", prefix, line)
            } else if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_reply_raw_and_plain() {
        assert_eq!(format_reply("a<br>b", true), "a<br>b");
        assert_eq!(format_reply("a<br>b", false), "a\nb");
    }

    #[test]
    fn test_speaker_block() {
        assert_eq!(speaker_block("PORTA", "hola"), "PORTA: hola");
        assert_eq!(
            speaker_block("BOT", "one\n\ntwo"),
            "BOT: one\n\n     two"
        );
    }
}
