//! # Reply Markup Rendering (`common::ui::markup`)
//!
//! File: cli/src/common/ui/markup.rs
//!
//! Replies carry the small rich-text subset used by the website widget:
//! `<br>`, `<strong>` and `<a href>`. The terminal cannot render HTML, so
//! this module turns a reply into plain text. Replies never contain user
//! input, so stripping is enough; no sanitising is attempted.

use regex::Regex;
use std::sync::LazyLock;

// NOTE: expect() on literal patterns cannot fail at runtime.
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>\r?\n?").expect("Invalid regex: line break"));
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex: markup tag"));

/// Converts reply markup into plain text for the terminal.
///
/// - `<br>` (any case, optionally self-closing) becomes a newline; a source
///   newline right after it is absorbed so lines are not doubled
/// - every other tag is removed, keeping its inner text (`<a ...>text</a>` → `text`)
/// - the basic HTML entities are decoded
/// - leading indentation on each line and trailing whitespace are trimmed
pub fn render_plain(markup: &str) -> String {
    let with_breaks = LINE_BREAK.replace_all(markup, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);

    decoded
        .lines()
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    // &amp; last so "&amp;lt;" decodes to "&lt;" and not "<".
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::responder;

    #[test]
    fn test_line_breaks() {
        assert_eq!(render_plain("a<br>b<BR/>c<br />d"), "a\nb\nc\nd");
        assert_eq!(render_plain("a<br><br>\nb"), "a\n\nb");
    }

    #[test]
    fn test_tags_are_stripped() {
        assert_eq!(
            render_plain("Call <strong>972 27 17 13</strong>"),
            "Call 972 27 17 13"
        );
        assert_eq!(
            render_plain(r##"Fill the <a href="#contact" style="color: #EB5A28">form</a>"##),
            "Fill the form"
        );
    }

    #[test]
    fn test_indentation_trimmed() {
        assert_eq!(render_plain("first<br>\n        second"), "first\nsecond");
    }

    #[test]
    fn test_entities() {
        assert_eq!(render_plain("A &amp; B &lt;3&gt; &quot;x&quot; it&#39;s"), "A & B <3> \"x\" it's");
        assert_eq!(render_plain("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_location_reply_renders() {
        let plain = render_plain(responder::respond("On esteu ubicats?"));
        assert!(plain.starts_with("📍 Adreça:\nCarrer Compositor Pep Ventura, 58\n17800 Olot, Girona"));
        assert!(plain.contains("📞 Telèfon: 972 27 17 13"));
        assert!(!plain.contains('<'));
    }
}
