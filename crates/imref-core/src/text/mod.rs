//! Rich-text to plain-text conversion
//!
//! Remote note bodies and pre-rendered citation/bibliography fields arrive
//! as HTML fragments; the template pipeline wants plain text. Block-level
//! closers become line breaks, remaining tags are dropped, and common
//! entities are decoded.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    /// Tags whose end (or self-closing form) implies a line break
    static ref BLOCK_BREAK: Regex =
        Regex::new(r"(?i)<(?:br\s*/?|/p|/div|/li|/h[1-6]|/blockquote|/tr)\s*>").unwrap();
    /// Any remaining markup tag
    static ref TAG: Regex = Regex::new(r"(?i)</?[a-z][^>]*>").unwrap();
    /// Runs of three or more newlines collapse to a paragraph break
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Decode HTML entities to their Unicode equivalents
pub fn decode_html_entities(text: &str) -> String {
    let mut result = text.to_string();
    result = result.replace("&lt;", "<");
    result = result.replace("&gt;", ">");
    result = result.replace("&nbsp;", " ");
    result = result.replace("&quot;", "\"");
    result = result.replace("&apos;", "'");
    result = result.replace("&#39;", "'");
    result = result.replace("&amp;", "&");
    result
}

/// Convert an HTML fragment to plain text
pub fn html_to_text(html: &str) -> String {
    let text = BLOCK_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    let text = decode_html_entities(&text);
    EXCESS_NEWLINES
        .replace_all(text.trim(), "\n\n")
        .into_owned()
}

/// Convert a raw JSON field to plain text. A missing or non-string value
/// converts to an empty string rather than failing.
pub fn value_to_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(html)) => html_to_text(html),
        _ => String::new(),
    }
}
