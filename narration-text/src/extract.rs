//! HTML to canonical plain text.
//!
//! The output is what gets sent to the speech provider and what the highlighter
//! splits into words, so every step here is order-sensitive: later passes assume
//! the earlier ones already ran.

use crate::entities::decode_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script pattern"));

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("style pattern"));

/// Authored manual line break: `<span class="blog-line-break"></span>`.
/// `blog-line-break` must be a whole class token.
static LINE_BREAK_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<span\b[^>]*?\bclass\s*=\s*["'](?:[^"']*\s)?blog-line-break(?:\s[^"']*)?["'][^>]*?(?:/>|>\s*</span\s*>)"#,
    )
    .expect("line break pattern")
});

/// Opening tags of elements that imply a word boundary.
static BLOCK_OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:p|div|br|h[1-6]|li|tr|td|th|blockquote|pre|hr)(?:\s[^>]*)?/?>")
        .expect("block tag pattern")
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Reduce lesson or blog HTML to canonical text.
///
/// The result has no markup, no whitespace other than single spaces between
/// words, and no leading or trailing whitespace. Malformed markup never fails;
/// anything the tag pass cannot recognize is kept as text.
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = LINE_BREAK_SPAN.replace_all(&text, " ");
    let text = BLOCK_OPEN_TAG.replace_all(&text, " ${0}");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = text.trim().to_string();

    log::trace!(
        "extracted {} chars of narration text from {} bytes of html",
        text.chars().count(),
        html.len()
    );

    text
}

/// Like [`html_to_text`], treating absent content as empty.
pub fn html_to_text_opt(html: Option<&str>) -> String {
    html.map(html_to_text).unwrap_or_default()
}
