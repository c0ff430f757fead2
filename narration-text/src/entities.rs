//! Fixed HTML entity table for narration text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Entities decoded during extraction and their plain-text replacements.
/// Anything not listed here is left verbatim.
const ENTITIES: &[(&str, &str)] = &[
    ("nbsp", " "),
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("#39", "'"),
    ("#039", "'"),
    ("#x27", "'"),
    ("apos", "'"),
    ("rsquo", "'"),  // Right single quote
    ("lsquo", "'"),  // Left single quote
    ("rdquo", "\""), // Right double quote
    ("ldquo", "\""), // Left double quote
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
];

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    let names: Vec<String> = ENTITIES
        .iter()
        .map(|(name, _)| regex::escape(name))
        .collect();
    Regex::new(&format!("&({});", names.join("|"))).expect("entity pattern should compile")
});

fn replacement(name: &str) -> Option<&'static str> {
    ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|(_, r)| *r)
}

/// Decode the fixed entity set in a single pass.
///
/// Decoded output is never rescanned, so `&amp;lt;` becomes `&lt;`, not `<`.
pub(crate) fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            replacement(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}
