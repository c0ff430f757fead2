//! Canonical narration text and content fingerprints.

use crate::extract::html_to_text;
use crate::tokenize::tokenize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Plain text derived from HTML content.
///
/// Only constructible through extraction, so it always holds the canonical form:
/// no markup, single spaces between words, nothing to trim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CanonicalText(String);

impl CanonicalText {
    /// Extract canonical text from HTML.
    pub fn from_html(html: &str) -> Self {
        Self(html_to_text(html))
    }

    /// Extract canonical text, treating absent content as empty.
    pub fn from_optional_html(html: Option<&str>) -> Self {
        html.map(Self::from_html).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The word sequence; a word's position is its word index.
    pub fn words(&self) -> Vec<&str> {
        tokenize(&self.0)
    }

    pub fn word_count(&self) -> usize {
        tokenize(&self.0).len()
    }
}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fingerprint of source HTML, used to tell when narration is stale.
///
/// SHA256 of the raw HTML, first 16 hex characters.
pub fn content_hash(html: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(html.as_bytes());
    let result = hasher.finalize();

    format!("{:x}", result)[..16].to_string()
}
