//! Word sequence from canonical text.

/// Split canonical text into its ordered words.
///
/// Only the literal space is a delimiter. Callers are expected to pass text that
/// already went through [`crate::html_to_text`], which leaves single spaces as
/// the only whitespace; empty segments are still dropped so repeated spaces
/// never produce empty words.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(' ').filter(|word| !word.is_empty()).collect()
}
