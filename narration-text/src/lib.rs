//! Shared text pipeline for lesson narration and word highlighting.
//!
//! Both the narration job and the playback highlighter derive words from the
//! same HTML through this crate:
//! - `extract`: HTML to canonical plain text
//! - `tokenize`: canonical text to the ordered word sequence
//! - `timing`: provider timestamps to a word timeline and highlight cursor
//!
//! Word index N in an audio timestamp track only lines up with word N on screen
//! when both sides run this exact code.

pub mod canonical;
mod entities;
pub mod error;
pub mod extract;
pub mod timing;
pub mod tokenize;

pub use canonical::{CanonicalText, content_hash};
pub use error::{AlignmentError, Result};
pub use extract::{html_to_text, html_to_text_opt};
pub use timing::{CharacterAlignment, Highlighter, TimestampTrack, WordTimeline, WordTiming};
pub use tokenize::tokenize;
