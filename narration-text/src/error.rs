use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error(
        "Character alignment arrays differ in length: {characters} characters, {starts} start times, {ends} end times"
    )]
    LengthMismatch {
        characters: usize,
        starts: usize,
        ends: usize,
    },

    #[error("Word timings skip index {expected} (found {found})")]
    IndexGap { expected: usize, found: usize },

    #[error("Word {index} has an invalid time span ({start} to {end})")]
    InvalidSpan { index: usize, start: f64, end: f64 },

    #[error("Word {index} starts before the word preceding it")]
    OutOfOrder { index: usize },

    #[error("Timing track has {actual} words but the text has {expected}")]
    WordCountMismatch { expected: usize, actual: usize },

    #[error("Word {index} differs: text has {expected:?}, timing track has {actual:?}")]
    WordMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
}

pub type Result<T> = std::result::Result<T, AlignmentError>;
