//! Audio timestamps for word highlighting.
//!
//! The speech provider returns timing for the exact canonical text it was sent.
//! That timing is folded into one [`WordTiming`] per word, keyed by word index,
//! and the highlighter maps elapsed playback time back to an index.

use crate::error::{AlignmentError, Result};
use serde::{Deserialize, Serialize};

/// Start and end of one spoken word, in seconds from the start of the audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    /// Word index in the canonical word sequence
    pub index: usize,
    /// The word as spoken
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Per-character timing as returned by speech providers that align on characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterAlignment {
    pub characters: Vec<String>,
    pub character_start_times_seconds: Vec<f64>,
    pub character_end_times_seconds: Vec<f64>,
}

impl CharacterAlignment {
    /// Group maximal runs of non-whitespace characters into words.
    ///
    /// Word boundaries fall on the same spaces the tokenizer splits on, so the
    /// resulting indices line up with the word sequence of the text that was
    /// synthesized.
    pub fn word_timings(&self) -> Result<Vec<WordTiming>> {
        let characters = self.characters.len();
        let starts = self.character_start_times_seconds.len();
        let ends = self.character_end_times_seconds.len();
        if characters != starts || characters != ends {
            return Err(AlignmentError::LengthMismatch {
                characters,
                starts,
                ends,
            });
        }

        let mut timings = Vec::new();
        let mut current: Option<WordTiming> = None;

        for (i, entry) in self.characters.iter().enumerate() {
            let start = self.character_start_times_seconds[i];
            let end = self.character_end_times_seconds[i];

            // Entries are usually single characters but may be empty or carry
            // several; each character shares the entry's timing.
            for ch in entry.chars() {
                if ch.is_whitespace() {
                    if let Some(word) = current.take() {
                        timings.push(word);
                    }
                    continue;
                }

                match current.as_mut() {
                    Some(word) => {
                        word.word.push(ch);
                        word.end = end;
                    }
                    None => {
                        current = Some(WordTiming {
                            index: timings.len(),
                            word: ch.to_string(),
                            start,
                            end,
                        });
                    }
                }
            }
        }

        if let Some(word) = current {
            timings.push(word);
        }

        Ok(timings)
    }
}

/// A timing track as stored by the narration job.
///
/// Accepts word-level timings, raw character alignment, or a provider response
/// carrying the alignment under an `alignment` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampTrack {
    Words(Vec<WordTiming>),
    Response { alignment: CharacterAlignment },
    Characters(CharacterAlignment),
}

impl TimestampTrack {
    pub fn into_word_timings(self) -> Result<Vec<WordTiming>> {
        match self {
            TimestampTrack::Words(words) => Ok(words),
            TimestampTrack::Response { alignment } | TimestampTrack::Characters(alignment) => {
                alignment.word_timings()
            }
        }
    }
}

/// Validated word timings, ordered by word index.
#[derive(Debug, Clone, PartialEq)]
pub struct WordTimeline {
    timings: Vec<WordTiming>,
}

impl WordTimeline {
    /// Build a timeline, checking that indices run 0..n without gaps and that
    /// start times never go backwards.
    pub fn new(mut timings: Vec<WordTiming>) -> Result<Self> {
        timings.sort_by_key(|t| t.index);

        let mut prev_start = f64::NEG_INFINITY;
        for (expected, timing) in timings.iter().enumerate() {
            if timing.index != expected {
                return Err(AlignmentError::IndexGap {
                    expected,
                    found: timing.index,
                });
            }
            if !timing.start.is_finite() || !timing.end.is_finite() || timing.end < timing.start {
                return Err(AlignmentError::InvalidSpan {
                    index: timing.index,
                    start: timing.start,
                    end: timing.end,
                });
            }
            if timing.start < prev_start {
                return Err(AlignmentError::OutOfOrder {
                    index: timing.index,
                });
            }
            prev_start = timing.start;
        }

        log::debug!("built word timeline with {} words", timings.len());
        Ok(Self { timings })
    }

    pub fn from_track(track: TimestampTrack) -> Result<Self> {
        Self::new(track.into_word_timings()?)
    }

    pub fn timings(&self) -> &[WordTiming] {
        &self.timings
    }

    pub fn len(&self) -> usize {
        self.timings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }

    /// End of the last word, or zero for an empty timeline.
    pub fn duration(&self) -> f64 {
        self.timings.last().map(|t| t.end).unwrap_or(0.0)
    }

    /// Index of the word to highlight at `elapsed` seconds.
    ///
    /// This is the last word that has started. Gaps between words keep the
    /// previous word highlighted, and so does everything after the final word.
    /// Returns `None` before the first word starts.
    pub fn word_at(&self, elapsed: f64) -> Option<usize> {
        let started = self.timings.partition_point(|t| t.start <= elapsed);
        started.checked_sub(1)
    }

    /// Compare against the word sequence the highlighter renders.
    ///
    /// Intended for tooling and CI: a mismatch means the narration and the page
    /// were derived from different text.
    pub fn check_parity(&self, words: &[&str]) -> Result<()> {
        if words.len() != self.timings.len() {
            return Err(AlignmentError::WordCountMismatch {
                expected: words.len(),
                actual: self.timings.len(),
            });
        }

        for (timing, word) in self.timings.iter().zip(words) {
            if timing.word != *word {
                return Err(AlignmentError::WordMismatch {
                    index: timing.index,
                    expected: word.to_string(),
                    actual: timing.word.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Highlight cursor driven by a per-frame playback clock.
///
/// Forward playback steps from the current word instead of searching the whole
/// timeline; a seek backwards falls back to [`WordTimeline::word_at`].
#[derive(Debug)]
pub struct Highlighter<'a> {
    timeline: &'a WordTimeline,
    current: Option<usize>,
}

impl<'a> Highlighter<'a> {
    pub fn new(timeline: &'a WordTimeline) -> Self {
        Self {
            timeline,
            current: None,
        }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Move the cursor to the word playing at `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f64) -> Option<usize> {
        let timings = self.timeline.timings();

        if !elapsed.is_finite() {
            self.current = self.timeline.word_at(elapsed);
            return self.current;
        }

        if let Some(i) = self.current {
            if elapsed < timings[i].start {
                self.current = self.timeline.word_at(elapsed);
                return self.current;
            }
        }

        let mut next = self.current.map_or(0, |i| i + 1);
        while next < timings.len() && timings[next].start <= elapsed {
            self.current = Some(next);
            next += 1;
        }

        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(index: usize, word: &str, start: f64, end: f64) -> WordTiming {
        WordTiming {
            index,
            word: word.to_string(),
            start,
            end,
        }
    }

    fn alignment_for(text: &str) -> CharacterAlignment {
        let characters: Vec<String> = text.chars().map(|c| c.to_string()).collect();
        let starts: Vec<f64> = (0..characters.len()).map(|i| i as f64 * 0.1).collect();
        let ends: Vec<f64> = (0..characters.len()).map(|i| i as f64 * 0.1 + 0.1).collect();
        CharacterAlignment {
            characters,
            character_start_times_seconds: starts,
            character_end_times_seconds: ends,
        }
    }

    fn sample_timeline() -> WordTimeline {
        WordTimeline::new(vec![
            timing(0, "Hello", 0.5, 0.9),
            timing(1, "big", 1.0, 1.2),
            timing(2, "world", 1.5, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_character_alignment_groups_words() {
        let timings = alignment_for("Hi there").word_timings().unwrap();
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].word, "Hi");
        assert_eq!(timings[0].index, 0);
        assert!((timings[0].start - 0.0).abs() < 1e-9);
        assert!((timings[0].end - 0.2).abs() < 1e-9);
        assert_eq!(timings[1].word, "there");
        assert_eq!(timings[1].index, 1);
        assert!((timings[1].start - 0.3).abs() < 1e-9);
        assert!((timings[1].end - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_character_alignment_ignores_edge_and_repeated_spaces() {
        let timings = alignment_for("  a   b ").word_timings().unwrap();
        let words: Vec<&str> = timings.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["a", "b"]);
    }

    #[test]
    fn test_character_alignment_empty_entry_does_not_split() {
        let alignment = CharacterAlignment {
            characters: vec!["a".into(), "".into(), "b".into(), " ".into(), "c".into()],
            character_start_times_seconds: vec![0.0, 0.1, 0.2, 0.3, 0.4],
            character_end_times_seconds: vec![0.1, 0.2, 0.3, 0.4, 0.5],
        };
        let timings = alignment.word_timings().unwrap();
        let words: Vec<&str> = timings.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["ab", "c"]);
        assert!((timings[0].end - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_character_alignment_multi_character_entry_with_space_splits() {
        let alignment = CharacterAlignment {
            characters: vec!["a b".into(), "c".into()],
            character_start_times_seconds: vec![0.0, 0.5],
            character_end_times_seconds: vec![0.4, 0.9],
        };
        let timings = alignment.word_timings().unwrap();
        let words: Vec<&str> = timings.iter().map(|t| t.word.as_str()).collect();
        assert_eq!(words, vec!["a", "bc"]);
        assert_eq!(timings[1].index, 1);
        assert!((timings[1].start - 0.0).abs() < 1e-9);
        assert!((timings[1].end - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_character_alignment_length_mismatch() {
        let mut alignment = alignment_for("abc");
        alignment.character_end_times_seconds.pop();
        assert_eq!(
            alignment.word_timings(),
            Err(AlignmentError::LengthMismatch {
                characters: 3,
                starts: 3,
                ends: 2
            })
        );
    }

    #[test]
    fn test_timestamp_track_formats() {
        let words: TimestampTrack =
            serde_json::from_str(r#"[{"index":0,"word":"Hi","start":0.0,"end":0.4}]"#).unwrap();
        assert_eq!(words.into_word_timings().unwrap().len(), 1);

        let raw = r#"{"characters":["H","i"," ","y","o"],
            "character_start_times_seconds":[0.0,0.1,0.2,0.3,0.4],
            "character_end_times_seconds":[0.1,0.2,0.3,0.4,0.5]}"#;
        let characters: TimestampTrack = serde_json::from_str(raw).unwrap();
        assert!(matches!(characters, TimestampTrack::Characters(_)));
        assert_eq!(characters.into_word_timings().unwrap().len(), 2);

        let response: TimestampTrack =
            serde_json::from_str(&format!(r#"{{"audio_base64":"AAAA","alignment":{}}}"#, raw))
                .unwrap();
        assert!(matches!(response, TimestampTrack::Response { .. }));
        let timings = response.into_word_timings().unwrap();
        assert_eq!(timings[1].word, "yo");
    }

    #[test]
    fn test_timeline_sorts_by_index() {
        let timeline = WordTimeline::new(vec![timing(1, "b", 1.0, 2.0), timing(0, "a", 0.0, 1.0)])
            .unwrap();
        assert_eq!(timeline.timings()[0].word, "a");
        assert_eq!(timeline.len(), 2);
        assert!((timeline.duration() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_timeline_rejects_gaps() {
        let err = WordTimeline::new(vec![timing(0, "a", 0.0, 1.0), timing(2, "c", 1.0, 2.0)])
            .unwrap_err();
        assert_eq!(
            err,
            AlignmentError::IndexGap {
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_timeline_rejects_bad_spans() {
        let err = WordTimeline::new(vec![timing(0, "a", 1.0, 0.5)]).unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidSpan { index: 0, .. }));

        let err = WordTimeline::new(vec![timing(0, "a", f64::NAN, 0.5)]).unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidSpan { index: 0, .. }));
    }

    #[test]
    fn test_timeline_rejects_backwards_starts() {
        let err = WordTimeline::new(vec![timing(0, "a", 1.0, 1.5), timing(1, "b", 0.5, 2.0)])
            .unwrap_err();
        assert_eq!(err, AlignmentError::OutOfOrder { index: 1 });
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = WordTimeline::new(Vec::new()).unwrap();
        assert!(timeline.is_empty());
        assert_eq!(timeline.word_at(3.0), None);
        assert_eq!(timeline.duration(), 0.0);
    }

    #[test]
    fn test_word_at() {
        let timeline = sample_timeline();
        assert_eq!(timeline.word_at(0.0), None);
        assert_eq!(timeline.word_at(0.5), Some(0));
        assert_eq!(timeline.word_at(0.95), Some(0));
        assert_eq!(timeline.word_at(1.1), Some(1));
        assert_eq!(timeline.word_at(1.5), Some(2));
        assert_eq!(timeline.word_at(60.0), Some(2));
        assert_eq!(timeline.word_at(f64::NAN), None);
    }

    #[test]
    fn test_check_parity() {
        let timeline = sample_timeline();
        assert!(timeline.check_parity(&["Hello", "big", "world"]).is_ok());

        assert_eq!(
            timeline.check_parity(&["Hello", "world"]),
            Err(AlignmentError::WordCountMismatch {
                expected: 2,
                actual: 3
            })
        );

        assert_eq!(
            timeline.check_parity(&["Hello", "small", "world"]),
            Err(AlignmentError::WordMismatch {
                index: 1,
                expected: "small".to_string(),
                actual: "big".to_string()
            })
        );
    }

    #[test]
    fn test_highlighter_forward_playback() {
        let timeline = sample_timeline();
        let mut cursor = Highlighter::new(&timeline);
        assert_eq!(cursor.advance(0.1), None);
        assert_eq!(cursor.advance(0.6), Some(0));
        assert_eq!(cursor.advance(0.7), Some(0));
        // A long frame skips straight past "big".
        assert_eq!(cursor.advance(1.6), Some(2));
        assert_eq!(cursor.current(), Some(2));
    }

    #[test]
    fn test_highlighter_seek_backwards() {
        let timeline = sample_timeline();
        let mut cursor = Highlighter::new(&timeline);
        cursor.advance(1.8);
        assert_eq!(cursor.advance(1.05), Some(1));
        assert_eq!(cursor.advance(0.2), None);
        assert_eq!(cursor.advance(0.5), Some(0));
    }

    #[test]
    fn test_highlighter_matches_word_at() {
        let timeline = sample_timeline();
        let mut cursor = Highlighter::new(&timeline);
        for frame in [0.0, 0.4, 0.5, 1.3, 0.9, 2.5, 1.0, 1.49, 1.5] {
            assert_eq!(cursor.advance(frame), timeline.word_at(frame), "frame {}", frame);
        }
        cursor.reset();
        assert_eq!(cursor.current(), None);
    }

    #[test]
    fn test_highlighter_non_finite_time_matches_word_at() {
        let timeline = sample_timeline();
        let mut cursor = Highlighter::new(&timeline);
        assert_eq!(cursor.advance(1.1), Some(1));
        assert_eq!(cursor.advance(f64::NAN), timeline.word_at(f64::NAN));
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.advance(f64::INFINITY), Some(2));
        assert_eq!(cursor.advance(f64::NEG_INFINITY), None);
    }
}
