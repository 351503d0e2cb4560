//! Value types shared by the aligner, the tracker and the synthesis client.
//!
//! * [`Annotation`]: one spoken word with its timing, as delivered by the
//!   synthesis service.
//! * [`Interval`]: an inclusive millisecond range bound to a token.
//! * [`Segment`]: one piece of the original text, either passed through
//!   verbatim ([`Segment::Literal`]) or word-like ([`Segment::Token`]).

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// A recognised word and the time span in which it is spoken.
///
/// Times are milliseconds from the start of the audio.  The service sends
/// integers, but any JSON number is accepted: fractional values are rounded
/// to the nearest millisecond and negative values clamp to `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// The word as recognised by the speech service.
    pub word: String,
    /// Start of the word in milliseconds.
    #[serde(deserialize_with = "deserialize_millis")]
    pub start_time: u64,
    /// End of the word in milliseconds.
    #[serde(deserialize_with = "deserialize_millis")]
    pub end_time: u64,
}

impl Annotation {
    pub fn new(word: impl Into<String>, start_time: u64, end_time: u64) -> Self {
        Self {
            word: word.into(),
            start_time,
            end_time,
        }
    }

    /// The timing of this annotation as an [`Interval`].
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("timestamp must be a finite number"));
    }
    Ok(value.round().max(0.0) as u64)
}

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// Inclusive millisecond range `[start_ms, end_ms]`.
///
/// An interval whose start lies after its end (noisy upstream data) contains
/// no position at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Interval {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Returns `true` when `start_ms ≤ position_ms ≤ end_ms`.
    ///
    /// ```
    /// use highlight_reader::align::Interval;
    ///
    /// let iv = Interval::new(400, 900);
    /// assert!(iv.contains(400));
    /// assert!(iv.contains(900));
    /// assert!(!iv.contains(901));
    /// ```
    pub fn contains(&self, position_ms: u64) -> bool {
        self.start_ms <= position_ms && position_ms <= self.end_ms
    }
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// One piece of the original text.
///
/// Concatenating the [`text`](Segment::text) of every segment, in order,
/// reproduces the original text byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Segment {
    /// Whitespace or punctuation, rendered as-is and never highlighted.
    Literal { text: String },
    /// A word-like token.  `interval` is `None` when no annotation matched.
    Token {
        text: String,
        interval: Option<Interval>,
    },
}

impl Segment {
    pub fn literal(text: impl Into<String>) -> Self {
        Segment::Literal { text: text.into() }
    }

    pub fn token(text: impl Into<String>, interval: Option<Interval>) -> Self {
        Segment::Token {
            text: text.into(),
            interval,
        }
    }

    /// The verbatim text of this segment.
    pub fn text(&self) -> &str {
        match self {
            Segment::Literal { text } | Segment::Token { text, .. } => text,
        }
    }

    /// The bound interval, if this is a token that matched an annotation.
    pub fn interval(&self) -> Option<Interval> {
        match self {
            Segment::Token { interval, .. } => *interval,
            Segment::Literal { .. } => None,
        }
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Segment::Token { .. })
    }

    pub fn is_bound(&self) -> bool {
        self.interval().is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
