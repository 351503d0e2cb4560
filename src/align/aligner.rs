//! Greedy single-cursor alignment of annotations onto the original text.
//!
//! ```text
//! original text ──split_preserving──▶ pieces
//! annotations   ──stable sort by start_time──▶ sorted
//!
//! for each piece:
//!     not word-like          → Literal
//!     normalize == sorted[c] → Token(Some(interval)), c += 1
//!     otherwise              → Token(None)
//! ```
//!
//! The cursor `c` only moves forward, so every annotation is consumed at
//! most once and in temporal order.  A mismatch leaves the cursor in place:
//! the same annotation stays the candidate for the next token.  Misalignment
//! is an expected outcome and never an error.

use crate::align::tokenize::{is_word_like, normalize, split_preserving};
use crate::align::types::{Annotation, Segment};

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// A token bound to an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Index into [`Alignment::segments`].
    pub segment: usize,
    /// Index into the annotation list after sorting by `start_time`.
    pub annotation: usize,
}

/// Result of [`align`]: the segment sequence plus the bindings made while
/// walking it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    segments: Vec<Segment>,
    bindings: Vec<Binding>,
}

impl Alignment {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Bindings in the order they were made.  Both indices are strictly
    /// increasing.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Number of word-like tokens, bound or not.
    pub fn token_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_token()).count()
    }

    /// Concatenation of every segment's text.  Always equals the input text.
    pub fn text(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }
}

// ---------------------------------------------------------------------------
// align
// ---------------------------------------------------------------------------

/// Align `annotations` onto `text`.
///
/// `annotations` may arrive in any order; a stable sort by `start_time` is
/// applied first, so ties keep their original relative order.
///
/// ```
/// use highlight_reader::align::{align, Annotation, Interval, Segment};
///
/// let words = vec![
///     Annotation::new("hi", 0, 400),
///     Annotation::new("there", 400, 900),
/// ];
/// let alignment = align("Hi there!", &words);
///
/// assert_eq!(
///     alignment.segments(),
///     &[
///         Segment::token("Hi", Some(Interval::new(0, 400))),
///         Segment::literal(" "),
///         Segment::token("there", Some(Interval::new(400, 900))),
///         Segment::literal("!"),
///     ]
/// );
/// ```
pub fn align(text: &str, annotations: &[Annotation]) -> Alignment {
    let mut sorted: Vec<&Annotation> = annotations.iter().collect();
    // `sort_by_key` is stable.
    sorted.sort_by_key(|a| a.start_time);
    let keys: Vec<String> = sorted.iter().map(|a| normalize(&a.word)).collect();

    let mut segments = Vec::new();
    let mut bindings = Vec::new();
    let mut cursor = 0usize;

    for piece in split_preserving(text) {
        if !is_word_like(piece) {
            segments.push(Segment::literal(piece));
            continue;
        }

        let interval = match keys.get(cursor) {
            Some(key) if *key == normalize(piece) => {
                bindings.push(Binding {
                    segment: segments.len(),
                    annotation: cursor,
                });
                let interval = sorted[cursor].interval();
                cursor += 1;
                Some(interval)
            }
            _ => None,
        };
        segments.push(Segment::token(piece, interval));
    }

    let alignment = Alignment { segments, bindings };
    log::debug!(
        "align: {} tokens, {} bound, {} of {} annotations unused",
        alignment.token_count(),
        alignment.bindings.len(),
        sorted.len() - cursor,
        sorted.len()
    );
    alignment
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::Interval;

    fn ann(word: &str, start: u64, end: u64) -> Annotation {
        Annotation::new(word, start, end)
    }

    fn intervals(alignment: &Alignment) -> Vec<Option<(u64, u64)>> {
        alignment
            .segments()
            .iter()
            .filter(|s| s.is_token())
            .map(|s| s.interval().map(|iv| (iv.start_ms, iv.end_ms)))
            .collect()
    }

    #[test]
    fn hi_there_example() {
        let a = align("Hi there!", &[ann("hi", 0, 400), ann("there", 400, 900)]);
        assert_eq!(
            a.segments(),
            &[
                Segment::token("Hi", Some(Interval::new(0, 400))),
                Segment::literal(" "),
                Segment::token("there", Some(Interval::new(400, 900))),
                Segment::literal("!"),
            ]
        );
        assert_eq!(
            a.bindings(),
            &[
                Binding { segment: 0, annotation: 0 },
                Binding { segment: 2, annotation: 1 },
            ]
        );
    }

    #[test]
    fn round_trip_preserves_text() {
        let words = [ann("one", 0, 1), ann("two", 2, 3)];
        for text in [
            "",
            "one two",
            "  One,   two!!  ",
            "?!.,",
            "Один, два?\n\tТри.",
            "no match at all",
        ] {
            assert_eq!(align(text, &words).text(), text);
        }
    }

    #[test]
    fn case_and_punctuation_insensitive() {
        let a = align("hello, world", &[ann("Hello", 0, 100), ann("WORLD.", 100, 200)]);
        assert_eq!(intervals(&a), vec![Some((0, 100)), Some((100, 200))]);
    }

    #[test]
    fn empty_annotations_leave_all_tokens_unbound() {
        let a = align("Some words, here.", &[]);
        assert_eq!(a.token_count(), 3);
        assert!(a.segments().iter().all(|s| !s.is_bound()));
        assert!(a.bindings().is_empty());
    }

    #[test]
    fn unsorted_annotations_are_sorted_first() {
        let a = align("a b c", &[ann("c", 200, 300), ann("a", 0, 100), ann("b", 100, 200)]);
        assert_eq!(
            intervals(&a),
            vec![Some((0, 100)), Some((100, 200)), Some((200, 300))]
        );
    }

    #[test]
    fn sort_is_stable_for_equal_start_times() {
        // Both start at 0; the original order ("x" then "y") must be kept.
        let a = align("x y", &[ann("x", 0, 50), ann("y", 0, 80)]);
        assert_eq!(intervals(&a), vec![Some((0, 50)), Some((0, 80))]);

        // Reversed input order flips the binding sequence.
        let b = align("x y", &[ann("y", 0, 80), ann("x", 0, 50)]);
        assert_eq!(intervals(&b), vec![None, Some((0, 80))]);
    }

    #[test]
    fn extra_text_word_is_skipped_without_advancing() {
        // "big" has no annotation; "dog" must still bind.
        let a = align("the big dog", &[ann("the", 0, 100), ann("dog", 100, 200)]);
        assert_eq!(intervals(&a), vec![Some((0, 100)), None, Some((100, 200))]);
    }

    #[test]
    fn missing_text_word_stalls_the_cursor() {
        // The annotation "um" never appears in the text, so the cursor is
        // stuck on it and every later token stays unbound.
        let a = align("so then", &[ann("so", 0, 100), ann("um", 100, 150), ann("then", 150, 300)]);
        assert_eq!(intervals(&a), vec![Some((0, 100)), None]);
    }

    #[test]
    fn each_annotation_is_consumed_at_most_once() {
        let a = align("go go go", &[ann("go", 0, 100), ann("go", 100, 200)]);
        assert_eq!(intervals(&a), vec![Some((0, 100)), Some((100, 200)), None]);
    }

    #[test]
    fn binding_indices_are_monotonic() {
        let words = [
            ann("a", 0, 10),
            ann("zz", 10, 20),
            ann("b", 20, 30),
            ann("c", 30, 40),
            ann("a", 40, 50),
        ];
        let a = align("a q b zz b c, a!", &words);
        let anns: Vec<usize> = a.bindings().iter().map(|b| b.annotation).collect();
        assert!(anns.windows(2).all(|w| w[0] <= w[1]), "{anns:?}");
        let segs: Vec<usize> = a.bindings().iter().map(|b| b.segment).collect();
        assert!(segs.windows(2).all(|w| w[0] < w[1]), "{segs:?}");
    }

    #[test]
    fn bindings_point_at_bound_tokens() {
        let words = [ann("hi", 0, 400), ann("there", 400, 900)];
        let a = align("Oh, hi there", &words);
        for b in a.bindings() {
            let seg = &a.segments()[b.segment];
            let mut sorted = words.to_vec();
            sorted.sort_by_key(|w| w.start_time);
            assert_eq!(seg.interval(), Some(sorted[b.annotation].interval()));
        }
    }

    #[test]
    fn punctuation_only_text_is_all_literal() {
        let a = align("?! ...", &[ann("x", 0, 1)]);
        assert_eq!(a.token_count(), 0);
        assert_eq!(a.segments().len(), 3);
    }
}
