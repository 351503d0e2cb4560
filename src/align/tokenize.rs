//! Lossless splitting of the original text into pieces.
//!
//! The text is cut at every run of whitespace and at every run of the
//! punctuation set `. , ! ?`.  Each run is its own piece, and so is every
//! stretch of text between runs.  No character is dropped or rewritten, so
//! joining the pieces yields the input again.

/// Punctuation characters that delimit tokens and are ignored when comparing
/// words.
pub const PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Space,
    Punct,
    Word,
}

fn classify(c: char) -> Class {
    if c.is_whitespace() {
        Class::Space
    } else if is_punctuation(c) {
        Class::Punct
    } else {
        Class::Word
    }
}

pub fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(&c)
}

/// Split `text` into maximal runs of whitespace, punctuation and other
/// characters.
///
/// Empty pieces are never produced.
///
/// ```
/// use highlight_reader::align::split_preserving;
///
/// assert_eq!(split_preserving("Hi, there!"), vec!["Hi", ",", " ", "there", "!"]);
/// ```
pub fn split_preserving(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut current: Option<Class> = None;

    for (idx, c) in text.char_indices() {
        let class = classify(c);
        match current {
            Some(prev) if prev == class => {}
            Some(_) => {
                pieces.push(&text[start..idx]);
                start = idx;
                current = Some(class);
            }
            None => current = Some(class),
        }
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Strip the punctuation set and surrounding whitespace.
fn strip(piece: &str) -> String {
    piece
        .chars()
        .filter(|c| !is_punctuation(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// A piece is word-like when something remains after removing punctuation
/// and trimming whitespace.
pub fn is_word_like(piece: &str) -> bool {
    !strip(piece).is_empty()
}

/// Comparison key for tokens and annotation words: punctuation stripped,
/// trimmed, lower-cased.
///
/// ```
/// use highlight_reader::align::normalize;
///
/// assert_eq!(normalize("Hello,"), "hello");
/// assert_eq!(normalize(" WORLD! "), "world");
/// ```
pub fn normalize(word: &str) -> String {
    strip(word).to_lowercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_pieces() {
        assert!(split_preserving("").is_empty());
    }

    #[test]
    fn whitespace_runs_are_kept_together() {
        assert_eq!(split_preserving("a  \t b"), vec!["a", "  \t ", "b"]);
    }

    #[test]
    fn punctuation_runs_are_kept_together() {
        assert_eq!(split_preserving("Wait...what?!"), vec!["Wait", "...", "what", "?!"]);
    }

    #[test]
    fn punctuation_and_whitespace_are_separate_pieces() {
        assert_eq!(split_preserving("end. Next"), vec!["end", ".", " ", "Next"]);
    }

    #[test]
    fn other_punctuation_stays_inside_words() {
        assert_eq!(split_preserving("don't stop"), vec!["don't", " ", "stop"]);
        assert_eq!(split_preserving("well-known"), vec!["well-known"]);
    }

    #[test]
    fn leading_and_trailing_delimiters() {
        assert_eq!(split_preserving("  hi!"), vec!["  ", "hi", "!"]);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        assert_eq!(
            split_preserving("Привет, мир!"),
            vec!["Привет", ",", " ", "мир", "!"]
        );
    }

    #[test]
    fn newlines_count_as_whitespace() {
        assert_eq!(split_preserving("one\r\ntwo"), vec!["one", "\r\n", "two"]);
    }

    #[test]
    fn pieces_rejoin_to_input() {
        for text in ["", "Hi there!", "  ..  ", "a,b.c!d?e", "Ёлка\n\n— ёж?"] {
            assert_eq!(split_preserving(text).concat(), text);
        }
    }

    #[test]
    fn word_like_detection() {
        assert!(is_word_like("word"));
        assert!(is_word_like("—"));
        assert!(!is_word_like("   "));
        assert!(!is_word_like("?!"));
        assert!(!is_word_like(""));
    }

    #[test]
    fn normalize_lowercases_unicode() {
        assert_eq!(normalize("Привет"), "привет");
        assert_eq!(normalize("HELLO"), "hello");
    }

    #[test]
    fn normalize_keeps_inner_apostrophes() {
        assert_eq!(normalize("Don't."), "don't");
    }
}
