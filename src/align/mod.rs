//! Text ↔ timing alignment.
//!
//! This module provides:
//! * [`align`]: binds timing annotations to word-like tokens of the original
//!   text using a single forward-only cursor.
//! * [`split_preserving`] / [`normalize`]: the lossless tokenizer and the
//!   comparison key it shares with the aligner.
//! * [`Annotation`], [`Interval`], [`Segment`]: the data model.
//!
//! # Quick start
//!
//! ```rust
//! use highlight_reader::align::{align, Annotation};
//!
//! let words = vec![Annotation::new("hello", 0, 350), Annotation::new("world", 350, 800)];
//! let alignment = align("Hello, world!", &words);
//!
//! assert_eq!(alignment.text(), "Hello, world!");
//! assert_eq!(alignment.bindings().len(), 2);
//! ```

pub mod aligner;
pub mod tokenize;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use aligner::{align, Alignment, Binding};
pub use tokenize::{is_word_like, normalize, split_preserving, PUNCTUATION};
pub use types::{Annotation, Interval, Segment};
