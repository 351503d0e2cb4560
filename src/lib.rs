//! HighlightReader: synchronised text highlighting for synthesized speech.
//!
//! The reader sends text to a synthesis service, receives an audio URL plus
//! per-word timings, aligns those timings onto the original text and
//! highlights the word being spoken as the audio plays.
//!
//! # Modules
//!
//! * [`align`]: lossless tokenizer and single-cursor aligner.
//! * [`playback`]: position tracker and playback engines.
//! * [`synth`]: synthesis service client.
//! * [`session`]: request lifecycle and async orchestrator.
//! * [`config`]: TOML settings.
//! * [`app`]: egui window.

pub mod align;
pub mod app;
pub mod config;
pub mod playback;
pub mod session;
pub mod synth;
