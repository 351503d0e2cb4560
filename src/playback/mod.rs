//! Playback-driven highlighting.
//!
//! # Architecture
//!
//! ```text
//! PlaybackEngine ──position_ms()──▶ PlaybackTracker::update ──▶ TransitionEvent
//!  (rodio sink position)               (first bound match)       (UI highlight)
//! ```
//!
//! The engine only knows about time; the tracker only knows about segments.

pub mod engine;
pub mod tracker;

pub use engine::{engine_from_config, PlaybackEngine, PlaybackError, RodioPlayback};
#[cfg(test)]
pub use engine::ClockPlayback;
pub use tracker::{PlaybackTracker, TransitionEvent};
