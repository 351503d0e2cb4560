//! Position → active segment resolution.
//!
//! [`PlaybackTracker`] is fed the playback position on every tick of the
//! playback engine and reports at most one [`TransitionEvent`] per call.
//! The presentation layer applies those events (add / remove a highlight,
//! scroll into view) without ever looking at intervals itself.
//!
//! # State transitions
//!
//! ```text
//!            match i                   match j (j ≠ i)
//! None ──────────────▶ Some(i) ──────────────────▶ Some(j)
//!   ▲      Activate        │          Switch
//!   │                      │ no match / reset()
//!   └──────────────────────┘
//!             Deactivate
//! ```

use crate::align::{Interval, Segment};

// ---------------------------------------------------------------------------
// TransitionEvent
// ---------------------------------------------------------------------------

/// A change of the active segment.  Indices refer to the segment sequence
/// the tracker was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// Nothing was active; segment `index` becomes active.
    Activate { index: usize },
    /// Segment `index` was active and nothing is active any more.
    Deactivate { index: usize },
    /// The active segment moved from `from` to `to`.
    Switch { from: usize, to: usize },
}

impl TransitionEvent {
    /// The segment that is active after this event, if any.
    pub fn activated(&self) -> Option<usize> {
        match *self {
            TransitionEvent::Activate { index } => Some(index),
            TransitionEvent::Switch { to, .. } => Some(to),
            TransitionEvent::Deactivate { .. } => None,
        }
    }

    /// The segment that lost its highlight through this event, if any.
    pub fn deactivated(&self) -> Option<usize> {
        match *self {
            TransitionEvent::Deactivate { index } => Some(index),
            TransitionEvent::Switch { from, .. } => Some(from),
            TransitionEvent::Activate { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackTracker
// ---------------------------------------------------------------------------

/// Tracks which bound token is active at the current playback position.
///
/// Only bound tokens take part in the lookup; they are collected once, in
/// sequence order, when the tracker is built.  When intervals overlap the
/// earliest segment in the sequence wins.
///
/// ```
/// use highlight_reader::align::{align, Annotation};
/// use highlight_reader::playback::{PlaybackTracker, TransitionEvent};
///
/// let words = vec![Annotation::new("hi", 0, 400), Annotation::new("there", 400, 900)];
/// let alignment = align("Hi there!", &words);
/// let mut tracker = PlaybackTracker::new(alignment.segments());
///
/// assert_eq!(tracker.update(350), Some(TransitionEvent::Activate { index: 0 }));
/// assert_eq!(tracker.update(450), Some(TransitionEvent::Switch { from: 0, to: 2 }));
/// assert_eq!(tracker.update(1000), Some(TransitionEvent::Deactivate { index: 2 }));
/// ```
#[derive(Debug, Clone)]
pub struct PlaybackTracker {
    bound: Vec<(usize, Interval)>,
    active: Option<usize>,
}

impl PlaybackTracker {
    /// Build a tracker for `segments`.  Nothing is active initially.
    pub fn new(segments: &[Segment]) -> Self {
        let bound = segments
            .iter()
            .enumerate()
            .filter_map(|(idx, seg)| seg.interval().map(|iv| (idx, iv)))
            .collect();
        Self {
            bound,
            active: None,
        }
    }

    /// Index of the currently active segment.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Number of segments that can ever become active.
    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    /// First bound segment, in sequence order, whose interval contains
    /// `position_ms`.
    fn lookup(&self, position_ms: u64) -> Option<usize> {
        self.bound
            .iter()
            .find(|(_, iv)| iv.contains(position_ms))
            .map(|(idx, _)| *idx)
    }

    /// Advance to `position_ms` and report the resulting transition.
    ///
    /// Returns `None` when the active segment did not change, so repeated
    /// calls with the same position produce at most one event.
    pub fn update(&mut self, position_ms: u64) -> Option<TransitionEvent> {
        let found = self.lookup(position_ms);
        let event = match (self.active, found) {
            (None, None) => None,
            (Some(prev), Some(next)) if prev == next => None,
            (None, Some(index)) => Some(TransitionEvent::Activate { index }),
            (Some(index), None) => Some(TransitionEvent::Deactivate { index }),
            (Some(from), Some(to)) => Some(TransitionEvent::Switch { from, to }),
        };
        self.active = found;

        if let Some(ev) = event {
            log::debug!("tracker: {ev:?} at {position_ms} ms");
        }
        event
    }

    /// Clear the active segment unconditionally.
    pub fn reset(&mut self) {
        self.active = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
