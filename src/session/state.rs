//! Request-scoped reader state.
//!
//! [`Session`] is owned by the UI thread and is the single source of truth
//! for what is on screen: the current phase, the aligned segments, the
//! tracker that highlights them and any error message.
//!
//! Every synthesis request gets a fresh [`RequestId`].  Only the result
//! carrying the latest id is accepted; anything older is a stale response
//! from a superseded request and is dropped.

use thiserror::Error;

use crate::align::{align, Annotation, Segment};
use crate::playback::{PlaybackTracker, TransitionEvent};
use crate::synth::{SynthError, SynthesisResponse};

/// Message shown for any failed request.  The cause goes to the log only.
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to generate audio.";

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Phases of a reader session.
///
/// ```text
/// Idle ──begin──▶ Requesting ──Ok──▶ Ready ──start_playback──▶ Playing
///                     │                                           │
///                     └──Err──▶ Error              playback ended ▼
///                                                              Finished
/// any state ──begin──▶ Requesting        any state ──reset──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing requested yet, or the view was reset.
    #[default]
    Idle,
    /// A synthesis request is in flight.
    Requesting,
    /// Segments are aligned and the audio source is known.
    Ready,
    /// Audio is playing and the tracker is being polled.
    Playing,
    /// Playback reached the end; the text stays visible without highlight.
    Finished,
    /// The last request failed.
    Error,
}

impl SessionState {
    /// Returns `true` while a request is in flight.
    ///
    /// The UI uses this to disable the submit button.
    ///
    /// ```
    /// use highlight_reader::session::SessionState;
    ///
    /// assert!(SessionState::Requesting.is_busy());
    /// assert!(!SessionState::Playing.is_busy());
    /// assert!(!SessionState::Error.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Requesting)
    }

    /// A short human-readable label suitable for display in the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Requesting => "Loading...",
            SessionState::Ready => "Ready",
            SessionState::Playing => "Playing",
            SessionState::Finished => "Finished",
            SessionState::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Submission with blank input.
    #[error("Please enter text to synthesize")]
    EmptyInput,
}

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// Identifies one synthesis request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// A validated submission: the request id and the trimmed text to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: RequestId,
    pub text: String,
}

// ---------------------------------------------------------------------------
// ReaderView
// ---------------------------------------------------------------------------

/// Everything produced from one successful synthesis response.
#[derive(Debug, Clone)]
pub struct ReaderView {
    pub original_text: String,
    pub audio_url: String,
    /// Annotations as received, before sorting.
    pub words: Vec<Annotation>,
    pub segments: Vec<Segment>,
    duration_ms: u64,
    tracker: PlaybackTracker,
}

impl ReaderView {
    fn from_response(response: SynthesisResponse) -> Self {
        let alignment = align(&response.original_text, &response.words);
        let tracker = PlaybackTracker::new(alignment.segments());
        log::info!(
            "session: aligned {} of {} tokens",
            alignment.bindings().len(),
            alignment.token_count()
        );
        Self {
            duration_ms: response.spoken_duration_ms(),
            original_text: response.original_text,
            audio_url: response.audio_url,
            words: response.words,
            segments: alignment.into_segments(),
            tracker,
        }
    }

    /// Index of the highlighted segment.
    pub fn active(&self) -> Option<usize> {
        self.tracker.active()
    }

    /// Expected audio length: the end of the last spoken word.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Reader state machine.  See [`SessionState`] for the transitions.
///
/// ```
/// use highlight_reader::align::Annotation;
/// use highlight_reader::session::{Session, SessionState};
/// use highlight_reader::synth::SynthesisResponse;
///
/// let mut session = Session::new();
/// let id = session.begin("Hi there!").unwrap().id;
///
/// let response = SynthesisResponse {
///     original_text: "Hi there!".into(),
///     words: vec![Annotation::new("hi", 0, 400), Annotation::new("there", 400, 900)],
///     audio_url: "https://audio/hi.ogg".into(),
/// };
/// assert!(session.complete(id, Ok(response)));
/// assert_eq!(session.state(), SessionState::Ready);
/// assert_eq!(session.view().unwrap().segments.len(), 4);
/// ```
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    next_id: u64,
    pending: Option<RequestId>,
    view: Option<ReaderView>,
    error_message: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current result, if the last request succeeded.
    pub fn view(&self) -> Option<&ReaderView> {
        self.view.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The request whose result is awaited.
    pub fn pending(&self) -> Option<RequestId> {
        self.pending
    }

    /// Start a new request for `text`, trimmed of surrounding whitespace.
    ///
    /// Blank input is rejected and leaves the session untouched.  Otherwise
    /// the previous view is dropped, so nothing from an earlier request is
    /// shown while this one runs.
    pub fn begin(&mut self, text: &str) -> Result<Submission, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.next_id += 1;
        let id = RequestId(self.next_id);
        if let Some(stale) = self.pending.replace(id) {
            log::debug!("session: request {} superseded by {}", stale.0, id.0);
        }
        self.view = None;
        self.error_message = None;
        self.state = SessionState::Requesting;
        log::info!("session: request {} started", id.0);
        Ok(Submission {
            id,
            text: text.to_string(),
        })
    }

    /// Apply the outcome of request `id`.
    ///
    /// Returns `false` (and changes nothing) when `id` is not the pending
    /// request.
    pub fn complete(
        &mut self,
        id: RequestId,
        outcome: Result<SynthesisResponse, SynthError>,
    ) -> bool {
        if self.pending != Some(id) {
            log::debug!("session: ignoring stale result for request {}", id.0);
            return false;
        }
        self.pending = None;

        match outcome {
            Ok(response) => {
                self.view = Some(ReaderView::from_response(response));
                self.state = SessionState::Ready;
            }
            Err(e) => {
                log::error!("session: request {} failed: {e}", id.0);
                self.fail(REQUEST_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// Enter the error state with `message`, discarding any view.
    pub fn fail(&mut self, message: String) {
        self.view = None;
        self.pending = None;
        self.error_message = Some(message);
        self.state = SessionState::Error;
    }

    /// Playback of the current view has started.
    pub fn start_playback(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.tracker.reset();
            self.state = SessionState::Playing;
        }
    }

    /// Feed a playback position to the tracker.
    ///
    /// Returns `None` when there is nothing to track or nothing changed.
    pub fn on_position(&mut self, position_ms: u64) -> Option<TransitionEvent> {
        if self.state != SessionState::Playing {
            return None;
        }
        self.view.as_mut()?.tracker.update(position_ms)
    }

    /// Playback reached its end: clear the highlight.
    pub fn on_playback_ended(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.tracker.reset();
        }
        if self.state == SessionState::Playing {
            self.state = SessionState::Finished;
        }
    }

    /// Return to [`SessionState::Idle`], forgetting any pending request.
    pub fn reset(&mut self) {
        self.pending = None;
        self.view = None;
        self.error_message = None;
        self.state = SessionState::Idle;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
