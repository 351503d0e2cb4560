//! Reader session: request lifecycle, stale-response rejection and the async
//! request runner.
//!
//! # Architecture
//!
//! ```text
//!  UI thread                                  tokio runtime
//! ┌────────────────────────┐  SessionCommand  ┌──────────────────────────┐
//! │ Session                │ ───────────────▶ │ SessionOrchestrator      │
//! │  begin() → Submission  │                  │  synthesize + fetch audio│
//! │  complete(id, outcome) │ ◀─────────────── │  abort superseded tasks  │
//! │  on_position(ms)       │  SessionResult   └──────────────────────────┘
//! └────────────────────────┘
//! ```
//!
//! The aligner runs inside [`Session::complete`], so the tracker never sees
//! a partially built segment sequence.

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{SessionCommand, SessionOrchestrator, SessionResult};
pub use state::{
    ReaderView, RequestId, Session, SessionError, SessionState, Submission,
    REQUEST_FAILED_MESSAGE,
};
