//! Session orchestrator: runs synthesis requests on the tokio runtime.
//!
//! [`SessionOrchestrator`] receives [`SessionCommand`]s from the UI over a
//! `tokio::sync::mpsc` channel and reports [`SessionResult`]s back.
//!
//! # Request flow
//!
//! ```text
//! SessionCommand::Synthesize { id, text }
//!   └─▶ abort in-flight request (if any)
//!   └─▶ spawn client.synthesize(text)
//!         └─▶ client.fetch_audio(response.audio_url)
//!               └─▶ SessionResult::Completed { id, outcome }
//!
//! SessionCommand::Cancel      └─▶ abort in-flight request, send nothing
//! SessionCommand::CheckStatus └─▶ SessionResult::Status(outcome)
//! ```
//!
//! The audio download is part of the request, so aborting a superseded
//! request also abandons its download and a result never arrives without
//! its audio.  Only one synthesis request is ever in flight.  A result that still
//! slips through after being superseded is rejected by
//! [`Session::complete`](super::Session::complete) through its id.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::synth::{ServiceStatus, SynthError, SynthesisClient, SynthesizedSpeech};

use super::state::{RequestId, Submission};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Commands sent from the UI thread to the orchestrator.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Synthesize `text`; the result is tagged with `id`.
    Synthesize { id: RequestId, text: String },
    /// Abort the in-flight synthesis request, if any.
    Cancel,
    /// Query the service status endpoint.
    CheckStatus,
}

impl From<Submission> for SessionCommand {
    fn from(submission: Submission) -> Self {
        SessionCommand::Synthesize {
            id: submission.id,
            text: submission.text,
        }
    }
}

/// Results delivered from the orchestrator to the UI.
#[derive(Debug, Clone)]
pub enum SessionResult {
    /// A synthesis request finished.
    Completed {
        id: RequestId,
        outcome: Result<SynthesizedSpeech, SynthError>,
    },
    /// A status query finished.
    Status(Result<ServiceStatus, SynthError>),
}

// ---------------------------------------------------------------------------
// SessionOrchestrator
// ---------------------------------------------------------------------------

/// Drives synthesis requests for one UI.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use highlight_reader::config::AppConfig;
/// use highlight_reader::session::SessionOrchestrator;
/// use highlight_reader::synth::ApiSynthesisClient;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let client = Arc::new(ApiSynthesisClient::from_config(&config.service));
///
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
/// let (result_tx, result_rx) = tokio::sync::mpsc::channel(16);
/// tokio::spawn(SessionOrchestrator::new(client, result_tx).run(command_rx));
///
/// // command_tx and result_rx are handed to the UI.
/// # drop((command_tx, result_rx));
/// # }
/// ```
pub struct SessionOrchestrator {
    client: Arc<dyn SynthesisClient>,
    result_tx: mpsc::Sender<SessionResult>,
    in_flight: Option<(RequestId, JoinHandle<()>)>,
}

impl SessionOrchestrator {
    pub fn new(client: Arc<dyn SynthesisClient>, result_tx: mpsc::Sender<SessionResult>) -> Self {
        Self {
            client,
            result_tx,
            in_flight: None,
        }
    }

    /// Run until `command_rx` is closed.
    ///
    /// On shutdown the in-flight request, if any, is allowed to finish and
    /// deliver its result.
    pub async fn run(mut self, mut command_rx: mpsc::Receiver<SessionCommand>) {
        while let Some(command) = command_rx.recv().await {
            match command {
                SessionCommand::Synthesize { id, text } => self.start(id, text),
                SessionCommand::Cancel => self.abort_in_flight(),
                SessionCommand::CheckStatus => self.check_status(),
            }
        }

        if let Some((id, handle)) = self.in_flight.take() {
            log::debug!("session: command channel closed, awaiting request {}", id.0);
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::warn!("session: request task {} failed: {e}", id.0);
                }
            }
        }
        log::info!("session: orchestrator shutting down");
    }

    fn start(&mut self, id: RequestId, text: String) {
        self.abort_in_flight();

        let client = Arc::clone(&self.client);
        let result_tx = self.result_tx.clone();
        let handle = tokio::spawn(async move {
            let outcome = synthesize_speech(client.as_ref(), &text).await;
            if result_tx
                .send(SessionResult::Completed { id, outcome })
                .await
                .is_err()
            {
                log::debug!("session: result receiver dropped for request {}", id.0);
            }
        });
        self.in_flight = Some((id, handle));
    }

    fn abort_in_flight(&mut self) {
        if let Some((id, handle)) = self.in_flight.take() {
            if !handle.is_finished() {
                log::info!("session: aborting request {}", id.0);
                handle.abort();
            }
        }
    }

    fn check_status(&self) {
        let client = Arc::clone(&self.client);
        let result_tx = self.result_tx.clone();
        tokio::spawn(async move {
            let outcome = client.status().await;
            let _ = result_tx.send(SessionResult::Status(outcome)).await;
        });
    }
}

/// Synthesize `text`, then download the audio the response points at.
async fn synthesize_speech(
    client: &dyn SynthesisClient,
    text: &str,
) -> Result<SynthesizedSpeech, SynthError> {
    let response = client.synthesize(text).await?;
    let audio = client.fetch_audio(&response.audio_url).await?;
    Ok(SynthesizedSpeech { response, audio })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
