//! Core `SynthesisClient` trait and `ApiSynthesisClient` implementation.
//!
//! `ApiSynthesisClient` talks to the HighlightReader HTTP service:
//!
//! | Method | Path          | Body       | Response              |
//! |--------|---------------|------------|-----------------------|
//! | POST   | `/synthesize` | `{"text"}` | [`SynthesisResponse`] |
//! | GET    | `/`           | —          | [`ServiceStatus`]     |
//!
//! The audio itself is fetched with a plain `GET` on the returned
//! `audio_url`; relative URLs are resolved against the base URL.
//!
//! All connection details come from [`ServiceConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::synth::response::{ServiceStatus, SynthesisResponse};

// ---------------------------------------------------------------------------
// SynthError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the synthesis service.
///
/// The UI collapses every variant into one generic failure message; the
/// detail only goes to the log.
#[derive(Debug, Clone, Error)]
pub enum SynthError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("synthesis request timed out")]
    Timeout,

    /// The service answered with a non-success status code.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The response body could not be parsed as expected JSON.
    #[error("failed to parse service response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SynthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthError::Timeout
        } else if e.is_decode() {
            SynthError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            SynthError::Status(status.as_u16())
        } else {
            SynthError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesisClient trait
// ---------------------------------------------------------------------------

/// Async interface to the synthesis service.
///
/// Implementors must be `Send + Sync` so they can be shared with spawned
/// request tasks behind an `Arc<dyn SynthesisClient>`.
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    /// Synthesize `text` and return the audio location plus word timings.
    async fn synthesize(&self, text: &str) -> Result<SynthesisResponse, SynthError>;

    /// Download the encoded audio at `url`.
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, SynthError>;

    /// Query the service identification / health endpoint.
    async fn status(&self) -> Result<ServiceStatus, SynthError>;
}

// ---------------------------------------------------------------------------
// ApiSynthesisClient
// ---------------------------------------------------------------------------

/// `reqwest`-backed [`SynthesisClient`].
pub struct ApiSynthesisClient {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl ApiSynthesisClient {
    /// Build a client from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Join `path` onto the configured base URL, tolerating a trailing `/`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Absolute URLs pass through; anything else is a path on the service.
    fn resolve(&self, url: &str) -> String {
        if url.contains("://") {
            url.to_string()
        } else {
            self.endpoint(&format!("/{}", url.trim_start_matches('/')))
        }
    }
}

#[async_trait]
impl SynthesisClient for ApiSynthesisClient {
    async fn synthesize(&self, text: &str) -> Result<SynthesisResponse, SynthError> {
        let url = self.endpoint("/synthesize");
        log::info!("synth: POST {url} ({} chars)", text.chars().count());

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthError::Status(status.as_u16()));
        }

        let body: SynthesisResponse = response
            .json()
            .await
            .map_err(|e| SynthError::Parse(e.to_string()))?;

        log::info!(
            "synth: received {} word timings, audio at {}",
            body.words.len(),
            body.audio_url
        );
        Ok(body)
    }

    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>, SynthError> {
        let url = self.resolve(url);
        log::info!("synth: GET {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SynthError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        log::debug!("synth: fetched {} bytes of audio", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn status(&self) -> Result<ServiceStatus, SynthError> {
        let response = self.client.get(self.endpoint("/")).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| SynthError::Parse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
