//! Synthesis service client.
//!
//! This module provides:
//! * [`SynthesisClient`]: async trait for the external synthesis service.
//! * [`ApiSynthesisClient`]: HTTP implementation built on `reqwest`.
//! * [`SynthesisResponse`] / [`ServiceStatus`]: response bodies.
//! * [`SynthesizedSpeech`]: a response plus its fetched audio.
//! * [`SynthError`]: error variants for service calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use highlight_reader::config::AppConfig;
//! use highlight_reader::synth::{ApiSynthesisClient, SynthesisClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = ApiSynthesisClient::from_config(&config.service);
//!
//!     let response = client.synthesize("Hi there!").await.unwrap();
//!     let audio = client.fetch_audio(&response.audio_url).await.unwrap();
//!     println!("{} words, {} bytes of audio", response.words.len(), audio.len());
//! }
//! ```

pub mod client;
pub mod response;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiSynthesisClient, SynthError, SynthesisClient};
pub use response::{ServiceStatus, SynthesisResponse, SynthesizedSpeech};
