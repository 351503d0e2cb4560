//! Configuration module for HighlightReader.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the service
//! client, playback and UI, `AppPaths` for the platform config directory, and
//! TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, PlaybackConfig, ServiceConfig, UiConfig};
