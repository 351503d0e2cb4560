//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a partial `settings.toml` only
//! overrides the keys it names.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Connection settings for the synthesis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the service; `/synthesize` and `/` are resolved against it.
    pub base_url: String,
    /// Maximum seconds to wait for a synthesis response, which includes
    /// server-side speech recognition.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Audio output and position polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// How often the UI samples the playback position, in milliseconds.
    pub poll_interval_ms: u64,
    /// Output volume in `0.0..=1.0`.
    pub volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            volume: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// egui window appearance and behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial window size `(width, height)` in logical pixels.
    pub window_size: (f32, f32),
    /// Scroll the highlighted word into view when it becomes active.
    pub auto_scroll: bool,
    /// Show the raw word timings as pretty-printed JSON under the text.
    pub show_timestamps: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (640.0, 480.0),
            auto_scroll: true,
            show_timestamps: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use highlight_reader::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("service at {}", config.service.base_url);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Synthesis service settings.
    pub service: ServiceConfig,
    /// Playback engine settings.
    pub playback: PlaybackConfig,
    /// UI settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.service.base_url, loaded.service.base_url);
        assert_eq!(original.service.timeout_secs, loaded.service.timeout_secs);
        assert_eq!(
            original.playback.poll_interval_ms,
            loaded.playback.poll_interval_ms
        );
        assert_eq!(original.playback.volume, loaded.playback.volume);
        assert_eq!(original.ui.window_size, loaded.ui.window_size);
        assert_eq!(original.ui.auto_scroll, loaded.ui.auto_scroll);
        assert_eq!(original.ui.show_timestamps, loaded.ui.show_timestamps);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.service.base_url, "http://localhost:8000");
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.service.base_url, "http://localhost:8000");
        assert_eq!(cfg.service.timeout_secs, 120);
        assert_eq!(cfg.playback.poll_interval_ms, 250);
        assert_eq!(cfg.playback.volume, 1.0);
        assert_eq!(cfg.ui.window_size, (640.0, 480.0));
        assert!(cfg.ui.auto_scroll);
        assert!(cfg.ui.show_timestamps);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[service]\nbase_url = \"http://reader.local:9000\"\n")
            .expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.service.base_url, "http://reader.local:9000");
        assert_eq!(cfg.service.timeout_secs, 120);
        assert_eq!(cfg.playback.poll_interval_ms, 250);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.service.base_url = "https://tts.example.com".into();
        cfg.service.timeout_secs = 30;
        cfg.playback.volume = 0.5;
        cfg.ui.auto_scroll = false;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.service.base_url, "https://tts.example.com");
        assert_eq!(loaded.service.timeout_secs, 30);
        assert_eq!(loaded.playback.volume, 0.5);
        assert!(!loaded.ui.auto_scroll);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[service\nbase_url =").expect("write");

        assert!(AppConfig::load_from(&path).is_err());
    }
}
