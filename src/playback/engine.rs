//! Playback engines: the source of position updates for the tracker.
//!
//! # Overview
//!
//! [`PlaybackEngine`] is the seam between the reader and whatever actually
//! plays the synthesized audio.  It is object-safe and `Send` so the UI can
//! hold a `Box<dyn PlaybackEngine>` chosen at startup.
//!
//! * [`RodioPlayback`]: decodes the fetched audio with `rodio` and plays it
//!   on the default output device.  The position is the sink's own playback
//!   position, so buffering and device latency never put the highlight ahead
//!   of the speech.
//! * `ClockPlayback` (tests only): silent; the position is wall-clock time
//!   since `play()`.

use std::io::Cursor;
use std::sync::mpsc;
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;

use crate::config::PlaybackConfig;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors that can occur when starting playback.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// `play()` was called before any audio was loaded.
    #[error("no audio loaded")]
    NoSource,

    /// The audio bytes are not in a format the decoder understands.
    #[error("failed to decode audio: {source}")]
    Decode {
        #[source]
        source: rodio::decoder::DecoderError,
    },

    /// No output device could be opened, or it refused a new sink.
    #[error("audio output unavailable: {0}")]
    Output(String),
}

// ---------------------------------------------------------------------------
// PlaybackEngine trait
// ---------------------------------------------------------------------------

/// Object-safe interface for anything that can play the synthesized audio
/// and report where it is.
pub trait PlaybackEngine: Send {
    /// Replace the loaded audio with `audio` (encoded bytes as served by the
    /// synthesis service).  Stops any playback in progress.
    fn load(&mut self, audio: Vec<u8>);

    /// Start playing the loaded audio from the beginning.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Current position in milliseconds, or `None` when not playing.
    fn position_ms(&self) -> Option<u64>;

    /// Returns `true` exactly once after the current playback reaches its
    /// end.
    fn poll_ended(&mut self) -> bool;

    /// Stop playback.  Does not report an end.
    fn stop(&mut self);
}

// Compile-time assertion: Box<dyn PlaybackEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn PlaybackEngine>) {}
};

/// Build the playback engine described by `config`.
pub fn engine_from_config(config: &PlaybackConfig) -> Box<dyn PlaybackEngine> {
    log::info!("playback: rodio output, volume {:.2}", config.volume);
    Box::new(RodioPlayback::new(config.volume))
}

// ---------------------------------------------------------------------------
// OutputDevice
// ---------------------------------------------------------------------------

/// The default output stream, kept alive on its own thread.
///
/// `rodio::OutputStream` is not `Send`, so it lives on `audio-output` until
/// the device is dropped.  Only the `Send` handle is shared.
struct OutputDevice {
    handle: OutputStreamHandle,
    _keep_alive: mpsc::Sender<()>,
}

impl OutputDevice {
    fn open() -> Result<Self, PlaybackError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (keep_alive, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("audio-output".into())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if ready_tx.send(Ok(handle)).is_ok() {
                        // Returns once every sender is gone.
                        let _ = shutdown_rx.recv();
                    }
                    drop(stream);
                    log::debug!("playback: output stream closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| PlaybackError::Output(e.to_string()))?;

        let handle = ready_rx
            .recv()
            .map_err(|e| PlaybackError::Output(e.to_string()))?
            .map_err(PlaybackError::Output)?;
        log::info!("playback: opened default output device");

        Ok(Self {
            handle,
            _keep_alive: keep_alive,
        })
    }
}

// ---------------------------------------------------------------------------
// RodioPlayback
// ---------------------------------------------------------------------------

/// Decode `bytes` (OGG/Vorbis, WAV, MP3 or FLAC) into a playable source.
fn decode(bytes: Vec<u8>) -> Result<Decoder<Cursor<Vec<u8>>>, PlaybackError> {
    Decoder::new(Cursor::new(bytes)).map_err(|source| PlaybackError::Decode { source })
}

/// `rodio`-backed engine playing in-memory audio on the default device.
///
/// The output device is opened on the first `play()`, so a machine without
/// audio output only fails when playback is actually requested.
pub struct RodioPlayback {
    volume: f32,
    audio: Option<Vec<u8>>,
    output: Option<OutputDevice>,
    sink: Option<Sink>,
}

impl RodioPlayback {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            audio: None,
            output: None,
            sink: None,
        }
    }

    fn open_sink(&mut self) -> Result<Sink, PlaybackError> {
        let output = match self.output.take() {
            Some(output) => output,
            None => OutputDevice::open()?,
        };
        let sink = Sink::try_new(&output.handle);
        self.output = Some(output);
        sink.map_err(|e| PlaybackError::Output(e.to_string()))
    }
}

impl std::fmt::Debug for RodioPlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioPlayback")
            .field("volume", &self.volume)
            .field("audio_bytes", &self.audio.as_ref().map(Vec::len))
            .field("device_open", &self.output.is_some())
            .field("playing", &self.sink.is_some())
            .finish()
    }
}

impl PlaybackEngine for RodioPlayback {
    fn load(&mut self, audio: Vec<u8>) {
        self.stop();
        log::debug!("playback: loaded {} bytes of audio", audio.len());
        self.audio = Some(audio);
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let bytes = self.audio.clone().ok_or(PlaybackError::NoSource)?;
        self.stop();

        let source = decode(bytes)?;
        let sink = self.open_sink()?;
        sink.set_volume(self.volume);
        sink.append(source);
        sink.play();

        self.sink = Some(sink);
        Ok(())
    }

    fn position_ms(&self) -> Option<u64> {
        self.sink
            .as_ref()
            .map(|sink| sink.get_pos().as_millis() as u64)
    }

    fn poll_ended(&mut self) -> bool {
        if self.sink.as_ref().is_some_and(|sink| sink.empty()) {
            log::debug!("playback: sink drained");
            self.sink = None;
            true
        } else {
            false
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

// ---------------------------------------------------------------------------
// ClockPlayback
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use clock::ClockPlayback;


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::Source;
    use std::time::{Duration, Instant};

    /// 16-bit mono PCM WAV of silence.
    fn silent_wav(sample_rate: u32, millis: u32) -> Vec<u8> {
        let samples = sample_rate * millis / 1000;
        let data_len = samples * 2;
        let mut wav = Vec::with_capacity(44 + data_len as usize);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        wav.resize(44 + data_len as usize, 0);
        wav
    }

    // -----------------------------------------------------------------------
    // RodioPlayback
    // -----------------------------------------------------------------------

    #[test]
    fn decodes_wav_bytes() {
        let source = decode(silent_wav(8_000, 100)).expect("valid wav");
        assert_eq!(source.channels(), 1);
        assert_eq!(source.sample_rate(), 8_000);
    }

    #[test]
    fn rodio_requires_audio() {
        let mut engine = RodioPlayback::new(1.0);
        assert!(matches!(engine.play(), Err(PlaybackError::NoSource)));
        assert_eq!(engine.position_ms(), None);
        assert!(!engine.poll_ended());
    }

    #[test]
    fn rodio_rejects_undecodable_audio() {
        let mut engine = RodioPlayback::new(1.0);
        engine.load(b"<html>not found</html>".to_vec());
        assert!(matches!(engine.play(), Err(PlaybackError::Decode { .. })));
        assert_eq!(engine.position_ms(), None);
        assert!(!engine.poll_ended());
    }

    #[test]
    fn rodio_loaded_but_not_playing_has_no_position() {
        let mut engine = RodioPlayback::new(0.0);
        engine.load(silent_wav(8_000, 100));
        assert_eq!(engine.position_ms(), None);
        assert!(!engine.poll_ended());
    }

    #[test]
    fn rodio_volume_is_clamped() {
        assert_eq!(RodioPlayback::new(3.0).volume, 1.0);
        assert_eq!(RodioPlayback::new(-1.0).volume, 0.0);
    }

    /// Needs an output device; machines without one must report `Output`.
    #[test]
    fn rodio_plays_to_the_end_once() {
        let mut engine = RodioPlayback::new(0.0);
        engine.load(silent_wav(8_000, 200));

        match engine.play() {
            Ok(()) => {}
            Err(PlaybackError::Output(_)) => return,
            Err(e) => panic!("unexpected playback error: {e}"),
        }
        assert!(engine.position_ms().is_some());

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut ended = false;
        while Instant::now() < deadline {
            if engine.poll_ended() {
                ended = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(ended, "playback never drained");
        assert!(!engine.poll_ended());
        assert_eq!(engine.position_ms(), None);
    }

    #[test]
    fn rodio_stop_and_reload_end_playback_silently() {
        let mut engine = RodioPlayback::new(0.0);
        engine.load(silent_wav(8_000, 2_000));

        match engine.play() {
            Ok(()) => {}
            Err(PlaybackError::Output(_)) => return,
            Err(e) => panic!("unexpected playback error: {e}"),
        }
        engine.stop();
        assert_eq!(engine.position_ms(), None);
        assert!(!engine.poll_ended());

        engine.play().expect("device already open");
        engine.load(silent_wav(8_000, 2_000));
        assert_eq!(engine.position_ms(), None);
        assert!(!engine.poll_ended());
    }

    #[test]
    fn engine_from_config_starts_idle() {
        let mut engine = engine_from_config(&PlaybackConfig::default());
        assert_eq!(engine.position_ms(), None);
        assert!(matches!(engine.play(), Err(PlaybackError::NoSource)));
    }

    // -----------------------------------------------------------------------
    // ClockPlayback
    // -----------------------------------------------------------------------

    #[test]
    fn clock_requires_audio() {
        let mut engine = ClockPlayback::new(Duration::from_secs(1));
        assert!(matches!(engine.play(), Err(PlaybackError::NoSource)));
        assert_eq!(engine.position_ms(), None);
    }

    #[test]
    fn clock_position_is_capped_and_ends_once() {
        let mut engine = ClockPlayback::new(Duration::from_millis(500));
        engine.load(Vec::new());
        engine.play().unwrap();
        assert!(!engine.poll_ended());

        engine.start_at(Duration::from_millis(2_000));
        assert_eq!(engine.position_ms(), Some(500));
        assert!(engine.poll_ended());
        assert!(!engine.poll_ended());
        assert_eq!(engine.position_ms(), None);
    }

    #[test]
    fn clock_stop_does_not_report_end() {
        let mut engine = ClockPlayback::new(Duration::ZERO);
        engine.load(Vec::new());
        engine.play().unwrap();
        engine.stop();
        assert!(!engine.poll_ended());
    }
}
