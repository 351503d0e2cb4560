//! Wire types returned by the synthesis service.

use serde::{Deserialize, Deserializer, Serialize};

use crate::align::Annotation;

// ---------------------------------------------------------------------------
// SynthesisResponse
// ---------------------------------------------------------------------------

/// Body of a successful `POST /synthesize`.
///
/// `words` is parsed leniently: a missing, `null` or non-array value yields
/// an empty list, and individual entries that do not parse are dropped.  An
/// incomplete annotation list only means fewer highlighted words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResponse {
    /// The text that was synthesized, echoed back by the service.
    pub original_text: String,
    /// Word timings, in whatever order the service produced them.
    #[serde(default, deserialize_with = "deserialize_words")]
    pub words: Vec<Annotation>,
    /// Where the synthesized audio can be fetched.
    pub audio_url: String,
}

impl SynthesisResponse {
    /// End of the last spoken word, used as the expected audio length.
    pub fn spoken_duration_ms(&self) -> u64 {
        self.words.iter().map(|w| w.end_time).max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// SynthesizedSpeech
// ---------------------------------------------------------------------------

/// A synthesis response together with the audio it points at.
#[derive(Clone, PartialEq)]
pub struct SynthesizedSpeech {
    pub response: SynthesisResponse,
    /// Encoded audio fetched from `response.audio_url`.
    pub audio: Vec<u8>,
}

impl std::fmt::Debug for SynthesizedSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizedSpeech")
            .field("response", &self.response)
            .field("audio_bytes", &self.audio.len())
            .finish()
    }
}

fn deserialize_words<'de, D>(deserializer: D) -> Result<Vec<Annotation>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Null => return Ok(Vec::new()),
        _ => {
            log::warn!("synth: `words` is not an array; treating as empty");
            return Ok(Vec::new());
        }
    };

    let total = items.len();
    let words: Vec<Annotation> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if words.len() < total {
        log::warn!(
            "synth: dropped {} of {} malformed word annotations",
            total - words.len(),
            total
        );
    }
    Ok(words)
}

// ---------------------------------------------------------------------------
// ServiceStatus
// ---------------------------------------------------------------------------

/// Body of `GET /`: service identification and health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub service: String,
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl ServiceStatus {
    pub fn is_running(&self) -> bool {
        self.status.eq_ignore_ascii_case("running")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_response() {
        let json = r#"{
            "audio_url": "https://storage/output.ogg",
            "original_text": "Hi there!",
            "words": [
                {"word": "hi", "start_time": 0, "end_time": 400},
                {"word": "there", "start_time": 400, "end_time": 900}
            ]
        }"#;
        let resp: SynthesisResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.original_text, "Hi there!");
        assert_eq!(resp.audio_url, "https://storage/output.ogg");
        assert_eq!(resp.words.len(), 2);
        assert_eq!(resp.spoken_duration_ms(), 900);
    }

    #[test]
    fn missing_words_is_empty() {
        let resp: SynthesisResponse =
            serde_json::from_str(r#"{"original_text":"x","audio_url":"u"}"#).unwrap();
        assert!(resp.words.is_empty());
        assert_eq!(resp.spoken_duration_ms(), 0);
    }

    #[test]
    fn null_or_non_array_words_is_empty() {
        for words in ["null", "{}", "\"hi\"", "3"] {
            let json = format!(r#"{{"original_text":"x","audio_url":"u","words":{words}}}"#);
            let resp: SynthesisResponse = serde_json::from_str(&json).unwrap();
            assert!(resp.words.is_empty(), "words = {words}");
        }
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let json = r#"{
            "original_text": "a b c",
            "audio_url": "u",
            "words": [
                {"word": "a", "start_time": 0, "end_time": 10},
                {"word": "b"},
                "c",
                {"word": "c", "start_time": 20, "end_time": 30}
            ]
        }"#;
        let resp: SynthesisResponse = serde_json::from_str(json).unwrap();
        let words: Vec<&str> = resp.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["a", "c"]);
    }

    #[test]
    fn missing_audio_url_is_an_error() {
        let res: Result<SynthesisResponse, _> =
            serde_json::from_str(r#"{"original_text":"x","words":[]}"#);
        assert!(res.is_err());
    }

    #[test]
    fn speech_debug_elides_audio_bytes() {
        let speech = SynthesizedSpeech {
            response: SynthesisResponse {
                original_text: "x".into(),
                words: Vec::new(),
                audio_url: "u".into(),
            },
            audio: vec![0u8; 4096],
        };
        let debug = format!("{speech:?}");
        assert!(debug.contains("audio_bytes: 4096"));
        assert!(debug.len() < 512);
    }

    #[test]
    fn parses_service_status() {
        let json = r#"{
            "service": "HighlightReader API",
            "status": "running",
            "version": "1.0.0",
            "server_time": "2024-01-01T00:00:00Z"
        }"#;
        let status: ServiceStatus = serde_json::from_str(json).unwrap();
        assert!(status.is_running());
        assert_eq!(status.version.as_deref(), Some("1.0.0"));
    }
}
