use super::transcriber::TranscriptEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const KEEPALIVE_MESSAGE: &str = r#"{"type":"KeepAlive"}"#;
pub const CLOSE_STREAM_MESSAGE: &str = r#"{"type":"CloseStream"}"#;

/// `Results` message from the live transcription API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsMessage {
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub speech_final: bool,
    pub channel: Channel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    #[serde(default)]
    pub punctuated_word: Option<String>,
}

impl ResultsMessage {
    /// Caption text: punctuated words joined by spaces, or the raw transcript
    /// when no word list came back. Blank transcripts yield `None`.
    pub fn caption(&self) -> Option<String> {
        let alternative = self.channel.alternatives.first()?;
        if alternative.transcript.trim().is_empty() {
            return None;
        }

        if alternative.words.is_empty() {
            return Some(alternative.transcript.trim().to_string());
        }

        let caption = alternative
            .words
            .iter()
            .map(|w| w.punctuated_word.as_deref().unwrap_or(&w.word))
            .collect::<Vec<_>>()
            .join(" ");
        Some(caption)
    }
}

/// Map one upstream text frame to the event it represents, if any
pub fn parse_message(text: &str) -> Option<TranscriptEvent> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse transcription message: {}", e);
            return None;
        }
    };

    match value.get("type").and_then(|t| t.as_str()) {
        Some("Results") => match serde_json::from_value::<ResultsMessage>(value) {
            Ok(results) => results.caption().map(|text| TranscriptEvent::Transcript {
                text,
                is_final: results.is_final,
            }),
            Err(e) => {
                warn!("Malformed Results message: {}", e);
                None
            }
        },
        Some("Metadata") => Some(TranscriptEvent::Metadata(value)),
        Some(kind @ ("SpeechStarted" | "UtteranceEnd")) => {
            debug!("Transcription signal: {}", kind);
            None
        }
        Some("Warning") => {
            warn!("Transcription warning: {}", value);
            None
        }
        Some("Error") => Some(TranscriptEvent::Error(value.to_string())),
        other => {
            warn!("Unknown transcription message type: {:?}", other);
            None
        }
    }
}
