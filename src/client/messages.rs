use serde::{Deserialize, Serialize};

/// Message sent to the browser, one JSON object per WebSocket text frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Echo of a finalized transcript
    Caption { output: String },

    /// Generation announcement; `sid2` is present once a response is committed
    AudioSession {
        sid1: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sid2: Option<u64>,
    },

    /// One synthesized audio chunk, serialized as a byte array
    Audio { output: Vec<u8>, sid1: u64, sid2: u64 },

    /// Stop playback of the current response immediately
    AudioStop { stop: bool },

    /// Upstream transcription metadata, passed through untouched
    Metadata { metadata: serde_json::Value },
}

impl ClientMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
