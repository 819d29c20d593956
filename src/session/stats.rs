use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics about a conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub connection_id: String,

    /// When the client connected
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Finalized utterances that started a response
    pub utterances: usize,

    pub responses_committed: usize,

    /// Responses interrupted by a newer utterance
    pub responses_superseded: usize,

    pub responses_aborted: usize,

    /// Audio chunks relayed to the client
    pub chunks_sent: usize,

    /// Audio chunks that failed the commit check
    pub chunks_dropped: usize,

    /// Fresh transcription adapters opened after the first one
    pub transcriber_reconnects: usize,

    /// Messages in history, system prompt included
    pub history_len: usize,
}
