use tokio::sync::mpsc;

/// Event reported by a transcription connection
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEvent {
    /// Upstream acknowledged the connection
    Opened,
    /// Partial or final transcript
    Transcript { text: String, is_final: bool },
    /// Upstream metadata, relayed to the client untouched
    Metadata(serde_json::Value),
    Closed,
    Error(String),
}

/// Instruction sent to a transcription connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamCommand {
    /// Raw audio frame, forwarded verbatim
    Audio(Vec<u8>),
    KeepAlive,
    /// Flush pending audio and close gracefully
    Finish,
}

/// Channel pair for one upstream connection
#[derive(Debug)]
pub struct TranscriberLink {
    pub commands: mpsc::Sender<UpstreamCommand>,
    pub events: mpsc::Receiver<TranscriptEvent>,
}

/// Transcription collaborator.
///
/// `open` returns immediately; the connection is established in the
/// background and reports `Opened` (or `Error`) on the event channel.
pub trait Transcriber: Send + Sync {
    fn open(&self) -> TranscriberLink;

    /// Name for logging
    fn name(&self) -> &str;
}
