//! Upstream speech-to-text stream
//!
//! - `transcriber` - collaborator trait and the channel pair it hands out
//! - `adapter` - connection lifecycle state machine with keep-alive
//! - `deepgram` - live transcription over a WebSocket
//! - `messages` - upstream wire format

pub mod adapter;
pub mod deepgram;
pub mod messages;
pub mod transcriber;

pub use adapter::{AdapterSignal, AdapterState, TranscriptAdapter};
pub use deepgram::DeepgramTranscriber;
pub use transcriber::{Transcriber, TranscriberLink, TranscriptEvent, UpstreamCommand};
