pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod http;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod transcript;
pub mod turn;

pub use client::{ClientMessage, ClientMultiplexer, Outbound};
pub use config::{Config, Credentials};
pub use conversation::{ConversationHistory, ConversationMessage, Role};
pub use error::{ConverseError, ConverseResult};
pub use http::{create_router, AppState};
pub use pipeline::{CompletionClient, PipelineEvent, ResponsePipeline, SpeechSynthesizer};
pub use session::{ClientFrame, Collaborators, ConversationSession, SessionConfig, SessionStats};
pub use transcript::{AdapterState, TranscriptAdapter, TranscriptEvent, Transcriber};
pub use turn::{ChunkVerdict, FinalDisposition, TurnSequencer, Utterance};
