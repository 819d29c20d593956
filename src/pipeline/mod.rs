//! Response pipeline: completion, then streamed synthesis
//!
//! Each finalized utterance starts one pipeline task. The task reports back
//! to the connection's event loop through `PipelineEvent`s; whether any of
//! its audio reaches the client is decided there, chunk by chunk.

pub mod completion;
pub mod response;
pub mod synthesis;

pub use completion::{CompletionClient, GroqCompletion};
pub use response::{PipelineEvent, ResponsePipeline};
pub use synthesis::{AudioStream, PlayHtSynthesizer, SpeechSynthesizer};
