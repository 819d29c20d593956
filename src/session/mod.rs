//! Conversation session management
//!
//! This module provides the `ConversationSession` that owns everything scoped
//! to one client connection:
//! - The transcription adapter (recreated after upstream failures)
//! - Conversation history and turn sequencing
//! - Response pipeline tasks
//! - Session statistics

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::{ClientFrame, Collaborators, ConversationSession};
pub use stats::SessionStats;
