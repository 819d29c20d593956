use crate::config::Config;
use crate::conversation::DEFAULT_SYSTEM_PROMPT;
use std::time::Duration;

/// Configuration for a conversation session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed first message of the history
    pub system_prompt: String,

    /// Final transcript containing this word ends the conversation
    pub termination_keyword: String,

    /// Caption sent right before the connection is closed on termination
    pub termination_caption: String,

    /// Keep-alive period for the transcription stream
    pub keepalive_interval: Duration,
}

impl SessionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            system_prompt: config.completion.system_prompt.clone(),
            termination_keyword: config.conversation.termination_keyword.clone(),
            keepalive_interval: config.transcription.keepalive_interval(),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            termination_keyword: "disconnect".to_string(),
            termination_caption: "#assistant stopped#".to_string(),
            keepalive_interval: Duration::from_secs(10),
        }
    }
}
