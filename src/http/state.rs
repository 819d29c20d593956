use crate::config::{Config, Credentials};
use crate::error::ConverseResult;
use crate::pipeline::{GroqCompletion, PlayHtSynthesizer};
use crate::session::{Collaborators, SessionConfig};
use crate::transcript::DeepgramTranscriber;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream services every new connection is wired to
    pub collaborators: Collaborators,

    /// Template for per-connection sessions
    pub session_config: SessionConfig,

    /// Static asset root
    pub public_dir: PathBuf,
}

impl AppState {
    /// Build the production collaborators from config and credentials
    pub fn new(config: &Config, credentials: &Credentials) -> ConverseResult<Self> {
        let collaborators = Collaborators {
            transcriber: Arc::new(DeepgramTranscriber::new(
                config.transcription.clone(),
                credentials.deepgram_api_key.clone(),
            )),
            completion: Arc::new(GroqCompletion::new(
                config.completion.clone(),
                credentials.groq_api_key.clone(),
            )?),
            synthesizer: Arc::new(PlayHtSynthesizer::new(
                config.synthesis.clone(),
                credentials.play_api_key.clone(),
                credentials.play_user_id.clone(),
            )?),
        };

        Ok(Self::with_collaborators(
            collaborators,
            SessionConfig::from_config(config),
            config.service.http.public_dir.clone(),
        ))
    }

    pub fn with_collaborators(
        collaborators: Collaborators,
        session_config: SessionConfig,
        public_dir: PathBuf,
    ) -> Self {
        Self {
            collaborators,
            session_config,
            public_dir,
        }
    }
}
