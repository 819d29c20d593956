use crate::conversation::DEFAULT_SYSTEM_PROMPT;
use crate::error::{ConverseError, ConverseResult};
use anyhow::Result;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub transcription: TranscriptionConfig,
    pub completion: CompletionConfig,
    pub synthesis: SynthesisConfig,
    pub conversation: ConversationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "loqa-converse".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    /// Directory served as static assets (index.html lives here)
    pub public_dir: PathBuf,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub url: String,
    pub model: String,
    pub language: String,
    pub punctuate: bool,
    pub smart_format: bool,
    /// Silence (ms) after which the upstream finalizes an utterance
    pub endpointing_ms: u32,
    pub keepalive_secs: u64,
}

impl TranscriptionConfig {
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs.max(1))
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            url: "wss://api.deepgram.com/v1/listen".to_string(),
            model: "nova-2-phonecall".to_string(),
            language: "en".to_string(),
            punctuate: true,
            smart_format: true,
            endpointing_ms: 400,
            keepalive_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-8b-8192".to_string(),
            temperature: 0.7,
            max_tokens: 256,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub url: String,
    pub voice: String,
    pub voice_engine: String,
    pub output_format: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            url: "https://api.play.ht/api/v2/tts/stream".to_string(),
            voice: "s3://voice-cloning-zero-shot/d9ff78ba-d016-47f6-b0ef-dd630f59414e/female-cs/manifest.json"
                .to_string(),
            voice_engine: "PlayHT2.0-turbo".to_string(),
            output_format: "mp3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Saying this word ends the conversation instead of producing a reply
    pub termination_keyword: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            termination_keyword: "disconnect".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only log file; `None` logs to stdout only
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from("logs.txt")),
        }
    }
}

impl Config {
    /// Load from an optional config file, then `LOQA__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("LOQA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(ConverseError::from)?;

        Ok(settings.try_deserialize().map_err(ConverseError::from)?)
    }
}

/// API credentials for the three upstream services
#[derive(Clone)]
pub struct Credentials {
    pub deepgram_api_key: String,
    pub groq_api_key: String,
    pub play_api_key: String,
    pub play_user_id: String,
}

impl Credentials {
    pub const REQUIRED: [&'static str; 4] =
        ["DEEPGRAM_API_KEY", "GROQ_API_KEY", "PLAY_API_KEY", "PLAY_USERID"];

    pub fn from_env() -> ConverseResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Every missing (or blank) variable is reported, not just the first
    pub fn from_lookup<F>(lookup: F) -> ConverseResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Vec::with_capacity(Self::REQUIRED.len());
        let mut missing = Vec::new();

        for key in Self::REQUIRED {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(value) => values.push(value),
                None => missing.push(key.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ConverseError::MissingCredentials(missing));
        }

        let mut values = values.into_iter();
        Ok(Self {
            deepgram_api_key: values.next().unwrap_or_default(),
            groq_api_key: values.next().unwrap_or_default(),
            play_api_key: values.next().unwrap_or_default(),
            play_user_id: values.next().unwrap_or_default(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("deepgram_api_key", &"<redacted>")
            .field("groq_api_key", &"<redacted>")
            .field("play_api_key", &"<redacted>")
            .field("play_user_id", &self.play_user_id)
            .finish()
    }
}
