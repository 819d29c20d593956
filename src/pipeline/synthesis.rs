use crate::config::SynthesisConfig;
use crate::error::{ConverseError, ConverseResult};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use serde::Serialize;

/// Forward-only stream of encoded audio chunks; ends when synthesis is done
pub type AudioStream = BoxStream<'static, ConverseResult<Vec<u8>>>;

/// Text-to-speech collaborator
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> ConverseResult<AudioStream>;
}

#[derive(Debug, Serialize)]
struct StreamRequest<'a> {
    text: &'a str,
    voice: &'a str,
    output_format: &'a str,
    voice_engine: &'a str,
}

/// Streaming synthesis against the PlayHT v2 API
pub struct PlayHtSynthesizer {
    config: SynthesisConfig,
    api_key: String,
    user_id: String,
    client: reqwest::Client,
}

impl PlayHtSynthesizer {
    pub fn new(
        config: SynthesisConfig,
        api_key: impl Into<String>,
        user_id: impl Into<String>,
    ) -> ConverseResult<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            user_id: user_id.into(),
            client,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for PlayHtSynthesizer {
    async fn synthesize(&self, text: &str) -> ConverseResult<AudioStream> {
        let body = StreamRequest {
            text,
            voice: &self.config.voice,
            output_format: &self.config.output_format,
            voice_engine: &self.config.voice_engine,
        };

        let res = self
            .client
            .post(&self.config.url)
            .header("X-USER-ID", &self.user_id)
            .header("AUTHORIZATION", &self.api_key)
            .header("accept", "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ConverseError::Synthesis(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let chunks = res
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ConverseError::from));

        Ok(chunks.boxed())
    }
}
