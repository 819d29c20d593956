use crate::config::CompletionConfig;
use crate::conversation::ConversationMessage;
use crate::error::{ConverseError, ConverseResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Conversational language model: full history in, one reply out
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ConversationMessage]) -> ConverseResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions against Groq's OpenAI-compatible endpoint
pub struct GroqCompletion {
    config: CompletionConfig,
    api_key: String,
    client: reqwest::Client,
}

impl GroqCompletion {
    pub fn new(config: CompletionConfig, api_key: impl Into<String>) -> ConverseResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionClient for GroqCompletion {
    async fn complete(&self, messages: &[ConversationMessage]) -> ConverseResult<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ConverseError::Completion(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let reply: ChatResponse = res.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ConverseError::Completion("empty completion".to_string()))
    }
}
