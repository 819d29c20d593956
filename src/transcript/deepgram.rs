use super::messages::{parse_message, CLOSE_STREAM_MESSAGE, KEEPALIVE_MESSAGE};
use super::transcriber::{Transcriber, TranscriberLink, TranscriptEvent, UpstreamCommand};
use crate::config::TranscriptionConfig;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info};

/// How long to wait for the upstream to close after `CloseStream`
const FINISH_GRACE: Duration = Duration::from_secs(5);

/// Live transcription client for the Deepgram streaming API
pub struct DeepgramTranscriber {
    config: TranscriptionConfig,
    api_key: String,
}

impl DeepgramTranscriber {
    pub fn new(config: TranscriptionConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
        }
    }

    /// Listen URL with the model options encoded as query parameters
    pub fn listen_url(&self) -> Result<String> {
        let url = reqwest::Url::parse_with_params(
            &self.config.url,
            &[
                ("language", self.config.language.clone()),
                ("punctuate", self.config.punctuate.to_string()),
                ("smart_format", self.config.smart_format.to_string()),
                ("model", self.config.model.clone()),
                ("endpointing", self.config.endpointing_ms.to_string()),
            ],
        )
        .context("Invalid transcription URL")?;

        Ok(url.into())
    }
}

impl Transcriber for DeepgramTranscriber {
    fn open(&self) -> TranscriberLink {
        let (command_tx, command_rx) = mpsc::channel(256);
        let (event_tx, event_rx) = mpsc::channel(256);

        let url = self.listen_url();
        let api_key = self.api_key.clone();

        tokio::spawn(async move {
            let result = match url {
                Ok(url) => run_connection(url, api_key, command_rx, event_tx.clone()).await,
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                error!("deepgram: {:#}", e);
                let _ = event_tx.send(TranscriptEvent::Error(format!("{:#}", e))).await;
            }
        });

        TranscriberLink {
            commands: command_tx,
            events: event_rx,
        }
    }

    fn name(&self) -> &str {
        "deepgram"
    }
}

async fn run_connection(
    url: String,
    api_key: String,
    mut commands: mpsc::Receiver<UpstreamCommand>,
    events: mpsc::Sender<TranscriptEvent>,
) -> Result<()> {
    let mut request = url
        .into_client_request()
        .context("Failed to build transcription request")?;
    request.headers_mut().insert(
        "Authorization",
        format!("Token {}", api_key)
            .parse()
            .context("Invalid transcription auth header")?,
    );

    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .context("Failed to connect to Deepgram")?;

    info!("deepgram: connected");
    if events.send(TranscriptEvent::Opened).await.is_err() {
        return Ok(());
    }

    let (mut sender, mut receiver) = ws_stream.split();
    let mut finish_deadline: Option<Instant> = None;
    let mut frames_sent: u64 = 0;

    loop {
        tokio::select! {
            command = commands.recv(), if finish_deadline.is_none() => match command {
                Some(UpstreamCommand::Audio(frame)) => {
                    frames_sent += 1;
                    sender
                        .send(WsMessage::Binary(frame))
                        .await
                        .context("Failed to send audio to Deepgram")?;
                }
                Some(UpstreamCommand::KeepAlive) => {
                    sender
                        .send(WsMessage::Text(KEEPALIVE_MESSAGE.to_string()))
                        .await
                        .context("Failed to send keep-alive")?;
                }
                Some(UpstreamCommand::Finish) | None => {
                    debug!(frames_sent, "deepgram: finishing stream");
                    let _ = sender
                        .send(WsMessage::Text(CLOSE_STREAM_MESSAGE.to_string()))
                        .await;
                    finish_deadline = Some(Instant::now() + FINISH_GRACE);
                }
            },
            message = receiver.next() => match message {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Some(event) = parse_message(&text) {
                        if events.send(event).await.is_err() {
                            debug!("deepgram: adapter dropped, closing");
                            let _ = sender.send(WsMessage::Close(None)).await;
                            return Ok(());
                        }
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    info!(close_frame = ?frame, "deepgram: disconnected");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return Err(e).context("Deepgram socket error");
                }
                None => break,
            },
            _ = sleep_until(finish_deadline.unwrap_or_else(Instant::now)), if finish_deadline.is_some() => {
                debug!("deepgram: no close after finish, dropping socket");
                let _ = sender.send(WsMessage::Close(None)).await;
                break;
            }
        }
    }

    let _ = events.send(TranscriptEvent::Closed).await;
    Ok(())
}
