#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use loqa_converse::client::{ClientMultiplexer, Outbound};
use loqa_converse::pipeline::{AudioStream, CompletionClient, SpeechSynthesizer};
use loqa_converse::session::{ClientFrame, Collaborators, ConversationSession, SessionConfig};
use loqa_converse::transcript::{Transcriber, TranscriberLink, TranscriptEvent, UpstreamCommand};
use loqa_converse::{
    ClientMessage, ConversationHistory, ConversationMessage, ConverseError, ConverseResult, Role,
    SessionStats,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(5);
pub const SLOW_REPLY: Duration = Duration::from_millis(300);

/// Test side of one opened transcription connection
pub struct FakeUpstream {
    pub commands: mpsc::Receiver<UpstreamCommand>,
    pub events: mpsc::Sender<TranscriptEvent>,
}

impl FakeUpstream {
    pub async fn emit(&self, event: TranscriptEvent) {
        self.events.send(event).await.expect("adapter gone");
    }

    pub async fn say(&self, text: &str) {
        self.emit(TranscriptEvent::Transcript {
            text: text.to_string(),
            is_final: true,
        })
        .await;
    }
}

pub struct FakeTranscriber {
    opened: mpsc::UnboundedSender<FakeUpstream>,
}

impl FakeTranscriber {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FakeUpstream>) {
        let (opened, rx) = mpsc::unbounded_channel();
        (Self { opened }, rx)
    }
}

impl Transcriber for FakeTranscriber {
    fn open(&self) -> TranscriberLink {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(64);
        let _ = self.opened.send(FakeUpstream {
            commands: command_rx,
            events: event_tx,
        });
        TranscriberLink {
            commands: command_tx,
            events: event_rx,
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Replies "reply to <last user message>". Fails when that message contains
/// "fail" and takes `SLOW_REPLY` when it contains "slow".
pub struct EchoCompletion;

#[async_trait]
impl CompletionClient for EchoCompletion {
    async fn complete(&self, messages: &[ConversationMessage]) -> ConverseResult<String> {
        let last = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if last.contains("slow") {
            tokio::time::sleep(SLOW_REPLY).await;
        }
        if last.contains("fail") {
            return Err(ConverseError::Completion("scripted failure".to_string()));
        }
        Ok(format!("reply to {}", last))
    }
}

pub struct SynthesisRequest {
    pub text: String,
    pub chunks: futures::channel::mpsc::UnboundedSender<ConverseResult<Vec<u8>>>,
}

impl SynthesisRequest {
    pub fn push(&self, chunk: &[u8]) {
        let _ = self.chunks.unbounded_send(Ok(chunk.to_vec()));
    }

    pub fn fail(&self, message: &str) {
        let _ = self
            .chunks
            .unbounded_send(Err(ConverseError::Synthesis(message.to_string())));
    }
}

pub struct ControlledSynthesizer {
    requests: mpsc::UnboundedSender<SynthesisRequest>,
}

impl ControlledSynthesizer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SynthesisRequest>) {
        let (requests, rx) = mpsc::unbounded_channel();
        (Self { requests }, rx)
    }
}

#[async_trait]
impl SpeechSynthesizer for ControlledSynthesizer {
    async fn synthesize(&self, text: &str) -> ConverseResult<AudioStream> {
        let (tx, rx) = futures::channel::mpsc::unbounded();
        self.requests
            .send(SynthesisRequest {
                text: text.to_string(),
                chunks: tx,
            })
            .map_err(|_| ConverseError::Synthesis("test dropped".to_string()))?;
        Ok(rx.boxed())
    }
}

/// A running session wired to fakes
pub struct Harness {
    pub frames: mpsc::Sender<ClientFrame>,
    pub outbound: mpsc::UnboundedReceiver<Outbound>,
    pub upstreams: mpsc::UnboundedReceiver<FakeUpstream>,
    pub synthesis: mpsc::UnboundedReceiver<SynthesisRequest>,
    pub session: JoinHandle<(SessionStats, ConversationHistory)>,
}

impl Harness {
    pub fn start() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let (transcriber, upstreams) = FakeTranscriber::new();
        let (synthesizer, synthesis) = ControlledSynthesizer::new();
        let collaborators = Collaborators {
            transcriber: Arc::new(transcriber),
            completion: Arc::new(EchoCompletion),
            synthesizer: Arc::new(synthesizer),
        };

        let (client, outbound) = ClientMultiplexer::new();
        let (frames, frame_rx) = mpsc::channel(64);
        let mut session = ConversationSession::new("conn-test", config, collaborators, client);

        let session = tokio::spawn(async move {
            let stats = session.run(frame_rx).await;
            (stats, session.history().clone())
        });

        Self {
            frames,
            outbound,
            upstreams,
            synthesis,
            session,
        }
    }

    pub async fn upstream(&mut self) -> FakeUpstream {
        timeout(WAIT, self.upstreams.recv())
            .await
            .expect("timed out waiting for transcription connection")
            .expect("transcriber dropped")
    }

    /// Next opened upstream, already acknowledged
    pub async fn open_upstream(&mut self) -> FakeUpstream {
        let upstream = self.upstream().await;
        upstream.emit(TranscriptEvent::Opened).await;
        upstream
    }

    pub async fn synthesis_request(&mut self) -> SynthesisRequest {
        timeout(WAIT, self.synthesis.recv())
            .await
            .expect("timed out waiting for synthesis request")
            .expect("synthesizer dropped")
    }

    pub async fn next_outbound(&mut self) -> Outbound {
        timeout(WAIT, self.outbound.recv())
            .await
            .expect("timed out waiting for client message")
            .expect("multiplexer dropped")
    }

    pub async fn next_message(&mut self) -> ClientMessage {
        match self.next_outbound().await {
            Outbound::Message(message) => message,
            Outbound::Close => panic!("unexpected close"),
        }
    }

    /// Collect messages up to and including the first one matching `done`
    pub async fn messages_until<F>(&mut self, done: F) -> Vec<ClientMessage>
    where
        F: Fn(&ClientMessage) -> bool,
    {
        let mut seen = Vec::new();
        loop {
            let message = self.next_message().await;
            let finished = done(&message);
            seen.push(message);
            if finished {
                return seen;
            }
        }
    }

    pub async fn finish(self) -> (SessionStats, ConversationHistory) {
        let _ = self.frames.send(ClientFrame::Close).await;
        timeout(WAIT, self.session)
            .await
            .expect("session did not stop")
            .expect("session panicked")
    }
}

pub fn is_audio(message: &ClientMessage) -> bool {
    matches!(message, ClientMessage::Audio { .. })
}

pub fn audio_for(sid1: u64) -> impl Fn(&ClientMessage) -> bool {
    move |message| matches!(message, ClientMessage::Audio { sid1: s, .. } if *s == sid1)
}
