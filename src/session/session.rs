use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::client::ClientMultiplexer;
use crate::conversation::ConversationHistory;
use crate::pipeline::{CompletionClient, PipelineEvent, ResponsePipeline, SpeechSynthesizer};
use crate::transcript::{TranscriptAdapter, TranscriptEvent, Transcriber};
use crate::turn::{ChunkVerdict, FinalDisposition, TurnSequencer};
use chrono::Utc;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Inbound traffic from the client socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// Raw microphone audio, forwarded verbatim
    Audio(Vec<u8>),
    Close,
}

/// External services a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub transcriber: Arc<dyn Transcriber>,
    pub completion: Arc<dyn CompletionClient>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

#[derive(Debug, Default)]
struct Counters {
    utterances: usize,
    committed: usize,
    superseded: usize,
    aborted: usize,
    chunks_sent: usize,
    chunks_dropped: usize,
    reconnects: usize,
}

/// Controller for one client connection.
///
/// `run` is the only place any per-connection state changes: client frames,
/// transcript events and pipeline reports are handled one at a time, so the
/// generation counters need no locking.
pub struct ConversationSession {
    id: String,
    config: SessionConfig,
    transcriber: Arc<dyn Transcriber>,
    pipeline: ResponsePipeline,
    sequencer: TurnSequencer,
    history: ConversationHistory,
    adapter: Option<TranscriptAdapter>,
    client: ClientMultiplexer,
    latest_generation: watch::Sender<u64>,
    pipeline_tx: mpsc::UnboundedSender<PipelineEvent>,
    pipeline_rx: mpsc::UnboundedReceiver<PipelineEvent>,
    tasks: JoinSet<()>,
    counters: Counters,
    started_at: chrono::DateTime<Utc>,
}

impl ConversationSession {
    /// Create the session and start connecting to the transcription service
    pub fn new(
        id: impl Into<String>,
        config: SessionConfig,
        collaborators: Collaborators,
        client: ClientMultiplexer,
    ) -> Self {
        let id = id.into();
        info!("Creating conversation session: {}", id);

        let (pipeline_tx, pipeline_rx) = mpsc::unbounded_channel();
        let (latest_generation, _) = watch::channel(0);
        let adapter =
            TranscriptAdapter::open(collaborators.transcriber.as_ref(), config.keepalive_interval);

        Self {
            sequencer: TurnSequencer::new(&config.termination_keyword),
            history: ConversationHistory::new(config.system_prompt.clone()),
            pipeline: ResponsePipeline::new(collaborators.completion, collaborators.synthesizer),
            transcriber: collaborators.transcriber,
            adapter: Some(adapter),
            id,
            config,
            client,
            latest_generation,
            pipeline_tx,
            pipeline_rx,
            tasks: JoinSet::new(),
            counters: Counters::default(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn sequencer(&self) -> &TurnSequencer {
        &self.sequencer
    }

    pub fn adapter(&self) -> Option<&TranscriptAdapter> {
        self.adapter.as_ref()
    }

    /// Process events until the client leaves or the conversation is
    /// terminated, then tear everything down.
    pub async fn run(&mut self, mut frames: mpsc::Receiver<ClientFrame>) -> SessionStats {
        info!("Conversation session started: {}", self.id);

        loop {
            // Transcript events win ties so an utterance bump always lands
            // before a commit check racing with it.
            tokio::select! {
                biased;

                event = next_transcript(&mut self.adapter) => {
                    if self.on_transcript(event).is_break() {
                        break;
                    }
                }
                Some(event) = self.pipeline_rx.recv() => self.on_pipeline(event),
                frame = frames.recv() => match frame {
                    Some(ClientFrame::Audio(bytes)) => self.on_client_audio(bytes),
                    Some(ClientFrame::Close) | None => {
                        info!("socket: client disconnected");
                        break;
                    }
                },
            }
        }

        self.teardown();
        let stats = self.stats();
        info!(
            "Conversation session ended: {} ({} utterances, {} responses, {:.1}s)",
            self.id, stats.utterances, stats.responses_committed, stats.duration_secs
        );
        stats
    }

    pub fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            connection_id: self.id.clone(),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            utterances: self.counters.utterances,
            responses_committed: self.counters.committed,
            responses_superseded: self.counters.superseded,
            responses_aborted: self.counters.aborted,
            chunks_sent: self.counters.chunks_sent,
            chunks_dropped: self.counters.chunks_dropped,
            transcriber_reconnects: self.counters.reconnects,
            history_len: self.history.len(),
        }
    }

    fn on_client_audio(&mut self, frame: Vec<u8>) {
        match self.adapter.as_ref() {
            Some(adapter) if adapter.is_ready() => {
                adapter.send_audio(frame);
            }
            Some(adapter) if !adapter.is_dead() => {
                debug!("socket: data couldn't be sent, transcription still connecting");
            }
            _ => {
                warn!("socket: data couldn't be sent to transcription, reconnecting");
                self.reconnect();
            }
        }
    }

    /// Replace a dead adapter with a fresh one. History and sequencing carry over.
    fn reconnect(&mut self) {
        if let Some(mut stale) = self.adapter.take() {
            stale.finish();
        }
        self.adapter = Some(TranscriptAdapter::open(
            self.transcriber.as_ref(),
            self.config.keepalive_interval,
        ));
        self.counters.reconnects += 1;
    }

    fn on_transcript(&mut self, event: TranscriptEvent) -> ControlFlow<()> {
        match event {
            TranscriptEvent::Transcript {
                text,
                is_final: true,
            } => return self.on_final(text),
            TranscriptEvent::Transcript {
                text,
                is_final: false,
            } => debug!("Partial transcript: {}", text),
            TranscriptEvent::Metadata(metadata) => {
                debug!("metadata relayed to client");
                self.client.metadata(metadata);
            }
            TranscriptEvent::Opened => {}
            TranscriptEvent::Closed => {
                info!("Transcription closed; a fresh stream opens on the next frame");
            }
            TranscriptEvent::Error(message) => {
                error!("Transcription error, stream discarded: {}", message);
            }
        }
        ControlFlow::Continue(())
    }

    fn on_final(&mut self, text: String) -> ControlFlow<()> {
        match self.sequencer.on_final_utterance(&text) {
            FinalDisposition::Ignored => ControlFlow::Continue(()),
            FinalDisposition::Terminate => {
                info!("Caption: {}", text);
                self.client.caption(text.trim());
                self.client.caption(self.config.termination_caption.clone());
                if let Some(adapter) = self.adapter.as_mut() {
                    adapter.finish();
                }
                self.client.close();
                ControlFlow::Break(())
            }
            FinalDisposition::Respond {
                utterance,
                interrupt,
            } => {
                if interrupt {
                    info!("Stopping the audio");
                    self.client.stop();
                    self.counters.superseded += 1;
                }

                info!(generation = utterance.generation, "Caption: {}", utterance.text);
                self.client.caption(utterance.text.clone());
                self.client.announce(utterance.generation, None);
                self.counters.utterances += 1;

                self.latest_generation.send_replace(utterance.generation);
                let work = self.pipeline.start(
                    &utterance,
                    &mut self.history,
                    self.latest_generation.subscribe(),
                    self.pipeline_tx.clone(),
                );
                self.tasks.spawn(work);

                ControlFlow::Continue(())
            }
        }
    }

    fn on_pipeline(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Reply { generation, text } => {
                // Only the newest turn's reply follows its user message directly
                if generation == self.sequencer.utterance_generation() {
                    debug!(generation, "Assistant reply recorded");
                    self.history.push_assistant(text);
                } else {
                    debug!(
                        generation,
                        current = self.sequencer.utterance_generation(),
                        "Superseded reply discarded from history"
                    );
                }
            }
            PipelineEvent::Audio { generation, chunk } => {
                match self.sequencer.on_audio_chunk(generation) {
                    ChunkVerdict::Commit { sid1, sid2 } => {
                        info!(sid1, sid2, "Response committed");
                        self.counters.committed += 1;
                        self.client.announce(sid1, Some(sid2));
                        self.client.audio(chunk, sid1, sid2);
                        self.counters.chunks_sent += 1;
                    }
                    ChunkVerdict::Forward { sid1, sid2 } => {
                        self.client.audio(chunk, sid1, sid2);
                        self.counters.chunks_sent += 1;
                    }
                    ChunkVerdict::Drop => {
                        self.counters.chunks_dropped += 1;
                    }
                }
            }
            PipelineEvent::Finished { generation, chunks } => {
                let current = self.sequencer.on_pipeline_finished(generation);
                debug!(generation, chunks, current, "Response pipeline finished");
            }
            PipelineEvent::Aborted { generation, error } => {
                error!(generation, "Response discarded: {}", error);
                if self.sequencer.on_pipeline_aborted(generation) {
                    self.counters.aborted += 1;
                }
            }
        }
    }

    fn teardown(&mut self) {
        self.tasks.abort_all();
        if let Some(mut adapter) = self.adapter.take() {
            adapter.finish();
        }
        self.pipeline_rx.close();
    }
}

async fn next_transcript(adapter: &mut Option<TranscriptAdapter>) -> TranscriptEvent {
    match adapter {
        Some(adapter) => adapter.next_event().await,
        None => std::future::pending().await,
    }
}
