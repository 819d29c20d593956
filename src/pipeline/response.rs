use super::completion::CompletionClient;
use super::synthesis::SpeechSynthesizer;
use crate::conversation::{ConversationHistory, ConversationMessage};
use crate::error::ConverseError;
use crate::turn::Utterance;
use futures::stream::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Progress report from a running pipeline, tagged with its generation
#[derive(Debug)]
pub enum PipelineEvent {
    /// Completion succeeded; the text belongs in history
    Reply { generation: u64, text: String },
    /// One synthesized chunk, not yet authorized for delivery
    Audio { generation: u64, chunk: Vec<u8> },
    /// Synthesis stream ended (or the pipeline stopped after being superseded)
    Finished { generation: u64, chunks: usize },
    /// Completion or synthesis failed
    Aborted {
        generation: u64,
        error: ConverseError,
    },
}

impl PipelineEvent {
    pub fn generation(&self) -> u64 {
        match self {
            PipelineEvent::Reply { generation, .. }
            | PipelineEvent::Audio { generation, .. }
            | PipelineEvent::Finished { generation, .. }
            | PipelineEvent::Aborted { generation, .. } => *generation,
        }
    }
}

#[derive(Clone)]
pub struct ResponsePipeline {
    completion: Arc<dyn CompletionClient>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl ResponsePipeline {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            completion,
            synthesizer,
        }
    }

    /// Append the user message right away, then return the work that calls
    /// the collaborators. Nothing runs until the returned future is spawned.
    ///
    /// `latest` carries the newest utterance generation; once it moves past
    /// this utterance the pipeline stops pulling synthesis chunks.
    pub fn start(
        &self,
        utterance: &Utterance,
        history: &mut ConversationHistory,
        latest: watch::Receiver<u64>,
        events: mpsc::UnboundedSender<PipelineEvent>,
    ) -> impl Future<Output = ()> + Send + 'static {
        history.push_user(utterance.text.clone());

        let run = PipelineRun {
            generation: utterance.generation,
            messages: history.snapshot(),
            completion: Arc::clone(&self.completion),
            synthesizer: Arc::clone(&self.synthesizer),
            latest,
            events,
        };

        run.execute()
    }
}

struct PipelineRun {
    generation: u64,
    messages: Vec<ConversationMessage>,
    completion: Arc<dyn CompletionClient>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    latest: watch::Receiver<u64>,
    events: mpsc::UnboundedSender<PipelineEvent>,
}

impl PipelineRun {
    fn superseded(&self) -> bool {
        *self.latest.borrow() != self.generation
    }

    fn report(&self, event: PipelineEvent) -> bool {
        self.events.send(event).is_ok()
    }

    fn abort(&self, error: ConverseError) {
        warn!(generation = self.generation, "Response pipeline aborted: {}", error);
        self.report(PipelineEvent::Aborted {
            generation: self.generation,
            error,
        });
    }

    async fn execute(self) {
        let generation = self.generation;
        let started = Instant::now();

        let text = match self.completion.complete(&self.messages).await {
            Ok(text) => text,
            Err(e) => return self.abort(e),
        };
        info!(
            generation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion ready: {}",
            text
        );

        if !self.report(PipelineEvent::Reply {
            generation,
            text: text.clone(),
        }) {
            return;
        }

        if self.superseded() {
            debug!(generation, "Superseded before synthesis, skipping");
            self.report(PipelineEvent::Finished {
                generation,
                chunks: 0,
            });
            return;
        }

        let mut stream = match self.synthesizer.synthesize(&text).await {
            Ok(stream) => stream,
            Err(e) => return self.abort(e),
        };

        let mut chunks = 0;
        while let Some(chunk) = stream.next().await {
            if self.superseded() {
                debug!(generation, chunks, "Superseded mid-stream, stopping synthesis");
                break;
            }

            match chunk {
                Ok(chunk) if chunk.is_empty() => continue,
                Ok(chunk) => {
                    if chunks == 0 {
                        info!(
                            generation,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "First audio chunk ready"
                        );
                    }
                    chunks += 1;
                    if !self.report(PipelineEvent::Audio { generation, chunk }) {
                        return;
                    }
                }
                Err(e) => return self.abort(e),
            }
        }

        self.report(PipelineEvent::Finished { generation, chunks });
    }
}
