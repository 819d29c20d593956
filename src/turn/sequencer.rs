use super::state::{ResponseSignal, ResponseState};
use tracing::{debug, info, warn};

/// A finalized, non-empty user utterance and the generation it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub generation: u64,
}

/// What the controller must do with a final transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalDisposition {
    /// Blank transcript
    Ignored,
    /// Termination keyword heard: close instead of replying
    Terminate,
    /// Start a response. When `interrupt` is set, an older response was still
    /// in flight and the client must be told to stop before anything else.
    Respond { utterance: Utterance, interrupt: bool },
}

/// Outcome of the per-chunk commit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkVerdict {
    /// First chunk of the newest response: announce `sid2`, then send
    Commit { sid1: u64, sid2: u64 },
    /// Later chunk of the committed response
    Forward { sid1: u64, sid2: u64 },
    /// Stale or discarded response
    Drop,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    generation: u64,
    state: ResponseState,
}

/// Per-connection generation bookkeeping.
///
/// Only ever touched from the connection's event loop, so a counter bump and
/// the commit decisions that follow it can never interleave.
#[derive(Debug)]
pub struct TurnSequencer {
    utterance_generation: u64,
    response_generation: u64,
    in_flight: Option<InFlight>,
    termination_keyword: String,
}

impl TurnSequencer {
    pub fn new(termination_keyword: &str) -> Self {
        Self {
            utterance_generation: 0,
            response_generation: 0,
            in_flight: None,
            termination_keyword: termination_keyword.trim().to_lowercase(),
        }
    }

    pub fn utterance_generation(&self) -> u64 {
        self.utterance_generation
    }

    pub fn response_generation(&self) -> u64 {
        self.response_generation
    }

    /// State of the newest response, if one is still tracked
    pub fn in_flight(&self) -> Option<(u64, ResponseState)> {
        self.in_flight.map(|f| (f.generation, f.state))
    }

    pub fn is_termination(&self, text: &str) -> bool {
        !self.termination_keyword.is_empty()
            && text.to_lowercase().contains(&self.termination_keyword)
    }

    pub fn on_final_utterance(&mut self, text: &str) -> FinalDisposition {
        let text = text.trim();
        if text.is_empty() {
            return FinalDisposition::Ignored;
        }

        if self.is_termination(text) {
            info!("Termination keyword heard, closing conversation");
            return FinalDisposition::Terminate;
        }

        let interrupt = match self.in_flight.take() {
            Some(previous) if previous.state.is_live() => {
                self.apply(previous, ResponseSignal::Supersede);
                true
            }
            _ => false,
        };

        self.utterance_generation += 1;
        let generation = self.utterance_generation;
        self.in_flight = Some(InFlight {
            generation,
            state: ResponseState::Idle,
        });

        debug!(generation, interrupt, "Utterance finalized");

        FinalDisposition::Respond {
            utterance: Utterance {
                text: text.to_string(),
                generation,
            },
            interrupt,
        }
    }

    /// Re-evaluated for every chunk, so a response superseded mid-stream stops
    /// at the next chunk even though its first one was already sent.
    pub fn on_audio_chunk(&mut self, generation: u64) -> ChunkVerdict {
        let Some(current) = self.in_flight else {
            return ChunkVerdict::Drop;
        };

        if current.generation != generation || generation != self.utterance_generation {
            debug!(
                generation,
                current = self.utterance_generation,
                "Dropping superseded audio chunk"
            );
            return ChunkVerdict::Drop;
        }

        match current.state {
            ResponseState::Idle => {
                let Some(next) = self.apply(current, ResponseSignal::Commit) else {
                    return ChunkVerdict::Drop;
                };
                self.in_flight = Some(next);
                self.response_generation = generation;
                debug_assert!(self.response_generation <= self.utterance_generation);
                ChunkVerdict::Commit {
                    sid1: self.utterance_generation,
                    sid2: self.response_generation,
                }
            }
            ResponseState::Committed => ChunkVerdict::Forward {
                sid1: self.utterance_generation,
                sid2: self.response_generation,
            },
            ResponseState::Superseded | ResponseState::Aborted => ChunkVerdict::Drop,
        }
    }

    /// Synthesis stream ended. Returns whether it was the newest response.
    pub fn on_pipeline_finished(&mut self, generation: u64) -> bool {
        match self.in_flight {
            Some(current) if current.generation == generation => {
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }

    /// A collaborator failed. Returns whether it was the newest response.
    pub fn on_pipeline_aborted(&mut self, generation: u64) -> bool {
        match self.in_flight {
            Some(current) if current.generation == generation => {
                self.apply(current, ResponseSignal::Abort);
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }

    fn apply(&self, current: InFlight, signal: ResponseSignal) -> Option<InFlight> {
        match current.state.transition(signal) {
            Some(state) => {
                debug!(
                    generation = current.generation,
                    from = ?current.state,
                    to = ?state,
                    "Response transition"
                );
                Some(InFlight {
                    generation: current.generation,
                    state,
                })
            }
            None => {
                warn!(
                    generation = current.generation,
                    state = ?current.state,
                    signal = ?signal,
                    "Rejected response transition"
                );
                None
            }
        }
    }
}
