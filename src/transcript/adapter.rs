use super::transcriber::{Transcriber, TranscriptEvent, UpstreamCommand};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

/// Lifecycle of one upstream transcription connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Connecting,
    Open,
    /// At least one event received
    Active,
    Closing,
    Closed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterSignal {
    Opened,
    Event,
    Finish,
    Closed,
    Error,
}

impl AdapterState {
    pub fn transition(self, signal: AdapterSignal) -> Option<AdapterState> {
        use AdapterSignal as S;
        use AdapterState::*;

        match (self, signal) {
            (Connecting, S::Opened) => Some(Open),
            (Open | Active, S::Event) => Some(Active),
            (Connecting | Open | Active, S::Finish) => Some(Closing),
            (Connecting | Open | Active | Closing, S::Closed) => Some(Closed),
            (Connecting | Open | Active | Closing, S::Error) => Some(Failed),
            _ => None,
        }
    }

    /// Audio frames may be forwarded
    pub fn is_ready(self) -> bool {
        matches!(self, AdapterState::Open | AdapterState::Active)
    }

    /// Never becomes ready again; must be replaced by a fresh adapter
    pub fn is_dead(self) -> bool {
        matches!(
            self,
            AdapterState::Closing | AdapterState::Closed | AdapterState::Failed
        )
    }
}

/// Wraps one transcription connection: tracks its state, gates audio on
/// readiness and keeps the upstream from idling out while it is open.
pub struct TranscriptAdapter {
    state: AdapterState,
    commands: mpsc::Sender<UpstreamCommand>,
    events: mpsc::Receiver<TranscriptEvent>,
    events_done: bool,
    keepalive_interval: Duration,
    keepalive: Option<JoinHandle<()>>,
}

impl TranscriptAdapter {
    pub fn open(transcriber: &dyn Transcriber, keepalive_interval: Duration) -> Self {
        info!("Opening transcription stream ({})", transcriber.name());
        let link = transcriber.open();

        Self {
            state: AdapterState::Connecting,
            commands: link.commands,
            events: link.events,
            events_done: false,
            keepalive_interval,
            keepalive: None,
        }
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_dead()
    }

    pub fn keepalive_running(&self) -> bool {
        self.keepalive.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Forward one raw client frame. Returns `false` when the frame was not sent.
    pub fn send_audio(&self, frame: Vec<u8>) -> bool {
        if !self.is_ready() {
            debug!(state = ?self.state, "Transcription not ready, dropping frame");
            return false;
        }

        match self.commands.try_send(UpstreamCommand::Audio(frame)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Transcription queue full, dropping frame");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Transcription connection gone, dropping frame");
                false
            }
        }
    }

    /// Ask the upstream to flush and close
    pub fn finish(&mut self) {
        if !self.signal(AdapterSignal::Finish) {
            return;
        }
        if let Err(e) = self.commands.try_send(UpstreamCommand::Finish) {
            debug!("Could not deliver finish to transcription: {}", e);
        }
    }

    /// Next upstream event, with the state machine already advanced.
    ///
    /// When the upstream goes away without saying so, a synthetic `Closed` is
    /// produced once; after that this future never resolves. Transcripts and
    /// metadata reaching a closing or failed stream are swallowed.
    pub async fn next_event(&mut self) -> TranscriptEvent {
        loop {
            if self.events_done {
                return std::future::pending().await;
            }

            let event = match self.events.recv().await {
                Some(event) => event,
                None => {
                    self.events_done = true;
                    if self.state == AdapterState::Closed || self.state == AdapterState::Failed {
                        continue;
                    }
                    TranscriptEvent::Closed
                }
            };

            match &event {
                TranscriptEvent::Opened => {
                    if self.signal(AdapterSignal::Opened) {
                        info!("Transcription stream open");
                        self.start_keepalive();
                    }
                }
                TranscriptEvent::Transcript { .. } | TranscriptEvent::Metadata(_) => {
                    // A dead stream may still flush results; none of them count
                    if self.is_dead() {
                        debug!(state = ?self.state, "Dropping transcription event from dead stream");
                        continue;
                    }
                    self.signal(AdapterSignal::Event);
                }
                TranscriptEvent::Closed => {
                    self.signal(AdapterSignal::Closed);
                    info!("Transcription stream closed");
                }
                TranscriptEvent::Error(message) => {
                    self.signal(AdapterSignal::Error);
                    error!("Transcription stream failed: {}", message);
                }
            }

            return event;
        }
    }

    fn signal(&mut self, signal: AdapterSignal) -> bool {
        match self.state.transition(signal) {
            Some(next) => {
                if next != self.state {
                    debug!(from = ?self.state, to = ?next, "Transcription state change");
                }
                self.state = next;
                if !next.is_ready() {
                    self.stop_keepalive();
                }
                true
            }
            None => {
                debug!(state = ?self.state, signal = ?signal, "Ignoring transcription signal");
                false
            }
        }
    }

    fn start_keepalive(&mut self) {
        self.stop_keepalive();

        let commands = self.commands.clone();
        let period = self.keepalive_interval;

        self.keepalive = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if commands.send(UpstreamCommand::KeepAlive).await.is_err() {
                    break;
                }
                debug!("Transcription keep-alive sent");
            }
        }));
    }

    fn stop_keepalive(&mut self) {
        if let Some(handle) = self.keepalive.take() {
            handle.abort();
        }
    }
}

impl Drop for TranscriptAdapter {
    fn drop(&mut self) {
        self.stop_keepalive();
    }
}
