/// Lifecycle of a single response pipeline instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Started, nothing delivered yet
    Idle,
    /// First chunk passed the commit check; later chunks stream freely
    Committed,
    /// A newer utterance finalized; all further output is dropped
    Superseded,
    /// A collaborator failed; output discarded
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSignal {
    Commit,
    Supersede,
    Abort,
}

impl ResponseState {
    /// The single authorized transition table. `None` means the signal is
    /// not valid in this state.
    pub fn transition(self, signal: ResponseSignal) -> Option<ResponseState> {
        use ResponseSignal::*;
        use ResponseState::*;

        match (self, signal) {
            (Idle, Commit) => Some(Committed),
            (Idle | Committed, Supersede) => Some(Superseded),
            (Idle | Committed, Abort) => Some(Aborted),
            _ => None,
        }
    }

    /// Still pending or streaming
    pub fn is_live(self) -> bool {
        matches!(self, ResponseState::Idle | ResponseState::Committed)
    }
}
