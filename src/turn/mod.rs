//! Turn sequencing and response cancellation
//!
//! Every finalized utterance gets the next generation number. A response may
//! only reach the client while its generation is still the newest one; an
//! older response is interrupted the moment a newer utterance finalizes.

mod sequencer;
mod state;

pub use sequencer::{ChunkVerdict, FinalDisposition, TurnSequencer, Utterance};
pub use state::{ResponseSignal, ResponseState};
