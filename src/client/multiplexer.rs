use super::messages::ClientMessage;
use tokio::sync::mpsc;
use tracing::debug;

/// Item queued for the socket writer
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Message(ClientMessage),
    /// Close the client connection after everything queued before it
    Close,
}

/// Stateless relay from controller decisions to client-bound messages.
///
/// Every message goes through one unbounded queue drained by a single writer,
/// so delivery order is exactly enqueue order.
#[derive(Debug, Clone)]
pub struct ClientMultiplexer {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ClientMultiplexer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn caption(&self, text: impl Into<String>) -> bool {
        self.send(ClientMessage::Caption {
            output: text.into(),
        })
    }

    pub fn announce(&self, sid1: u64, sid2: Option<u64>) -> bool {
        self.send(ClientMessage::AudioSession { sid1, sid2 })
    }

    pub fn audio(&self, chunk: Vec<u8>, sid1: u64, sid2: u64) -> bool {
        self.send(ClientMessage::Audio {
            output: chunk,
            sid1,
            sid2,
        })
    }

    pub fn stop(&self) -> bool {
        self.send(ClientMessage::AudioStop { stop: true })
    }

    pub fn metadata(&self, metadata: serde_json::Value) -> bool {
        self.send(ClientMessage::Metadata { metadata })
    }

    pub fn close(&self) -> bool {
        self.push(Outbound::Close)
    }

    pub fn send(&self, message: ClientMessage) -> bool {
        self.push(Outbound::Message(message))
    }

    fn push(&self, item: Outbound) -> bool {
        if self.tx.send(item).is_err() {
            debug!("Client writer gone, dropping outbound message");
            return false;
        }
        true
    }
}
