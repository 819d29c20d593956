use super::state::AppState;
use crate::client::{ClientMultiplexer, Outbound};
use crate::session::{ClientFrame, ConversationSession};
use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use std::fmt::Display;
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Bridge one upgraded client socket to a fresh conversation session
pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let id = format!("conn-{}", uuid::Uuid::new_v4());
    let span = info_span!("connection", id = %id);

    run_connection(socket, state, id).instrument(span).await
}

async fn run_connection(socket: WebSocket, state: AppState, id: String) {
    info!("socket: client connected");

    let (sink, mut stream) = socket.split();
    let (client, outbound) = ClientMultiplexer::new();
    let writer = tokio::spawn(write_outbound(outbound, sink).in_current_span());

    let (frame_tx, frame_rx) = mpsc::channel(256);
    let reader = tokio::spawn(
        async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Binary(data)) => {
                        if frame_tx.send(ClientFrame::Audio(data)).await.is_err() {
                            return;
                        }
                    }
                    Ok(Message::Text(text)) => {
                        debug!("Ignoring text frame from client ({} bytes)", text.len());
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("socket: receive error: {}", e);
                        break;
                    }
                }
            }
            let _ = frame_tx.send(ClientFrame::Close).await;
        }
        .in_current_span(),
    );

    let mut session = ConversationSession::new(
        id,
        state.session_config.clone(),
        state.collaborators.clone(),
        client,
    );
    session.run(frame_rx).await;

    reader.abort();
    // Dropping the session drops the last multiplexer handle, which lets the
    // writer drain what is queued and exit.
    drop(session);
    if let Err(e) = writer.await {
        error!("Socket writer panicked: {}", e);
    }
}

/// Drain the multiplexer queue onto the socket in FIFO order
pub async fn write_outbound<S>(mut outbound: mpsc::UnboundedReceiver<Outbound>, mut sink: S)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(item) = outbound.recv().await {
        match item {
            Outbound::Message(message) => {
                let json = match message.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to encode client message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json)).await {
                    debug!("socket: send failed, stopping writer: {}", e);
                    break;
                }
            }
            Outbound::Close => {
                info!("socket: closing client connection");
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        }
    }
}
