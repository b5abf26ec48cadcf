//! WebSocket connection to the chat server.
//!
//! [`connect`] returns immediately; the connection is established in a
//! spawned task that reports progress as [`WsEvent`]s. Event order follows
//! the browser `WebSocket` API: a failed connect or a read error produces
//! `Error` followed by `Closed`, and every connection ends with exactly one
//! `Closed`.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use streamchat_core::{Transport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Error type for WebSocket operations.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    /// Failed to connect.
    #[error("Connection failed: {0}")]
    Connection(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Events from the WebSocket connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsEvent {
    /// The handshake completed.
    Opened,
    /// A text frame arrived.
    Message(String),
    /// The connection failed.
    Error(String),
    /// The connection is gone. Always the last event.
    Closed,
}

/// Handle for sending messages to the WebSocket.
#[derive(Debug, Clone)]
pub struct WsSender {
    tx: Option<mpsc::Sender<Message>>,
}

impl Transport for WsSender {
    fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.try_send(Message::Text(payload)).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Full,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    fn close(&mut self) {
        if let Some(tx) = self.tx.take() {
            // The writer may already be gone.
            let _ = tx.try_send(Message::Close(None));
        }
    }
}

/// Spawn a WebSocket connection task.
///
/// Returns a sender for outgoing messages and a receiver for connection events.
pub fn connect(url: &str, capacity: usize) -> (WsSender, mpsc::Receiver<WsEvent>) {
    // Channel for outgoing messages
    let (outgoing_tx, outgoing_rx) = mpsc::channel::<Message>(capacity);

    // Channel for connection events
    let (event_tx, event_rx) = mpsc::channel::<WsEvent>(capacity);

    tokio::spawn(run_connection(url.to_string(), outgoing_rx, event_tx));

    (
        WsSender {
            tx: Some(outgoing_tx),
        },
        event_rx,
    )
}

/// Connect, then pump frames until either side closes.
async fn run_connection(
    url: String,
    outgoing_rx: mpsc::Receiver<Message>,
    tx: mpsc::Sender<WsEvent>,
) {
    tracing::debug!(url = %url, "Connecting");

    let ws_stream = match open(&url).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "WebSocket connect failed");
            let _ = tx.send(WsEvent::Error(e.to_string())).await;
            let _ = tx.send(WsEvent::Closed).await;
            return;
        }
    };

    let (write, read) = ws_stream.split();
    let _ = tx.send(WsEvent::Opened).await;

    let writer = tokio::spawn(ws_writer(write, outgoing_rx));
    ws_reader(read, &tx).await;
    writer.abort();

    let _ = tx.send(WsEvent::Closed).await;
    tracing::debug!(url = %url, "Connection task finished");
}

async fn open(url: &str) -> Result<WsStream, WsError> {
    let (stream, _) = connect_async(url).await?;
    Ok(stream)
}

/// Task that writes outgoing messages.
async fn ws_writer(mut write: SplitSink<WsStream, Message>, mut rx: mpsc::Receiver<Message>) {
    while let Some(msg) = rx.recv().await {
        let closing = matches!(msg, Message::Close(_));
        if let Err(e) = write.send(msg).await {
            tracing::debug!(error = %e, "WebSocket write failed");
            break;
        }
        if closing {
            break;
        }
    }
}

/// Read frames until the connection ends, forwarding text payloads.
async fn ws_reader(mut read: SplitStream<WsStream>, tx: &mpsc::Sender<WsEvent>) {
    while let Some(result) = read.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if tx.send(WsEvent::Message(text)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(frame)) => {
                tracing::debug!(frame = ?frame, "Server closed connection");
                break;
            }
            // Ignore control frames and binary messages
            Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_) | Message::Binary(_)) => {}
            Err(e) => {
                let _ = tx.send(WsEvent::Error(e.to_string())).await;
                break;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
