//! Error types for streamchat.
//!
//! Connection failures are not represented here: they arrive as controller
//! callbacks, not as `Result`s.

use thiserror::Error;

/// Errors raised while handing an outbound payload to the connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection is gone and can no longer accept messages.
    #[error("connection closed")]
    Closed,

    /// The outbound queue is full.
    #[error("outbound queue is full")]
    Full,

    /// The payload could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised while decoding an inbound payload.
///
/// The controller drops these silently; the type exists so the reason can be
/// logged.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload is not valid JSON or does not match a known message shape.
    #[error("malformed server message: {0}")]
    Malformed(#[from] serde_json::Error),
}
