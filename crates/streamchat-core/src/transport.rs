//! Outbound side of the connection.

use crate::error::TransportError;

/// Sink for outbound payloads.
///
/// Implementations must not block: the controller calls `send_text` from the
/// event loop.
pub trait Transport {
    /// Queue a text frame for delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be queued.
    fn send_text(&mut self, payload: String) -> Result<(), TransportError>;

    /// Close the connection. Further sends fail with [`TransportError::Closed`].
    fn close(&mut self) {}
}
