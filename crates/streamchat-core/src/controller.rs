//! Chat controller state machine.
//!
//! The controller owns the view and the outbound transport, and reacts to
//! three kinds of input:
//!
//! - connection lifecycle callbacks (`on_open`, `on_close`, `on_error`)
//! - inbound payloads (`on_message`)
//! - the user pressing send (`submit`)
//!
//! At most one assistant message is in progress at a time. Its handle is held
//! in [`StreamState`], so updates never need to search the view.

use crate::error::TransportError;
use crate::message::{ItemId, Message};
use crate::protocol::{parse_server_message, ClientMessage, ServerMessage};
use crate::transport::Transport;
use crate::view::View;

/// Notice shown when the connection opens.
pub const CONNECTED_NOTICE: &str = "Connected to the server. You can start chatting!";

/// Notice shown when the connection closes.
pub const DISCONNECTED_NOTICE: &str = "Disconnected from the server. Please refresh the page.";

/// Notice shown when the connection fails.
pub const CONNECTION_ERROR_NOTICE: &str =
    "Error connecting to the server. Please check if the server is running.";

/// Notice shown when an outbound message could not be handed to the connection.
pub const SEND_ERROR_NOTICE: &str = "Error sending message to server.";

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Waiting for the connection to open.
    #[default]
    Connecting,
    /// Connected; sends are allowed.
    Open,
    /// Closed by either side. Terminal.
    Closed,
    /// The connection failed. Terminal.
    Errored,
}

impl ConnectionState {
    /// Human-readable display string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "connected",
            Self::Closed => "disconnected",
            Self::Errored => "error",
        }
    }

    /// Check if the state can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }
}

/// Streaming session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// No assistant message is receiving updates.
    #[default]
    Idle,
    /// `item` is the in-progress assistant message.
    InProgress {
        /// View handle of the in-progress message.
        item: ItemId,
    },
}

/// Result of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was queued on the connection.
    Sent,
    /// The input was empty after trimming; nothing happened.
    Empty,
    /// The send affordance is disabled; nothing happened.
    Disabled,
    /// The connection refused the message; an error notice was shown.
    Failed,
}

/// The chat UI controller.
#[derive(Debug)]
pub struct Controller<V, T> {
    view: V,
    transport: T,
    connection: ConnectionState,
    stream: StreamState,
    /// Handle of the visible typing placeholder, if any.
    typing: Option<ItemId>,
    send_enabled: bool,
}

impl<V: View, T: Transport> Controller<V, T> {
    /// Create a controller. Call [`start`](Self::start) before dispatching events.
    pub fn new(view: V, transport: T) -> Self {
        Self {
            view,
            transport,
            connection: ConnectionState::Connecting,
            stream: StreamState::Idle,
            typing: None,
            send_enabled: false,
        }
    }

    /// Begin a session: the connection is being established and sends are
    /// disabled until it opens.
    pub fn start(&mut self) {
        self.connection = ConnectionState::Connecting;
        self.set_send_enabled(false);
        tracing::debug!("Controller started");
    }

    /// End the session from the client side. No notice is shown.
    pub fn stop(&mut self) {
        if !self.connection.is_terminal() {
            self.connection = ConnectionState::Closed;
        }
        self.set_send_enabled(false);
        self.transport.close();
        tracing::debug!("Controller stopped");
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// The connection opened.
    pub fn on_open(&mut self) {
        if self.connection != ConnectionState::Connecting {
            tracing::warn!(state = ?self.connection, "Ignoring open event");
            return;
        }
        tracing::info!("Connected to server");
        self.connection = ConnectionState::Open;
        self.set_send_enabled(true);
        self.append(&Message::system(CONNECTED_NOTICE));
    }

    /// The connection closed.
    pub fn on_close(&mut self) {
        tracing::info!("Disconnected from server");
        self.connection = ConnectionState::Closed;
        self.set_send_enabled(false);
        self.append(&Message::system(DISCONNECTED_NOTICE));
    }

    /// The connection failed. `description` is logged, not displayed.
    pub fn on_error(&mut self, description: &str) {
        tracing::error!(error = %description, "Connection error");
        self.connection = ConnectionState::Errored;
        self.set_send_enabled(false);
        self.append(&Message::system(CONNECTION_ERROR_NOTICE));
    }

    // =========================================================================
    // Inbound Messages
    // =========================================================================

    /// Handle a raw inbound text payload. Malformed payloads are dropped.
    pub fn on_message(&mut self, raw: &str) {
        match parse_server_message(raw) {
            Ok(ServerMessage::Response { content, streaming }) => {
                if streaming {
                    self.update_streaming_message(&content);
                } else {
                    self.finalize_streaming_message();
                    self.remove_typing();
                    self.append(&Message::assistant(content));
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, payload = %raw, "Ignoring server message");
            }
        }
    }

    /// Create or update the in-progress assistant message.
    ///
    /// Each chunk carries the full text so far, so the displayed text is
    /// replaced rather than extended.
    fn update_streaming_message(&mut self, content: &str) {
        self.remove_typing();
        match self.stream {
            StreamState::InProgress { item } => {
                self.view.replace_content(item, content);
            }
            StreamState::Idle => {
                let item = self.view.append(&Message::streaming(content));
                self.stream = StreamState::InProgress { item };
            }
        }
        self.view.scroll_to_bottom();
    }

    /// Remove the cursor from the in-progress message, if any.
    fn finalize_streaming_message(&mut self) {
        if let StreamState::InProgress { item } = std::mem::take(&mut self.stream) {
            self.view.finalize(item);
        }
    }

    // =========================================================================
    // Outbound Messages
    // =========================================================================

    /// Send the contents of the input box.
    ///
    /// An in-progress message is left as it is; it is finalized by the
    /// server's next non-streaming response.
    pub fn submit(&mut self) -> SendOutcome {
        if !self.send_enabled {
            return SendOutcome::Disabled;
        }

        let input = self.view.input_text();
        let text = input.trim();
        if text.is_empty() {
            return SendOutcome::Empty;
        }
        let text = text.to_string();

        self.append(&Message::user(&text));
        self.view.clear_input();
        self.show_typing();

        let result = serde_json::to_string(&ClientMessage::new(text))
            .map_err(TransportError::from)
            .and_then(|payload| self.transport.send_text(payload));

        match result {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                tracing::error!(error = %e, "Error sending message");
                self.remove_typing();
                self.append(&Message::system(SEND_ERROR_NOTICE));
                SendOutcome::Failed
            }
        }
    }

    // =========================================================================
    // View Helpers
    // =========================================================================

    fn append(&mut self, message: &Message) -> ItemId {
        let id = self.view.append(message);
        self.view.scroll_to_bottom();
        id
    }

    fn show_typing(&mut self) {
        self.remove_typing();
        self.typing = Some(self.view.show_typing());
        self.view.scroll_to_bottom();
    }

    fn remove_typing(&mut self) {
        if let Some(id) = self.typing.take() {
            self.view.remove(id);
        }
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
        self.view.set_send_enabled(enabled);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Current streaming state.
    #[must_use]
    pub fn stream_state(&self) -> StreamState {
        self.stream
    }

    /// Check if the send affordance is enabled.
    #[must_use]
    pub fn is_send_enabled(&self) -> bool {
        self.send_enabled
    }

    /// Check if a typing placeholder is visible.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    /// The view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view, for input editing.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
