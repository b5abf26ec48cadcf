//! Core types and controller logic for streamchat.
//!
//! This crate holds everything about the chat client that does not depend on
//! where it is displayed:
//!
//! - **Controller**: the connection and streaming state machine
//! - **Protocol**: the JSON messages exchanged with the server
//! - **View / Transport**: the seams a frontend implements
//! - **Markdown**: the markdown-to-HTML renderer
//! - **HtmlView**: a `View` that produces the browser DOM structure
//!
//! # Example
//!
//! ```
//! use streamchat_core::{Controller, HtmlView, Transport, TransportError};
//!
//! #[derive(Default)]
//! struct Outbox(Vec<String>);
//!
//! impl Transport for Outbox {
//!     fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
//!         self.0.push(payload);
//!         Ok(())
//!     }
//! }
//!
//! let mut controller = Controller::new(HtmlView::new(), Outbox::default());
//! controller.start();
//! controller.on_open();
//!
//! controller.view_mut().set_input("Hello");
//! controller.submit();
//!
//! assert_eq!(controller.transport().0, vec![r#"{"message":"Hello"}"#]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod controller;
pub mod error;
pub mod html;
pub mod markdown;
pub mod message;
pub mod protocol;
pub mod transport;
pub mod view;

pub use controller::{ConnectionState, Controller, SendOutcome, StreamState};
pub use error::{ProtocolError, TransportError};
pub use html::HtmlView;
pub use message::{Completeness, ItemId, Message, Sender};
pub use protocol::{parse_server_message, ClientMessage, ServerMessage};
pub use transport::Transport;
pub use view::View;
