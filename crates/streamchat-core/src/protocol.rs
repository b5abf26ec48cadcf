//! Wire protocol types.
//!
//! Client -> Server: `{"message": "<user text>"}`
//!
//! Server -> Client: `{"type": "response", "content": "<text>", "streaming": <bool>}`
//!
//! Streaming responses carry the complete text so far, not a delta.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProtocolError;

/// Client -> Server: a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMessage {
    /// The trimmed text the user typed.
    pub message: String,
}

impl ClientMessage {
    /// Create a message carrying `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
        }
    }
}

/// Server -> Client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Assistant output.
    Response {
        /// Full text so far.
        content: String,
        /// `true` while more chunks will follow. A missing or null flag
        /// means final.
        #[serde(default, deserialize_with = "null_as_false")]
        streaming: bool,
    },
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode an inbound payload.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if the text is not JSON, has an
/// unknown `type`, or lacks `content`.
pub fn parse_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_serializes_correctly() {
        let json = serde_json::to_string(&ClientMessage::new("Hello")).unwrap();
        assert_eq!(json, r#"{"message":"Hello"}"#);
    }

    #[test]
    fn streaming_response_deserializes() {
        let msg = parse_server_message(r#"{"type":"response","content":"Hi","streaming":true}"#)
            .unwrap();
        assert_eq!(
            msg,
            ServerMessage::Response {
                content: "Hi".to_string(),
                streaming: true,
            }
        );
    }

    #[test]
    fn missing_streaming_flag_means_final() {
        let msg = parse_server_message(r#"{"type":"response","content":"Welcome"}"#).unwrap();
        let ServerMessage::Response { streaming, .. } = msg;
        assert!(!streaming);
    }

    #[test]
    fn null_streaming_flag_means_final() {
        let msg = parse_server_message(r#"{"type":"response","content":"Done","streaming":null}"#)
            .unwrap();
        assert_eq!(
            msg,
            ServerMessage::Response {
                content: "Done".to_string(),
                streaming: false,
            }
        );
    }

    #[test]
    fn non_bool_streaming_flag_is_rejected() {
        assert!(
            parse_server_message(r#"{"type":"response","content":"x","streaming":"yes"}"#)
                .is_err()
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(parse_server_message(r#"{"type":"ping","content":"x"}"#).is_err());
    }

    #[test]
    fn non_json_is_rejected() {
        assert!(parse_server_message("not json").is_err());
        assert!(parse_server_message("").is_err());
    }

    #[test]
    fn response_without_content_is_rejected() {
        assert!(parse_server_message(r#"{"type":"response","streaming":true}"#).is_err());
    }
}
