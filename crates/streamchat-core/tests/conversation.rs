//! End-to-end conversations through the controller and the HTML view.
//!
//! Each test drives a `Controller<HtmlView, _>` with the same sequence of
//! connection events and payloads a live server would produce.

use streamchat_core::controller::{
    CONNECTED_NOTICE, CONNECTION_ERROR_NOTICE, DISCONNECTED_NOTICE, SEND_ERROR_NOTICE,
};
use streamchat_core::{
    Completeness, ConnectionState, Controller, HtmlView, SendOutcome, Sender, StreamState,
    Transport, TransportError,
};

// =============================================================================
// Test Helpers
// =============================================================================

/// Transport that records every payload.
#[derive(Debug, Default)]
struct RecordingTransport {
    sent: Vec<String>,
    fail_next: bool,
}

impl Transport for RecordingTransport {
    fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(TransportError::Full);
        }
        self.sent.push(payload);
        Ok(())
    }
}

type TestController = Controller<HtmlView, RecordingTransport>;

fn connected() -> TestController {
    let mut controller = Controller::new(HtmlView::new(), RecordingTransport::default());
    controller.start();
    controller.on_open();
    controller
}

fn type_and_send(controller: &mut TestController, text: &str) -> SendOutcome {
    controller.view_mut().set_input(text);
    controller.submit()
}

fn streaming(content: &str) -> String {
    serde_json::json!({"type": "response", "content": content, "streaming": true}).to_string()
}

fn finished(content: &str) -> String {
    serde_json::json!({"type": "response", "content": content, "streaming": false}).to_string()
}

fn assistant_items(controller: &TestController) -> Vec<(String, Completeness)> {
    controller
        .view()
        .messages()
        .into_iter()
        .filter(|(sender, _, _)| *sender == Sender::Assistant)
        .map(|(_, content, completeness)| (content.to_string(), completeness))
        .collect()
}

// =============================================================================
// Conversations
// =============================================================================

#[test]
fn greeting_then_streamed_answer() {
    let mut controller = connected();

    // Server greets on connect.
    controller.on_message(&finished("Welcome! Ask me about EVs."));

    assert_eq!(type_and_send(&mut controller, "Hello"), SendOutcome::Sent);
    assert_eq!(controller.transport().sent, vec![r#"{"message":"Hello"}"#]);
    assert_eq!(controller.view().input(), "");
    assert!(controller.view().has_typing_indicator());

    controller.on_message(&streaming("Hi"));
    assert!(!controller.view().has_typing_indicator());

    controller.on_message(&streaming("Hi there"));
    assert_eq!(
        assistant_items(&controller),
        vec![
            ("Welcome! Ask me about EVs.".to_string(), Completeness::Final),
            ("Hi there".to_string(), Completeness::InProgress),
        ]
    );

    controller.on_message(&finished("Hi there!"));
    assert_eq!(
        assistant_items(&controller),
        vec![
            ("Welcome! Ask me about EVs.".to_string(), Completeness::Final),
            ("Hi there".to_string(), Completeness::Final),
            ("Hi there!".to_string(), Completeness::Final),
        ]
    );
    assert_eq!(controller.stream_state(), StreamState::Idle);
    assert!(!controller.view().to_html().contains("cursor"));
}

#[test]
fn streaming_is_last_write_wins() {
    let mut controller = connected();
    for chunk in ["A", "AB", "ABC", "A"] {
        controller.on_message(&streaming(chunk));
    }

    let items = assistant_items(&controller);
    assert_eq!(items, vec![("A".to_string(), Completeness::InProgress)]);
    assert_eq!(controller.view().to_html().matches("cursor").count(), 1);
}

#[test]
fn null_streaming_flag_finishes_the_stream() {
    let mut controller = connected();
    controller.on_message(&streaming("Almost"));
    controller.on_message(r#"{"type":"response","content":"Almost done","streaming":null}"#);

    let items = assistant_items(&controller);
    assert_eq!(items, vec![("Almost done".to_string(), Completeness::Final)]);
    assert_eq!(controller.stream_state(), StreamState::Idle);
}

#[test]
fn two_turns_produce_independent_streams() {
    let mut controller = connected();

    type_and_send(&mut controller, "first");
    controller.on_message(&streaming("one"));
    controller.on_message(&finished("one."));

    type_and_send(&mut controller, "second");
    controller.on_message(&streaming("two"));

    let items = assistant_items(&controller);
    assert_eq!(items.len(), 3);
    assert_eq!(items[2], ("two".to_string(), Completeness::InProgress));
    assert_eq!(
        items
            .iter()
            .filter(|(_, c)| *c == Completeness::InProgress)
            .count(),
        1
    );
}

#[test]
fn ping_changes_nothing() {
    let mut controller = connected();
    let before = controller.view().to_html();

    controller.on_message(r#"{"type":"ping"}"#);
    controller.on_message(r#"{"type":"ping","content":"pong","streaming":false}"#);
    controller.on_message("{not json");

    assert_eq!(controller.view().to_html(), before);
}

#[test]
fn whitespace_input_sends_nothing() {
    let mut controller = connected();
    let before = controller.view().nodes().len();

    assert_eq!(type_and_send(&mut controller, "   "), SendOutcome::Empty);
    assert_eq!(type_and_send(&mut controller, ""), SendOutcome::Empty);

    assert!(controller.transport().sent.is_empty());
    assert_eq!(controller.view().nodes().len(), before);
}

#[test]
fn close_disables_sending() {
    let mut controller = connected();
    controller.on_close();

    assert!(!controller.view().is_send_enabled());
    let messages = controller.view().messages();
    assert_eq!(
        messages.last(),
        Some(&(Sender::System, DISCONNECTED_NOTICE, Completeness::Final))
    );

    assert_eq!(type_and_send(&mut controller, "anyone?"), SendOutcome::Disabled);
    assert!(controller.transport().sent.is_empty());
}

#[test]
fn failed_connect_reports_error_then_close() {
    let mut controller = Controller::new(HtmlView::new(), RecordingTransport::default());
    controller.start();
    assert!(!controller.view().is_send_enabled());

    controller.on_error("Connection refused (os error 111)");
    controller.on_close();

    let notices: Vec<_> = controller
        .view()
        .messages()
        .into_iter()
        .map(|(_, content, _)| content)
        .collect();
    assert_eq!(notices, vec![CONNECTION_ERROR_NOTICE, DISCONNECTED_NOTICE]);
    assert_eq!(controller.connection_state(), ConnectionState::Closed);
    assert!(!controller.view().is_send_enabled());
}

#[test]
fn send_failure_is_not_fatal() {
    let mut controller = connected();
    controller.transport_mut().fail_next = true;

    assert_eq!(type_and_send(&mut controller, "lost"), SendOutcome::Failed);
    assert!(!controller.view().has_typing_indicator());
    assert_eq!(controller.view().input(), "");

    let messages = controller.view().messages();
    assert_eq!(
        messages.last(),
        Some(&(Sender::System, SEND_ERROR_NOTICE, Completeness::Final))
    );

    assert_eq!(type_and_send(&mut controller, "retry"), SendOutcome::Sent);
    assert_eq!(controller.transport().sent, vec![r#"{"message":"retry"}"#]);
}

#[test]
fn connected_notice_is_first_item() {
    let controller = connected();
    assert!(controller.view().is_send_enabled());
    assert_eq!(
        controller.view().messages(),
        vec![(Sender::System, CONNECTED_NOTICE, Completeness::Final)]
    );
}

#[test]
fn markdown_is_rendered_for_every_item() {
    let mut controller = connected();
    type_and_send(&mut controller, "**bold** question");
    controller.on_message(&finished("- one\n- two"));

    let html = controller.view().to_html();
    assert!(html.contains("<strong>bold</strong> question"));
    assert!(html.contains("<li>one</li>"));
}
