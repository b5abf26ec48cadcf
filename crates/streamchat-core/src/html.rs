//! A [`View`] that builds the chat page's message list as HTML.
//!
//! The structure matches what the browser client puts in the DOM:
//!
//! ```html
//! <div class="message assistant">
//!   <div class="message-content">...rendered markdown...<span class="cursor">|</span></div>
//! </div>
//! <div class="message assistant" id="typingIndicator">
//!   <div class="typing-indicator">Typing...</div>
//! </div>
//! ```

use crate::markdown::to_html;
use crate::message::{Completeness, ItemId, Message, Sender};
use crate::view::View;

/// Text shown in the typing placeholder.
pub const TYPING_TEXT: &str = "Typing...";

/// One node in the message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A chat message.
    Message {
        /// View handle.
        id: ItemId,
        /// Message owner.
        sender: Sender,
        /// Source text, kept so tests can inspect it.
        content: String,
        /// Rendered markdown.
        html: String,
        /// Whether the cursor marker is shown.
        cursor: bool,
    },
    /// The typing placeholder.
    Typing {
        /// View handle.
        id: ItemId,
    },
}

impl Node {
    fn id(&self) -> ItemId {
        match self {
            Self::Message { id, .. } | Self::Typing { id } => *id,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Message {
                sender,
                html,
                cursor,
                ..
            } => {
                out.push_str(r#"<div class="message "#);
                out.push_str(sender.as_str());
                out.push_str(r#""><div class="message-content">"#);
                out.push_str(html);
                if *cursor {
                    out.push_str(r#"<span class="cursor">|</span>"#);
                }
                out.push_str("</div></div>");
            }
            Self::Typing { .. } => {
                out.push_str(r#"<div class="message assistant" id="typingIndicator">"#);
                out.push_str(r#"<div class="typing-indicator">"#);
                out.push_str(TYPING_TEXT);
                out.push_str("</div></div>");
            }
        }
    }
}

/// In-memory model of the chat page.
#[derive(Debug, Default)]
pub struct HtmlView {
    nodes: Vec<Node>,
    next_id: u64,
    send_enabled: bool,
    input: String,
    /// Set whenever the list was scrolled to the bottom after a change.
    pinned_to_bottom: bool,
}

impl HtmlView {
    /// Create an empty page with the send button disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the input box text, as if the user typed it.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Nodes in display order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Messages (excluding the typing placeholder) as `(sender, content, completeness)`.
    #[must_use]
    pub fn messages(&self) -> Vec<(Sender, &str, Completeness)> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Message {
                    sender,
                    content,
                    cursor,
                    ..
                } => {
                    let completeness = if *cursor {
                        Completeness::InProgress
                    } else {
                        Completeness::Final
                    };
                    Some((*sender, content.as_str(), completeness))
                }
                Node::Typing { .. } => None,
            })
            .collect()
    }

    /// Check if the typing placeholder is shown.
    #[must_use]
    pub fn has_typing_indicator(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, Node::Typing { .. }))
    }

    /// Check if the send button is enabled.
    #[must_use]
    pub fn is_send_enabled(&self) -> bool {
        self.send_enabled
    }

    /// Current input box text.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Check if the list is scrolled to the newest item.
    #[must_use]
    pub fn is_pinned_to_bottom(&self) -> bool {
        self.pinned_to_bottom
    }

    /// Serialize the message list.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    fn push(&mut self, make: impl FnOnce(ItemId) -> Node) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.nodes.push(make(id));
        self.pinned_to_bottom = false;
        id
    }

    fn find_mut(&mut self, id: ItemId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id() == id)
    }
}

impl View for HtmlView {
    fn append(&mut self, message: &Message) -> ItemId {
        self.push(|id| Node::Message {
            id,
            sender: message.sender,
            content: message.content.clone(),
            html: to_html(&message.content),
            cursor: message.is_in_progress(),
        })
    }

    fn replace_content(&mut self, id: ItemId, new_content: &str) {
        if let Some(Node::Message { content, html, .. }) = self.find_mut(id) {
            new_content.clone_into(content);
            *html = to_html(new_content);
            self.pinned_to_bottom = false;
        }
    }

    fn finalize(&mut self, id: ItemId) {
        if let Some(Node::Message { cursor, .. }) = self.find_mut(id) {
            *cursor = false;
        }
    }

    fn show_typing(&mut self) -> ItemId {
        self.push(|id| Node::Typing { id })
    }

    fn remove(&mut self, id: ItemId) {
        self.nodes.retain(|n| n.id() != id);
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn scroll_to_bottom(&mut self) {
        self.pinned_to_bottom = true;
    }
}
