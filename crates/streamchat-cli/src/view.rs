//! Terminal implementation of the chat view.

use std::collections::HashMap;

use ratatui::text::Line;
use streamchat_core::{Completeness, ItemId, Message, View};

use crate::input::InputBox;

/// Spinner frames for the typing placeholder.
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A chat message.
    Message(Message),
    /// The typing placeholder.
    Typing,
}

/// A transcript entry with its view handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// View handle.
    pub id: ItemId,
    /// What is shown.
    pub kind: EntryKind,
}

/// Lines of a final message rendered at one width.
#[derive(Debug)]
struct RenderedLines {
    width: usize,
    lines: Vec<Line<'static>>,
}

/// Transcript, input box and send state for the terminal UI.
#[derive(Debug, Default)]
pub struct ChatView {
    entries: Vec<Entry>,
    next_id: u64,
    rendered: HashMap<ItemId, RenderedLines>,
    /// Input buffer.
    pub input: InputBox,
    send_enabled: bool,
    /// Lines scrolled up from the bottom. Zero follows new output.
    scroll: usize,
    animation_frame: usize,
}

impl ChatView {
    /// Create an empty view with sending disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript in display order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Check if the send affordance is enabled.
    #[must_use]
    pub fn is_send_enabled(&self) -> bool {
        self.send_enabled
    }

    /// Lines scrolled up from the bottom.
    #[must_use]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Scroll towards older output.
    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_add(amount);
    }

    /// Scroll towards newer output.
    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll = self.scroll.saturating_sub(amount);
    }

    /// Clamp the scroll offset once the renderer knows the real limit.
    pub fn clamp_scroll(&mut self, max: usize) {
        self.scroll = self.scroll.min(max);
    }

    /// Advance the spinner.
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// Current spinner frame.
    #[must_use]
    pub fn spinner_char(&self) -> &'static str {
        SPINNER[self.animation_frame % SPINNER.len()]
    }

    /// Lines for the message at `index`, drawn by `render` at `width`.
    ///
    /// Final messages are rendered once per width and reused until their
    /// content changes. Returns `None` for the typing placeholder.
    pub fn rendered_lines<F>(
        &mut self,
        index: usize,
        width: usize,
        render: F,
    ) -> Option<Vec<Line<'static>>>
    where
        F: FnOnce(&Message, usize) -> Vec<Line<'static>>,
    {
        let entry = self.entries.get(index)?;
        let EntryKind::Message(message) = &entry.kind else {
            return None;
        };
        if message.is_in_progress() {
            return Some(render(message, width));
        }

        if let Some(cached) = self.rendered.get(&entry.id) {
            if cached.width == width {
                return Some(cached.lines.clone());
            }
        }
        let lines = render(message, width);
        self.rendered.insert(
            entry.id,
            RenderedLines {
                width,
                lines: lines.clone(),
            },
        );
        Some(lines)
    }

    fn push(&mut self, kind: EntryKind) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, kind });
        id
    }

    fn message_mut(&mut self, id: ItemId) -> Option<&mut Message> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .and_then(|e| match &mut e.kind {
                EntryKind::Message(message) => Some(message),
                EntryKind::Typing => None,
            })
    }
}

impl View for ChatView {
    fn append(&mut self, message: &Message) -> ItemId {
        self.push(EntryKind::Message(message.clone()))
    }

    fn replace_content(&mut self, id: ItemId, content: &str) {
        if let Some(message) = self.message_mut(id) {
            content.clone_into(&mut message.content);
            self.rendered.remove(&id);
        }
    }

    fn finalize(&mut self, id: ItemId) {
        if let Some(message) = self.message_mut(id) {
            message.completeness = Completeness::Final;
            self.rendered.remove(&id);
        }
    }

    fn show_typing(&mut self) -> ItemId {
        self.push(EntryKind::Typing)
    }

    fn remove(&mut self, id: ItemId) {
        self.entries.retain(|e| e.id != id);
        self.rendered.remove(&id);
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send_enabled = enabled;
    }

    fn input_text(&self) -> String {
        self.input.text().to_string()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use streamchat_core::Sender;

    use super::*;

    #[test]
    fn append_and_replace() {
        let mut view = ChatView::new();
        let id = view.append(&Message::streaming("Hi"));
        view.replace_content(id, "Hi there");

        assert_eq!(
            view.entries()[0].kind,
            EntryKind::Message(Message::streaming("Hi there"))
        );
    }

    #[test]
    fn finalize_clears_in_progress() {
        let mut view = ChatView::new();
        let id = view.append(&Message::streaming("done"));
        view.finalize(id);

        let EntryKind::Message(message) = &view.entries()[0].kind else {
            panic!("expected a message");
        };
        assert_eq!(message.completeness, Completeness::Final);
        assert_eq!(message.sender, Sender::Assistant);
    }

    #[test]
    fn typing_placeholder_is_removable() {
        let mut view = ChatView::new();
        view.append(&Message::user("q"));
        let typing = view.show_typing();
        assert_eq!(view.entries().len(), 2);

        view.remove(typing);
        assert_eq!(view.entries().len(), 1);

        // Replacing a placeholder is a no-op.
        let typing = view.show_typing();
        view.replace_content(typing, "nope");
        assert_eq!(view.entries()[1].kind, EntryKind::Typing);
    }

    #[test]
    fn scroll_follows_output() {
        let mut view = ChatView::new();
        view.scroll_up(10);
        view.scroll_down(3);
        assert_eq!(view.scroll(), 7);

        view.clamp_scroll(5);
        assert_eq!(view.scroll(), 5);

        view.scroll_to_bottom();
        assert_eq!(view.scroll(), 0);

        view.scroll_down(1);
        assert_eq!(view.scroll(), 0);
    }

    #[test]
    fn input_is_read_and_cleared() {
        let mut view = ChatView::new();
        view.input.set_text("hello");
        assert_eq!(view.input_text(), "hello");

        view.clear_input();
        assert!(view.input.is_empty());
    }

    #[test]
    fn send_starts_disabled() {
        let mut view = ChatView::new();
        assert!(!view.is_send_enabled());
        view.set_send_enabled(true);
        assert!(view.is_send_enabled());
    }

    #[test]
    fn final_message_lines_are_reused_per_width() {
        let mut view = ChatView::new();
        view.append(&Message::assistant("**done**"));
        let renders = std::cell::Cell::new(0);
        let render = |message: &Message, _width: usize| {
            renders.set(renders.get() + 1);
            vec![Line::from(message.content.clone())]
        };

        let first = view.rendered_lines(0, 40, render).unwrap();
        let second = view.rendered_lines(0, 40, render).unwrap();
        assert_eq!(first, second);
        assert_eq!(renders.get(), 1);

        view.rendered_lines(0, 30, render).unwrap();
        assert_eq!(renders.get(), 2);
    }

    #[test]
    fn streaming_lines_are_rendered_every_time() {
        let mut view = ChatView::new();
        let id = view.append(&Message::streaming("a"));
        let renders = std::cell::Cell::new(0);
        let render = |message: &Message, _width: usize| {
            renders.set(renders.get() + 1);
            vec![Line::from(message.content.clone())]
        };

        view.rendered_lines(0, 40, render).unwrap();
        view.replace_content(id, "ab");
        let lines = view.rendered_lines(0, 40, render).unwrap();
        assert_eq!(lines, vec![Line::from("ab")]);
        assert_eq!(renders.get(), 2);

        // The first render after finalizing fills the cache.
        view.finalize(id);
        view.rendered_lines(0, 40, render).unwrap();
        view.rendered_lines(0, 40, render).unwrap();
        assert_eq!(renders.get(), 3);
    }

    #[test]
    fn typing_placeholder_has_no_message_lines() {
        let mut view = ChatView::new();
        view.show_typing();
        assert!(view
            .rendered_lines(0, 40, |_, _| vec![Line::from("x")])
            .is_none());
        assert!(view
            .rendered_lines(1, 40, |_, _| vec![Line::from("x")])
            .is_none());
    }

    #[test]
    fn spinner_cycles() {
        let mut view = ChatView::new();
        let first = view.spinner_char();
        view.tick();
        assert_ne!(view.spinner_char(), first);
        for _ in 1..SPINNER.len() {
            view.tick();
        }
        assert_eq!(view.spinner_char(), first);
    }
}
