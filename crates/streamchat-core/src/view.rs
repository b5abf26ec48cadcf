//! The display surface driven by the controller.

use crate::message::{ItemId, Message};

/// A message list plus an input box and a send affordance.
///
/// Every item handed to `append` or `replace_content` is rendered through
/// markdown by the implementation.
pub trait View {
    /// Append a message at the bottom of the list.
    fn append(&mut self, message: &Message) -> ItemId;

    /// Replace the displayed text of an existing item.
    fn replace_content(&mut self, id: ItemId, content: &str);

    /// Remove the cursor marker from an in-progress item.
    fn finalize(&mut self, id: ItemId);

    /// Show the typing placeholder at the bottom of the list.
    fn show_typing(&mut self) -> ItemId;

    /// Remove an item. Unknown ids are ignored.
    fn remove(&mut self, id: ItemId);

    /// Enable or disable the send affordance.
    fn set_send_enabled(&mut self, enabled: bool);

    /// Current contents of the input box.
    fn input_text(&self) -> String;

    /// Empty the input box and shrink it back to one line.
    fn clear_input(&mut self);

    /// Scroll the message list so the newest item is visible.
    fn scroll_to_bottom(&mut self);
}
