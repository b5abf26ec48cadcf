//! UI rendering with ratatui.
//!
//! Layout, top to bottom: header bar, transcript, input box, status bar.
//! The input box grows with its content.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use ratatui::Frame;

use streamchat_core::html::TYPING_TEXT;
use streamchat_core::{ConnectionState, Message, Sender};

use crate::markdown::render_lines;
use crate::view::ChatView;

/// Application title in the header bar.
const TITLE: &str = "STREAMCHAT";

/// Marker appended to a message that is still streaming.
const STREAM_CURSOR: &str = "▌";

/// Horizontal padding for transcript content.
const CHAT_PADDING: u16 = 2;

/// Render the UI.
pub fn render(frame: &mut Frame, view: &mut ChatView, endpoint: &str, state: ConnectionState) {
    let area = frame.area();
    let input_height = u16::try_from(view.input.height()).unwrap_or(u16::MAX);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Header bar
            Constraint::Min(3),               // Transcript
            Constraint::Length(input_height), // Input box
            Constraint::Length(1),            // Status bar
        ])
        .split(area);

    render_header_bar(frame, endpoint, state, layout[0]);
    render_transcript(frame, view, layout[1]);
    render_input(frame, view, layout[2]);
    render_status_bar(frame, state, layout[3]);
}

fn state_style(state: ConnectionState) -> Style {
    match state {
        ConnectionState::Connecting => Style::default().fg(Color::Yellow),
        ConnectionState::Open => Style::default().fg(Color::Green),
        ConnectionState::Closed | ConnectionState::Errored => Style::default().fg(Color::Red),
    }
}

/// Render the header bar with the endpoint and connection state.
fn render_header_bar(frame: &mut Frame, endpoint: &str, state: ConnectionState, area: Rect) {
    let status_text = state.as_str();
    let right_width = endpoint.chars().count() + status_text.len() + 3;
    let padding = usize::from(area.width).saturating_sub(TITLE.len() + right_width);

    let line = Line::from(vec![
        Span::styled(
            TITLE,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(padding)),
        Span::raw(endpoint.to_string()),
        Span::raw(" ["),
        Span::styled(status_text, state_style(state)),
        Span::raw("]"),
    ]);

    let header = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn label(sender: Sender) -> Span<'static> {
    let (text, color) = match sender {
        Sender::User => ("[You]", Color::Cyan),
        Sender::Assistant => ("[Assistant]", Color::Green),
        Sender::System => ("[System]", Color::Yellow),
    };
    Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

/// Lines for one message: label, rendered markdown, stream cursor if live.
fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(label(message.sender))];

    let mut body = render_lines(&message.content, width);
    if message.sender == Sender::System {
        for line in &mut body {
            line.style = Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC);
        }
    }
    if message.is_in_progress() {
        let cursor = Span::styled(STREAM_CURSOR, Style::default().fg(Color::Gray));
        match body.last_mut() {
            Some(last) => last.spans.push(cursor),
            None => body.push(Line::from(cursor)),
        }
    }

    lines.extend(body);
    lines.push(Line::default());
    lines
}

/// Build all transcript lines.
fn transcript_lines(view: &mut ChatView, width: usize) -> Vec<Line<'static>> {
    let spinner = view.spinner_char();
    let mut lines = Vec::new();
    for index in 0..view.entries().len() {
        if let Some(message) = view.rendered_lines(index, width, message_lines) {
            lines.extend(message);
        } else {
            lines.push(Line::from(label(Sender::Assistant)));
            lines.push(Line::from(vec![
                Span::styled(spinner, Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled(TYPING_TEXT, Style::default().fg(Color::DarkGray)),
            ]));
            lines.push(Line::default());
        }
    }
    lines
}

/// Render the transcript, pinned to the bottom unless scrolled up.
fn render_transcript(frame: &mut Frame, view: &mut ChatView, area: Rect) {
    let block = Block::default()
        .title(" Chat ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chat_area = Rect::new(
        inner.x + CHAT_PADDING,
        inner.y,
        inner.width.saturating_sub(CHAT_PADDING * 2 + 1), // +1 for scrollbar
        inner.height,
    );
    let content_width = usize::from(chat_area.width);

    if view.entries().is_empty() {
        let hint = Paragraph::new("Waiting for the server...")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, chat_area);
        return;
    }

    let text = Text::from(transcript_lines(view, content_width));
    let visible_lines = usize::from(chat_area.height);
    let total_lines = wrapped_line_count(&text, content_width);

    // Offset counts lines up from the bottom, so 0 shows the newest output.
    let max_scroll = total_lines.saturating_sub(visible_lines);
    view.clamp_scroll(max_scroll);
    let top = max_scroll - view.scroll();

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, chat_area);

    if total_lines > visible_lines {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));
        let mut state = ScrollbarState::new(total_lines)
            .position(top)
            .viewport_content_length(visible_lines);
        frame.render_stateful_widget(scrollbar, inner, &mut state);
    }
}

/// Render the input box and place the terminal cursor in it.
fn render_input(frame: &mut Frame, view: &ChatView, area: Rect) {
    let enabled = view.is_send_enabled();
    let (title, border) = if enabled {
        (" Message ", Color::Cyan)
    } else {
        (" Sending disabled ", Color::DarkGray)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);

    let (row, col) = view.input.cursor_position();
    // Keep the cursor visible when the box is squeezed by a small terminal.
    let row_offset = row.saturating_sub(usize::from(inner.height.saturating_sub(1)));
    let col_offset = col.saturating_sub(usize::from(inner.width.saturating_sub(1)));

    let input = Paragraph::new(view.input.text())
        .style(Style::default().fg(if enabled { Color::White } else { Color::DarkGray }))
        .scroll((
            u16::try_from(row_offset).unwrap_or(u16::MAX),
            u16::try_from(col_offset).unwrap_or(u16::MAX),
        ))
        .block(block);
    frame.render_widget(input, area);

    if enabled && inner.width > 0 && inner.height > 0 {
        let x = u16::try_from(col - col_offset).unwrap_or(0);
        let y = u16::try_from(row - row_offset).unwrap_or(0);
        frame.set_cursor_position((inner.x + x, inner.y + y));
    }
}

/// Render the status bar.
fn render_status_bar(frame: &mut Frame, state: ConnectionState, area: Rect) {
    let badge = Span::styled(
        format!(" {} ", state.as_str().to_uppercase()),
        state_style(state).add_modifier(Modifier::REVERSED),
    );
    let key = Style::default().fg(Color::Yellow);

    let status = Line::from(vec![
        badge,
        Span::raw(" "),
        Span::styled("Enter", key),
        Span::raw(":send "),
        Span::styled("Shift+Enter", key),
        Span::raw(":newline "),
        Span::styled("PgUp/PgDn", key),
        Span::raw(":scroll "),
        Span::styled("Esc", key),
        Span::raw(":quit"),
    ]);

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

/// Calculate the number of visual lines after text wrapping.
fn wrapped_line_count(text: &Text, available_width: usize) -> usize {
    if available_width == 0 {
        return text.lines.len();
    }

    text.lines
        .iter()
        .map(|line| line.width().div_ceil(available_width).max(1))
        .sum()
}
