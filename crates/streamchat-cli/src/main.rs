//! Streamchat - terminal client for a streaming chat server.
//!
//! This is the entry point for the `streamchat` binary.

mod config;
mod input;
mod markdown;
mod ui;
mod view;
mod ws;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers, KeyboardEnhancementFlags, MouseEventKind,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use futures::{Stream, StreamExt};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use streamchat_core::{Controller, SendOutcome, Transport};

use config::ClientConfig;
use view::ChatView;
use ws::{WsEvent, WsSender};

/// Lines moved per PageUp/PageDown.
const PAGE_SCROLL: usize = 10;

/// Lines moved per mouse wheel notch.
const WHEEL_SCROLL: usize = 3;

/// Streamchat - terminal client for a streaming chat server.
#[derive(Parser, Debug)]
#[command(name = "streamchat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    /// Write debug logs to this file instead of stderr.
    #[arg(long, env = "STREAMCHAT_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Read settings from this JSON file.
    #[arg(long, env = "STREAMCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Spinner animation interval in milliseconds.
    #[arg(long, env = "STREAMCHAT_TICK_MS")]
    tick_ms: Option<u64>,
}

type ChatController<T> = Controller<ChatView, T>;

/// What the event loop should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        let writer = match &args.log_file {
            Some(path) => BoxMakeWriter::new(Mutex::new(File::create(path)?)),
            None => BoxMakeWriter::new(io::stderr),
        };
        tracing_subscriber::fmt()
            .with_env_filter("streamchat=debug,streamchat_core=debug,warn")
            .with_writer(writer)
            .with_ansi(args.log_file.is_none())
            .init();
    }

    let config = ClientConfig::load(args.config.as_deref())?.with_overrides(args.tick_ms);
    tracing::info!(endpoint = %config.endpoint, "Starting client");

    // Setup terminal with mouse capture enabled
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    // Needed to tell Shift+Enter apart from Enter.
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if keyboard_enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Open the connection and start the controller
    let (sender, events) = ws::connect(&config.endpoint, config.channel_capacity);
    let mut controller = Controller::new(ChatView::new(), sender);
    controller.start();

    // Run the event loop
    let result = run_event_loop(
        &mut controller,
        events,
        EventStream::new(),
        config.tick(),
        |controller| draw(&mut terminal, controller, &config.endpoint),
    )
    .await;

    // Restore terminal
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn draw(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut ChatController<WsSender>,
    endpoint: &str,
) -> io::Result<()> {
    let state = controller.connection_state();
    terminal.draw(|f| ui::render(f, controller.view_mut(), endpoint, state))?;
    Ok(())
}

/// Main event loop.
///
/// Redraws after every terminal event, WebSocket event and spinner tick, so
/// streamed text appears as it arrives. Returns when the user quits or the
/// terminal input ends.
async fn run_event_loop<T, I, D>(
    controller: &mut ChatController<T>,
    mut events: mpsc::Receiver<WsEvent>,
    mut input: I,
    tick: Duration,
    mut redraw: D,
) -> anyhow::Result<()>
where
    T: Transport,
    I: Stream<Item = io::Result<Event>> + Unpin,
    D: FnMut(&mut ChatController<T>) -> io::Result<()>,
{
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        redraw(controller)?;

        tokio::select! {
            // Spinner animation
            _ = ticker.tick() => controller.view_mut().tick(),

            // Terminal events
            event = input.next() => {
                let Some(event) = event else { break };
                if handle_input(controller, event?) == Flow::Quit {
                    break;
                }
            }

            // WebSocket events
            Some(event) = events.recv() => handle_ws_event(controller, event),
        }
    }

    controller.stop();
    tracing::info!("Client stopped");

    Ok(())
}

/// Route a connection event to the controller.
fn handle_ws_event<T: Transport>(controller: &mut ChatController<T>, event: WsEvent) {
    match event {
        WsEvent::Opened => controller.on_open(),
        WsEvent::Message(text) => controller.on_message(&text),
        WsEvent::Error(description) => controller.on_error(&description),
        WsEvent::Closed => controller.on_close(),
    }
}

/// Handle terminal input events.
fn handle_input<T: Transport>(controller: &mut ChatController<T>, event: Event) -> Flow {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(controller, key),
        Event::Mouse(mouse) => {
            match mouse.kind {
                MouseEventKind::ScrollUp => controller.view_mut().scroll_up(WHEEL_SCROLL),
                MouseEventKind::ScrollDown => controller.view_mut().scroll_down(WHEEL_SCROLL),
                _ => {}
            }
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

/// Handle a key press: editing, scrolling, sending and quitting.
fn handle_key<T: Transport>(controller: &mut ChatController<T>, key: KeyEvent) -> Flow {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let newline = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('c') if ctrl => return Flow::Quit,
        KeyCode::Enter if !newline => {
            let outcome = controller.submit();
            if outcome != SendOutcome::Sent {
                tracing::debug!(outcome = ?outcome, "Message not sent");
            }
            return Flow::Continue;
        }
        _ => {}
    }

    let view = controller.view_mut();
    match key.code {
        KeyCode::Enter => view.input.newline(),
        KeyCode::PageUp => view.scroll_up(PAGE_SCROLL),
        KeyCode::PageDown => view.scroll_down(PAGE_SCROLL),
        KeyCode::Char('a') if ctrl => view.input.move_cursor_line_start(),
        KeyCode::Char('e') if ctrl => view.input.move_cursor_line_end(),
        KeyCode::Char('u') if ctrl => view.input.clear(),
        KeyCode::Char('w') if ctrl => view.input.delete_word(),
        KeyCode::Char(c) if !ctrl => view.input.insert_char(c),
        KeyCode::Backspace => view.input.delete_char(),
        KeyCode::Delete => view.input.delete_char_forward(),
        KeyCode::Left => view.input.move_cursor_left(),
        KeyCode::Right => view.input.move_cursor_right(),
        KeyCode::Home => view.input.move_cursor_line_start(),
        KeyCode::End => view.input.move_cursor_line_end(),
        _ => {}
    }

    Flow::Continue
}
