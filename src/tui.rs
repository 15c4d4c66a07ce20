use std::io::{self, Stderr};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::app::SendOutcome;

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Everything the main loop reacts to: terminal input, the animation
/// tick, and send round trips finishing in whatever order the relay
/// answers them.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    Reply(SendOutcome),
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        // Spawn event reader task
        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            loop {
                if let Some(Ok(evt)) = reader.next().await {
                    let app_event = match evt {
                        // Only handle key press events, not release
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            Some(AppEvent::Key(key))
                        }
                        Event::Resize(_, _) => Some(AppEvent::Resize),
                        _ => None,
                    };

                    if let Some(event) = app_event {
                        if tx_events.send(event).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        // Spawn tick timer for the thinking animation (300ms interval)
        let tx_tick = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_millis(300));
            loop {
                interval.tick().await;
                if tx_tick.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    /// Sender handed to spawned send tasks. Completions land on the
    /// same queue as key events, so history appends stay serialized on
    /// the main loop and arrive in completion order.
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}
