use std::fs;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

mod app;
mod backend;
mod client;
mod config;
mod handler;
mod message;
mod router;
mod store;
mod tui;
mod ui;

use app::App;
use backend::Backend;
use client::RelayClient;
use config::Config;
use store::ConversationStore;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = Config::load().unwrap_or_default();
    let selection = config
        .backend
        .as_deref()
        .and_then(Backend::from_str)
        .unwrap_or(Backend::Gpt);
    let client = RelayClient::new(&config.server_url());

    // Seed the conversation from the relay. An unreachable relay is
    // not fatal, the session just starts empty.
    let messages = match client.fetch_history().await {
        Ok(rows) => message::hydrate_history(&rows),
        Err(err) => {
            tracing::warn!(error = %err, "history hydration failed, starting empty");
            Vec::new()
        }
    };
    let store = ConversationStore::hydrate(selection, messages);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(store, client, events.sender());

    let result = run(&mut terminal, &mut events, &mut app).await;
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;
        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

/// Log to a file under the user's data dir; the terminal itself
/// belongs to the TUI. RUST_LOG controls the filter.
fn init_logging() -> Result<()> {
    let log_dir = dirs::data_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?
        .join("duochat");
    fs::create_dir_all(&log_dir)?;

    let log_file = fs::File::create(log_dir.join("duochat.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
