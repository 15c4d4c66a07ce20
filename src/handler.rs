use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::config::Config;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Reply(outcome) => app.apply_outcome(outcome),
        AppEvent::Tick => app.tick(),
        AppEvent::Resize => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // A failure banner stays up until the user does anything else.
    app.clear_notice();

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,

        KeyCode::Enter => app.submit(),

        // Toggle gpt <-> gemini; remember the choice for next session
        KeyCode::Tab => {
            app.toggle_backend();
            let _ = Config::save_backend(app.store.selection().as_str());
        }

        // Compose buffer editing
        KeyCode::Backspace => app.store.delete_before_cursor(),
        KeyCode::Delete => app.store.delete_at_cursor(),
        KeyCode::Left => app.store.cursor_left(),
        KeyCode::Right => app.store.cursor_right(),
        KeyCode::Home => app.store.cursor_home(),
        KeyCode::End => app.store.cursor_end(),

        // History scrollback
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::PageDown => app.scroll_down(app.half_page()),

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.store.insert_char(c)
        }

        _ => {}
    }
}
