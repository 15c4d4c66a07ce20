use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;
use crate::backend::Backend;
use crate::message::{MessageContent, Role};

fn role_label(role: Role) -> (&'static str, Color) {
    match role {
        Role::User => ("You:", Color::Cyan),
        Role::Gpt => ("GPT:", Color::Blue),
        Role::Gemini => ("Gemini:", Color::Green),
    }
}

fn backend_color(backend: Backend) -> Color {
    match backend {
        Backend::Gpt => Color::Blue,
        Backend::Gemini => Color::Green,
    }
}

/// Estimate how many terminal rows a logical line occupies once the
/// chat paragraph wraps it.
fn wrapped_line_count(text: &str, width: usize) -> u16 {
    if width == 0 {
        return 1;
    }
    // Use character count, not byte length, for proper UTF-8 handling
    let char_count = text.chars().count();
    if char_count == 0 {
        1
    } else {
        ((char_count / width) + 1) as u16
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let [chat_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    render_chat(app, frame, chat_area);
    render_status(app, frame, status_area);
    render_input(app, frame, input_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store the pane height for scroll calculations (inner size minus
    // borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    app.chat_height = area.height.saturating_sub(2);

    let selection = app.store.selection();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(backend_color(selection)))
        .title(format!(" {} (Tab to switch) ", selection.display_name()));

    let mut lines: Vec<Line> = Vec::new();
    let mut total: u16 = 0;

    if app.store.messages().is_empty() && app.pending_sends == 0 {
        lines.push(Line::from(Span::styled(
            "Say something, or @image <prompt> for a picture...",
            Style::default().fg(Color::DarkGray),
        )));
        total += 1;
    } else {
        for msg in app.store.messages() {
            let (label, color) = role_label(msg.role);
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            total += 1;

            match &msg.content {
                MessageContent::Text(text) => {
                    for line in text.lines() {
                        total += wrapped_line_count(line, inner_width);
                        lines.push(Line::from(line.to_string()));
                    }
                }
                MessageContent::CaptionedImage { caption, url } => {
                    total += wrapped_line_count(caption, inner_width);
                    lines.push(Line::from(Span::styled(
                        caption.clone(),
                        Style::default().add_modifier(Modifier::ITALIC),
                    )));
                    if !url.is_empty() {
                        total += wrapped_line_count(url, inner_width);
                        lines.push(Line::from(Span::styled(
                            url.clone(),
                            Style::default()
                                .fg(Color::Blue)
                                .add_modifier(Modifier::UNDERLINED),
                        )));
                    }
                }
            }

            lines.push(Line::default());
            total += 1;
        }

        if app.pending_sends > 0 {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            let label = if app.pending_sends > 1 {
                format!("Thinking{} ({} pending)", dots, app.pending_sends)
            } else {
                format!("Thinking{}", dots)
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
            total += 1;
        }
    }

    app.total_chat_lines = total;
    if app.stick_to_bottom {
        app.chat_scroll = app.max_scroll();
    } else {
        app.chat_scroll = app.chat_scroll.min(app.max_scroll());
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let status = match &app.notice {
        Some(notice) => Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            " Enter: send | Tab: switch backend | @image <prompt>: image | Esc: quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(status), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message ");

    // Calculate visible portion of input with horizontal scrolling.
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.store.cursor();

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .store
        .buffer()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}
