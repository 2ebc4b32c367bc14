use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppState, ReviewLoad};

/// Render the keybindings bar at the bottom
pub fn render_keybindings(frame: &mut Frame, app: &App, area: Rect) {
    let keys: Vec<(&str, &str)> = match &app.state {
        AppState::Idle | AppState::Error(_) => {
            let mut keys = vec![("F1-F3", "Tabs"), ("Ctrl+S", "Submit")];
            if app.fields().len() > 1 {
                keys.push(("Tab", "Next field"));
            }
            keys.push(("Esc", "Quit"));
            keys
        }
        AppState::Submitting | AppState::Polling => vec![("Esc", "Cancel"), ("q", "Quit")],
        AppState::Complete => {
            let mut keys = vec![
                ("j/k", "Select"),
                ("Enter", "Expand"),
                ("y", "Copy code"),
                ("p", "Copy patch"),
                ("d", "Download"),
            ];
            if matches!(app.review, Some(ReviewLoad::Failed(_))) {
                keys.push(("r", "Retry"));
            }
            keys.push(("PgUp/PgDn", "Scroll"));
            keys.push(("n", "New"));
            keys.push(("q", "Quit"));
            keys
        }
        AppState::NotFound => vec![("n", "New"), ("q", "Quit")],
    };

    let mut spans: Vec<Span> = vec![Span::styled(" ", Style::default())];

    for (i, (key, desc)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(
            *key,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(Color::White),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(paragraph, area);
}
