use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState};

pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let loading = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("⏳ {}", message),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )]),
    ])
    .wrap(Wrap { trim: false });

    frame.render_widget(loading, area);
}

/// Progress while the submission is in flight or the review is running
pub fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    if app.state == AppState::Submitting {
        render_loading(frame, area, "Submitting...");
        return;
    }

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("⏳ Status: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(app.status_label().to_string(), Style::default().fg(Color::White)),
        ]),
    ];
    if let Some(session) = &app.session {
        lines.push(Line::from(vec![
            Span::styled("Session: ", Style::default().fg(Color::DarkGray)),
            Span::styled(session.to_string(), Style::default().fg(Color::Gray)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
