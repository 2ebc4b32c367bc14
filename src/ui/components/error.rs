use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Error list shown under the form
pub fn error_lines(errors: &[String]) -> Vec<Line<'_>> {
    errors
        .iter()
        .map(|message| {
            Line::from(vec![Span::styled(
                format!("Error: {}", message),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )])
        })
        .collect()
}

pub fn render_not_found(frame: &mut Frame, app: &App, area: Rect) {
    let session = app
        .session
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_default();

    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "Review session not found",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![Span::styled(
            format!("The service no longer knows session {}. Press n to submit again.", session),
            Style::default().fg(Color::Gray),
        )]),
    ])
    .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}
