use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::domain::types::Tab;

/// Render the title line and the tab strip
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut title = vec![Span::styled(
        "AI Code Reviewer",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if let Some(session) = &app.session {
        title.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        title.push(Span::styled(
            format!("session {}", session),
            Style::default().fg(Color::White),
        ));
    }

    let mut tabs: Vec<Span> = Vec::new();
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            tabs.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        let style = if *tab == app.tab {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        tabs.push(Span::styled(format!("F{} {}", i + 1, tab.title()), style));
    }

    let header = Paragraph::new(vec![Line::from(title), Line::from(tabs)]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(header, area);
}
