use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FormField, TextInput};
use crate::domain::types::{Tab, ZipSelection};

use super::error::error_lines;
use super::util::format_size;

/// Render the active tab's form, its errors and the submit hint
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let footer_height = app.errors.len() as u16 + 2;

    match app.tab {
        Tab::PasteCode => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(3),
                    Constraint::Length(footer_height),
                ])
                .split(area);

            render_field(frame, app, FormField::Filename, FormField::Filename.label().to_string(), chunks[0]);

            let title = match app.language_hint() {
                Some(language) => format!("Code ({})", language),
                None => "Code".to_string(),
            };
            render_field(frame, app, FormField::Code, title, chunks[1]);
            render_footer(frame, app, chunks[2]);
        }
        Tab::UploadZip => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(2),
                    Constraint::Min(0),
                    Constraint::Length(footer_height),
                ])
                .split(area);

            render_field(frame, app, FormField::ZipPath, "ZIP File (path)".to_string(), chunks[0]);
            render_zip_details(frame, app, chunks[1]);
            render_footer(frame, app, chunks[3]);
        }
        Tab::GithubRepo => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(0),
                    Constraint::Length(footer_height),
                ])
                .split(area);

            render_field(frame, app, FormField::GithubUrl, FormField::GithubUrl.label().to_string(), chunks[0]);
            render_footer(frame, app, chunks[2]);
        }
    }
}

fn render_field(frame: &mut Frame, app: &App, field: FormField, title: String, area: Rect) {
    let focused = app.focus == field;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };
    let input = app.input(field);

    let inner_height = area.height.saturating_sub(2);
    let (row, col) = cursor_position(input);
    let scroll = row.saturating_sub(inner_height.saturating_sub(1));

    let paragraph = Paragraph::new(input.value())
        .style(Style::default().fg(Color::White))
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", title),
                    Style::default().fg(border_color).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    frame.render_widget(paragraph, area);

    if focused {
        let x = area.x + 1 + col.min(area.width.saturating_sub(3));
        let y = area.y + 1 + row - scroll;
        frame.set_cursor_position((x, y));
    }
}

/// Row and column of the cursor within the input's text
fn cursor_position(input: &TextInput) -> (u16, u16) {
    let before = &input.value()[..input.cursor()];
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map_or(0, |line| line.chars().count());
    (row as u16, col as u16)
}

fn render_zip_details(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        format!("Max size: {}MB", app.limits.max_zip_size_mb),
        Style::default().fg(Color::DarkGray),
    ))];

    match &app.zip_selection {
        ZipSelection::File { size_bytes, .. } => lines.push(Line::from(Span::styled(
            format!("Selected: {}", format_size(*size_bytes)),
            Style::default().fg(Color::Green),
        ))),
        ZipSelection::NotAFile(_) => lines.push(Line::from(Span::styled(
            "No such file",
            Style::default().fg(Color::DarkGray),
        ))),
        ZipSelection::None => {}
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = error_lines(&app.errors);
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Ctrl+S", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" Submit for Review", Style::default().fg(Color::White)),
    ]));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
