use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, AppState};

use super::components::{
    error::render_not_found, form::render_form, header::render_header,
    keybindings::render_keybindings, loading::render_status, results::render_results,
};

const HEADER_HEIGHT: u16 = 3;
const KEYS_HEIGHT: u16 = 2;

/// Rows left for the main content in a terminal `total` rows tall
pub fn main_area_height(total: u16) -> u16 {
    total.saturating_sub(HEADER_HEIGHT + KEYS_HEIGHT)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT), // Title and tabs
            Constraint::Min(5),                // Main content
            Constraint::Length(KEYS_HEIGHT),   // Keybindings bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match &app.state {
        AppState::Idle | AppState::Error(_) => render_form(frame, app, chunks[1]),
        AppState::Submitting | AppState::Polling => render_status(frame, app, chunks[1]),
        AppState::Complete => render_results(frame, app, chunks[1]),
        AppState::NotFound => render_not_found(frame, app, chunks[1]),
    }

    render_keybindings(frame, app, chunks[2]);
}
