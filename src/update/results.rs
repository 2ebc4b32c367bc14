use crossterm::event::{KeyCode, KeyModifiers};

use crate::action::CopyTarget;
use crate::app::{App, ReviewLoad};
use crate::command::Command;
use crate::domain::types::ReviewStatus;
use crate::ui;

use super::helpers;

const PAGE: u16 = 10;

pub fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            Vec::new()
        }
        KeyCode::Char('n') | KeyCode::Esc => helpers::start_over(app),
        KeyCode::Char('d') if ctrl => {
            page_down(app);
            Vec::new()
        }
        KeyCode::Char('u') if ctrl => {
            app.scroll_offset = app.scroll_offset.saturating_sub(PAGE);
            Vec::new()
        }
        KeyCode::PageDown => {
            page_down(app);
            Vec::new()
        }
        KeyCode::PageUp => {
            app.scroll_offset = app.scroll_offset.saturating_sub(PAGE);
            Vec::new()
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next_issue();
            follow_selection(app);
            Vec::new()
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev_issue();
            follow_selection(app);
            Vec::new()
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.toggle_expanded();
            follow_selection(app);
            Vec::new()
        }
        KeyCode::Char('y') => copy_recommended_code(app),
        KeyCode::Char('p') => copy_patch(app),
        KeyCode::Char('d') => download(app),
        KeyCode::Char('r') => retry_review(app),
        _ => Vec::new(),
    }
}

/// Largest offset that still fills the viewport
fn max_scroll(app: &App) -> u16 {
    ui::results_layout(app)
        .height
        .saturating_sub(app.viewport_height)
}

fn page_down(app: &mut App) {
    app.scroll_offset = app.scroll_offset.saturating_add(PAGE).min(max_scroll(app));
}

/// Keep the selected issue's header row on screen
fn follow_selection(app: &mut App) {
    let height = app.viewport_height;
    if height == 0 {
        return;
    }
    let layout = ui::results_layout(app);
    let Some(&row) = layout.issue_rows.get(app.selected_issue) else {
        return;
    };

    if row < app.scroll_offset {
        app.scroll_offset = row;
    } else if row >= app.scroll_offset.saturating_add(height) {
        app.scroll_offset = row + 1 - height;
    }
    app.scroll_offset = app
        .scroll_offset
        .min(layout.height.saturating_sub(height));
}

/// Recommended code is only reachable from an expanded row
fn copy_recommended_code(app: &mut App) -> Vec<Command> {
    let Some(session) = app.session.clone() else {
        return Vec::new();
    };
    let idx = app.selected_issue;
    if !app.is_expanded(idx) {
        return Vec::new();
    }
    let Some(issue) = app.issue(idx) else {
        return Vec::new();
    };
    if issue.recommended_code.is_empty() {
        return Vec::new();
    }

    vec![Command::CopyToClipboard {
        session,
        target: CopyTarget::Issue(idx),
        text: issue.recommended_code.clone(),
    }]
}

fn copy_patch(app: &mut App) -> Vec<Command> {
    let Some(session) = app.session.clone() else {
        return Vec::new();
    };
    let Some(patch) = app.loaded_review().and_then(|r| r.unified_patch()) else {
        return Vec::new();
    };

    vec![Command::CopyToClipboard {
        session,
        target: CopyTarget::Patch,
        text: patch.to_string(),
    }]
}

fn download(app: &mut App) -> Vec<Command> {
    let Some(session) = app.session.clone() else {
        return Vec::new();
    };
    let Some(status) = &app.status else {
        return Vec::new();
    };
    if status.status != ReviewStatus::Complete {
        return Vec::new();
    }

    let url = status
        .download_url
        .clone()
        .or_else(|| app.loaded_review().and_then(|r| r.download_url.clone()))
        .filter(|u| !u.is_empty());
    let Some(url) = url else {
        app.notice = Some("No download available for this review".to_string());
        return Vec::new();
    };

    app.notice = Some("Downloading...".to_string());
    vec![Command::Download { session, url }]
}

fn retry_review(app: &mut App) -> Vec<Command> {
    if !matches!(app.review, Some(ReviewLoad::Failed(_))) {
        return Vec::new();
    }
    let Some(session) = app.session.clone() else {
        return Vec::new();
    };

    app.review = Some(ReviewLoad::Loading);
    vec![Command::FetchReview { session }]
}
