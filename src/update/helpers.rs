use crossterm::event::{KeyCode, KeyModifiers};
use tracing::info;

use crate::app::{App, AppState};
use crate::command::Command;
use crate::domain::types::Tab;
use crate::domain::validation;

/// Keys that work in every state. Returns `None` when the key is not global.
pub fn handle_global(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Option<Vec<Command>> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
            app.should_quit = true;
            Some(vec![Command::StopPolling])
        }
        KeyCode::Char('t') if ctrl => {
            let next = app.tab.next();
            Some(switch_tab(app, next))
        }
        KeyCode::F(1) => Some(switch_tab(app, Tab::PasteCode)),
        KeyCode::F(2) => Some(switch_tab(app, Tab::UploadZip)),
        KeyCode::F(3) => Some(switch_tab(app, Tab::GithubRepo)),
        _ => None,
    }
}

/// Changing tabs abandons whatever the previous tab started
pub fn switch_tab(app: &mut App, tab: Tab) -> Vec<Command> {
    if app.session.is_some() || app.state != AppState::Idle {
        info!(from = ?app.tab, to = ?tab, "tab switch resets session");
    }
    app.select_tab(tab);
    vec![Command::StopPolling]
}

/// Drop the current session and go back to the form
pub fn start_over(app: &mut App) -> Vec<Command> {
    app.reset_session();
    vec![Command::StopPolling]
}

pub fn submit(app: &mut App) -> Vec<Command> {
    let input = app.current_input();
    match validation::validate(&input, &app.limits) {
        Ok(submission) => {
            app.reset_session();
            app.state = AppState::Submitting;
            info!(kind = submission.kind(), epoch = app.epoch, "submitting for review");
            vec![
                Command::StopPolling,
                Command::Submit {
                    epoch: app.epoch,
                    submission,
                },
            ]
        }
        Err(err) => {
            app.fail(err.to_string());
            Vec::new()
        }
    }
}
