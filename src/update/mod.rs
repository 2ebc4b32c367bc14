mod actions;
mod busy;
mod form;
mod helpers;
mod results;

use tokio::time::Instant;

use crate::action::Action;
use crate::app::{App, AppState};
use crate::command::Command;

/// Commands to run once at startup
pub fn init(_app: &App) -> Vec<Command> {
    vec![Command::LoadLimits]
}

pub fn update(app: &mut App, action: Action) -> Vec<Command> {
    match action {
        Action::Input { code, modifiers } => {
            if let Some(commands) = helpers::handle_global(app, code, modifiers) {
                return commands;
            }
            match &app.state {
                AppState::Idle | AppState::Error(_) => form::handle_input(app, code, modifiers),
                AppState::Submitting | AppState::Polling => busy::handle_input(app, code),
                AppState::Complete | AppState::NotFound => {
                    results::handle_input(app, code, modifiers)
                }
            }
        }
        Action::Paste(text) => form::handle_paste(app, &text),
        Action::Tick => {
            app.expire_flash(Instant::now());
            Vec::new()
        }
        Action::LimitsLoaded(limits) => actions::handle_limits_loaded(app, limits),
        Action::Submitted { epoch, result } => actions::handle_submitted(app, epoch, result),
        Action::StatusPolled { session, snapshot } => {
            actions::handle_status_polled(app, session, snapshot)
        }
        Action::PollTimedOut { session, after } => {
            actions::handle_poll_timed_out(app, session, after)
        }
        Action::ReviewLoaded { session, result } => {
            actions::handle_review_loaded(app, session, result)
        }
        Action::Copied {
            session,
            target,
            result,
        } => actions::handle_copied(app, session, target, result),
        Action::Downloaded { session, result } => {
            actions::handle_downloaded(app, session, result)
        }
    }
}
