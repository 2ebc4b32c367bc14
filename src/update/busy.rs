use crossterm::event::KeyCode;

use crate::app::App;
use crate::command::Command;

use super::helpers;

/// Input while a submission or review is in flight
pub fn handle_input(app: &mut App, code: KeyCode) -> Vec<Command> {
    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            vec![Command::StopPolling]
        }
        KeyCode::Esc => helpers::start_over(app),
        _ => Vec::new(),
    }
}
