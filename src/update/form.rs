use crossterm::event::{KeyCode, KeyModifiers};

use crate::app::{App, FormField};
use crate::command::Command;

use super::helpers;

pub fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
    match code {
        KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => helpers::submit(app),
        KeyCode::Enter if app.focus.is_multiline() => {
            app.focused_input_mut().insert_char('\n');
            Vec::new()
        }
        KeyCode::Enter => helpers::submit(app),
        KeyCode::Tab | KeyCode::BackTab => {
            app.next_field();
            Vec::new()
        }
        KeyCode::Esc => {
            app.should_quit = true;
            Vec::new()
        }
        KeyCode::Backspace => {
            app.focused_input_mut().backspace();
            edited(app);
            Vec::new()
        }
        KeyCode::Left => {
            app.focused_input_mut().left();
            Vec::new()
        }
        KeyCode::Right => {
            app.focused_input_mut().right();
            Vec::new()
        }
        KeyCode::Home => {
            app.focused_input_mut().home();
            Vec::new()
        }
        KeyCode::End => {
            app.focused_input_mut().end();
            Vec::new()
        }
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            app.focused_input_mut().insert_char(c);
            edited(app);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Bracketed paste. Single-line fields keep only the first line.
pub fn handle_paste(app: &mut App, text: &str) -> Vec<Command> {
    if !app.is_form_active() {
        return Vec::new();
    }

    let text = text.replace("\r\n", "\n");
    if app.focus.is_multiline() {
        app.focused_input_mut().insert_str(&text);
    } else {
        let line = text.lines().next().unwrap_or_default();
        app.focused_input_mut().insert_str(line.trim());
    }
    edited(app);
    Vec::new()
}

fn edited(app: &mut App) {
    if app.focus == FormField::ZipPath {
        app.refresh_zip_selection();
    }
}
