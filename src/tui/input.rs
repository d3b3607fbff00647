//! Input handling for keyboard and terminal events

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, Tab};
use super::screens::help;
use crate::model::ControlOp;

/// Rows moved by PgUp/PgDn
const PAGE_ROWS: usize = 10;

const CONFIG_LOCKED: &str = "The configuration is locked while an operation is running";

/// Handle one terminal event
pub(crate) fn handle_event(app: &mut App, event: &Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, *key),
        Event::Resize(_, height) => app.on_resize(*height),
        _ => {}
    }
}

/// Feed a key straight into the handler
#[cfg(test)]
pub(crate) fn simulate_key_event(app: &mut App, key: KeyEvent) {
    handle_key_event(app, key);
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits immediately
    if is_ctrl(&key, 'c') {
        app.quit();
        return;
    }

    app.hint = None;
    app.dirty = true;

    if app.confirm_quit {
        match key.code {
            KeyCode::Char('q' | 'y') | KeyCode::Enter => app.quit(),
            _ => app.confirm_quit = false,
        }
        return;
    }

    if app.show_help {
        handle_help_key(app, key);
        return;
    }

    if app.show_diagnostics {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('D' | 'q')) {
            app.show_diagnostics = false;
        }
        return;
    }

    if app.tab == Tab::Config && app.editing {
        handle_editor_key(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('D') => app.show_diagnostics = true,
        KeyCode::Tab => app.set_tab(app.tab.next()),
        KeyCode::BackTab => app.set_tab(app.tab.prev()),
        KeyCode::Char(c) if Tab::from_key(c).is_some() => {
            if let Some(tab) = Tab::from_key(c) {
                app.set_tab(tab);
            }
        }
        _ => match app.tab {
            Tab::Control => handle_control_key(app, key),
            Tab::Config => handle_config_key(app, key),
            Tab::Logs => handle_logs_key(app, key),
        },
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    let offset = app.help_state.offset();
    match key.code {
        KeyCode::Esc | KeyCode::Char('?' | 'q') => app.show_help = false,
        KeyCode::Up | KeyCode::Char('k') => *app.help_state.offset_mut() = offset.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            *app.help_state.offset_mut() = (offset + 1).min(help::row_count().saturating_sub(1));
        }
        KeyCode::PageUp => *app.help_state.offset_mut() = offset.saturating_sub(PAGE_ROWS),
        KeyCode::PageDown => {
            *app.help_state.offset_mut() =
                (offset + PAGE_ROWS).min(help::row_count().saturating_sub(1));
        }
        _ => {}
    }
}

fn handle_control_key(app: &mut App, key: KeyEvent) {
    let count = ControlOp::ALL.len();
    match key.code {
        KeyCode::Left | KeyCode::Up => app.selected_op = (app.selected_op + count - 1) % count,
        KeyCode::Right | KeyCode::Down => app.selected_op = (app.selected_op + 1) % count,
        KeyCode::Enter => app.run_op(app.selected_op()),
        KeyCode::Char('s') => app.run_op(ControlOp::Start),
        KeyCode::Char('x') => app.run_op(ControlOp::Stop),
        KeyCode::Char('r') => app.run_op(ControlOp::Reload),
        KeyCode::Char('u') => app.refresh_status(),
        _ => {}
    }
}

fn handle_config_key(app: &mut App, key: KeyEvent) {
    if is_ctrl(&key, 's') {
        app.save();
        return;
    }
    let state = app.orch.operation_state();
    match key.code {
        KeyCode::Enter | KeyCode::Char('e') => {
            if !app.config_loaded {
                app.set_hint("Configuration has not been loaded yet");
            } else if state.busy {
                app.set_hint(CONFIG_LOCKED);
            } else {
                app.editing = true;
            }
        }
        KeyCode::Char('u') => {
            // A fetch landing after a save would replace the saved text's baseline
            if state.busy || state.saving {
                app.set_hint(CONFIG_LOCKED);
            } else {
                app.refresh_config();
            }
        }
        KeyCode::Up => app.editor.move_up(),
        KeyCode::Down => app.editor.move_down(),
        KeyCode::PageUp => app.editor.move_rows_up(PAGE_ROWS),
        KeyCode::PageDown => app.editor.move_rows_down(PAGE_ROWS),
        _ => {}
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    if is_ctrl(&key, 's') {
        app.save();
        return;
    }

    if app.orch.operation_state().busy {
        app.editing = false;
        app.set_hint(CONFIG_LOCKED);
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let editor = &mut app.editor;
    match key.code {
        KeyCode::Esc => app.editing = false,
        KeyCode::Char('w') if ctrl => editor.delete_word_before(),
        KeyCode::Char(c) if !ctrl && !alt => editor.insert_char(c),
        KeyCode::Enter => editor.insert_newline(),
        KeyCode::Tab => editor.insert_tab(),
        KeyCode::Backspace if ctrl || alt => editor.delete_word_before(),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left if ctrl => editor.move_word_left(),
        KeyCode::Right if ctrl => editor.move_word_right(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        KeyCode::PageUp => editor.move_rows_up(PAGE_ROWS),
        KeyCode::PageDown => editor.move_rows_down(PAGE_ROWS),
        _ => {}
    }
}

fn handle_logs_key(app: &mut App, key: KeyEvent) {
    // Upper bound is applied when drawing, against the visible rows
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.log_scroll = app.log_scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => app.log_scroll = app.log_scroll.saturating_add(1),
        KeyCode::PageUp => app.log_scroll = app.log_scroll.saturating_sub(PAGE_ROWS),
        KeyCode::PageDown => app.log_scroll = app.log_scroll.saturating_add(PAGE_ROWS),
        KeyCode::Home => app.log_scroll = 0,
        KeyCode::End => app.log_scroll = app.logs.len(),
        KeyCode::Char('u') => app.load_logs(),
        KeyCode::Char('c') => app.reconnect_logs(),
        _ => {}
    }
}
