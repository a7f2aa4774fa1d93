use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_tasks().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_chat_editing(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.screen = app.screen.next();
            return;
        }
        KeyCode::Char('1') => {
            app.screen = Screen::About;
            return;
        }
        KeyCode::Char('2') => {
            app.screen = Screen::Projects;
            return;
        }
        KeyCode::Char('3') | KeyCode::Char('a') => {
            app.screen = Screen::Chat;
            app.input_mode = InputMode::Editing;
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::About => handle_about(app, key),
        Screen::Projects => handle_projects(app, key),
        Screen::Chat => handle_chat_normal(app, key),
    }
}

fn handle_about(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.about_scroll = app.about_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.about_scroll = app.about_scroll.saturating_sub(1),
        KeyCode::Char('g') => app.about_scroll = 0,
        _ => {}
    }
}

fn handle_projects(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.project_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.project_nav_up(),
        KeyCode::Enter | KeyCode::Char('i') => {
            app.request_insight();
        }
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.screen = Screen::About,
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char('j') | KeyCode::Down => app.chat_scroll = app.chat_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('M') => app.cycle_model(),
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_chat();
        }
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.chat_input.chars().count();
            if app.chat_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.chat_cursor = app.chat_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.chat_input.chars().count();
            app.chat_cursor = (app.chat_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.chat_cursor = 0;
        }
        KeyCode::End => {
            app.chat_cursor = app.chat_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let inside = app.body_area.map_or(true, |r| {
        mouse.column >= r.x && mouse.column < r.x + r.width && mouse.row >= r.y && mouse.row < r.y + r.height
    });
    if !inside {
        return;
    }

    match (mouse.kind, app.screen) {
        (MouseEventKind::ScrollDown, Screen::About) => app.about_scroll = app.about_scroll.saturating_add(3),
        (MouseEventKind::ScrollUp, Screen::About) => app.about_scroll = app.about_scroll.saturating_sub(3),
        (MouseEventKind::ScrollDown, Screen::Projects) => app.project_nav_down(),
        (MouseEventKind::ScrollUp, Screen::Projects) => app.project_nav_up(),
        (MouseEventKind::ScrollDown, Screen::Chat) => app.chat_scroll = app.chat_scroll.saturating_add(3),
        (MouseEventKind::ScrollUp, Screen::Chat) => app.chat_scroll = app.chat_scroll.saturating_sub(3),
        _ => {}
    }
}
