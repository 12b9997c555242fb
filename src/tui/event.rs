//! Terminal events to messages.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::message::{InputEdit, Message, Scroll};
use super::model::{App, Focus};

const PAGE: usize = 10;

pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_event(event: Event, app: &App) -> Message {
    match event {
        Event::Key(key) => handle_key_event(key, app),
        Event::Paste(text) if app.notice().is_none() && app.focus == Focus::Input => {
            Message::Input(InputEdit::Paste(text))
        }
        _ => Message::Noop,
    }
}

fn handle_key_event(key: KeyEvent, app: &App) -> Message {
    // Windows terminals also report Release events.
    if key.kind != KeyEventKind::Press {
        return Message::Noop;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
        return Message::Quit;
    }

    if app.notice().is_some() {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => Message::DismissNotice,
            _ => Message::Noop,
        };
    }

    match key.code {
        KeyCode::Char('s') if ctrl => return Message::StartFetch,
        KeyCode::F(5) => return Message::StartFetch,
        KeyCode::Char('l') if ctrl => return Message::ClearInput,
        KeyCode::Char('o') if ctrl => return Message::OpenFolder,
        KeyCode::Tab | KeyCode::BackTab => return Message::ToggleFocus,
        KeyCode::Esc => return Message::Quit,
        _ => {}
    }

    match app.focus {
        Focus::Input => handle_input_keys(key),
        Focus::Log => handle_log_keys(key),
    }
}

fn handle_input_keys(key: KeyEvent) -> Message {
    let edit = match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            InputEdit::Insert(c)
        }
        KeyCode::Enter => InputEdit::Newline,
        KeyCode::Backspace => InputEdit::Backspace,
        KeyCode::Delete => InputEdit::Delete,
        KeyCode::Left => InputEdit::Left,
        KeyCode::Right => InputEdit::Right,
        KeyCode::Up => InputEdit::Up,
        KeyCode::Down => InputEdit::Down,
        KeyCode::Home => InputEdit::Home,
        KeyCode::End => InputEdit::End,
        _ => return Message::Noop,
    };
    Message::Input(edit)
}

fn handle_log_keys(key: KeyEvent) -> Message {
    let scroll = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Scroll::Up(1),
        KeyCode::Down | KeyCode::Char('j') => Scroll::Down(1),
        KeyCode::PageUp => Scroll::Up(PAGE),
        KeyCode::PageDown => Scroll::Down(PAGE),
        KeyCode::Home | KeyCode::Char('g') => Scroll::Top,
        KeyCode::End | KeyCode::Char('G') => Scroll::Bottom,
        _ => return Message::Noop,
    };
    Message::ScrollLog(scroll)
}
