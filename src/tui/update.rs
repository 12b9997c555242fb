//! State transitions.

use bulk_whois::parse_domain_list;
use tracing::debug;

use super::backend::{Backend, BackendEvent};
use super::message::{InputEdit, Message, Scroll};
use super::model::{App, Notice};

pub fn update(app: &mut App, backend: &Backend, msg: Message) {
    match msg {
        Message::Quit => app.should_quit = true,
        Message::StartFetch => start_fetch(app, backend),
        Message::ClearInput => app.clear_input(),
        Message::OpenFolder => backend.open_folder(),
        Message::ToggleFocus => app.focus = app.focus.toggle(),
        Message::DismissNotice => app.dismiss_notice(),
        Message::Input(edit) => edit_input(app, edit),
        Message::ScrollLog(scroll) => scroll_log(app, scroll),
        Message::Noop => {}
    }
}

pub fn apply_backend_event(app: &mut App, event: BackendEvent) {
    match event {
        BackendEvent::Fetch(event) => app.apply_fetch_event(event),
        BackendEvent::FolderOpened(result) => {
            for notice in Notice::from_open_result(result) {
                app.push_notice(notice);
            }
        }
    }
}

fn start_fetch(app: &mut App, backend: &Backend) {
    if app.running {
        debug!("Fetch already running, ignoring start request");
        return;
    }
    let domains = parse_domain_list(&app.input.text());
    if domains.is_empty() {
        app.push_notice(Notice::no_input());
        return;
    }
    app.begin_run();
    backend.start_fetch(domains);
}

fn edit_input(app: &mut App, edit: InputEdit) {
    let input = &mut app.input;
    match edit {
        InputEdit::Insert(c) => input.insert_char(c),
        InputEdit::Paste(text) => input.insert_str(&text),
        InputEdit::Newline => input.newline(),
        InputEdit::Backspace => input.backspace(),
        InputEdit::Delete => input.delete(),
        InputEdit::Left => input.move_left(),
        InputEdit::Right => input.move_right(),
        InputEdit::Up => input.move_up(),
        InputEdit::Down => input.move_down(),
        InputEdit::Home => input.move_home(),
        InputEdit::End => input.move_end(),
    }
}

fn scroll_log(app: &mut App, scroll: Scroll) {
    match scroll {
        Scroll::Up(n) => app.scroll_log_up(n),
        Scroll::Down(n) => app.scroll_log_down(n),
        Scroll::Top => app.scroll_log_up(usize::MAX),
        Scroll::Bottom => app.log_offset = 0,
    }
}
