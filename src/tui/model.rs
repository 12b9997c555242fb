//! Application state for the interactive front end.

use std::collections::VecDeque;

use bulk_whois::{FetchEvent, LogTag, OpenOutcome};

use super::input::InputBuffer;

pub const STATUS_READY: &str = "Ready. Enter domains above and press Ctrl+S to start fetching.";
pub const STATUS_CLEARED: &str = "Input cleared.";
pub const STATUS_STARTED: &str = "Processing domains... Please wait.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Log,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Input => Focus::Log,
            Focus::Log => Focus::Input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Modal message box; dismissed with Enter or Esc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn no_input() -> Self {
        Self::new(
            NoticeKind::Warning,
            "No Input",
            "Please enter at least one domain name into the input box.",
        )
    }

    /// Notices to show after an open-folder request finished.
    pub fn from_open_result(result: Result<OpenOutcome, String>) -> Vec<Notice> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                return vec![Notice::new(
                    NoticeKind::Error,
                    "Error",
                    format!("An unexpected error occurred while trying to open the folder.\nError: {}", e),
                )]
            }
        };

        let mut notices = Vec::new();
        if outcome.created {
            notices.push(Notice::new(
                NoticeKind::Info,
                "Folder Created",
                format!("The output folder was created at:\n{}", outcome.path.display()),
            ));
        }
        if outcome.needs_manual_open() {
            notices.push(Notice::new(
                NoticeKind::Warning,
                "Manual Open Required",
                format!(
                    "Could not automatically open the folder. Please navigate manually to:\n\n{}",
                    outcome.path.display()
                ),
            ));
        }
        notices
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub tag: LogTag,
}

#[derive(Debug, Default)]
pub struct App {
    pub should_quit: bool,
    pub focus: Focus,
    pub input: InputBuffer,
    pub status: String,
    pub log: Vec<LogLine>,
    /// Lines scrolled up from the tail; zero follows new output.
    pub log_offset: usize,
    pub running: bool,
    pub notices: VecDeque<Notice>,
}

impl App {
    pub fn new(initial_input: &str) -> Self {
        Self {
            input: InputBuffer::from_text(initial_input),
            status: STATUS_READY.to_string(),
            ..Default::default()
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.status = STATUS_CLEARED.to_string();
    }

    /// Reset the results log and lock the start action.
    pub fn begin_run(&mut self) {
        self.running = true;
        self.log.clear();
        self.log_offset = 0;
        self.status = STATUS_STARTED.to_string();
    }

    pub fn apply_fetch_event(&mut self, event: FetchEvent) {
        if let Some((text, tag)) = event.log_line() {
            self.log.push(LogLine { text, tag });
        }
        if let Some(status) = event.status_text() {
            self.status = status;
        }
        if matches!(event, FetchEvent::Finished { .. }) {
            self.running = false;
        }
    }

    pub fn scroll_log_up(&mut self, lines: usize) {
        self.log_offset = self.log_offset.saturating_add(lines).min(self.log.len().saturating_sub(1));
    }

    pub fn scroll_log_down(&mut self, lines: usize) {
        self.log_offset = self.log_offset.saturating_sub(lines);
    }
}
