//! Messages produced by key handling and consumed by `update`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    StartFetch,
    ClearInput,
    OpenFolder,
    ToggleFocus,
    DismissNotice,
    Input(InputEdit),
    ScrollLog(Scroll),
    Noop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEdit {
    Insert(char),
    Paste(String),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    Up(usize),
    Down(usize),
    Top,
    Bottom,
}
