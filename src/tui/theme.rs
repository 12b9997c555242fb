use bulk_whois::LogTag;
use ratatui::style::{Color, Modifier, Style};

use super::model::NoticeKind;

pub struct Styles;

impl Styles {
    pub fn title() -> Style {
        Style::default().fg(Color::White).bg(Color::Rgb(0, 122, 204)).add_modifier(Modifier::BOLD)
    }

    pub fn border(focused: bool) -> Style {
        if focused {
            Style::default().fg(Color::Rgb(0, 122, 204))
        } else {
            Style::default().fg(Color::Rgb(90, 90, 90))
        }
    }

    pub fn button(enabled: bool) -> Style {
        if enabled {
            Style::default().fg(Color::Black).bg(Color::Rgb(78, 201, 176)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray).bg(Color::Rgb(62, 62, 62))
        }
    }

    pub fn status() -> Style {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    }

    pub fn log(tag: LogTag) -> Style {
        match tag {
            LogTag::Info => Style::default().fg(Color::Blue),
            LogTag::Success => Style::default().fg(Color::Green),
            LogTag::Error => Style::default().fg(Color::Red),
        }
    }

    pub fn notice(kind: NoticeKind) -> Style {
        match kind {
            NoticeKind::Info => Style::default().fg(Color::Cyan),
            NoticeKind::Warning => Style::default().fg(Color::Yellow),
            NoticeKind::Error => Style::default().fg(Color::Red),
        }
    }

    pub fn hint_key() -> Style {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    pub fn hint_desc() -> Style {
        Style::default().fg(Color::Gray)
    }
}
