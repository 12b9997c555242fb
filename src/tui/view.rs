//! Rendering.
//!
//! ```text
//!  Bulk WHOIS Domain Lookup
//! ┌Enter Domains (One per line)┐
//! │                            │
//! └────────────────────────────┘
//!  [ Start Fetching ] [ Clear Input ] [ Open Output Folder ]
//!  status line
//! ┌Results Log─────────────────┐
//! │                            │
//! └────────────────────────────┘
//!  key hints
//! ```

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::model::{App, Focus};
use super::theme::Styles;

const INPUT_HEIGHT: u16 = 10;

pub fn render(app: &App, frame: &mut Frame) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let title = Paragraph::new("Bulk WHOIS Domain Lookup")
        .alignment(Alignment::Center)
        .style(Styles::title());
    frame.render_widget(title, rows[0]);

    render_input(app, frame, rows[1]);
    render_buttons(app, frame, rows[2]);
    frame.render_widget(Paragraph::new(format!(" {}", app.status)).style(Styles::status()), rows[3]);
    render_log(app, frame, rows[4]);
    render_hints(app, frame, rows[5]);
    render_notice(app, frame);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Input;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Enter Domains (One per line) ")
        .border_style(Styles::border(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    let (row, col) = app.input.cursor();
    let first = if height > 0 && row >= height { row + 1 - height } else { 0 };

    let lines: Vec<Line> = app
        .input
        .lines()
        .iter()
        .skip(first)
        .take(height)
        .map(|line| Line::raw(line.as_str()))
        .collect();
    let line = &app.input.lines()[row];
    let prefix: String = line.chars().take(col).collect();
    let cursor_x = prefix.width() as u16;

    let h_scroll = cursor_x.saturating_sub(inner.width.saturating_sub(1));
    frame.render_widget(Paragraph::new(lines).scroll((0, h_scroll)), inner);

    if focused && app.notice().is_none() && inner.width > 0 {
        frame.set_cursor_position(Position::new(
            inner.x + cursor_x - h_scroll,
            inner.y + (row - first) as u16,
        ));
    }
}

fn render_buttons(app: &App, frame: &mut Frame, area: Rect) {
    let start = if app.running { " Fetching... " } else { " Start Fetching " };
    let spans = vec![
        Span::raw(" "),
        Span::styled(start, Styles::button(!app.running)),
        Span::raw("  "),
        Span::styled(" Clear Input ", Styles::button(true)),
        Span::raw("  "),
        Span::styled(" Open Output Folder ", Styles::button(true)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_log(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Log;
    let title = if app.log_offset > 0 {
        format!(" Results Log (+{} below) ", app.log_offset)
    } else {
        " Results Log ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Styles::border(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    let end = app.log.len().saturating_sub(app.log_offset);
    let start = end.saturating_sub(height);

    let lines: Vec<Line> = app.log[start..end]
        .iter()
        .map(|line| Line::styled(line.text.as_str(), Styles::log(line.tag)))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_hints(app: &App, frame: &mut Frame, area: Rect) {
    let hints: &[(&str, &str)] = if app.notice().is_some() {
        &[("Enter/Esc", "Close"), ("Ctrl+Q", "Quit")]
    } else {
        match app.focus {
            Focus::Input => &[
                ("Ctrl+S/F5", "Start"),
                ("Ctrl+L", "Clear"),
                ("Ctrl+O", "Open Folder"),
                ("Tab", "Results Log"),
                ("Esc", "Quit"),
            ],
            Focus::Log => &[
                ("↑↓ PgUp PgDn", "Scroll"),
                ("Home/End", "Top/Bottom"),
                ("Ctrl+S/F5", "Start"),
                ("Tab", "Input"),
                ("Esc", "Quit"),
            ],
        }
    };

    let mut spans = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Styles::hint_desc()));
        } else {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(*key, Styles::hint_key()));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(*desc, Styles::hint_desc()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_notice(app: &App, frame: &mut Frame) {
    let Some(notice) = app.notice() else {
        return;
    };

    let screen = frame.area();
    let width = 60.min(screen.width);
    let text_width = width.saturating_sub(4).max(1) as usize;
    let body_lines: u16 = notice
        .body
        .lines()
        .map(|line| (line.width().max(1)).div_ceil(text_width) as u16)
        .sum();
    let area = centered_rect(width, body_lines + 4, screen);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", notice.title))
        .border_style(Styles::notice(notice.kind));
    let body = Paragraph::new(notice.body.as_str())
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default());

    frame.render_widget(Clear, area);
    frame.render_widget(body, area);

    let footer = Rect::new(area.x + 1, area.y + area.height.saturating_sub(2), area.width.saturating_sub(2), 1);
    frame.render_widget(
        Paragraph::new("[ OK ]").alignment(Alignment::Center).style(Styles::hint_key()),
        footer,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::model::{LogLine, Notice};
    use bulk_whois::LogTag;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_renders_main_screen() {
        let mut app = App::new("google.com\nexample.org");
        app.log.push(LogLine { text: "Starting lookup for 2 domains.".into(), tag: LogTag::Info });
        let text = screen(&app);
        assert!(text.contains("Bulk WHOIS Domain Lookup"));
        assert!(text.contains("Enter Domains (One per line)"));
        assert!(text.contains("example.org"));
        assert!(text.contains("Ready. Enter domains above"));
        assert!(text.contains("Starting lookup for 2 domains."));
        assert!(text.contains("Start Fetching"));
    }

    #[test]
    fn test_renders_notice_on_top() {
        let mut app = App::new("");
        app.push_notice(Notice::no_input());
        let text = screen(&app);
        assert!(text.contains("No Input"));
        assert!(text.contains("[ OK ]"));
    }

    #[test]
    fn test_running_disables_start_button() {
        let mut app = App::new("a.com");
        app.begin_run();
        let text = screen(&app);
        assert!(text.contains("Fetching..."));
        assert!(text.contains("Processing domains... Please wait."));
    }
}
