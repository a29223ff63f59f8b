use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::console::{ConsolePhase, QueryConsole};
use crate::render::view_console;

use super::content::render_result;
use super::input::{render_field, Input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFocus {
    Query,
    Password,
}

impl ConsoleFocus {
    pub fn toggle(self) -> Self {
        match self {
            ConsoleFocus::Query => ConsoleFocus::Password,
            ConsoleFocus::Password => ConsoleFocus::Query,
        }
    }
}

/// Full-screen overlay for one console session.
pub fn render_console(frame: &mut Frame, area: Rect, console: &QueryConsole, editor: &Input, focus: ConsoleFocus) {
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Length(3), // SQL
            Constraint::Length(3), // 密码
            Constraint::Min(5),    // 结果
            Constraint::Length(3), // 表结构
        ])
        .split(area);

    let target = console.target();
    let phase_color = match console.phase() {
        ConsolePhase::Idle => Color::Gray,
        ConsolePhase::Running => Color::Yellow,
        ConsolePhase::Succeeded => Color::Green,
        ConsolePhase::Failed => Color::Red,
    };
    let header = Line::from(vec![
        Span::styled(format!("{} ", target.name), Style::default().fg(Color::Cyan).bold()),
        Span::styled(target.engine.display_version(), Style::default().fg(Color::Blue)),
        Span::raw(" | "),
        Span::styled(console.readiness(), Style::default().fg(phase_color)),
        Span::raw(" | F5 run  Ctrl+L clear  Ctrl+S schema  Tab switch  Esc close"),
    ]);
    frame.render_widget(
        Paragraph::new(header).block(Block::default().title("Query console").borders(Borders::ALL)),
        chunks[0],
    );

    editor.render(frame, chunks[1], "SQL", focus == ConsoleFocus::Query);

    if console.requires_password() {
        let masked = console.password.masked();
        render_field(frame, chunks[2], "Database password", &masked, focus == ConsoleFocus::Password);
        if focus == ConsoleFocus::Password {
            let x = chunks[2].x + 1 + masked.chars().count() as u16;
            frame.set_cursor_position((x.min(chunks[2].x + chunks[2].width.saturating_sub(2)), chunks[2].y + 1));
        }
    } else {
        render_field(frame, chunks[2], "Database password", "not required in simulated mode", false);
    }

    render_result(frame, chunks[3], &view_console(console));

    let schema = if console.schema().is_empty() {
        "Ctrl+S loads the table list".to_string()
    } else {
        console.schema().iter().map(|t| t.summary()).collect::<Vec<_>>().join(" | ")
    };
    frame.render_widget(
        Paragraph::new(schema)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Schema").borders(Borders::ALL)),
        chunks[4],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_toggle() {
        assert_eq!(ConsoleFocus::Query.toggle(), ConsoleFocus::Password);
        assert_eq!(ConsoleFocus::Password.toggle(), ConsoleFocus::Query);
    }
}
