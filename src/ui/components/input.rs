use ratatui::{
    layout::Rect,
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Single text field with a char-based cursor and optional history.
pub struct Input {
    input: String,
    // 光标位置（按字符计数，不是字节）
    cursor_pos: usize,
    history: Vec<String>,
    history_index: usize,
}

impl Input {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            cursor_pos: 0,
            history: Vec::new(),
            history_index: 0,
        }
    }

    pub fn with_value(value: &str) -> Self {
        let mut input = Self::new();
        input.set_value(value);
        input
    }

    pub fn value(&self) -> &str {
        &self.input
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = value.to_string();
        self.cursor_pos = self.input.chars().count();
    }

    pub fn add_char(&mut self, ch: char) {
        let byte_idx = self.byte_index_for_char_pos(self.cursor_pos);
        self.input.insert(byte_idx, ch);
        self.cursor_pos += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_pos == 0 { return; }
        let prev_char_pos = self.cursor_pos - 1;
        let start = self.byte_index_for_char_pos(prev_char_pos);
        let end = self.byte_index_for_char_pos(self.cursor_pos);
        self.input.replace_range(start..end, "");
        self.cursor_pos = prev_char_pos;
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_pos = (self.cursor_pos + 1).min(self.input.chars().count());
    }

    pub fn add_to_history(&mut self, command: String) {
        if !command.trim().is_empty() && self.history.last() != Some(&command) {
            self.history.push(command);
        }
        self.history_index = self.history.len();
    }

    pub fn get_history_up(&mut self) -> Option<String> {
        if self.history_index > 0 {
            self.history_index -= 1;
            self.history.get(self.history_index).cloned()
        } else {
            None
        }
    }

    pub fn get_history_down(&mut self) -> Option<String> {
        if self.history_index < self.history.len() {
            self.history_index += 1;
            self.history.get(self.history_index).cloned()
        } else {
            None
        }
    }

    fn byte_index_for_char_pos(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, focused: bool) {
        render_field(frame, area, title, &self.input, focused);
        if focused {
            let x = area.x + 1 + self.cursor_pos as u16;
            frame.set_cursor_position((x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
        }
    }
}

/// Bordered one-line field; yellow border when focused.
pub fn render_field(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let color = if focused { Color::Yellow } else { Color::Green };
    let paragraph = Paragraph::new(value.to_string())
        .block(Block::default().title(title.to_string()).borders(Borders::ALL).style(Style::default().fg(color)))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multibyte_editing() {
        let mut input = Input::with_value("数据库");
        input.move_cursor_left();
        input.delete_char();
        assert_eq!(input.value(), "数库");
        input.add_char('x');
        assert_eq!(input.value(), "数x库");
    }

    #[test]
    fn test_history_navigation() {
        let mut input = Input::new();
        input.add_to_history("SELECT 1".into());
        input.add_to_history("SHOW TABLES;".into());
        input.add_to_history("SHOW TABLES;".into());
        assert_eq!(input.get_history_up().as_deref(), Some("SHOW TABLES;"));
        assert_eq!(input.get_history_up().as_deref(), Some("SELECT 1"));
        assert_eq!(input.get_history_up(), None);
        assert_eq!(input.get_history_down().as_deref(), Some("SHOW TABLES;"));
        assert_eq!(input.get_history_down(), None);
    }
}
