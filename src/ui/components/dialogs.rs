use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::lifecycle::{PendingDeletion, RotationDialog};
use crate::models::NewInstanceDraft;
use crate::secret::OneTimePassword;

use super::input::{render_field, Input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateField {
    Name,
    User,
    Password,
    Engine,
}

impl CreateField {
    fn next(self) -> Self {
        match self {
            CreateField::Name => CreateField::User,
            CreateField::User => CreateField::Password,
            CreateField::Password => CreateField::Engine,
            CreateField::Engine => CreateField::Name,
        }
    }
}

/// Create dialog. Holds the draft until the server accepts it.
pub struct CreateForm {
    pub draft: NewInstanceDraft,
    pub focus: CreateField,
    pub error: Option<String>,
    /// Ticket of the create request in flight, if any.
    pub submission: Option<u64>,
    // 生成的密码明文显示，方便用户记下
    pub reveal: bool,
}

impl CreateForm {
    pub fn new() -> Self {
        Self {
            draft: NewInstanceDraft::default(),
            focus: CreateField::Name,
            error: None,
            submission: None,
            reveal: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_some()
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn add_char(&mut self, ch: char) {
        match self.focus {
            CreateField::Name => self.draft.name.push(ch),
            CreateField::User => self.draft.user.push(ch),
            CreateField::Password => self.draft.password.push(ch),
            CreateField::Engine => {
                if ch == ' ' {
                    self.draft.engine = self.draft.engine.next();
                }
            }
        }
    }

    pub fn delete_char(&mut self) {
        match self.focus {
            CreateField::Name => { self.draft.name.pop(); }
            CreateField::User => { self.draft.user.pop(); }
            CreateField::Password => self.draft.password.pop(),
            CreateField::Engine => {}
        }
    }

    pub fn generate_password(&mut self) {
        self.draft.password = OneTimePassword::generate();
        self.reveal = true;
    }

    pub fn take_draft(&mut self) -> NewInstanceDraft {
        std::mem::take(&mut self.draft)
    }
}

pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn dialog_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan))
}

fn password_text(password: &OneTimePassword, reveal: bool) -> String {
    if reveal {
        password.expose().to_string()
    } else {
        password.masked()
    }
}

fn error_line(error: &Option<String>, hint: &str) -> Paragraph<'static> {
    match error {
        Some(e) => Paragraph::new(e.clone()).style(Style::default().fg(Color::Red)),
        None => Paragraph::new(hint.to_string()).style(Style::default().fg(Color::DarkGray)),
    }
    .wrap(Wrap { trim: true })
}

pub fn render_create(frame: &mut Frame, area: Rect, form: &CreateForm) {
    let area = centered(area, 60, 17);
    frame.render_widget(Clear, area);
    let block = dialog_block("New database");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    render_field(frame, chunks[0], "Name", &form.draft.name, form.focus == CreateField::Name);
    render_field(frame, chunks[1], "User", &form.draft.user, form.focus == CreateField::User);
    render_field(
        frame,
        chunks[2],
        "Password (Ctrl+G generates)",
        &password_text(&form.draft.password, form.reveal),
        form.focus == CreateField::Password,
    );
    render_field(
        frame,
        chunks[3],
        "Engine (Space toggles)",
        form.draft.engine.display_version(),
        form.focus == CreateField::Engine,
    );
    let hint = if form.is_submitting() { "Creating..." } else { "Tab next field | Enter create | Esc cancel" };
    frame.render_widget(error_line(&form.error, hint), chunks[4]);
}

pub fn render_confirm_delete(frame: &mut Frame, area: Rect, pending: &PendingDeletion) {
    let area = centered(area, 60, 7);
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(format!("{}\n\n[y] delete   [n/Esc] keep", pending.prompt()))
        .style(Style::default().fg(Color::Red))
        .block(dialog_block("Delete database"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

pub fn render_rotate(frame: &mut Frame, area: Rect, dialog: &RotationDialog, reveal: bool) {
    let area = centered(area, 60, 8);
    frame.render_widget(Clear, area);
    let title = format!("Change password - {}", dialog.target_name);
    let block = dialog_block(&title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);
    render_field(frame, chunks[0], "New password (Ctrl+G generates)", &password_text(&dialog.password, reveal), true);
    let hint = if dialog.is_submitting() { "Saving..." } else { "Enter save | Esc cancel" };
    frame.render_widget(error_line(&dialog.error, hint), chunks[1]);
}

pub fn render_resize(frame: &mut Frame, area: Rect, name: &str, input: &Input, error: &Option<String>) {
    let area = centered(area, 50, 8);
    frame.render_widget(Clear, area);
    let title = format!("Size limit - {}", name);
    let block = dialog_block(&title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);
    input.render(frame, chunks[0], "Max size (MB)", true);
    frame.render_widget(error_line(error, "Enter save | Esc cancel"), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngineKind;

    #[test]
    fn test_create_form_editing() {
        let mut form = CreateForm::new();
        form.add_char('a');
        form.next_field();
        form.add_char('u');
        form.next_field();
        form.generate_password();
        assert!(form.reveal);
        assert_eq!(form.draft.password.len(), 16);
        form.next_field();
        form.add_char(' ');
        assert_eq!(form.draft.engine, EngineKind::Postgresql);

        let draft = form.take_draft();
        assert!(draft.validate().is_ok());
        assert!(form.draft.name.is_empty());
    }

    #[test]
    fn test_centered_fits_small_area() {
        let area = Rect { x: 0, y: 0, width: 40, height: 5 };
        let r = centered(area, 60, 17);
        assert_eq!((r.width, r.height), (40, 5));
    }
}
