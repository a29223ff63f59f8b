use ratatui::{
    layout::{Alignment, Rect},
    prelude::*,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::InstanceCollectionStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A non-fatal, user-visible notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

pub struct StatusBar {
    mode: &'static str,
    stats: InstanceCollectionStats,
    in_flight: usize,
    notice: Option<Notice>,
}

impl StatusBar {
    pub fn new(mode: &'static str) -> Self {
        Self {
            mode,
            stats: InstanceCollectionStats::default(),
            in_flight: 0,
            notice: None,
        }
    }

    pub fn set_stats(&mut self, stats: InstanceCollectionStats) {
        self.stats = stats;
    }

    pub fn set_in_flight(&mut self, in_flight: usize) {
        self.in_flight = in_flight;
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let status = if self.in_flight > 0 { format!("BUSY({})", self.in_flight) } else { "READY".to_string() };
        let stats = format!(
            "{} databases | MySQL {} | PostgreSQL {} | {:.1} MB",
            self.stats.total_databases, self.stats.mysql_count, self.stats.postgres_count, self.stats.total_size_mb
        );

        let mut spans = vec![
            Span::styled("[DBDECK] ", Style::default().fg(Color::Green).bold()),
            Span::styled(status, Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
            Span::styled(format!("query: {}", self.mode), Style::default().fg(Color::Blue)),
            Span::raw(" | "),
            Span::styled(stats, Style::default().fg(Color::Cyan)),
        ];
        if let Some(notice) = &self.notice {
            let color = match notice.level {
                NoticeLevel::Info => Color::White,
                NoticeLevel::Success => Color::Green,
                NoticeLevel::Error => Color::Red,
            };
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(notice.message.clone(), Style::default().fg(color)));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Green));

        let paragraph = Paragraph::new(Line::from(spans))
            .block(block)
            .alignment(Alignment::Left);

        frame.render_widget(paragraph, area);
    }
}
