use ratatui::{
    layout::{Constraint, Rect},
    prelude::*,
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::render::{ResultView, NULL_MARKER};

/// Results pane of the console. Knows nothing about which backend answered.
pub fn render_result(frame: &mut Frame, area: Rect, view: &ResultView) {
    let title = match view {
        ResultView::Table { status, .. } | ResultView::NoRows { status } if !status.is_empty() => {
            format!("Results - {}", status)
        }
        _ => "Results".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Green));

    match view {
        ResultView::Table { header, rows, .. } => {
            let widths: Vec<Constraint> = view
                .column_widths()
                .into_iter()
                .map(|w| Constraint::Length(w.clamp(4, 48) as u16))
                .collect();

            let body: Vec<Row> = rows
                .iter()
                .map(|row| {
                    Row::new(row.iter().map(|cell| {
                        // NULL 用灰色区分，避免和空字符串混淆
                        if cell == NULL_MARKER {
                            Text::from(cell.as_str()).style(Style::default().fg(Color::DarkGray))
                        } else {
                            Text::from(cell.as_str())
                        }
                    }))
                })
                .collect();

            let table = Table::new(body, &widths)
                .header(
                    Row::new(header.iter().map(|h| h.as_str()))
                        .style(Style::default().fg(Color::Yellow).bold()),
                )
                .block(block)
                .column_spacing(1);

            frame.render_widget(table, area);
        }
        other => {
            let color = match other {
                ResultView::Error(_) => Color::Red,
                ResultView::NoRows { .. } => Color::Gray,
                _ => Color::DarkGray,
            };
            let text = other.body_text().unwrap_or_default();
            let paragraph = Paragraph::new(text)
                .style(Style::default().fg(color))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
        }
    }
}
