use ratatui::{
    layout::{Constraint, Rect},
    prelude::*,
    widgets::{Block, Borders, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::lifecycle::{EngineFilter, FilteredView};
use crate::models::DatabaseInstance;

const BAR_WIDTH: usize = 10;

pub struct InstanceList {
    view: FilteredView,
    state: TableState,
}

impl InstanceList {
    pub fn new() -> Self {
        Self {
            view: FilteredView::default(),
            state: TableState::default(),
        }
    }

    /// Swap in a new view, keeping the selection on the same id when possible.
    pub fn set_view(&mut self, view: FilteredView) {
        let selected_id = self.selected().map(|db| db.id);
        self.view = view;
        let idx = selected_id
            .and_then(|id| self.view.instances.iter().position(|db| db.id == id))
            .or(if self.view.instances.is_empty() { None } else { Some(0) });
        self.state.select(idx);
    }

    pub fn selected(&self) -> Option<&DatabaseInstance> {
        self.state.selected().and_then(|i| self.view.instances.get(i))
    }

    pub fn next_item(&mut self) {
        let len = self.view.instances.len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous_item(&mut self) {
        let len = self.view.instances.len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, search: &str, filter: EngineFilter) {
        let title = format!(
            "Databases ({}) - search: '{}' - engine: {}",
            self.view.instances.len(),
            search,
            filter.label()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Green));

        if let Some(empty) = self.view.empty {
            let paragraph = Paragraph::new(empty.message())
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let rows: Vec<Row> = self
            .view
            .instances
            .iter()
            .map(|db| {
                Row::new(vec![
                    db.name.clone(),
                    db.engine.display_version().to_string(),
                    db.user.clone(),
                    usage_bar(db),
                    db.status.clone(),
                    db.created_label(),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(16),
            Constraint::Length(32),
            Constraint::Length(10),
            Constraint::Length(11),
        ];

        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["Name", "Engine", "User", "Storage", "Status", "Created"])
                    .style(Style::default().fg(Color::Yellow).bold()),
            )
            .block(block)
            .row_highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ")
            .column_spacing(1);

        frame.render_stateful_widget(table, area, &mut self.state);
    }
}

fn usage_bar(db: &DatabaseInstance) -> String {
    let filled = ((db.usage_percent() / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}] {}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled), db.usage_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::filter_instances;
    use crate::models::instance::sample;
    use crate::models::EngineKind;

    #[test]
    fn test_usage_bar_never_overflows() {
        let db = sample(1, "a", EngineKind::Mysql, 150.0);
        assert_eq!(usage_bar(&db), "[##########] 100% of 100 MB");
        let db = sample(2, "b", EngineKind::Mysql, 50.0);
        assert_eq!(usage_bar(&db), "[#####.....] 50% of 100 MB");
    }

    #[test]
    fn test_selection_follows_id() {
        let all = vec![
            sample(1, "shop", EngineKind::Mysql, 0.0),
            sample(2, "blog", EngineKind::Postgresql, 0.0),
        ];
        let mut list = InstanceList::new();
        list.set_view(filter_instances(&all, "", EngineFilter::All));
        list.next_item();
        assert_eq!(list.selected().unwrap().id, 2);

        list.set_view(filter_instances(&all, "blog", EngineFilter::All));
        assert_eq!(list.selected().unwrap().id, 2);

        list.set_view(filter_instances(&all, "zzz", EngineFilter::All));
        assert!(list.selected().is_none());
    }
}
