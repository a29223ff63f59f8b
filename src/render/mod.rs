//! Result renderer contract.
//!
//! Both execution paths produce a [`QueryResult`]; this module turns it (or
//! its absence, or an error) into one [`ResultView`] so the presentation
//! layer never needs to know which backend answered.

use serde_json::Value;

use crate::console::QueryConsole;
use crate::models::QueryResult;

pub const NULL_MARKER: &str = "NULL";
pub const NO_ROWS: &str = "Query executed successfully. No rows returned.";
pub const PLACEHOLDER: &str = "Enter your password and run a query";

/// Maximum width of a rendered cell before truncation
const MAX_CELL_WIDTH: usize = 48;

#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// Nothing has run yet.
    Placeholder(&'static str),
    Running,
    Error(String),
    /// The statement ran but returned no rows.
    NoRows { status: String },
    Table { header: Vec<String>, rows: Vec<Vec<String>>, status: String },
}

/// Text for one cell. NULL gets a marker so it never looks like `""`.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => NULL_MARKER.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn truncate_cell(value: &str, max_width: usize) -> String {
    if value.chars().count() <= max_width {
        value.to_string()
    } else if max_width <= 3 {
        value.chars().take(max_width).collect()
    } else {
        format!("{}...", value.chars().take(max_width - 3).collect::<String>())
    }
}

pub fn view_result(result: &QueryResult, status: String) -> ResultView {
    if result.rows.is_empty() {
        return ResultView::NoRows { status };
    }
    // 行列数不一致属于数据源的问题，这里不做校验
    let rows = result
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| truncate_cell(&render_cell(cell), MAX_CELL_WIDTH)).collect())
        .collect();
    ResultView::Table { header: result.columns.clone(), rows, status }
}

pub fn view_console(console: &QueryConsole) -> ResultView {
    if console.is_running() {
        return ResultView::Running;
    }
    if let Some(err) = console.error() {
        return ResultView::Error(err.to_string());
    }
    match console.result() {
        Some(result) => view_result(result, console.status_line().unwrap_or_default()),
        None => ResultView::Placeholder(PLACEHOLDER),
    }
}

impl ResultView {
    pub fn body_text(&self) -> Option<String> {
        match self {
            ResultView::Placeholder(text) => Some(text.to_string()),
            ResultView::Running => Some("Running...".to_string()),
            ResultView::Error(msg) => Some(msg.clone()),
            ResultView::NoRows { .. } => Some(NO_ROWS.to_string()),
            ResultView::Table { .. } => None,
        }
    }

    /// Column widths sized to the widest cell (header included).
    pub fn column_widths(&self) -> Vec<usize> {
        match self {
            ResultView::Table { header, rows, .. } => {
                let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
                for row in rows {
                    for (i, cell) in row.iter().enumerate() {
                        if let Some(w) = widths.get_mut(i) {
                            *w = (*w).max(cell.chars().count());
                        }
                    }
                }
                widths
            }
            _ => Vec::new(),
        }
    }
}
