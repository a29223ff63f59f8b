use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::db::adapter::{ConsoleTarget, QueryExecutor};
use crate::error::{DeckError, Result};
use crate::models::{QueryResult, SchemaColumn, TableSchema};
use crate::secret::OneTimePassword;

pub const SYNTAX_ERROR: &str =
    "ERROR 1064 (42000): You have an error in your SQL syntax; no valid statement was recognized";

const USER_COLUMNS: [&str; 6] = ["id", "username", "email", "role", "status", "created_at"];
const TABLES: [&str; 5] = ["users", "orders", "products", "categories", "sessions"];

/// Offline path: answers from canned data, no password, no network.
pub struct QuerySimulator {
    delay: Duration,
}

impl QuerySimulator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Keyword classification of the lowercased query text.
    pub fn answer(&self, instance_name: &str, query: &str) -> Result<QueryResult> {
        let lowered = query.to_lowercase();
        let result = if lowered.contains("select") {
            Self::users_table()
        } else if lowered.contains("show tables") {
            Self::table_list(instance_name)
        } else {
            return Err(DeckError::Syntax(SYNTAX_ERROR.to_string()));
        };
        Ok(result.with_elapsed(self.delay.as_millis() as u64))
    }

    fn users_table() -> QueryResult {
        let rows: Vec<Vec<Value>> = vec![
            vec![json!(1), json!("admin"), json!("admin@example.com"), json!("admin"), json!("active"), json!("2024-01-15 09:30:00")],
            vec![json!(2), json!("johndoe"), json!("john@example.com"), json!("user"), json!("active"), json!("2024-02-03 14:12:45")],
            vec![json!(3), json!("janesmith"), json!("jane@example.com"), json!("editor"), json!("inactive"), json!("2024-02-20 08:05:10")],
            vec![json!(4), json!("bobwilson"), json!("bob@example.com"), json!("user"), json!("pending"), json!("2024-03-11 17:48:22")],
            vec![json!(5), json!("alicebrown"), json!("alice@example.com"), json!("user"), json!("active"), json!("2024-04-02 11:00:00")],
        ];
        let message = format!("{} rows returned", rows.len());
        QueryResult::new(USER_COLUMNS.iter().map(|c| c.to_string()).collect(), rows, Some(message))
    }

    fn table_list(instance_name: &str) -> QueryResult {
        let rows: Vec<Vec<Value>> = TABLES.iter().map(|t| vec![json!(t)]).collect();
        let message = format!("{} rows returned", rows.len());
        QueryResult::new(vec![format!("Tables_in_{}", instance_name)], rows, Some(message))
    }

    fn schema() -> Vec<TableSchema> {
        let column = |name: &str, data_type: &str, key: Option<&str>| SchemaColumn {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: key.is_none(),
            key: key.map(str::to_string),
            default_value: None,
            extra: None,
        };
        TABLES
            .iter()
            .map(|&table| {
                let columns = if table == "users" {
                    USER_COLUMNS
                        .iter()
                        .map(|&c| match c {
                            "id" => column(c, "int", Some("PRI")),
                            "created_at" => column(c, "datetime", None),
                            _ => column(c, "varchar(255)", None),
                        })
                        .collect()
                } else {
                    vec![column("id", "int", Some("PRI")), column("name", "varchar(255)", None)]
                };
                TableSchema { name: table.to_string(), columns }
            })
            .collect()
    }
}

#[async_trait]
impl QueryExecutor for QuerySimulator {
    fn name(&self) -> &'static str { "simulated" }

    fn requires_password(&self) -> bool { false }

    async fn execute(&self, target: &ConsoleTarget, query: &str, _password: OneTimePassword) -> Result<QueryResult> {
        debug!(instance = %target.name, "simulating query");
        tokio::time::sleep(self.delay).await;
        self.answer(&target.name, query)
    }

    async fn fetch_schema(&self, _target: &ConsoleTarget, _password: OneTimePassword) -> Result<Vec<TableSchema>> {
        tokio::time::sleep(self.delay).await;
        Ok(Self::schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngineKind;

    fn sim() -> QuerySimulator {
        QuerySimulator::new(Duration::ZERO)
    }

    #[test]
    fn test_select_returns_user_table() {
        let result = sim().answer("shop", "SELECT * FROM users LIMIT 10;").unwrap();
        assert_eq!(result.columns, ["id", "username", "email", "role", "status", "created_at"]);
        assert_eq!(result.row_count(), 5);
        let ids: Vec<i64> = result.rows.iter().map(|r| r[0].as_i64().unwrap()).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5]);
        assert!(result.rows.iter().flatten().all(|cell| !cell.is_null()));
    }

    #[test]
    fn test_show_tables_named_after_instance() {
        let result = sim().answer("shop", "SHOW TABLES;").unwrap();
        assert_eq!(result.columns, ["Tables_in_shop"]);
        assert_eq!(result.row_count(), 5);
    }

    #[test]
    fn test_unknown_statement_is_syntax_error() {
        let err = sim().answer("shop", "DROP everything").unwrap_err();
        assert_eq!(err, DeckError::Syntax(SYNTAX_ERROR.to_string()));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_elapsed_is_synthetic_delay() {
        let result = QuerySimulator::new(Duration::from_millis(250)).answer("shop", "select 1").unwrap();
        assert_eq!(result.elapsed_ms, 250);
    }

    #[tokio::test]
    async fn test_execute_without_password() {
        let target = ConsoleTarget { id: 3, name: "blog".into(), engine: EngineKind::Postgresql };
        let sim = sim();
        assert!(!sim.requires_password());
        let result = sim.execute(&target, "show tables", OneTimePassword::default()).await.unwrap();
        assert_eq!(result.columns, ["Tables_in_blog"]);

        let schema = sim.fetch_schema(&target, OneTimePassword::default()).await.unwrap();
        assert_eq!(schema.len(), 5);
        assert_eq!(schema[0].columns.len(), 6);
    }
}
