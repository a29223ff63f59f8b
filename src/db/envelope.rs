//! Response envelopes of the hosting API.
//!
//! Every body carries a `success` flag. List fields may be missing or `null`;
//! both mean "empty", never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DeckError, Result};
use crate::models::{DatabaseInstance, InstanceCollectionStats, QueryResult, TableSchema};

use super::adapter::InstanceListing;

#[derive(Debug, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    pub fn into_result(self, fallback: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(DeckError::server(self.message, fallback))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "instances")]
    pub databases: Option<Vec<DatabaseInstance>>,
    #[serde(default)]
    pub stats: Option<InstanceCollectionStats>,
}

impl ListEnvelope {
    pub fn into_listing(self) -> Result<InstanceListing> {
        if !self.success {
            return Err(DeckError::server(self.message, "Failed to load databases"));
        }
        Ok(InstanceListing {
            instances: self.databases.unwrap_or_default(),
            stats: self.stats,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stats: Option<InstanceCollectionStats>,
}

impl StatsEnvelope {
    pub fn into_stats(self) -> Result<InstanceCollectionStats> {
        if !self.success {
            return Err(DeckError::server(self.message, "Failed to load statistics"));
        }
        Ok(self.stats.unwrap_or_default())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub rows: Option<Vec<Vec<Value>>>,
}

impl QueryEnvelope {
    pub fn into_result(self, elapsed_ms: u64) -> Result<QueryResult> {
        if !self.success {
            return Err(DeckError::server(self.message, "Query failed"));
        }
        Ok(QueryResult::new(
            self.columns.unwrap_or_default(),
            self.rows.unwrap_or_default(),
            self.message,
        )
        .with_elapsed(elapsed_ms))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SchemaEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tables: Option<Vec<TableSchema>>,
}

impl SchemaEnvelope {
    pub fn into_tables(self) -> Result<Vec<TableSchema>> {
        if !self.success {
            return Err(DeckError::server(self.message, "Failed to load schema"));
        }
        Ok(self.tables.unwrap_or_default())
    }
}

// 含明文密码，不实现 Debug
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody<'a> {
    pub database_name: &'a str,
    pub database_user: &'a str,
    pub database_password: &'a str,
    pub database_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateBody<'a> {
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeBody {
    pub max_size_mb: u32,
}

#[derive(Serialize)]
pub struct QueryBody<'a> {
    pub query: &'a str,
    pub password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_success_with_null_lists() {
        let env: QueryEnvelope =
            serde_json::from_str(r#"{"success":true,"columns":null,"rows":null,"message":"0 rows affected"}"#).unwrap();
        let result = env.into_result(12).unwrap();
        assert!(result.columns.is_empty());
        assert!(result.rows.is_empty());
        assert_eq!(result.message.as_deref(), Some("0 rows affected"));
        assert_eq!(result.elapsed_ms, 12);
    }

    #[test]
    fn test_query_success_keeps_nulls() {
        let env: QueryEnvelope = serde_json::from_str(
            r#"{"success":true,"columns":["id","note"],"rows":[[1,null],[2,""]],"message":"2 rows returned"}"#,
        )
        .unwrap();
        let result = env.into_result(3).unwrap();
        assert_eq!(result.rows[0][1], Value::Null);
        assert_eq!(result.rows[1][1], json!(""));
    }

    #[test]
    fn test_query_failure_message_and_fallback() {
        let env: QueryEnvelope =
            serde_json::from_str(r#"{"success":false,"message":"command not allowed: GRANT"}"#).unwrap();
        assert_eq!(
            env.into_result(0).unwrap_err(),
            DeckError::Server("command not allowed: GRANT".into())
        );

        let env: QueryEnvelope = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(env.into_result(0).unwrap_err(), DeckError::Server("Query failed".into()));
    }

    #[test]
    fn test_missing_success_means_failure() {
        let ack: Ack = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(
            ack.into_result("Failed to delete database").unwrap_err().to_string(),
            "Failed to delete database"
        );
    }

    #[test]
    fn test_listing_defaults_and_alias() {
        let env: ListEnvelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        let listing = env.into_listing().unwrap();
        assert!(listing.instances.is_empty());
        assert!(listing.stats.is_none());

        let env: ListEnvelope = serde_json::from_str(
            r#"{"success":true,"instances":[{"id":1,"database_name":"a","database_type":"mysql"}]}"#,
        )
        .unwrap();
        assert_eq!(env.into_listing().unwrap().instances.len(), 1);
    }

    #[test]
    fn test_create_body_wire_names() {
        let body = CreateBody {
            database_name: "shop",
            database_user: "admin",
            database_password: "pw",
            database_type: "mysql",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"databaseName":"shop","databaseUser":"admin","databasePassword":"pw","databaseType":"mysql"})
        );
        assert_eq!(
            serde_json::to_value(RotateBody { new_password: "x" }).unwrap(),
            json!({"newPassword":"x"})
        );
    }
}
