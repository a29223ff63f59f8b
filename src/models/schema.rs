use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "default", default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub extra: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<SchemaColumn>,
}

impl TableSchema {
    /// `users(id int PK, email varchar)` style one-liner.
    pub fn summary(&self) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut s = format!("{} {}", c.name, c.data_type);
                if c.key.as_deref() == Some("PRI") {
                    s.push_str(" PK");
                }
                s
            })
            .collect();
        format!("{}({})", self.name, cols.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_marks_primary_key() {
        let table: TableSchema = serde_json::from_str(
            r#"{"name":"users","columns":[
                {"name":"id","type":"int","nullable":false,"key":"PRI"},
                {"name":"email","type":"varchar(255)","nullable":true}
            ]}"#,
        )
        .unwrap();
        assert_eq!(table.summary(), "users(id int PK, email varchar(255))");
    }
}
