use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fallback capacity when the server reports no usable maximum.
pub const DEFAULT_MAX_SIZE_MB: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Mysql,
    Postgresql,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Mysql => "mysql",
            EngineKind::Postgresql => "postgresql",
        }
    }

    /// Label shown in the console status line.
    pub fn display_version(&self) -> &'static str {
        match self {
            EngineKind::Mysql => "MySQL 8.0",
            EngineKind::Postgresql => "PostgreSQL 15",
        }
    }

    pub fn next(&self) -> EngineKind {
        match self {
            EngineKind::Mysql => EngineKind::Postgresql,
            EngineKind::Postgresql => EngineKind::Mysql,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(EngineKind::Mysql),
            "postgresql" | "postgres" => Ok(EngineKind::Postgresql),
            other => Err(format!("unknown engine kind '{}'", other)),
        }
    }
}

/// One provisioned database as reported by the hosting API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInstance {
    pub id: i64,
    #[serde(rename = "database_name")]
    pub name: String,
    #[serde(rename = "database_type")]
    pub engine: EngineKind,
    #[serde(rename = "database_user", default)]
    pub user: String,
    #[serde(default)]
    pub current_size_mb: f64,
    #[serde(default)]
    pub max_size_mb: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_created_at")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DatabaseInstance {
    pub fn effective_max_mb(&self) -> f64 {
        if self.max_size_mb > 0.0 {
            self.max_size_mb
        } else {
            DEFAULT_MAX_SIZE_MB
        }
    }

    /// Storage usage in percent, clamped to [0, 100] even when the server
    /// reports more usage than capacity.
    pub fn usage_percent(&self) -> f64 {
        let ratio = self.current_size_mb.max(0.0) / self.effective_max_mb() * 100.0;
        if ratio.is_finite() {
            ratio.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn usage_label(&self) -> String {
        format!(
            "{:.0}% of {} MB",
            self.usage_percent(),
            self.effective_max_mb()
        )
    }

    pub fn created_label(&self) -> String {
        self.created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

// RFC 3339 优先，其次 MySQL 风格的 "YYYY-MM-DD HH:MM:SS"
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|t| t.and_utc())
}

#[cfg(test)]
pub(crate) fn sample(id: i64, name: &str, engine: EngineKind, size: f64) -> DatabaseInstance {
    DatabaseInstance {
        id,
        name: name.to_string(),
        engine,
        user: format!("{}_user", name),
        current_size_mb: size,
        max_size_mb: 100.0,
        status: "active".to_string(),
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_shape() {
        let json = r#"{
            "id": 7,
            "database_name": "shop",
            "database_type": "postgresql",
            "database_user": "shop_admin",
            "current_size_mb": 12.5,
            "max_size_mb": 100,
            "status": "active",
            "created_at": "2024-03-01T10:00:00Z"
        }"#;
        let db: DatabaseInstance = serde_json::from_str(json).unwrap();
        assert_eq!(db.id, 7);
        assert_eq!(db.engine, EngineKind::Postgresql);
        assert_eq!(db.created_label(), "2024-03-01");
    }

    #[test]
    fn test_mysql_style_timestamp_and_missing_fields() {
        let json = r#"{"id":1,"database_name":"a","database_type":"mysql","created_at":"2024-03-01 10:00:00"}"#;
        let db: DatabaseInstance = serde_json::from_str(json).unwrap();
        assert!(db.created_at.is_some());
        assert_eq!(db.current_size_mb, 0.0);
        assert_eq!(db.effective_max_mb(), DEFAULT_MAX_SIZE_MB);
    }

    #[test]
    fn test_usage_clamps_to_100() {
        let mut db = sample(1, "a", EngineKind::Mysql, 150.0);
        db.max_size_mb = 100.0;
        assert_eq!(db.usage_percent(), 100.0);
        assert_eq!(db.usage_label(), "100% of 100 MB");
    }

    #[test]
    fn test_usage_clamps_negative_and_zero_max() {
        let mut db = sample(1, "a", EngineKind::Mysql, -5.0);
        assert_eq!(db.usage_percent(), 0.0);
        db.current_size_mb = 25.0;
        db.max_size_mb = 0.0;
        assert_eq!(db.usage_percent(), 25.0);
    }

    #[test]
    fn test_engine_kind_parse() {
        assert_eq!("MySQL".parse::<EngineKind>().unwrap(), EngineKind::Mysql);
        assert_eq!("postgres".parse::<EngineKind>().unwrap(), EngineKind::Postgresql);
        assert!("oracle".parse::<EngineKind>().is_err());
    }
}
