use serde::{Deserialize, Serialize};

use super::{DatabaseInstance, EngineKind};

/// Aggregate view over the instance collection. Always derived, never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceCollectionStats {
    #[serde(default)]
    pub total_databases: usize,
    #[serde(default)]
    pub mysql_count: usize,
    #[serde(default)]
    pub postgres_count: usize,
    #[serde(rename = "totalSizeMB", default)]
    pub total_size_mb: f64,
}

impl InstanceCollectionStats {
    pub fn derive(instances: &[DatabaseInstance]) -> Self {
        let count = |kind: EngineKind| instances.iter().filter(|db| db.engine == kind).count();
        Self {
            total_databases: instances.len(),
            mysql_count: count(EngineKind::Mysql),
            postgres_count: count(EngineKind::Postgresql),
            total_size_mb: instances.iter().map(|db| db.current_size_mb.max(0.0)).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::instance::sample;

    #[test]
    fn test_derive_counts() {
        let instances = vec![
            sample(1, "a", EngineKind::Mysql, 10.0),
            sample(2, "b", EngineKind::Postgresql, 2.5),
            sample(3, "c", EngineKind::Mysql, 0.0),
        ];
        let stats = InstanceCollectionStats::derive(&instances);
        assert_eq!(stats.total_databases, 3);
        assert_eq!(stats.mysql_count, 2);
        assert_eq!(stats.postgres_count, 1);
        assert_eq!(stats.total_size_mb, 12.5);
    }

    #[test]
    fn test_derive_empty() {
        assert_eq!(InstanceCollectionStats::derive(&[]), InstanceCollectionStats::default());
    }

    #[test]
    fn test_wire_names() {
        let stats: InstanceCollectionStats = serde_json::from_str(
            r#"{"totalDatabases":2,"mysqlCount":1,"postgresCount":1,"totalSizeMB":3.5}"#,
        )
        .unwrap();
        assert_eq!(stats.total_databases, 2);
        assert_eq!(stats.total_size_mb, 3.5);
    }
}
