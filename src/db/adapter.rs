use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, ExecutionMode};
use crate::error::Result;
use crate::models::{DatabaseInstance, EngineKind, InstanceCollectionStats, NewInstanceDraft, QueryResult, TableSchema};
use crate::secret::OneTimePassword;

use crate::db::adapters::http::HttpGateway;
use crate::db::adapters::simulator::QuerySimulator;

/// What `GET databases` hands back. `stats` is whatever the server sent and is
/// only used to cross-check the locally derived figures.
#[derive(Debug, Clone, Default)]
pub struct InstanceListing {
    pub instances: Vec<DatabaseInstance>,
    pub stats: Option<InstanceCollectionStats>,
}

/// The instance a console is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleTarget {
    pub id: i64,
    pub name: String,
    pub engine: EngineKind,
}

impl From<&DatabaseInstance> for ConsoleTarget {
    fn from(db: &DatabaseInstance) -> Self {
        Self { id: db.id, name: db.name.clone(), engine: db.engine }
    }
}

/// Lifecycle calls against the hosting API. One request, one response, no retries.
#[async_trait]
pub trait InstanceApi: Send + Sync {
    async fn list_instances(&self) -> Result<InstanceListing>;
    async fn create_instance(&self, draft: &NewInstanceDraft) -> Result<()>;
    async fn delete_instance(&self, id: i64) -> Result<()>;
    async fn rotate_password(&self, id: i64, new_password: OneTimePassword) -> Result<()>;
    async fn fetch_stats(&self) -> Result<InstanceCollectionStats>;
    async fn update_size_limit(&self, id: i64, max_size_mb: u32) -> Result<()>;
}

/// Where console queries go. Chosen once per process, never per call.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    fn name(&self) -> &'static str;
    fn requires_password(&self) -> bool { true }
    async fn execute(&self, target: &ConsoleTarget, query: &str, password: OneTimePassword) -> Result<QueryResult>;
    async fn fetch_schema(&self, target: &ConsoleTarget, password: OneTimePassword) -> Result<Vec<TableSchema>>;
}

pub fn new_executor(config: &Config, gateway: Arc<HttpGateway>) -> Arc<dyn QueryExecutor> {
    match config.mode {
        ExecutionMode::Live => gateway as Arc<dyn QueryExecutor>,
        ExecutionMode::Simulated => Arc::new(QuerySimulator::new(config.sim_delay())),
    }
}
