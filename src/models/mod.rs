pub mod instance;
pub mod stats;
pub mod draft;
pub mod query;
pub mod schema;

pub use instance::{DatabaseInstance, EngineKind};
pub use stats::InstanceCollectionStats;
pub use draft::NewInstanceDraft;
pub use query::QueryResult;
pub use schema::{SchemaColumn, TableSchema};
