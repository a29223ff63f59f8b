mod adapter;
pub mod adapters;
mod credentials;
mod envelope;

pub use adapter::{new_executor, ConsoleTarget, InstanceApi, InstanceListing, QueryExecutor};
pub use adapters::http::HttpGateway;
pub use adapters::simulator::QuerySimulator;
pub use credentials::StaticToken;
