pub mod http;
pub mod simulator;
