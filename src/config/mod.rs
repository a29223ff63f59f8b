use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::Level;
use url::Url;

/// Which backend answers console queries. Fixed for the lifetime of the process.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Forward queries to the hosting API
    Live,
    /// Answer queries from the built-in canned simulator
    Simulated,
}

#[derive(Parser, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base URL of the hosting API
    #[arg(long, env = "DBDECK_API_URL", default_value = "http://localhost:8080/api")]
    pub api_url: String,

    /// Bearer token for the hosting API
    #[arg(long, env = "DBDECK_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// Query execution path for every console
    #[arg(long, value_enum, default_value = "live")]
    pub mode: ExecutionMode,

    /// Artificial delay of the simulated executor, in milliseconds
    #[arg(long, default_value = "500")]
    pub sim_delay_ms: u64,

    /// Console execution timeout in seconds (0 disables)
    #[arg(long, default_value = "30")]
    pub query_timeout_secs: u64,

    /// HTTP timeout for lifecycle calls in seconds
    #[arg(long, default_value = "15")]
    pub request_timeout_secs: u64,

    /// Log file path (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        self.level()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| anyhow!("invalid api url '{}': {}", self.api_url, e))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(anyhow!("unsupported api url scheme '{}'", other)),
        }
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| anyhow!("invalid log level '{}'", self.log_level))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("dbdeck.log"))
    }

    pub fn sim_delay(&self) -> Duration {
        Duration::from_millis(self.sim_delay_ms)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        match self.query_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// token 不得出现在日志里
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("token", &if self.token.is_empty() { "<none>" } else { "<redacted>" })
            .field("mode", &self.mode)
            .field("sim_delay_ms", &self.sim_delay_ms)
            .field("query_timeout_secs", &self.query_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_file", &self.log_file)
            .field("log_level", &self.log_level)
            .finish()
    }
}
