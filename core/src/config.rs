use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// Tunables for one injection run. Every field has a default so an empty
/// TOML file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    /// Interface the target's debugger listens on.
    pub host: String,

    /// Fixed remote-debugging port. A free ephemeral port is picked when unset.
    pub port: Option<u16>,

    /// How long the scheduler keeps polling for new windows.
    pub timeout_secs: u64,

    pub poll_interval_ms: u64,

    /// Upper bound on a single `Runtime.evaluate` round-trip.
    pub eval_timeout_ms: u64,

    /// Upper bound on a single `/json/list` request.
    pub discovery_timeout_ms: u64,

    pub attach_attempts: u32,

    pub attach_interval_ms: u64,

    /// Delay after spawning before checking that the target is still alive.
    pub spawn_settle_ms: u64,

    /// Optional cap on poll cycles, applied in addition to the deadline.
    pub max_polls: Option<u32>,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            timeout_secs: 5,
            poll_interval_ms: 1_000,
            eval_timeout_ms: 5_000,
            discovery_timeout_ms: 2_000,
            attach_attempts: 30,
            attach_interval_ms: 500,
            spawn_settle_ms: 500,
            max_polls: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl InjectConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn eval_timeout(&self) -> Duration {
        Duration::from_millis(self.eval_timeout_ms)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    pub fn attach_interval(&self) -> Duration {
        Duration::from_millis(self.attach_interval_ms)
    }

    pub fn spawn_settle(&self) -> Duration {
        Duration::from_millis(self.spawn_settle_ms)
    }
}
