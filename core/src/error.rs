use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

/// Fatal failures while starting the target and waiting for its debugger.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    AttachTimeout(#[from] AttachTimeoutError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("no application given to launch")]
    EmptyCommand,

    #[error("could not reserve a debugging port on {host}: {source}")]
    PortUnavailable {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not execute {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program:?} exited before its debugger came up ({status}); not found or already running?")]
    ExitedEarly { program: String, status: String },
}

#[derive(Error, Debug)]
#[error("debug endpoint http://{host}:{port}/ did not answer after {attempts} attempts over {waited:?}")]
pub struct AttachTimeoutError {
    pub host: String,
    pub port: u16,
    pub attempts: u32,
    pub waited: Duration,
}

/// A single failed discovery poll. Never fatal to the scheduler.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("could not build the discovery HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("discovery request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("discovery endpoint {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("discovery endpoint {url} returned a malformed target list: {detail}")]
    Malformed { url: String, detail: String },
}

/// A single failed script evaluation. Never fatal to the scheduler.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("failed to open debugger channel {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("debugger channel protocol error: {detail}")]
    Protocol { detail: String },

    #[error("Runtime.evaluate error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("script threw: {message}")]
    Exception { message: String },

    #[error("Runtime.evaluate timed out after {0:?}")]
    Timeout(Duration),

    #[error("debugger channel closed before a response arrived")]
    Closed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
