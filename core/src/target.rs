use serde::Serialize;

/// Where a launched target's remote-debugging endpoint listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
}

impl ConnectionParams {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Root of the HTTP endpoint, e.g. `http://127.0.0.1:9222`.
    pub fn http_root(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Landing page listing inspectable windows; what `--browser` opens.
    pub fn devtools_url(&self) -> String {
        format!("{}/", self.http_root())
    }
}

/// One debuggable window as reported by a single discovery poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugTarget {
    pub id: String,
    pub title: String,
    pub url: String,
    pub rpc_endpoint: String,
}
