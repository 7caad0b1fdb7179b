//! Window discovery over the debugger's `/json/list` HTTP endpoint.

use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::DiscoveryError;
use crate::target::ConnectionParams;
use crate::target::DebugTarget;

/// Anything that can produce a point-in-time snapshot of debuggable windows.
#[async_trait]
pub trait TargetSource: Send + Sync {
    async fn list_targets(&self) -> Result<Vec<DebugTarget>, DiscoveryError>;
}

/// Shape of one `/json/list` entry. Only the fields we map are declared;
/// everything else the endpoint sends is ignored.
#[derive(Deserialize)]
struct JsonListEntry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: Option<String>,
}

pub struct DiscoveryClient {
    client: reqwest::Client,
    params: ConnectionParams,
}

impl DiscoveryClient {
    /// `timeout` bounds one whole `/json/list` request, connect included.
    pub fn new(params: ConnectionParams, timeout: Duration) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|source| DiscoveryError::Client { source })?;
        Ok(Self { client, params })
    }

    fn list_url(&self) -> String {
        // The timestamp keeps intermediaries from serving a stale list.
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        format!("{}/json/list?t={ts}", self.params.http_root())
    }
}

#[async_trait]
impl TargetSource for DiscoveryClient {
    async fn list_targets(&self) -> Result<Vec<DebugTarget>, DiscoveryError> {
        let url = self.list_url();
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| DiscoveryError::Request {
                url: url.clone(),
                source,
            })?;
        if !resp.status().is_success() {
            return Err(DiscoveryError::Status {
                url,
                status: resp.status(),
            });
        }
        let body = resp
            .json::<JsonValue>()
            .await
            .map_err(|e| DiscoveryError::Malformed {
                url: url.clone(),
                detail: e.to_string(),
            })?;
        parse_target_list(body).map_err(|detail| DiscoveryError::Malformed { url, detail })
    }
}

/// Map a raw `/json/list` body into targets, keeping endpoint order.
///
/// A body that is not an array is an error. Individual entries that do not
/// parse, or that have no debugger channel, are skipped.
pub fn parse_target_list(body: JsonValue) -> Result<Vec<DebugTarget>, String> {
    let JsonValue::Array(entries) = body else {
        return Err(format!("expected a JSON array, got {}", json_kind(&body)));
    };

    let targets = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<JsonListEntry>(entry) {
            Ok(JsonListEntry {
                id,
                title,
                url,
                web_socket_debugger_url: Some(ws),
            }) if !ws.is_empty() => Some(DebugTarget {
                id,
                title,
                url,
                rpc_endpoint: ws,
            }),
            Ok(entry) => {
                debug!(id = %entry.id, "skipping target without a debugger channel");
                None
            }
            Err(e) => {
                debug!(error = %e, "skipping malformed target entry");
                None
            }
        })
        .collect();
    Ok(targets)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
