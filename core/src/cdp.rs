//! Single-shot `Runtime.evaluate` over a window's DevTools WebSocket.
//!
//! Every call opens its own channel, sends one request tagged with a fresh
//! correlation id, waits for the response carrying that id, and closes the
//! channel again. Nothing is pooled between calls.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use futures::SinkExt;
use futures::StreamExt;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use tracing::trace;

use crate::error::EvalError;
use crate::target::DebugTarget;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Evaluates one script in one window.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, target: &DebugTarget, script: &str) -> Result<EvalValue, EvalError>;
}

/// The `result` object of a successful evaluation, reduced to the fields we
/// report on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalValue {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EvalValue {
    /// Short human-readable rendering for log lines.
    pub fn summary(&self) -> String {
        if let Some(description) = &self.description {
            return description.clone();
        }
        match &self.value {
            Some(value) => value.to_string(),
            None => self.kind.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EvaluateRequest {
    id: u64,
    method: &'static str,
    params: JsonValue,
}

fn evaluate_request(id: u64, expression: &str) -> EvaluateRequest {
    EvaluateRequest {
        id,
        method: "Runtime.evaluate",
        params: json!({
            "expression": expression,
            "objectGroup": "console",
            "includeCommandLineAPI": true,
            "silent": false,
            "returnByValue": false,
            "userGesture": true,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct EvaluateResult {
    result: Option<EvalValue>,
    #[serde(rename = "exceptionDetails")]
    exception_details: Option<JsonValue>,
    #[serde(rename = "wasThrown", default)]
    was_thrown: bool,
}

/// Outcome of looking at one incoming frame while waiting for `id`.
#[derive(Debug)]
enum Frame {
    Response(Result<EvalValue, EvalError>),
    Unrelated,
}

fn classify_frame(text: &str, id: u64) -> Frame {
    let json: JsonValue = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "ignoring non-JSON frame");
            return Frame::Unrelated;
        }
    };
    if json.get("id").and_then(JsonValue::as_u64) != Some(id) {
        return Frame::Unrelated;
    }
    Frame::Response(parse_response(&json))
}

/// Interpret a response already known to carry our correlation id.
fn parse_response(json: &JsonValue) -> Result<EvalValue, EvalError> {
    if let Some(err) = json.get("error") {
        let err: RpcError =
            serde_json::from_value(err.clone()).map_err(|e| EvalError::Protocol {
                detail: format!("unreadable error object: {e}"),
            })?;
        return Err(EvalError::Remote {
            code: err.code,
            message: err.message,
        });
    }

    let Some(result) = json.get("result") else {
        return Err(EvalError::Protocol {
            detail: "response carries neither result nor error".to_string(),
        });
    };
    let parsed: EvaluateResult =
        serde_json::from_value(result.clone()).map_err(|e| EvalError::Protocol {
            detail: format!("unreadable evaluate result: {e}"),
        })?;

    if parsed.exception_details.is_some() || parsed.was_thrown {
        return Err(EvalError::Exception {
            message: exception_message(&parsed),
        });
    }
    parsed.result.ok_or_else(|| EvalError::Protocol {
        detail: "evaluate result has no remote object".to_string(),
    })
}

fn exception_message(parsed: &EvaluateResult) -> String {
    let from_details = parsed.exception_details.as_ref().and_then(|details| {
        details
            .pointer("/exception/description")
            .or_else(|| details.get("text"))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    });
    from_details
        .or_else(|| parsed.result.as_ref().map(EvalValue::summary))
        .unwrap_or_else(|| "unknown exception".to_string())
}

/// WebSocket-backed [`Evaluator`].
#[derive(Debug, Clone)]
pub struct CdpEvaluator {
    timeout: Duration,
}

impl CdpEvaluator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn round_trip(&self, ws_url: &str, expression: &str) -> Result<EvalValue, EvalError> {
        let (mut ws, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| EvalError::Connect {
                url: ws_url.to_string(),
                reason: e.to_string(),
            })?;

        let id = next_request_id();
        let request = serde_json::to_string(&evaluate_request(id, expression)).map_err(|e| {
            EvalError::Protocol {
                detail: format!("failed to serialize request: {e}"),
            }
        })?;
        debug!(id, url = ws_url, "sending Runtime.evaluate");
        ws.send(Message::Text(request.into()))
            .await
            .map_err(|e| EvalError::Protocol {
                detail: format!("failed to send request: {e}"),
            })?;

        let outcome = loop {
            let Some(msg) = ws.next().await else {
                break Err(EvalError::Closed);
            };
            let text = match msg {
                Ok(Message::Text(t)) => t.to_string(),
                Ok(Message::Binary(b)) => match String::from_utf8(b.to_vec()) {
                    Ok(s) => s,
                    Err(_) => continue,
                },
                Ok(Message::Close(_)) => break Err(EvalError::Closed),
                Ok(_) => continue,
                Err(e) => {
                    break Err(EvalError::Protocol {
                        detail: format!("read failed: {e}"),
                    });
                }
            };
            match classify_frame(&text, id) {
                Frame::Response(result) => break result,
                Frame::Unrelated => trace!(id, "skipping unrelated frame"),
            }
        };

        // Best effort; the outcome is already decided.
        let _ = ws.close(None).await;
        outcome
    }
}

#[async_trait]
impl Evaluator for CdpEvaluator {
    async fn evaluate(&self, target: &DebugTarget, script: &str) -> Result<EvalValue, EvalError> {
        tokio::time::timeout(self.timeout, self.round_trip(&target.rpc_endpoint, script))
            .await
            .map_err(|_| EvalError::Timeout(self.timeout))?
    }
}
