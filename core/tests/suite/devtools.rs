//! A stand-in for one window's DevTools WebSocket.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::Mutex;

use futures::SinkExt;
use futures::StreamExt;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Reply with a numeric result for the request's id.
    Answer,
    /// Send an event and a reply for a different id before the real reply.
    NoiseThenAnswer,
    /// Reply with `exceptionDetails`.
    Throw,
    /// Reply with a JSON-RPC error object.
    RpcError,
    /// Read the request and never reply.
    Silent,
    /// Close the socket right after reading the request.
    Hangup,
}

pub struct FakeWindow {
    pub ws_url: String,
    received: Arc<Mutex<Vec<Value>>>,
}

impl FakeWindow {
    /// Requests seen so far, across all connections.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }

    pub fn expressions(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|r| r["params"]["expression"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

pub async fn spawn_window(id: &str, behavior: Behavior) -> FakeWindow {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&received);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    let Message::Text(text) = msg else {
                        continue;
                    };
                    let request: Value = serde_json::from_str(text.as_str()).unwrap();
                    log.lock().unwrap().push(request.clone());
                    let id = request["id"].as_u64().unwrap();
                    for reply in replies(behavior, id) {
                        ws.send(Message::Text(reply.to_string().into())).await.unwrap();
                    }
                    match behavior {
                        Behavior::Hangup => {
                            let _ = ws.close(None).await;
                            return;
                        }
                        Behavior::Silent => {
                            // Keep the socket open without answering.
                            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                            return;
                        }
                        _ => {}
                    }
                }
            });
        }
    });

    FakeWindow {
        ws_url: format!("ws://{addr}/devtools/page/{id}"),
        received,
    }
}

fn replies(behavior: Behavior, id: u64) -> Vec<Value> {
    let answer = json!({
        "id": id,
        "result": {"result": {"type": "number", "value": 2, "description": "2"}}
    });
    match behavior {
        Behavior::Answer => vec![answer],
        Behavior::NoiseThenAnswer => vec![
            json!({"method": "Runtime.consoleAPICalled", "params": {"type": "log"}}),
            json!({"id": id + 1000, "result": {"result": {"type": "undefined"}}}),
            answer,
        ],
        Behavior::Throw => vec![json!({
            "id": id,
            "result": {
                "result": {"type": "object", "subtype": "error", "description": "Error: nope"},
                "exceptionDetails": {
                    "text": "Uncaught",
                    "exception": {"type": "object", "description": "Error: nope"}
                }
            }
        })],
        Behavior::RpcError => vec![json!({
            "id": id,
            "error": {"code": -32601, "message": "'Runtime.evaluate' wasn't found"}
        })],
        Behavior::Silent | Behavior::Hangup => Vec::new(),
    }
}

/// One `/json/list` entry pointing at `window`.
pub fn list_entry(id: &str, window: &FakeWindow) -> Value {
    json!({
        "description": "",
        "id": id,
        "title": format!("Window {id}"),
        "type": "page",
        "url": format!("file:///app/{id}.html"),
        "webSocketDebuggerUrl": window.ws_url,
    })
}
