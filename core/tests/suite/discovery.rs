#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;
use std::time::Instant;

use electron_inject_core::ConnectionParams;
use electron_inject_core::DiscoveryClient;
use electron_inject_core::DiscoveryError;
use electron_inject_core::TargetSource;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

pub fn params_for(server: &MockServer) -> ConnectionParams {
    let addr = server.address();
    ConnectionParams::new(addr.ip().to_string(), addr.port())
}

const TIMEOUT: Duration = Duration::from_secs(2);

fn client_for(server: &MockServer) -> DiscoveryClient {
    DiscoveryClient::new(params_for(server), TIMEOUT).expect("discovery client")
}

#[tokio::test]
async fn lists_windows_in_endpoint_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "2",
                "title": "Settings",
                "type": "page",
                "url": "file:///app/settings.html",
                "webSocketDebuggerUrl": "ws://127.0.0.1:1/devtools/page/2"
            },
            {
                "id": "sw",
                "title": "service worker",
                "type": "service_worker",
                "url": "file:///app/sw.js"
            },
            {
                "id": "1",
                "title": "Main",
                "type": "page",
                "url": "file:///app/index.html",
                "webSocketDebuggerUrl": "ws://127.0.0.1:1/devtools/page/1"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let targets = client.list_targets().await.expect("list targets");

    let ids: Vec<&str> = targets.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert_eq!(targets[1].title, "Main");
    assert_eq!(targets[1].rpc_endpoint, "ws://127.0.0.1:1/devtools/page/1");
}

#[tokio::test]
async fn error_status_is_discovery_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_targets()
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Status { .. }), "{err:?}");
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_targets()
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Malformed { .. }), "{err:?}");
}

#[tokio::test]
async fn refused_connection_is_request_error() {
    let port = electron_inject_core::launcher::reserve_port("127.0.0.1").unwrap();
    let err = DiscoveryClient::new(ConnectionParams::new("127.0.0.1", port), TIMEOUT)
        .unwrap()
        .list_targets()
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Request { .. }), "{err:?}");
}

#[tokio::test]
async fn hung_endpoint_is_cut_off_by_discovery_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let started = Instant::now();
    let err = DiscoveryClient::new(params_for(&server), Duration::from_millis(200))
        .unwrap()
        .list_targets()
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Request { .. }), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
}
