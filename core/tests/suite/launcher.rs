#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use electron_inject_core::InjectConfig;
use electron_inject_core::LaunchError;
use electron_inject_core::Launcher;
use electron_inject_core::ResolveError;
use electron_inject_core::TargetCommand;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn fast_config() -> InjectConfig {
    InjectConfig {
        spawn_settle_ms: 200,
        attach_attempts: 3,
        attach_interval_ms: 20,
        ..InjectConfig::default()
    }
}

/// `sh -c <script>` ignores the appended `--remote-debugging-port` (it lands in `$0`).
fn shell(script: &str) -> TargetCommand {
    TargetCommand::from_argv(vec!["sh".to_string(), "-c".to_string(), script.to_string()])
        .unwrap()
}

#[tokio::test]
async fn returns_params_once_endpoint_answers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = InjectConfig {
        port: Some(server.address().port()),
        ..fast_config()
    };
    let params = Launcher::from_config(&config)
        .launch(&shell("sleep 2"))
        .await
        .expect("launch");
    assert_eq!(params.host, "127.0.0.1");
    assert_eq!(params.port, server.address().port());
}

#[tokio::test]
async fn missing_program_is_launch_error() {
    let err = Launcher::from_config(&fast_config())
        .launch(&TargetCommand::from_argv(vec!["/definitely/not/an/app".to_string()]).unwrap())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ResolveError::Launch(LaunchError::Spawn { .. })),
        "{err:?}"
    );
}

#[tokio::test]
async fn early_exit_is_launch_error() {
    let err = Launcher::from_config(&fast_config())
        .launch(&shell("exit 3"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ResolveError::Launch(LaunchError::ExitedEarly { .. })),
        "{err:?}"
    );
}

#[tokio::test]
async fn endpoint_that_never_answers_is_attach_timeout() {
    let err = Launcher::from_config(&fast_config())
        .launch(&shell("sleep 2"))
        .await
        .unwrap_err();
    match err {
        ResolveError::AttachTimeout(timeout) => {
            assert_eq!(timeout.attempts, 3);
            assert_ne!(timeout.port, 0);
        }
        other => panic!("unexpected {other:?}"),
    }
}
