use std::sync::Arc;

use console_client::{ConsoleClient, LogPanelState, RestDataProvider};
use console_config::{ApiConfig, LogsConfig};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tempfile::TempDir;

async fn setup() -> (ServerGuard, ConsoleClient) {
    let server = Server::new_async().await;
    let provider =
        RestDataProvider::new(&ApiConfig::with_base_url(format!("{}/api/v1", server.url())))
            .unwrap();
    let client = ConsoleClient::with_provider(Arc::new(provider), &LogsConfig::default());
    (server, client)
}

#[tokio::test]
async fn test_fetch_logs_posts_empty_body() {
    let (mut server, client) = setup().await;
    let mock = server
        .mock("POST", "/api/v1/executions/e1/logs")
        .match_body(Matcher::Json(json!({})))
        .with_status(200)
        .with_body(json!({"data": {"logs": "step 1\nstep 2\n"}}).to_string())
        .create_async()
        .await;

    let logs = client.logs().fetch_logs("e1").await.unwrap();
    assert_eq!(logs, "step 1\nstep 2\n");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_logs_encodes_slash_in_execution_id() {
    let (mut server, client) = setup().await;
    let mock = server
        .mock("POST", "/api/v1/executions/a%2Fb/logs")
        .with_status(200)
        .with_body(json!({"data": {"logs": "done"}}).to_string())
        .create_async()
        .await;

    let logs = client.logs().fetch_logs("a/b").await.unwrap();
    assert_eq!(logs, "done");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_logs_yield_placeholder() {
    let (mut server, client) = setup().await;
    server
        .mock("POST", "/api/v1/executions/e1/logs")
        .with_status(200)
        .with_body(json!({"data": {}}).to_string())
        .create_async()
        .await;

    let logs = client.logs().fetch_logs("e1").await.unwrap();
    assert_eq!(logs, "No logs available");
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_text() {
    let (mut server, client) = setup().await;
    let ok = server
        .mock("POST", "/api/v1/executions/e1/logs")
        .with_status(200)
        .with_body(json!({"data": {"logs": "first run"}}).to_string())
        .create_async()
        .await;

    let viewer = client.log_viewer("e1");
    assert_eq!(viewer.state().await, LogPanelState::Idle);
    assert_eq!(viewer.text().await, "No logs available");

    viewer.refresh().await.unwrap();
    assert_eq!(viewer.state().await, LogPanelState::Loaded);
    assert_eq!(viewer.text().await, "first run");

    ok.remove_async().await;
    server
        .mock("POST", "/api/v1/executions/e1/logs")
        .with_status(500)
        .with_body(json!({"message": "log store unavailable"}).to_string())
        .create_async()
        .await;

    let err = viewer.refresh().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    match viewer.state().await {
        LogPanelState::Failed { message } => assert!(message.contains("log store unavailable")),
        other => panic!("unexpected state: {other:?}"),
    }
    assert_eq!(viewer.text().await, "first run");
}

#[tokio::test]
async fn test_export_writes_current_text_without_refetching() {
    let (mut server, client) = setup().await;
    let mock = server
        .mock("POST", "/api/v1/executions/e1/logs")
        .with_status(200)
        .with_body(json!({"data": {"logs": "exported line"}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let viewer = client.log_viewer("e1");
    viewer.refresh().await.unwrap();

    let dir = TempDir::new().unwrap();
    let path = viewer.export(dir.path()).await.unwrap();

    assert_eq!(path.file_name().unwrap(), "execution-e1-logs.txt");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "exported line");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_viewer_title() {
    let (_server, client) = setup().await;
    assert_eq!(client.log_viewer("e9").title(), "Execution Logs - e9");
}
