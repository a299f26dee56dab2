mod common;

use axum_test::TestServer;
use feedback_return::api::routes::public_routes;
use feedback_return::domain::ReturnPathTransport;
use std::sync::Arc;

fn health_server(state: feedback_return::AppState) -> TestServer {
    TestServer::new(public_routes().with_state(state)).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let config = common::test_config("", ReturnPathTransport::Query);
    let server = health_server(common::create_test_state(&config));

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["sessions"]["status"], "ok");
    assert_eq!(
        json["checks"]["notify"]["message"],
        "No feedback config, feedback emails disabled"
    );
}

#[tokio::test]
async fn test_health_reports_configured_notify() {
    let config = common::test_config("/app", ReturnPathTransport::Query);
    let notifier = Arc::new(common::RecordingNotifier::default());
    let server = health_server(common::create_state_with_notifier(&config, notifier));

    let response = server.get("/health").await;

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["checks"]["notify"]["message"], "Feedback emails configured");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let config = common::test_config("", ReturnPathTransport::Query);
    let server = health_server(common::create_test_state(&config));

    let json = server.get("/health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("sessions").is_some());
    assert!(json["checks"].get("notify").is_some());
}
