mod common;

use axum::http::StatusCode;

use common::spawn_app;

#[tokio::test]
async fn test_health_reports_database() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "up");
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/v1/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/v1/movies", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
