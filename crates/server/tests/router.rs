use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

async fn build_app() -> anyhow::Result<Router> {
    let path = std::env::temp_dir().join(format!("taskdesk_router_{}.db", Uuid::new_v4()));
    let cfg = AppConfig {
        database: models::db::sqlite_config(&path),
        ..AppConfig::default()
    };
    let state = server::startup::prepare(&cfg).await?;
    Ok(server::startup::build_app(state))
}

async fn body_bytes(resp: axum::response::Response) -> anyhow::Result<Vec<u8>> {
    Ok(axum::body::to_bytes(resp.into_body(), usize::MAX).await?.to_vec())
}

#[tokio::test]
async fn health_returns_literal_up() -> anyhow::Result<()> {
    let app = build_app().await?;
    let req = Request::builder().uri("/health").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await?, b"UP");
    Ok(())
}

#[tokio::test]
async fn create_then_fetch_task() -> anyhow::Result<()> {
    let app = build_app().await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"title": "Task 1", "id": 77}))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = serde_json::from_slice(&body_bytes(resp).await?)?;
    let id = created["id"].as_i64().unwrap_or_default();
    // client-supplied ids are ignored
    assert_ne!(id, 77);

    let req = Request::builder().uri(format!("/api/tasks/{id}")).body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = serde_json::from_slice(&body_bytes(resp).await?)?;
    assert_eq!(fetched["title"], "Task 1");
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_rejected() -> anyhow::Result<()> {
    let app = build_app().await?;
    let req = Request::builder().uri("/api/tasks/abc").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404() -> anyhow::Result<()> {
    let app = build_app().await?;
    let req = Request::builder().uri("/api/nope").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn empty_user_list_is_json_array() -> anyhow::Result<()> {
    let app = build_app().await?;
    let req = Request::builder().uri("/api/users").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await?, b"[]");
    Ok(())
}
