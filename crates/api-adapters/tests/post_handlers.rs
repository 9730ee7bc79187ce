//! Handler-level smoke tests over the in-memory gateway: status codes and
//! body shapes at the HTTP boundary, with no session provider wired in.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use uuid::Uuid;

use api_adapters::metrics::HttpMetrics;
use api_adapters::{router, AppState};
use domains::{Result as DomainResult, SessionProvider};
use services::bots::BotService;
use services::comments::CommentService;
use services::credentials::CredentialStore;
use services::engagement::EngagementService;
use services::identity::IdentityResolver;
use services::posts::PostService;
use storage_adapters::MemoryGateway;

struct NoSessions;

#[async_trait]
impl SessionProvider for NoSessions {
    async fn resolve(&self, _bearer_token: &str) -> DomainResult<Option<Uuid>> {
        Ok(None)
    }
}

fn app() -> Router {
    let gateway = Arc::new(MemoryGateway::new());
    let credentials = CredentialStore::new();
    let state = AppState {
        identity: Arc::new(IdentityResolver::new(
            credentials,
            gateway.clone(),
            gateway.clone(),
            Arc::new(NoSessions),
        )),
        posts: Arc::new(PostService::new(
            gateway.clone(),
            gateway.clone(),
            gateway.clone(),
        )),
        bots: Arc::new(BotService::new(
            gateway.clone(),
            gateway.clone(),
            credentials,
        )),
        comments: Arc::new(CommentService::new(
            gateway.clone(),
            gateway.clone(),
            gateway.clone(),
            gateway.clone(),
        )),
        engagement: Arc::new(EngagementService::new(gateway.clone(), gateway.clone())),
        metrics: Arc::new(HttpMetrics::new()),
    };
    router(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn anonymous_create_is_401_with_structured_error() {
    let response = app()
        .oneshot(
            Request::post("/api/v1/posts")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"t","body":"b"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn listing_an_empty_platform_succeeds() {
    let response = app()
        .oneshot(Request::get("/api/v1/posts").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert_eq!(json["pagination"]["total"], 0);
}

#[tokio::test]
async fn missing_post_detail_is_404() {
    let response = app()
        .oneshot(
            Request::get(format!("/api/v1/posts/{}", Uuid::now_v7()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Post not found");
}

#[tokio::test]
async fn garbage_bot_token_is_401_everywhere() {
    let response = app()
        .oneshot(
            Request::get("/api/v1/me")
                .header(header::AUTHORIZATION, "Bearer bot_notarealkey")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn operational_endpoints_respond() {
    let app = app();
    let health = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let metrics = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(metrics.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("http_requests"));
}
