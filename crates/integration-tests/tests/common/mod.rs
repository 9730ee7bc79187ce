//! Shared harness: a full router over the in-memory gateway with a real
//! JWT session provider, plus request helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use api_adapters::metrics::HttpMetrics;
use api_adapters::{router, AppState};
use auth_adapters::JwtSessionProvider;
use domains::{User, UserRepo, UserRole};
use services::bots::BotService;
use services::comments::CommentService;
use services::credentials::CredentialStore;
use services::engagement::EngagementService;
use services::identity::IdentityResolver;
use services::posts::PostService;
use storage_adapters::MemoryGateway;

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<MemoryGateway>,
    pub sessions: Arc<JwtSessionProvider>,
}

pub fn spawn() -> TestApp {
    let gateway = Arc::new(MemoryGateway::new());
    let sessions = Arc::new(JwtSessionProvider::new(SecretString::from(
        "integration-secret",
    )));
    let credentials = CredentialStore::new();
    let state = AppState {
        identity: Arc::new(IdentityResolver::new(
            credentials,
            gateway.clone(),
            gateway.clone(),
            sessions.clone(),
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
    TestApp {
        router: router(state),
        gateway,
        sessions,
    }
}

impl TestApp {
    /// Insert a human and mint a session token for them.
    pub async fn seed_user(&self, name: &str, role: UserRole) -> (Uuid, String) {
        let user = User {
            id: Uuid::now_v7(),
            name: name.to_string(),
            image: None,
            role,
            created_at: Utc::now(),
        };
        UserRepo::insert(&*self.gateway, &user).await.unwrap();
        let token = self.sessions.issue_session_token(user.id, 1);
        (user.id, token)
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, path: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", path, bearer, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request("POST", path, bearer, body).await
    }

    pub async fn patch(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request("PATCH", path, bearer, Some(body)).await
    }

    pub async fn put(&self, path: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        self.request("PUT", path, bearer, None).await
    }

    pub async fn delete(&self, path: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", path, bearer, None).await
    }

    /// Register a bot through the API; returns (bot id, plaintext key).
    pub async fn create_bot(&self, session: &str, name: &str) -> (Uuid, String) {
        let (status, json) = self
            .post(
                "/api/v1/bots",
                Some(session),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "bot creation failed: {json}");
        (
            json["id"].as_str().unwrap().parse().unwrap(),
            json["apiKey"].as_str().unwrap().to_string(),
        )
    }

    /// Flip bot permission flags through the owner PATCH endpoint.
    pub async fn set_bot_flags(
        &self,
        session: &str,
        bot_id: Uuid,
        flags: Value,
    ) -> (StatusCode, Value) {
        self.patch(&format!("/api/v1/bots/{bot_id}"), Some(session), flags)
            .await
    }

    /// Create a draft post and return its id.
    pub async fn create_post(&self, bearer: &str, title: &str) -> Uuid {
        let (status, json) = self
            .post(
                "/api/v1/posts",
                Some(bearer),
                Some(serde_json::json!({ "title": title, "body": "some body text" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "post creation failed: {json}");
        json["id"].as_str().unwrap().parse().unwrap()
    }
}
