#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use yamdb::config::Config;
use yamdb::services::notifier::Notifier;
use yamdb::state::SharedState;

/// Captures every outgoing message instead of delivering it.
#[derive(Default)]
pub struct Outbox {
    messages: Mutex<Vec<(String, String)>>,
}

impl Outbox {
    /// Confirmation code from the latest message sent to `to`.
    pub fn last_code_for(&self, to: &str) -> String {
        let messages = self.messages.lock().unwrap();
        let (_, body) = messages
            .iter()
            .rev()
            .find(|(recipient, _)| recipient == to)
            .unwrap_or_else(|| panic!("no mail sent to {to}"));
        body.lines()
            .find_map(|line| line.strip_prefix("Your confirmation code is: "))
            .expect("mail body carries a code")
            .trim()
            .to_string()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn send(&self, to: &str, _subject: &str, body: &str) -> anyhow::Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub shared: Arc<SharedState>,
    pub outbox: Arc<Outbox>,
    db_path: std::path::PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.general.database_path = db_path.display().to_string();
    config.auth.jwt_secret = "integration-test-secret-0123456789abcdef".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.observability.metrics_enabled = false;
    config
}

pub async fn spawn_app() -> TestApp {
    let db_path = std::env::temp_dir().join(format!("yamdb-test-{}.db", uuid::Uuid::new_v4()));
    let outbox = Arc::new(Outbox::default());

    let shared = Arc::new(
        SharedState::with_notifier(test_config(&db_path), outbox.clone())
            .await
            .expect("Failed to create shared state"),
    );
    let state = yamdb::api::create_app_state(shared.clone(), None);
    let router = yamdb::api::router(state).await;

    TestApp {
        router,
        shared,
        outbox,
        db_path,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Signs the pair up and redeems the mailed code.
    pub async fn token_for(&self, username: &str, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/signup",
                None,
                serde_json::json!({ "username": username, "email": email }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signup failed: {body}");

        let code = self.outbox.last_code_for(email);
        let (status, body) = self
            .post(
                "/api/v1/auth/token",
                None,
                serde_json::json!({ "username": username, "confirmation_code": code }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "token exchange failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.shared
            .store
            .upsert_superuser("root", "root@example.com")
            .await
            .unwrap();
        self.token_for("root", "root@example.com").await
    }

    /// Creates a user with `role` through the admin API and returns its token.
    pub async fn token_with_role(&self, admin: &str, username: &str, role: &str) -> String {
        let email = format!("{username}@example.com");
        let (status, body) = self
            .post(
                "/api/v1/users",
                Some(admin),
                serde_json::json!({ "username": username, "email": email, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "user creation failed: {body}");
        self.token_for(username, &email).await
    }

    /// Seeds a category, a genre and one title; returns the title id.
    pub async fn seed_title(&self, admin: &str) -> i64 {
        self.post(
            "/api/v1/categories",
            Some(admin),
            serde_json::json!({ "name": "Films", "slug": "films" }),
        )
        .await;
        self.post(
            "/api/v1/genres",
            Some(admin),
            serde_json::json!({ "name": "Drama", "slug": "drama" }),
        )
        .await;
        let (status, body) = self
            .post(
                "/api/v1/titles",
                Some(admin),
                serde_json::json!({
                    "name": "Solaris",
                    "year": 1972,
                    "category": "films",
                    "genre": ["drama"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "title creation failed: {body}");
        body["data"]["id"].as_i64().unwrap()
    }
}
