use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use support_desk_api::app::{app, AppState};
use support_desk_api::auth;
use support_desk_api::config;
use support_desk_api::database::models::NewAccount;
use support_desk_api::database::{DocumentStore, MemoryStore};

/// Full router over a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    #[allow(dead_code)]
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone());
        let router = app(state, config::config());
        Self { router, store }
    }

    /// Create an account straight in the store and mint a token for it
    #[allow(dead_code)]
    pub async fn account(&self, name: &str) -> Result<(Uuid, String)> {
        let account = self
            .store
            .create_account(NewAccount {
                name: name.to_string(),
                email: format!("{}@example.com", name),
                password_hash: "unused".to_string(),
            })
            .await?;
        let token = auth::token_for(account.id)?;
        Ok((account.id, token))
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let bytes = body.map(|payload| serde_json::to_vec(&payload)).transpose()?;
        self.send(method, uri, token, bytes).await
    }

    /// Send a body verbatim, for payloads that are not valid JSON
    #[allow(dead_code)]
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &str,
    ) -> Result<(StatusCode, Value)> {
        self.send(method, uri, token, Some(body.as_bytes().to_vec())).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(bytes))?,
            None => builder.body(Body::empty())?,
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("route request")?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await?;

        let parsed = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("parse response body")?
        };
        Ok((status, parsed))
    }

    #[allow(dead_code)]
    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    #[allow(dead_code)]
    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn delete(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }
}
