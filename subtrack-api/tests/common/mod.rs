//! Common test utilities for integration tests
//!
//! Tests drive the real router through `tower::Service::call`. Storage is the
//! in-memory repository, so no database is needed; `FailingRepository`
//! stands in for a broken database.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use subtrack_api::app::{build_router, AppState};
use subtrack_shared::models::subscription::{
    CostFilter, CreateSubscription, Subscription, UpdateSubscription,
};
use subtrack_shared::repository::memory::InMemorySubscriptionRepository;
use subtrack_shared::repository::{RepositoryError, SubscriptionRepository};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing the router and its storage
pub struct TestContext {
    pub repo: Arc<InMemorySubscriptionRepository>,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a context with empty storage
    pub fn new() -> Self {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let app = build_router(AppState::new(repo.clone()));
        TestContext { repo, app }
    }

    /// Sends a request and returns status plus decoded JSON body
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.app, method, uri, body).await
    }

    /// Sends a request with a raw body string
    pub async fn send_raw(&self, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        call(&self.app, request).await
    }

    /// Creates a subscription through the API and returns the stored record
    pub async fn create(&self, user_id: Uuid, service: &str, price: i64, start: &str) -> Value {
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/subscriptions",
                Some(json!({
                    "service_name": service,
                    "price": price,
                    "user_id": user_id,
                    "start_date": start,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        body
    }
}

/// Router whose storage fails every call
pub fn failing_app() -> axum::Router {
    build_router(AppState::new(Arc::new(FailingRepository)))
}

pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    call(app, builder.body(body).unwrap()).await
}

async fn call(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, value)
}

/// Storage that is always down
pub struct FailingRepository;

fn down() -> RepositoryError {
    RepositoryError::Storage("connection refused".to_string())
}

#[async_trait]
impl SubscriptionRepository for FailingRepository {
    async fn create(&self, _data: CreateSubscription) -> Result<Subscription, RepositoryError> {
        Err(down())
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Subscription>, RepositoryError> {
        Err(down())
    }

    async fn list(&self) -> Result<Vec<Subscription>, RepositoryError> {
        Err(down())
    }

    async fn update(
        &self,
        _id: Uuid,
        _changes: UpdateSubscription,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Err(down())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        Err(down())
    }

    async fn total_cost(&self, _filter: &CostFilter) -> Result<i64, RepositoryError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(down())
    }
}
