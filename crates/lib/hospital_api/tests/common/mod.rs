//! Shared helpers: an in-memory app and a JSON request driver.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use hospital_api::config::{ApiConfig, RecordAccessPolicy};
use hospital_api::{AppState, router};
use hospital_core::store::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

pub fn app() -> (Router, AppState) {
    app_with_policy(RecordAccessPolicy::Public)
}

pub fn app_with_policy(policy: RecordAccessPolicy) -> (Router, AppState) {
    let mut config = ApiConfig::with_secret(SECRET);
    config.records_access = policy;
    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    (router(state.clone()), state)
}

/// Send a request and return status plus parsed JSON body (`Null` if empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(request).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, json)
}

/// Register an account and return its token.
pub async fn register(app: &Router, email: &str, role: Option<&str>) -> String {
    let mut body = json!({
        "email": email,
        "password": "secret1",
        "firstName": "Test",
        "lastName": "User",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    let (status, json) = send(app, Method::POST, "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {json}");
    json["token"].as_str().expect("token").to_string()
}
