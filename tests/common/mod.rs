//! Common test utilities for integration tests
//!
//! Fixtures for standing the proxy up against a mockito upstream and
//! helpers for driving the router with `oneshot`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use mockito::{Mock, ServerGuard};
use serde_json::Value;

use cherry_picker::UpstreamConfig;

pub const ORG_ID: &str = "org-1";
pub const TOKEN: &str = "tok-e2e";

/// Upstream settings pointing both the token and task endpoints at `server`.
pub fn upstream_config(server: &ServerGuard) -> UpstreamConfig {
    UpstreamConfig {
        base_url: server.url(),
        token_url: format!("{}/oauth/token", server.url()),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        org_id: ORG_ID.to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

/// Token endpoint mock expected to be hit exactly `expect` times.
pub async fn token_mock(server: &mut ServerGuard, expect: usize) -> Mock {
    server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"access_token":"{TOKEN}","expires_in":3600}}"#))
        .expect(expect)
        .create_async()
        .await
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
