//! Mock registry server helpers
//!
//! Sets up wiremock endpoints shaped like the Open VSX REST API.

#![allow(dead_code)]

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "ovsx-test-token";

/// `GET /api/{namespace}/{name}` answering with a listing
pub async fn mock_listing(server: &MockServer, namespace: &str, name: &str, version: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{}/{}", namespace, name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "namespace": namespace,
            "name": name,
            "version": version,
            "timestamp": "2024-05-02T09:41:17.123456Z",
            "files": {}
        })))
        .mount(server)
        .await;
}

/// `GET /api/{namespace}/{name}` answering with a status and error body
pub async fn mock_lookup_error(
    server: &MockServer,
    namespace: &str,
    name: &str,
    status: u16,
    error: &str,
) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{}/{}", namespace, name)))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "error": error })))
        .mount(server)
        .await;
}

/// `POST /api/-/namespace/create` answering with a status and optional error
pub async fn mock_namespace_create(
    server: &MockServer,
    namespace: &str,
    status: u16,
    error: Option<&str>,
) {
    let body = match error {
        Some(error) => json!({ "error": error }),
        None => json!({ "success": format!("Created namespace {}", namespace) }),
    };

    Mock::given(method("POST"))
        .and(path("/api/-/namespace/create"))
        .and(query_param("token", TEST_TOKEN))
        .and(body_json(json!({ "name": namespace })))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// `POST /api/-/publish` accepting the upload
pub async fn mock_publish_success(server: &MockServer, namespace: &str, name: &str, version: &str) {
    Mock::given(method("POST"))
        .and(path("/api/-/publish"))
        .and(query_param("token", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "namespace": namespace,
            "name": name,
            "version": version
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// `POST /api/-/publish` rejecting the upload
pub async fn mock_publish_rejected(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/-/publish"))
        .respond_with(response)
        .mount(server)
        .await;
}
