//! Test utilities and common setup.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use jarvis_bridge::api::{self, AppState, BridgeSettings};
use jarvis_bridge::host::{DryRunHost, HostAction, HostControl, HostError, HostResult};
use serde_json::Value;
use tower::ServiceExt;

/// Host whose every dispatch fails to start.
pub struct FailingHost;

#[async_trait]
impl HostControl for FailingHost {
    fn name(&self) -> &str {
        "failing"
    }

    async fn dispatch(&self, _action: HostAction) -> HostResult<()> {
        Err(HostError::spawn(
            "simulated",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        ))
    }
}

fn test_settings() -> BridgeSettings {
    BridgeSettings {
        advertise_host: Some("192.168.1.50".to_string()),
        ..BridgeSettings::default()
    }
}

/// Create a test application backed by a recording host.
pub fn test_app() -> (Router, Arc<DryRunHost>) {
    let host = Arc::new(DryRunHost::new());
    let state = AppState::new(host.clone(), test_settings());
    (api::create_router(state), host)
}

/// Create a test application with custom settings.
pub fn test_app_with_settings(settings: BridgeSettings) -> (Router, Arc<DryRunHost>) {
    let host = Arc::new(DryRunHost::new());
    let state = AppState::new(host.clone(), settings);
    (api::create_router(state), host)
}

/// Create a test application whose host fails every action.
pub fn failing_app() -> Router {
    let state = AppState::new(Arc::new(FailingHost), test_settings());
    api::create_router(state)
}

/// Send a request and decode the JSON response.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_raw(app, request).await
}

/// Send a prepared request and decode the JSON response.
pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}
