#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::util::ServiceExt;

use roteiro_erp::{app, config, gate::CsrfService, AppState};

/// Fresh in-process application, default configuration.
pub fn test_app() -> Router {
    let state = AppState::from_config(config::config()).expect("gate construction");
    app(state)
}

/// Cookie-header fragment for an authenticated request. The gate only checks
/// presence, so any opaque value works.
pub fn session_cookie() -> String {
    "token=sessao-de-teste".to_string()
}

/// A freshly issued CSRF token, valid for both the cookie and the echo
/// header.
pub fn csrf_token() -> String {
    CsrfService::new(config::config().security.csrf_ttl_minutes).issue(Utc::now())
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("infallible router")
}

pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_authed(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .header("cookie", session_cookie())
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get("location")
        .expect("redirect without location header")
        .to_str()
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
