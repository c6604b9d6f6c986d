//! Login page and the session/CSRF lifecycle endpoints under `/api/auth`.
//! The `/api` prefix is on the gate's exclusion list, so these handlers do
//! their own cookie checks.

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;
use crate::gate::{cookie_value, CSRF_COOKIE, SESSION_COOKIE};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub unauthorized: Option<String>,
    pub invalid: Option<String>,
}

/// GET /login - the only page reachable without a session.
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Html<String> {
    let banner = if query.unauthorized.is_some() {
        "<p class=\"warn\">Sessão expirada ou não autenticada. Entre novamente.</p>"
    } else if query.invalid.is_some() {
        "<p class=\"warn\">Usuário ou senha inválidos.</p>"
    } else {
        ""
    };

    Html(format!(
        "<!doctype html>\n<html lang=\"pt-BR\">\n<head><meta charset=\"utf-8\"><title>Entrar — Roteiro ERP</title></head>\n<body data-module=\"login\">\n<main>\n<h1>Entrar</h1>\n{banner}\n<form method=\"post\" action=\"/api/auth/login\">\n<input name=\"username\" placeholder=\"Usuário\">\n<input name=\"password\" type=\"password\" placeholder=\"Senha\">\n<button type=\"submit\">Entrar</button>\n</form>\n</main>\n</body>\n</html>\n"
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login - issue the session and CSRF cookies and send the
/// browser to the home page.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let security = &config::config().security;

    let accepted = !security.admin_password.is_empty()
        && form.username == security.admin_user
        && form.password == security.admin_password;

    if !accepted {
        tracing::warn!(user = %form.username, "login rejected");
        return Redirect::to("/login?invalid=true").into_response();
    }

    let session_token = Uuid::new_v4().to_string();
    let csrf_token = state.gate.csrf().issue(Utc::now());
    tracing::info!(user = %form.username, "login accepted, session issued");

    (
        AppendHeaders([
            (SET_COOKIE, session_cookie(&session_token)),
            (SET_COOKIE, csrf_cookie(&csrf_token)),
        ]),
        Redirect::to(&state.gate.paths().home),
    )
        .into_response()
}

/// POST /api/auth/logout - expire both cookies and return to the login page.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([
            (SET_COOKIE, expired_cookie(SESSION_COOKIE)),
            (SET_COOKIE, expired_cookie(CSRF_COOKIE)),
        ]),
        Redirect::to(&state.gate.paths().login),
    )
}

/// PUT /api/auth/csrf - rotate the anti-forgery token for the active session.
pub async fn csrf_refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if cookie_value(&headers, SESSION_COOKIE).is_none() {
        return Err(ApiError::unauthorized("sessão ausente"));
    }

    let token = state.gate.csrf().issue(Utc::now());
    Ok((
        AppendHeaders([(SET_COOKIE, csrf_cookie(&token))]),
        ApiResponse::success(json!({ "csrf_token": token })),
    )
        .into_response())
}

/// GET /api/auth/whoami - session probe used by the front-end shell.
pub async fn whoami(headers: HeaderMap) -> ApiResult<Value> {
    let authenticated = cookie_value(&headers, SESSION_COOKIE).is_some();
    Ok(ApiResponse::success(json!({ "authenticated": authenticated })))
}

/// Session cookie stays out of script reach; the CSRF cookie must be
/// readable so the client can echo it into the request header.
fn session_cookie(value: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
        SESSION_COOKIE,
        value,
        secure_suffix()
    )
}

fn csrf_cookie(value: &str) -> String {
    format!("{}={}; Path=/; SameSite=Lax{}", CSRF_COOKIE, value, secure_suffix())
}

fn expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0", name)
}

fn secure_suffix() -> &'static str {
    if config::config().security.cookie_secure {
        "; Secure"
    } else {
        ""
    }
}
