//! Per-request gate: vanity-URL canonicalization, session and permission
//! checks, CSRF enforcement, and the public->internal rewrite.
//!
//! The decision core is a pure function from a request snapshot to one of
//! Redirect / Rewrite / Block / Continue; the axum middleware around it only
//! builds the snapshot and applies the outcome.

pub mod csrf;
pub mod policy;
pub mod routes;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Json, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::ApiError;

pub use csrf::{CsrfService, CSRF_COOKIE, CSRF_HEADER};
pub use policy::{PermissionPolicy, PrefixPolicy, SessionContext};
pub use routes::{RouteTable, RouteTableError, MODULE_PREFIX, ROUTE_ENTRIES};

/// Cookie whose presence marks a request as authenticated.
pub const SESSION_COOKIE: &str = "token";

/// Body of the terminal CSRF failure response.
pub const CSRF_INVALID_MESSAGE: &str = "CSRF token inválido";

/// Read-only view of one request, taken before any routing happens. The gate
/// decides from this alone, which keeps it a pure function in tests.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub path: String,
    pub cookies: HashMap<String, String>,
    pub csrf_header: Option<String>,
}

impl RequestSnapshot {
    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        Self {
            method: method.clone(),
            path: uri.path().to_string(),
            cookies: parse_cookies(headers),
            csrf_header: headers
                .get(CSRF_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    fn session_token(&self) -> Option<&str> {
        self.cookies.get(SESSION_COOKIE).map(String::as_str)
    }

    fn csrf_cookie(&self) -> Option<&str> {
        self.cookies.get(CSRF_COOKIE).map(String::as_str)
    }
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Client-visible navigation to another URL.
    Redirect(String),
    /// Serve the given internal path without changing the visible URL.
    Rewrite(String),
    /// Terminal error response, no further processing.
    Block { status: StatusCode, body: Value },
    /// Not our business; pass the request through unmodified.
    Continue,
}

/// Well-known navigation targets used by gate decisions.
#[derive(Debug, Clone)]
pub struct GatePaths {
    pub login: String,
    pub home: String,
    pub access_denied: String,
}

impl Default for GatePaths {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            home: "/home".to_string(),
            access_denied: "/acesso-negado".to_string(),
        }
    }
}

/// The assembled gate. Immutable after construction and shared across
/// requests behind an `Arc`.
pub struct Gate {
    table: RouteTable,
    policy: Box<dyn PermissionPolicy>,
    csrf: CsrfService,
    paths: GatePaths,
    /// Paths reachable without a session.
    public_paths: Vec<String>,
    /// Prefixes the gate never inspects (assets, the JSON API, favicon).
    /// Entries ending in `/` are prefix matches, others exact.
    excluded: Vec<String>,
}

impl Gate {
    pub fn new(table: RouteTable, policy: Box<dyn PermissionPolicy>, csrf: CsrfService) -> Self {
        let paths = GatePaths::default();
        let public_paths = vec![paths.login.clone()];
        Self {
            table,
            policy,
            csrf,
            paths,
            public_paths,
            excluded: vec![
                "/api/".to_string(),
                "/assets/".to_string(),
                "/favicon.ico".to_string(),
            ],
        }
    }

    /// Gate over the standard route table, configured from application
    /// settings.
    pub fn from_config(config: &AppConfig) -> Result<Self, RouteTableError> {
        Ok(Self::new(
            RouteTable::standard()?,
            Box::new(PrefixPolicy::default()),
            CsrfService::new(config.security.csrf_ttl_minutes),
        ))
    }

    pub fn csrf(&self) -> &CsrfService {
        &self.csrf
    }

    pub fn paths(&self) -> &GatePaths {
        &self.paths
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|rule| {
            if rule.ends_with('/') {
                path.starts_with(rule.as_str())
            } else {
                path == rule
            }
        })
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }

    fn login_redirect(&self) -> Decision {
        Decision::Redirect(format!("{}?unauthorized=true", self.paths.login))
    }

    /// The ordered rule set, first match wins. Pure: reads only the snapshot,
    /// the clock value handed in, and the immutable tables.
    pub fn decide(&self, request: &RequestSnapshot, now: DateTime<Utc>) -> Decision {
        if self.is_excluded(&request.path) {
            return Decision::Continue;
        }

        // 1. Internal module paths are never user-visible; force the public
        //    form into the address bar.
        if request.path.starts_with(MODULE_PREFIX) {
            if let Some(public) = self.table.redirect_for_internal(&request.path) {
                return Decision::Redirect(public);
            }
        }

        // 2. Session gate.
        let session = match request.session_token() {
            None => {
                if self.is_public(&request.path) {
                    None
                } else {
                    return self.login_redirect();
                }
            }
            Some(token) => {
                if request.path == self.paths.login {
                    return Decision::Redirect(self.paths.home.clone());
                }
                Some(SessionContext { token: token.to_string() })
            }
        };

        // 3. Permission gate, authenticated requests only.
        if let Some(session) = &session {
            if !self.policy.allow(&request.path, session) {
                return Decision::Redirect(self.paths.access_denied.clone());
            }
        }

        // 4. CSRF gate for unsafe methods.
        if request.method != Method::GET && request.method != Method::HEAD {
            if let Err(reason) = self.csrf.verify(
                request.csrf_header.as_deref(),
                request.csrf_cookie(),
                now,
            ) {
                tracing::warn!(path = %request.path, method = %request.method, %reason, "CSRF check failed");
                return Decision::Block {
                    status: StatusCode::FORBIDDEN,
                    body: json!({ "error": CSRF_INVALID_MESSAGE }),
                };
            }
        }

        // 5. Serve public aliases from their module page. Internal paths were
        //    already diverted by rule 1, so a rewritten path can never match
        //    here a second time.
        if let Some(internal) = self.table.rewrite_for_public(&request.path) {
            return Decision::Rewrite(internal);
        }

        Decision::Continue
    }
}

/// Axum shell around [`Gate::decide`].
pub async fn gate_middleware(
    State(gate): State<Arc<Gate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let snapshot = RequestSnapshot::from_parts(request.method(), request.uri(), request.headers());

    match gate.decide(&snapshot, Utc::now()) {
        Decision::Continue => next.run(request).await,
        Decision::Redirect(target) => {
            tracing::debug!(from = %snapshot.path, to = %target, "gate redirect");
            Redirect::temporary(&target).into_response()
        }
        Decision::Block { status, body } => (status, Json(body)).into_response(),
        Decision::Rewrite(internal) => {
            tracing::debug!(public = %snapshot.path, %internal, "gate rewrite");
            match rebuild_uri(&internal, request.uri().query()) {
                Ok(uri) => {
                    *request.uri_mut() = uri;
                    next.run(request).await
                }
                Err(e) => {
                    tracing::error!(%internal, error = %e, "rewrite produced an invalid URI");
                    ApiError::internal_server_error("falha interna de roteamento").into_response()
                }
            }
        }
    }
}

/// Value of a single cookie, if present.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    parse_cookies(headers).remove(name)
}

fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }
    cookies
}

fn rebuild_uri(path: &str, query: Option<&str>) -> Result<Uri, axum::http::uri::InvalidUri> {
    match query {
        Some(q) => format!("{}?{}", path, q).parse(),
        None => path.parse(),
    }
}
