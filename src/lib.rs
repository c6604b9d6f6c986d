pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use gate::Gate;
use handlers::{auth, pages};

/// Shared application state. The gate is immutable and cheap to share; it is
/// both the router middleware's state and the handlers' source for CSRF
/// issuance and navigation targets.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<Gate>,
}

impl AppState {
    pub fn from_config(config: &config::AppConfig) -> anyhow::Result<Self> {
        Ok(Self { gate: Arc::new(Gate::from_config(config)?) })
    }
}

/// Assemble the full application router. The gate wraps everything,
/// including the fallback, so unmatched paths still pass through it.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(page_routes())
        .merge(module_routes())
        .merge(auth_api_routes())
        .with_state(state.clone())
        .layer(from_fn_with_state(state.gate.clone(), gate::gate_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Directly addressable pages: login, access denied, and the root redirect.
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::root))
        .route("/login", get(auth::login_page))
        .route("/acesso-negado", get(pages::access_denied))
}

/// Internal module pages. Reached only through the gate's public->internal
/// rewrite; direct hits are redirected to the vanity URL before they land
/// here.
fn module_routes() -> Router<AppState> {
    Router::new()
        .route("/mods/home", get(pages::dashboard))
        .route("/mods/visits/home", get(pages::visits_home))
        .route("/mods/visits/agenda", get(pages::agenda).post(pages::agenda_submit))
        .route("/mods/visits/list", get(pages::visits_list))
        .route("/mods/visits/edit/:id", get(pages::visit_edit))
        .route("/mods/visits/details/:id", get(pages::visit_details))
        .route("/mods/visits/locations", get(pages::locations_home))
        .route("/mods/visits/locations/edit/:id", get(pages::location_edit))
        .route("/mods/visits/locations/details/:id", get(pages::location_details))
        .route("/mods/prescribers", get(pages::prescribers_home))
        .route("/mods/prescribers/edit/:id", get(pages::prescriber_edit))
        .route("/mods/prescribers/details/:id", get(pages::prescriber_details))
        .route("/mods/vehicles", get(pages::vehicles_home))
        .route("/mods/vehicles/edit/:id", get(pages::vehicle_edit))
        .route("/mods/vehicles/details/:id", get(pages::vehicle_details))
        .route("/mods/config", get(pages::config_home))
        .route("/mods/reports", get(pages::reports_home))
}

/// Session lifecycle endpoints plus the health probe. `/api` is excluded
/// from the gate matcher; these handlers check cookies themselves.
fn auth_api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/csrf", put(auth::csrf_refresh))
        .route("/api/auth/whoami", get(auth::whoami))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now(),
        }
    }))
}
