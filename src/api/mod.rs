//! Router assembly and application state.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::clinic::ClinicState;
use crate::database::store::ClinicStore;
use crate::middleware::auth::session_middleware;

/// Shared application state: the store boundary plus one in-memory clinic
/// mirror per vet, loaded on first dashboard access and patched by the
/// mutation handlers after confirmed writes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClinicStore>,
    pub dashboards: Arc<RwLock<HashMap<Uuid, ClinicState>>>,
}

impl AppState {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self {
            store,
            dashboards: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_auth_routes())
        // Session-protected API
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_auth_routes() -> Router<AppState> {
    use crate::handlers::auth;

    Router::new()
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/login", post(auth::login))
}

fn protected_routes() -> Router<AppState> {
    use crate::handlers::{auth, dashboard, data, profile};

    Router::new()
        // Session
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/session", delete(auth::logout))
        .route("/api/auth/create-vet-profile", post(auth::create_vet_profile))
        // Clinic profile
        .route("/api/profile", get(profile::get).patch(profile::patch))
        // Dashboard aggregate + search
        .route("/api/dashboard", get(dashboard::get))
        // Owner tree mutations
        .route("/api/owners", post(data::owner_post))
        .route("/api/owners/:id", patch(data::owner_patch))
        .route("/api/owners/:id/pets", post(data::pet_post))
        .route("/api/pets/:id", patch(data::pet_patch))
        .route("/api/pets/:id/history", post(data::history_post))
        .route("/api/history/:id", patch(data::history_patch))
        .route("/api/pets/:id/reminders", post(data::reminder_post))
        .route("/api/reminders/:id", patch(data::reminder_patch))
        .route("/api/reminders/:id/done", post(data::reminder_done))
        .route_layer(axum_middleware::from_fn(session_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Vetclinic API",
            "version": version,
            "description": "Veterinary clinic management backend (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/sign-up, /auth/login (public - token acquisition)",
                "session": "/api/auth/* (protected)",
                "profile": "/api/profile (protected)",
                "dashboard": "/api/dashboard?q= (protected)",
                "owners": "/api/owners[/:id] (protected)",
                "pets": "/api/owners/:id/pets, /api/pets/:id (protected)",
                "history": "/api/pets/:id/history, /api/history/:id (protected)",
                "reminders": "/api/pets/:id/reminders, /api/reminders/:id[/done] (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    use axum::{http::StatusCode, response::Json};

    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}
