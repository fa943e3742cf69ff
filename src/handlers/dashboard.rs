use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::AppState;
use crate::clinic::filter_owners;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};

use super::utils::{ensure_loaded, resolve_vet};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Free-text search over owner name, phone, and pet names
    pub q: Option<String>,
}

/// GET /api/dashboard - The whole dashboard payload: clinic profile, the
/// (optionally filtered) owner tree, and upcoming reminders.
pub async fn get(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let vet = resolve_vet(&app, &user).await?;
    ensure_loaded(&app, vet.id).await?;

    let dashboards = app.dashboards.read().await;
    let clinic = dashboards
        .get(&vet.id)
        .ok_or_else(|| ApiError::internal_server_error("clinic state missing after load"))?;

    let query_text = query.q.unwrap_or_default();
    let owners: Vec<_> = filter_owners(&clinic.owners, &query_text)
        .into_iter()
        .cloned()
        .collect();

    Ok(ApiResponse::success(json!({
        "profile": {
            "id": vet.id,
            "clinic_name": vet.clinic_name,
            "doctor_name": vet.doctor_name,
            "email": vet.email,
            "phone": vet.phone,
        },
        "owners": owners,
        "pending_reminders": clinic.pending_reminders(),
        "weight_charts": clinic.weight_charts(),
    })))
}
