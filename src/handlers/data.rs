//! Mutation endpoints. Each resolves the caller's clinic, makes sure the
//! in-memory mirror is loaded, and delegates to the matching two-phase
//! handler in [`crate::clinic::mutations`].

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::clinic::mutations::{
    self, AddHistoryInput, AddOwnerInput, AddPetInput, AddReminderInput, UpdateHistoryInput,
    UpdateOwnerInput, UpdatePetInput, UpdateReminderInput,
};
use crate::clinic::ClinicState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};

use super::utils::{ensure_loaded, resolve_vet};

/// Run `f` with the caller's mutable clinic mirror and the store.
macro_rules! with_clinic {
    ($app:expr, $user:expr, $vet_id:ident, $clinic:ident, $body:expr) => {{
        let vet = resolve_vet(&$app, &$user).await?;
        ensure_loaded(&$app, vet.id).await?;
        let mut dashboards = $app.dashboards.write().await;
        let $clinic: &mut ClinicState = dashboards
            .get_mut(&vet.id)
            .ok_or_else(|| ApiError::internal_server_error("clinic state missing after load"))?;
        let $vet_id: Uuid = vet.id;
        $body
    }};
}

/// POST /api/owners
pub async fn owner_post(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<AddOwnerInput>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, vet_id, clinic, {
        let owner = mutations::add_owner(app.store.as_ref(), clinic, vet_id, input).await?;
        Ok(ApiResponse::created(owner))
    })
}

/// PATCH /api/owners/:id
pub async fn owner_patch(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(owner_id): Path<Uuid>,
    Json(input): Json<UpdateOwnerInput>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, _vet_id, clinic, {
        let owner = mutations::update_owner(app.store.as_ref(), clinic, owner_id, input).await?;
        Ok(ApiResponse::success(owner))
    })
}

/// POST /api/owners/:id/pets
pub async fn pet_post(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(owner_id): Path<Uuid>,
    Json(input): Json<AddPetInput>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, _vet_id, clinic, {
        let pet = mutations::add_pet(app.store.as_ref(), clinic, owner_id, input).await?;
        Ok(ApiResponse::created(pet))
    })
}

/// PATCH /api/pets/:id
pub async fn pet_patch(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pet_id): Path<Uuid>,
    Json(input): Json<UpdatePetInput>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, _vet_id, clinic, {
        let pet = mutations::update_pet(app.store.as_ref(), clinic, pet_id, input).await?;
        Ok(ApiResponse::success(pet))
    })
}

/// POST /api/pets/:id/history
pub async fn history_post(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pet_id): Path<Uuid>,
    Json(input): Json<AddHistoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, _vet_id, clinic, {
        let entry = mutations::add_history(app.store.as_ref(), clinic, pet_id, input).await?;
        Ok(ApiResponse::created(entry))
    })
}

/// PATCH /api/history/:id
pub async fn history_patch(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(history_id): Path<Uuid>,
    Json(input): Json<UpdateHistoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, _vet_id, clinic, {
        let entry =
            mutations::update_history(app.store.as_ref(), clinic, history_id, input).await?;
        Ok(ApiResponse::success(entry))
    })
}

/// POST /api/pets/:id/reminders
pub async fn reminder_post(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pet_id): Path<Uuid>,
    Json(input): Json<AddReminderInput>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, _vet_id, clinic, {
        let reminder = mutations::add_reminder(app.store.as_ref(), clinic, pet_id, input).await?;
        Ok(ApiResponse::created(reminder))
    })
}

/// PATCH /api/reminders/:id
pub async fn reminder_patch(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(reminder_id): Path<Uuid>,
    Json(input): Json<UpdateReminderInput>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, _vet_id, clinic, {
        let reminder =
            mutations::update_reminder(app.store.as_ref(), clinic, reminder_id, input).await?;
        Ok(ApiResponse::success(reminder))
    })
}

/// POST /api/reminders/:id/done
pub async fn reminder_done(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(reminder_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    with_clinic!(app, user, _vet_id, clinic, {
        mutations::mark_reminder_done(app.store.as_ref(), clinic, reminder_id).await?;
        Ok(ApiResponse::success(serde_json::json!({ "completed": true })))
    })
}
