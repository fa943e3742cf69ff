use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;

use crate::api::AppState;
use crate::clinic::VetProfile;
use crate::database::models::VetRow;
use crate::database::store::VetPatch;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};

use super::utils::resolve_vet;

fn profile_from_row(row: VetRow) -> VetProfile {
    VetProfile {
        id: row.id,
        clinic_name: row.clinic_name,
        doctor_name: row.doctor_name,
        email: row.email,
        phone: row.phone,
    }
}

/// GET /api/profile - Resolve the caller's clinic profile. 404 with code
/// PROFILE_NOT_FOUND sends the client to the setup flow.
pub async fn get(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let vet = resolve_vet(&app, &user).await?;
    Ok(ApiResponse::success(profile_from_row(vet)))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub clinic_name: Option<String>,
    pub doctor_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// PATCH /api/profile - Settings form: partial update of the clinic profile.
pub async fn patch(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let vet = resolve_vet(&app, &user).await?;

    let updated = app
        .store
        .update_vet(
            vet.id,
            VetPatch {
                clinic_name: payload.clinic_name,
                doctor_name: payload.doctor_name,
                email: payload.email,
                phone: payload.phone,
            },
        )
        .await?;

    Ok(ApiResponse::success(profile_from_row(updated)))
}
