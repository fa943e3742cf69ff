use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::{self, Claims};
use crate::database::manager::DatabaseError;
use crate::database::store::NewVet;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Sign-up form sends the repeat-password field along
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/sign-up - Create an account and return a session token.
pub async fn sign_up(
    State(app): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::bad_request("Password must be at least 6 characters"));
    }
    if let Some(confirm) = &payload.confirm_password {
        if *confirm != payload.password {
            return Err(ApiError::bad_request("Passwords do not match"));
        }
    }

    let password_hash = auth::hash_password(&payload.password);
    let user = app.store.insert_user(&email, &password_hash).await.map_err(|e| match e {
        DatabaseError::Conflict(_) => ApiError::conflict("Email is already registered"),
        other => other.into(),
    })?;

    let token = auth::generate_jwt(&Claims::new(user.id, user.email.clone()))?;
    tracing::info!(user_id = %user.id, "account created");

    Ok(ApiResponse::created(json!({
        "token": token,
        "user": { "id": user.id, "email": user.email }
    })))
}

/// POST /auth/login - Validate credentials and return a session token.
pub async fn login(
    State(app): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let user = app
        .store
        .find_user_by_email(&email)
        .await?
        .filter(|u| auth::verify_password(&payload.password, &u.password_hash))
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let token = auth::generate_jwt(&Claims::new(user.id, user.email.clone()))?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": { "id": user.id, "email": user.email }
    })))
}

/// GET /api/auth/whoami - Current session identity.
pub async fn whoami(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    ApiResponse::success(json!({
        "user_id": user.user_id,
        "email": user.email
    }))
}

/// DELETE /api/auth/session - Log out. Sessions are stateless tokens, so
/// this only confirms the client should discard its copy.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct CreateVetProfileRequest {
    pub user_id: Option<Uuid>,
    pub clinic_name: Option<String>,
    pub doctor_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// POST /api/auth/create-vet-profile - Create the caller's clinic profile.
/// 400 on missing fields or store rejection, 201 with the new row.
pub async fn create_vet_profile(
    State(app): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateVetProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user_id, clinic_name, doctor_name, email) = match (
        payload.user_id,
        payload.clinic_name.filter(|s| !s.trim().is_empty()),
        payload.doctor_name.filter(|s| !s.trim().is_empty()),
        payload.email.filter(|s| !s.trim().is_empty()),
    ) {
        (Some(user_id), Some(clinic), Some(doctor), Some(email)) => {
            (user_id, clinic, doctor, email)
        }
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };

    if user_id != user.user_id {
        return Err(ApiError::bad_request("user_id does not match the session"));
    }

    let vet = app
        .store
        .insert_vet(NewVet {
            user_id,
            clinic_name: clinic_name.trim().to_string(),
            doctor_name: doctor_name.trim().to_string(),
            email: email.trim().to_string(),
            phone: payload.phone.filter(|s| !s.trim().is_empty()),
        })
        .await
        .map_err(|e| match e {
            // Store rejections answer 400 on this endpoint
            DatabaseError::Conflict(msg) => ApiError::bad_request(msg),
            other => other.into(),
        })?;

    Ok(ApiResponse::created(vet))
}
