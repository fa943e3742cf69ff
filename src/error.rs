// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::clinic::mutations::MutationError;
use crate::database::manager::DatabaseError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),
    /// Authenticated identity has no clinic profile yet; the client routes
    /// to the setup flow rather than showing an error page.
    ProfileNotFound,

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::ProfileNotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::ProfileNotFound => "No clinic profile for this account",
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ProfileNotFound => "PROFILE_NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) => ApiError::conflict(msg),
            DatabaseError::Rejected(msg) => {
                // Internal details are logged, never exposed
                tracing::warn!("Statement rejected: {}", msg);
                ApiError::bad_request("Request could not be completed with the given data")
            }
            DatabaseError::ConfigMissing(what) => {
                tracing::error!("Missing configuration: {}", what);
                ApiError::service_unavailable("Service misconfigured")
            }
            DatabaseError::QueryError(msg) => {
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            // Connection-class failures are retryable, so 503 rather than 500
            DatabaseError::Sqlx(
                err @ (sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)),
            ) => {
                tracing::error!("Database unreachable: {}", err);
                ApiError::service_unavailable("Data store temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<MutationError> for ApiError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Validation(msg) => ApiError::bad_request(msg),
            MutationError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            MutationError::Store(db) => db.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(msg) => ApiError::unauthorized(msg),
            AuthError::TokenGeneration(msg) => {
                tracing::error!("JWT generation failed: {}", msg);
                ApiError::internal_server_error("Failed to create session")
            }
            AuthError::MissingSecret => {
                tracing::error!("JWT secret not configured");
                ApiError::service_unavailable("Service misconfigured")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_not_found_has_routing_code() {
        let err = ApiError::ProfileNotFound;
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json()["code"], "PROFILE_NOT_FOUND");
    }

    #[test]
    fn store_conflict_maps_to_409() {
        let err: ApiError = DatabaseError::Conflict("email already exists".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_unreachable_maps_to_503() {
        for err in [
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut),
            DatabaseError::Sqlx(sqlx::Error::PoolClosed),
        ] {
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    #[test]
    fn statement_rejection_maps_to_400_without_leaking() {
        let api: ApiError =
            DatabaseError::Rejected("pets_owner_id_fkey violated".to_string()).into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);
        assert!(!api.message().contains("fkey"));
    }

    #[test]
    fn sqlx_details_are_not_leaked() {
        let err: ApiError =
            DatabaseError::QueryError("SELECT * FROM secrets failed".to_string()).into();
        assert!(!err.message().contains("secrets"));
    }
}
