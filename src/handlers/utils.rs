use uuid::Uuid;

use crate::api::AppState;
use crate::clinic::load_clinic;
use crate::database::models::VetRow;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Profile resolution: exactly one vets row per identity. Absence is a
/// routing signal for the client, not a fault.
pub async fn resolve_vet(app: &AppState, user: &AuthUser) -> Result<VetRow, ApiError> {
    app.store
        .find_vet_by_user(user.user_id)
        .await?
        .ok_or(ApiError::ProfileNotFound)
}

/// Make sure the clinic's in-memory mirror exists, aggregating from storage
/// on first access. Subsequent requests reuse the patched mirror.
pub async fn ensure_loaded(app: &AppState, vet_id: Uuid) -> Result<(), ApiError> {
    {
        let dashboards = app.dashboards.read().await;
        if dashboards.contains_key(&vet_id) {
            return Ok(());
        }
    }

    let loaded = load_clinic(app.store.as_ref(), vet_id).await?;
    app.dashboards.write().await.entry(vet_id).or_insert(loaded);
    Ok(())
}
