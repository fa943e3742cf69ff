use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// `age` holds the canonical text rendering of [`crate::clinic::PetAge`];
/// legacy rows may still contain a bare number of years.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PetRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub medical_alerts: Option<String>,
    pub created_at: DateTime<Utc>,
}
