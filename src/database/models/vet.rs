use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One clinic profile per authenticated account (`user_id` is unique).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VetRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub clinic_name: String,
    pub doctor_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}
