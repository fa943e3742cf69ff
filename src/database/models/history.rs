use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PetHistoryRow {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub history_date: NaiveDate,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub entry_type: String,
    pub description: String,
    pub veterinarian: String,
    pub weight: Option<f64>,
    pub created_at: DateTime<Utc>,
}
