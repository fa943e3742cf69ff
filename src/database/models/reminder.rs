use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReminderRow {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub reminder_date: NaiveDate,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub reminder_type: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}
