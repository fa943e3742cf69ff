//! The store boundary. Domain logic talks to [`ClinicStore`]; the production
//! implementation is [`PgClinicStore`] over sqlx/Postgres. Rows come back
//! typed (see `models`) so nothing loosely-shaped flows past this module.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{OwnerRow, PetHistoryRow, PetRow, ReminderRow, UserRow, VetRow};

#[derive(Debug, Clone)]
pub struct NewVet {
    pub user_id: Uuid,
    pub clinic_name: String,
    pub doctor_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct VetPatch {
    pub clinic_name: Option<String>,
    pub doctor_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOwner {
    pub vet_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OwnerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPet {
    pub owner_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: String,
    /// Canonical age text, see [`crate::clinic::PetAge::to_storage`].
    pub age: String,
    pub medical_alerts: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PetPatch {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub medical_alerts: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewHistory {
    pub pet_id: Uuid,
    pub history_date: NaiveDate,
    pub entry_type: String,
    pub description: String,
    pub veterinarian: String,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryPatch {
    pub history_date: Option<NaiveDate>,
    pub entry_type: Option<String>,
    pub description: Option<String>,
    pub veterinarian: Option<String>,
    pub weight: Option<f64>,
}

/// New reminders always start with `completed = false`.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub pet_id: Uuid,
    pub reminder_date: NaiveDate,
    pub reminder_type: String,
    pub description: String,
}

/// `completed` is deliberately absent: only `mark_reminder_done` touches it,
/// which keeps the flag monotonic.
#[derive(Debug, Clone, Default)]
pub struct ReminderPatch {
    pub reminder_date: Option<NaiveDate>,
    pub reminder_type: Option<String>,
    pub description: Option<String>,
}

#[async_trait]
pub trait ClinicStore: Send + Sync {
    // Identity accounts
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserRow, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError>;

    // Clinic profiles
    async fn insert_vet(&self, new: NewVet) -> Result<VetRow, DatabaseError>;
    async fn find_vet_by_user(&self, user_id: Uuid) -> Result<Option<VetRow>, DatabaseError>;
    async fn update_vet(&self, vet_id: Uuid, patch: VetPatch) -> Result<VetRow, DatabaseError>;

    // Owners
    async fn insert_owner(&self, new: NewOwner) -> Result<OwnerRow, DatabaseError>;
    async fn update_owner(&self, owner_id: Uuid, patch: OwnerPatch) -> Result<OwnerRow, DatabaseError>;
    /// All owners for a clinic, newest first.
    async fn list_owners(&self, vet_id: Uuid) -> Result<Vec<OwnerRow>, DatabaseError>;

    // Pets
    async fn insert_pet(&self, new: NewPet) -> Result<PetRow, DatabaseError>;
    async fn update_pet(&self, pet_id: Uuid, patch: PetPatch) -> Result<PetRow, DatabaseError>;
    async fn list_pets(&self, owner_ids: &[Uuid]) -> Result<Vec<PetRow>, DatabaseError>;

    // Medical history
    async fn insert_history(&self, new: NewHistory) -> Result<PetHistoryRow, DatabaseError>;
    async fn update_history(&self, history_id: Uuid, patch: HistoryPatch) -> Result<PetHistoryRow, DatabaseError>;
    /// History rows for the given pets, newest entry date first.
    async fn list_history(&self, pet_ids: &[Uuid]) -> Result<Vec<PetHistoryRow>, DatabaseError>;

    // Reminders
    async fn insert_reminder(&self, new: NewReminder) -> Result<ReminderRow, DatabaseError>;
    async fn update_reminder(&self, reminder_id: Uuid, patch: ReminderPatch) -> Result<ReminderRow, DatabaseError>;
    async fn mark_reminder_done(&self, reminder_id: Uuid) -> Result<(), DatabaseError>;
    async fn list_reminders(&self, pet_ids: &[Uuid]) -> Result<Vec<ReminderRow>, DatabaseError>;
}

pub struct PgClinicStore {
    pool: PgPool,
}

impl PgClinicStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map database-side refusals: unique violations become Conflict (409),
/// any other constraint failure becomes Rejected (bad request data).
/// Infrastructure errors pass through untouched.
fn map_insert_error(err: sqlx::Error, what: &str) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return DatabaseError::Conflict(format!("{} already exists", what));
        }
        return DatabaseError::Rejected(format!("{} insert refused: {}", what, db_err));
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl ClinicStore for PgClinicStore {
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserRow, DatabaseError> {
        sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING *",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "email"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_vet(&self, new: NewVet) -> Result<VetRow, DatabaseError> {
        sqlx::query_as::<_, VetRow>(
            "INSERT INTO vets (user_id, clinic_name, doctor_name, email, phone) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(new.user_id)
        .bind(&new.clinic_name)
        .bind(&new.doctor_name)
        .bind(&new.email)
        .bind(&new.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "vet profile"))
    }

    async fn find_vet_by_user(&self, user_id: Uuid) -> Result<Option<VetRow>, DatabaseError> {
        let row = sqlx::query_as::<_, VetRow>("SELECT * FROM vets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_vet(&self, vet_id: Uuid, patch: VetPatch) -> Result<VetRow, DatabaseError> {
        let row = sqlx::query_as::<_, VetRow>(
            "UPDATE vets SET \
                clinic_name = COALESCE($2, clinic_name), \
                doctor_name = COALESCE($3, doctor_name), \
                email = COALESCE($4, email), \
                phone = COALESCE($5, phone) \
             WHERE id = $1 RETURNING *",
        )
        .bind(vet_id)
        .bind(&patch.clinic_name)
        .bind(&patch.doctor_name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DatabaseError::NotFound(format!("vet {}", vet_id)))
    }

    async fn insert_owner(&self, new: NewOwner) -> Result<OwnerRow, DatabaseError> {
        sqlx::query_as::<_, OwnerRow>(
            "INSERT INTO owners (vet_id, name, phone, email, address) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(new.vet_id)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "owner"))
    }

    async fn update_owner(&self, owner_id: Uuid, patch: OwnerPatch) -> Result<OwnerRow, DatabaseError> {
        let row = sqlx::query_as::<_, OwnerRow>(
            "UPDATE owners SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                phone = COALESCE($4, phone), \
                address = COALESCE($5, address) \
             WHERE id = $1 RETURNING *",
        )
        .bind(owner_id)
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.address)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DatabaseError::NotFound(format!("owner {}", owner_id)))
    }

    async fn list_owners(&self, vet_id: Uuid) -> Result<Vec<OwnerRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, OwnerRow>(
            "SELECT * FROM owners WHERE vet_id = $1 ORDER BY created_at DESC",
        )
        .bind(vet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_pet(&self, new: NewPet) -> Result<PetRow, DatabaseError> {
        sqlx::query_as::<_, PetRow>(
            "INSERT INTO pets (owner_id, name, species, breed, age, medical_alerts) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(new.owner_id)
        .bind(&new.name)
        .bind(&new.species)
        .bind(&new.breed)
        .bind(&new.age)
        .bind(&new.medical_alerts)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "pet"))
    }

    async fn update_pet(&self, pet_id: Uuid, patch: PetPatch) -> Result<PetRow, DatabaseError> {
        let row = sqlx::query_as::<_, PetRow>(
            "UPDATE pets SET \
                name = COALESCE($2, name), \
                species = COALESCE($3, species), \
                breed = COALESCE($4, breed), \
                age = COALESCE($5, age), \
                medical_alerts = COALESCE($6, medical_alerts) \
             WHERE id = $1 RETURNING *",
        )
        .bind(pet_id)
        .bind(&patch.name)
        .bind(&patch.species)
        .bind(&patch.breed)
        .bind(&patch.age)
        .bind(&patch.medical_alerts)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DatabaseError::NotFound(format!("pet {}", pet_id)))
    }

    async fn list_pets(&self, owner_ids: &[Uuid]) -> Result<Vec<PetRow>, DatabaseError> {
        if owner_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, PetRow>(
            "SELECT * FROM pets WHERE owner_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_history(&self, new: NewHistory) -> Result<PetHistoryRow, DatabaseError> {
        sqlx::query_as::<_, PetHistoryRow>(
            "INSERT INTO pet_history (pet_id, history_date, type, description, veterinarian, weight) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(new.pet_id)
        .bind(new.history_date)
        .bind(&new.entry_type)
        .bind(&new.description)
        .bind(&new.veterinarian)
        .bind(new.weight)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "history entry"))
    }

    async fn update_history(&self, history_id: Uuid, patch: HistoryPatch) -> Result<PetHistoryRow, DatabaseError> {
        let row = sqlx::query_as::<_, PetHistoryRow>(
            "UPDATE pet_history SET \
                history_date = COALESCE($2, history_date), \
                type = COALESCE($3, type), \
                description = COALESCE($4, description), \
                veterinarian = COALESCE($5, veterinarian), \
                weight = COALESCE($6, weight) \
             WHERE id = $1 RETURNING *",
        )
        .bind(history_id)
        .bind(patch.history_date)
        .bind(&patch.entry_type)
        .bind(&patch.description)
        .bind(&patch.veterinarian)
        .bind(patch.weight)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DatabaseError::NotFound(format!("history entry {}", history_id)))
    }

    async fn list_history(&self, pet_ids: &[Uuid]) -> Result<Vec<PetHistoryRow>, DatabaseError> {
        if pet_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, PetHistoryRow>(
            "SELECT * FROM pet_history WHERE pet_id = ANY($1) \
             ORDER BY history_date DESC, created_at DESC",
        )
        .bind(pet_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_reminder(&self, new: NewReminder) -> Result<ReminderRow, DatabaseError> {
        sqlx::query_as::<_, ReminderRow>(
            "INSERT INTO reminders (pet_id, reminder_date, type, description, completed) \
             VALUES ($1, $2, $3, $4, FALSE) RETURNING *",
        )
        .bind(new.pet_id)
        .bind(new.reminder_date)
        .bind(&new.reminder_type)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "reminder"))
    }

    async fn update_reminder(&self, reminder_id: Uuid, patch: ReminderPatch) -> Result<ReminderRow, DatabaseError> {
        let row = sqlx::query_as::<_, ReminderRow>(
            "UPDATE reminders SET \
                reminder_date = COALESCE($2, reminder_date), \
                type = COALESCE($3, type), \
                description = COALESCE($4, description) \
             WHERE id = $1 RETURNING *",
        )
        .bind(reminder_id)
        .bind(patch.reminder_date)
        .bind(&patch.reminder_type)
        .bind(&patch.description)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| DatabaseError::NotFound(format!("reminder {}", reminder_id)))
    }

    async fn mark_reminder_done(&self, reminder_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE reminders SET completed = TRUE WHERE id = $1")
            .bind(reminder_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("reminder {}", reminder_id)));
        }
        Ok(())
    }

    async fn list_reminders(&self, pet_ids: &[Uuid]) -> Result<Vec<ReminderRow>, DatabaseError> {
        if pet_ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT * FROM reminders WHERE pet_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(pet_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
