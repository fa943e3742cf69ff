use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{OwnerRow, PetHistoryRow, PetRow, ReminderRow, UserRow, VetRow};
use crate::database::store::{
    ClinicStore, HistoryPatch, NewHistory, NewOwner, NewPet, NewReminder, NewVet, OwnerPatch,
    PetPatch, ReminderPatch, VetPatch,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    vets: Vec<VetRow>,
    owners: Vec<OwnerRow>,
    pets: Vec<PetRow>,
    history: Vec<PetHistoryRow>,
    reminders: Vec<ReminderRow>,
}

/// In-memory stand-in for the Postgres store. Tables keep insertion order;
/// the list methods reproduce the SQL ordering contracts. `fail_next`
/// injects a one-shot failure to exercise error paths.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_next: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call (read or write) fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_fail(&self) -> Result<(), DatabaseError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ClinicStore for MemoryStore {
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(DatabaseError::Conflict("email already exists".to_string()));
        }
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError> {
        self.check_fail()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_vet(&self, new: NewVet) -> Result<VetRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.vets.iter().any(|v| v.user_id == new.user_id) {
            return Err(DatabaseError::Conflict("vet profile already exists".to_string()));
        }
        let row = VetRow {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            clinic_name: new.clinic_name,
            doctor_name: new.doctor_name,
            email: new.email,
            phone: new.phone,
            created_at: Utc::now(),
        };
        tables.vets.push(row.clone());
        Ok(row)
    }

    async fn find_vet_by_user(&self, user_id: Uuid) -> Result<Option<VetRow>, DatabaseError> {
        self.check_fail()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.vets.iter().find(|v| v.user_id == user_id).cloned())
    }

    async fn update_vet(&self, vet_id: Uuid, patch: VetPatch) -> Result<VetRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .vets
            .iter_mut()
            .find(|v| v.id == vet_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("vet {}", vet_id)))?;
        if let Some(v) = patch.clinic_name {
            row.clinic_name = v;
        }
        if let Some(v) = patch.doctor_name {
            row.doctor_name = v;
        }
        if let Some(v) = patch.email {
            row.email = v;
        }
        if let Some(v) = patch.phone {
            row.phone = Some(v);
        }
        Ok(row.clone())
    }

    async fn insert_owner(&self, new: NewOwner) -> Result<OwnerRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = OwnerRow {
            id: Uuid::new_v4(),
            vet_id: new.vet_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            created_at: Utc::now(),
        };
        tables.owners.push(row.clone());
        Ok(row)
    }

    async fn update_owner(&self, owner_id: Uuid, patch: OwnerPatch) -> Result<OwnerRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .owners
            .iter_mut()
            .find(|o| o.id == owner_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("owner {}", owner_id)))?;
        if let Some(v) = patch.name {
            row.name = v;
        }
        if let Some(v) = patch.email {
            row.email = Some(v);
        }
        if let Some(v) = patch.phone {
            row.phone = v;
        }
        if let Some(v) = patch.address {
            row.address = Some(v);
        }
        Ok(row.clone())
    }

    async fn list_owners(&self, vet_id: Uuid) -> Result<Vec<OwnerRow>, DatabaseError> {
        self.check_fail()?;
        let tables = self.tables.lock().unwrap();
        // Insertion order reversed = created_at DESC
        Ok(tables
            .owners
            .iter()
            .rev()
            .filter(|o| o.vet_id == vet_id)
            .cloned()
            .collect())
    }

    async fn insert_pet(&self, new: NewPet) -> Result<PetRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = PetRow {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            name: new.name,
            species: new.species,
            breed: new.breed,
            age: new.age,
            medical_alerts: new.medical_alerts,
            created_at: Utc::now(),
        };
        tables.pets.push(row.clone());
        Ok(row)
    }

    async fn update_pet(&self, pet_id: Uuid, patch: PetPatch) -> Result<PetRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .pets
            .iter_mut()
            .find(|p| p.id == pet_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("pet {}", pet_id)))?;
        if let Some(v) = patch.name {
            row.name = v;
        }
        if let Some(v) = patch.species {
            row.species = v;
        }
        if let Some(v) = patch.breed {
            row.breed = v;
        }
        if let Some(v) = patch.age {
            row.age = v;
        }
        if let Some(v) = patch.medical_alerts {
            row.medical_alerts = Some(v);
        }
        Ok(row.clone())
    }

    async fn list_pets(&self, owner_ids: &[Uuid]) -> Result<Vec<PetRow>, DatabaseError> {
        self.check_fail()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .pets
            .iter()
            .filter(|p| owner_ids.contains(&p.owner_id))
            .cloned()
            .collect())
    }

    async fn insert_history(&self, new: NewHistory) -> Result<PetHistoryRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = PetHistoryRow {
            id: Uuid::new_v4(),
            pet_id: new.pet_id,
            history_date: new.history_date,
            entry_type: new.entry_type,
            description: new.description,
            veterinarian: new.veterinarian,
            weight: new.weight,
            created_at: Utc::now(),
        };
        tables.history.push(row.clone());
        Ok(row)
    }

    async fn update_history(&self, history_id: Uuid, patch: HistoryPatch) -> Result<PetHistoryRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .history
            .iter_mut()
            .find(|h| h.id == history_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("history entry {}", history_id)))?;
        if let Some(v) = patch.history_date {
            row.history_date = v;
        }
        if let Some(v) = patch.entry_type {
            row.entry_type = v;
        }
        if let Some(v) = patch.description {
            row.description = v;
        }
        if let Some(v) = patch.veterinarian {
            row.veterinarian = v;
        }
        if let Some(v) = patch.weight {
            row.weight = Some(v);
        }
        Ok(row.clone())
    }

    async fn list_history(&self, pet_ids: &[Uuid]) -> Result<Vec<PetHistoryRow>, DatabaseError> {
        self.check_fail()?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<(usize, PetHistoryRow)> = tables
            .history
            .iter()
            .enumerate()
            .filter(|(_, h)| pet_ids.contains(&h.pet_id))
            .map(|(i, h)| (i, h.clone()))
            .collect();
        // history_date DESC, then insertion order DESC (stands in for created_at)
        rows.sort_by(|(ia, a), (ib, b)| {
            b.history_date.cmp(&a.history_date).then(ib.cmp(ia))
        });
        Ok(rows.into_iter().map(|(_, h)| h).collect())
    }

    async fn insert_reminder(&self, new: NewReminder) -> Result<ReminderRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = ReminderRow {
            id: Uuid::new_v4(),
            pet_id: new.pet_id,
            reminder_date: new.reminder_date,
            reminder_type: new.reminder_type,
            description: new.description,
            completed: false,
            created_at: Utc::now(),
        };
        tables.reminders.push(row.clone());
        Ok(row)
    }

    async fn update_reminder(&self, reminder_id: Uuid, patch: ReminderPatch) -> Result<ReminderRow, DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .reminders
            .iter_mut()
            .find(|r| r.id == reminder_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("reminder {}", reminder_id)))?;
        if let Some(v) = patch.reminder_date {
            row.reminder_date = v;
        }
        if let Some(v) = patch.reminder_type {
            row.reminder_type = v;
        }
        if let Some(v) = patch.description {
            row.description = v;
        }
        Ok(row.clone())
    }

    async fn mark_reminder_done(&self, reminder_id: Uuid) -> Result<(), DatabaseError> {
        self.check_fail()?;
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .reminders
            .iter_mut()
            .find(|r| r.id == reminder_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("reminder {}", reminder_id)))?;
        row.completed = true;
        Ok(())
    }

    async fn list_reminders(&self, pet_ids: &[Uuid]) -> Result<Vec<ReminderRow>, DatabaseError> {
        self.check_fail()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .reminders
            .iter()
            .filter(|r| pet_ids.contains(&r.pet_id))
            .cloned()
            .collect())
    }
}
