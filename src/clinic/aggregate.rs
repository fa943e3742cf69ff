//! Clinic data aggregation: flat table rows in, the nested
//! owner → pet → (history, reminders) tree out.
//!
//! One bulk query per table (owners for the clinic, then pets/history/
//! reminders keyed by the parent id sets), grouped in memory. Any fetch
//! failure aborts the whole load; partial trees are never returned.

use std::collections::HashMap;

use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{OwnerRow, PetHistoryRow, PetRow, ReminderRow};
use crate::database::store::ClinicStore;

use super::state::ClinicState;
use super::types::{HistoryEntry, HistoryType, Owner, Pet, PetAge, Reminder, ReminderType};

/// Row conversions live here, right at the store boundary. Stored category
/// labels and age text are parsed leniently so rows written by older clients
/// still load.
pub fn history_from_row(row: PetHistoryRow) -> HistoryEntry {
    HistoryEntry {
        id: row.id,
        date: row.history_date,
        entry_type: HistoryType::from_label_lossy(&row.entry_type),
        description: row.description,
        veterinarian: row.veterinarian,
        weight: row.weight,
    }
}

pub fn reminder_from_row(row: ReminderRow) -> Reminder {
    Reminder {
        id: row.id,
        date: row.reminder_date,
        reminder_type: ReminderType::from_label_lossy(&row.reminder_type),
        description: row.description,
        completed: row.completed,
    }
}

pub fn pet_from_row(row: PetRow, history: Vec<HistoryEntry>, reminders: Vec<Reminder>) -> Pet {
    Pet {
        id: row.id,
        name: row.name,
        species: row.species,
        breed: row.breed,
        age: PetAge::parse_lossy(&row.age),
        medical_alerts: row.medical_alerts,
        history,
        reminders,
    }
}

pub fn owner_from_row(row: OwnerRow, pets: Vec<Pet>) -> Owner {
    Owner {
        id: row.id,
        name: row.name,
        email: row.email,
        phone: row.phone,
        address: row.address,
        pets,
    }
}

/// Load everything belonging to one clinic into a [`ClinicState`]. Owners
/// come back newest-first, history newest entry date first; pets and
/// reminders keep their creation order. Missing children are empty vectors.
pub async fn load_clinic(
    store: &dyn ClinicStore,
    vet_id: Uuid,
) -> Result<ClinicState, DatabaseError> {
    let owner_rows = store.list_owners(vet_id).await?;
    let owner_ids: Vec<Uuid> = owner_rows.iter().map(|o| o.id).collect();

    let pet_rows = store.list_pets(&owner_ids).await?;
    let pet_ids: Vec<Uuid> = pet_rows.iter().map(|p| p.id).collect();

    let history_rows = store.list_history(&pet_ids).await?;
    let reminder_rows = store.list_reminders(&pet_ids).await?;

    let mut history_by_pet: HashMap<Uuid, Vec<HistoryEntry>> = HashMap::new();
    for row in history_rows {
        history_by_pet.entry(row.pet_id).or_default().push(history_from_row(row));
    }

    let mut reminders_by_pet: HashMap<Uuid, Vec<Reminder>> = HashMap::new();
    for row in reminder_rows {
        reminders_by_pet.entry(row.pet_id).or_default().push(reminder_from_row(row));
    }

    let mut pets_by_owner: HashMap<Uuid, Vec<Pet>> = HashMap::new();
    for row in pet_rows {
        let owner_id = row.owner_id;
        let history = history_by_pet.remove(&row.id).unwrap_or_default();
        let reminders = reminders_by_pet.remove(&row.id).unwrap_or_default();
        pets_by_owner
            .entry(owner_id)
            .or_default()
            .push(pet_from_row(row, history, reminders));
    }

    let owners = owner_rows
        .into_iter()
        .map(|row| {
            let pets = pets_by_owner.remove(&row.id).unwrap_or_default();
            owner_from_row(row, pets)
        })
        .collect();

    Ok(ClinicState::new(owners))
}
