//! Mutation handlers for the dashboard. Every handler follows the same
//! two-phase contract: exactly one store write, and only after that write
//! succeeds, the equivalent patch of the in-memory [`ClinicState`]. A failed
//! write leaves the state untouched; there is nothing to roll back.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{
    ClinicStore, HistoryPatch, NewHistory, NewOwner, NewPet, NewReminder, OwnerPatch, PetPatch,
    ReminderPatch,
};

use super::aggregate::{history_from_row, owner_from_row, pet_from_row, reminder_from_row};
use super::dates;
use super::state::ClinicState;
use super::types::{HistoryEntry, HistoryType, Owner, Pet, PetAge, Reminder, ReminderType};

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

fn require(value: &str, field: &str) -> Result<String, MutationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MutationError::Validation(format!("'{}' is required", field)));
    }
    Ok(trimmed.to_string())
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate, MutationError> {
    dates::parse_display(value).map_err(|e| MutationError::Validation(e.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct AddOwnerInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOwnerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddPetInput {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: PetAge,
    #[serde(default)]
    pub medical_alerts: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePetInput {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<PetAge>,
    pub medical_alerts: Option<String>,
}

/// Dates arrive in the `dd/mm/yyyy` display convention and are converted to
/// ISO before anything touches the store.
#[derive(Debug, Deserialize)]
pub struct AddHistoryInput {
    pub date: String,
    #[serde(rename = "type")]
    pub entry_type: HistoryType,
    pub description: String,
    pub veterinarian: String,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHistoryInput {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: Option<HistoryType>,
    pub description: Option<String>,
    pub veterinarian: Option<String>,
    pub weight: Option<f64>,
}

fn default_reminder_type() -> ReminderType {
    ReminderType::Control
}

#[derive(Debug, Deserialize)]
pub struct AddReminderInput {
    pub date: String,
    #[serde(rename = "type", default = "default_reminder_type")]
    pub reminder_type: ReminderType,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReminderInput {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub reminder_type: Option<ReminderType>,
    pub description: Option<String>,
}

/// Create an owner under the clinic and prepend it (with an empty pet list)
/// to the state.
pub async fn add_owner(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    vet_id: Uuid,
    input: AddOwnerInput,
) -> Result<Owner, MutationError> {
    let name = require(&input.name, "name")?;
    let phone = require(&input.phone, "phone")?;

    let row = store
        .insert_owner(NewOwner {
            vet_id,
            name,
            phone,
            email: input.email.filter(|s| !s.trim().is_empty()),
            address: input.address.filter(|s| !s.trim().is_empty()),
        })
        .await?;

    let owner = owner_from_row(row, vec![]);
    state.prepend_owner(owner.clone());
    Ok(owner)
}

pub async fn update_owner(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    owner_id: Uuid,
    input: UpdateOwnerInput,
) -> Result<Owner, MutationError> {
    // Scope to the caller's clinic: the owner must be in the loaded tree
    if state.owner_mut(owner_id).is_none() {
        return Err(MutationError::NotFound("owner"));
    }

    let row = store
        .update_owner(
            owner_id,
            OwnerPatch {
                name: input.name,
                email: input.email,
                phone: input.phone,
                address: input.address,
            },
        )
        .await?;

    let owner = state.owner_mut(owner_id).expect("checked above");
    owner.name = row.name;
    owner.email = row.email;
    owner.phone = row.phone;
    owner.address = row.address;
    Ok(owner.clone())
}

/// Create a pet under an owner and append it (with empty history/reminder
/// lists) to that owner.
pub async fn add_pet(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    owner_id: Uuid,
    input: AddPetInput,
) -> Result<Pet, MutationError> {
    if state.owner_mut(owner_id).is_none() {
        return Err(MutationError::NotFound("owner"));
    }
    let name = require(&input.name, "name")?;
    let species = require(&input.species, "species")?;
    let breed = require(&input.breed, "breed")?;

    let row = store
        .insert_pet(NewPet {
            owner_id,
            name,
            species,
            breed,
            age: input.age.to_storage(),
            medical_alerts: input.medical_alerts.filter(|s| !s.trim().is_empty()),
        })
        .await?;

    let pet = pet_from_row(row, vec![], vec![]);
    state.append_pet(owner_id, pet.clone());
    Ok(pet)
}

pub async fn update_pet(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    pet_id: Uuid,
    input: UpdatePetInput,
) -> Result<Pet, MutationError> {
    if state.pet_mut(pet_id).is_none() {
        return Err(MutationError::NotFound("pet"));
    }

    let row = store
        .update_pet(
            pet_id,
            PetPatch {
                name: input.name,
                species: input.species,
                breed: input.breed,
                age: input.age.map(|a| a.to_storage()),
                medical_alerts: input.medical_alerts,
            },
        )
        .await?;

    let pet = state.pet_mut(pet_id).expect("checked above");
    pet.name = row.name;
    pet.species = row.species;
    pet.breed = row.breed;
    pet.age = PetAge::parse_lossy(&row.age);
    pet.medical_alerts = row.medical_alerts;
    Ok(pet.clone())
}

pub async fn add_history(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    pet_id: Uuid,
    input: AddHistoryInput,
) -> Result<HistoryEntry, MutationError> {
    if state.pet_mut(pet_id).is_none() {
        return Err(MutationError::NotFound("pet"));
    }
    let date = parse_date(&input.date)?;
    let description = require(&input.description, "description")?;
    let veterinarian = require(&input.veterinarian, "veterinarian")?;

    let row = store
        .insert_history(NewHistory {
            pet_id,
            history_date: date,
            entry_type: input.entry_type.label().to_string(),
            description,
            veterinarian,
            weight: input.weight,
        })
        .await?;

    let entry = history_from_row(row);
    state.upsert_history(pet_id, entry.clone());
    Ok(entry)
}

pub async fn update_history(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    history_id: Uuid,
    input: UpdateHistoryInput,
) -> Result<HistoryEntry, MutationError> {
    if !state.contains_history(history_id) {
        return Err(MutationError::NotFound("history entry"));
    }
    let date = input.date.as_deref().map(parse_date).transpose()?;

    let row = store
        .update_history(
            history_id,
            HistoryPatch {
                history_date: date,
                entry_type: input.entry_type.map(|t| t.label().to_string()),
                description: input.description,
                veterinarian: input.veterinarian,
                weight: input.weight,
            },
        )
        .await?;

    let pet_id = row.pet_id;
    let entry = history_from_row(row);
    state.upsert_history(pet_id, entry.clone());
    Ok(entry)
}

pub async fn add_reminder(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    pet_id: Uuid,
    input: AddReminderInput,
) -> Result<Reminder, MutationError> {
    if state.pet_mut(pet_id).is_none() {
        return Err(MutationError::NotFound("pet"));
    }
    let date = parse_date(&input.date)?;
    let description = require(&input.description, "description")?;

    let row = store
        .insert_reminder(NewReminder {
            pet_id,
            reminder_date: date,
            reminder_type: input.reminder_type.label().to_string(),
            description,
        })
        .await?;

    let reminder = reminder_from_row(row);
    state.upsert_reminder(pet_id, reminder.clone());
    Ok(reminder)
}

pub async fn update_reminder(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    reminder_id: Uuid,
    input: UpdateReminderInput,
) -> Result<Reminder, MutationError> {
    if !state.contains_reminder(reminder_id) {
        return Err(MutationError::NotFound("reminder"));
    }
    let date = input.date.as_deref().map(parse_date).transpose()?;

    let row = store
        .update_reminder(
            reminder_id,
            ReminderPatch {
                reminder_date: date,
                reminder_type: input.reminder_type.map(|t| t.label().to_string()),
                description: input.description,
            },
        )
        .await?;

    let pet_id = row.pet_id;
    let reminder = reminder_from_row(row);
    state.upsert_reminder(pet_id, reminder.clone());
    Ok(reminder)
}

/// Flip one reminder to completed. Idempotent: marking an already-completed
/// reminder succeeds and leaves it completed.
pub async fn mark_reminder_done(
    store: &dyn ClinicStore,
    state: &mut ClinicState,
    reminder_id: Uuid,
) -> Result<(), MutationError> {
    if !state.contains_reminder(reminder_id) {
        return Err(MutationError::NotFound("reminder"));
    }

    store.mark_reminder_done(reminder_id).await?;
    state.mark_reminder_done(reminder_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::aggregate::load_clinic;
    use crate::database::store::NewVet;
    use crate::testing::MemoryStore;

    async fn clinic_with_state(store: &MemoryStore) -> (Uuid, ClinicState) {
        let vet = store
            .insert_vet(NewVet {
                user_id: Uuid::new_v4(),
                clinic_name: "Clínica Veterinaria Barea".to_string(),
                doctor_name: "Dr. Barea".to_string(),
                email: "contact@clinicabarea.com".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        let state = load_clinic(store, vet.id).await.unwrap();
        (vet.id, state)
    }

    #[tokio::test]
    async fn add_owner_requires_name_and_phone() {
        let store = MemoryStore::new();
        let (vet_id, mut state) = clinic_with_state(&store).await;

        let result = add_owner(
            &store,
            &mut state,
            vet_id,
            AddOwnerInput {
                name: "  ".to_string(),
                phone: "+51999".to_string(),
                email: None,
                address: None,
            },
        )
        .await;

        assert!(matches!(result, Err(MutationError::Validation(_))));
        assert!(state.owners.is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_state_untouched() {
        let store = MemoryStore::new();
        let (vet_id, mut state) = clinic_with_state(&store).await;
        let before = state.owners.clone();

        store.fail_next();
        let result = add_owner(
            &store,
            &mut state,
            vet_id,
            AddOwnerInput {
                name: "Carlos Ramírez".to_string(),
                phone: "+51 999 999 999".to_string(),
                email: None,
                address: None,
            },
        )
        .await;

        assert!(matches!(result, Err(MutationError::Store(_))));
        assert_eq!(state.owners, before);
    }

    #[tokio::test]
    async fn update_reminder_cannot_unset_completed() {
        // ReminderPatch carries no completed field; this pins the contract
        let patch = ReminderPatch::default();
        assert!(patch.reminder_date.is_none());
        assert!(patch.reminder_type.is_none());
        assert!(patch.description.is_none());
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let store = MemoryStore::new();
        let (vet_id, mut state) = clinic_with_state(&store).await;

        // Add owner
        let owner = add_owner(
            &store,
            &mut state,
            vet_id,
            AddOwnerInput {
                name: "Carlos Ramírez".to_string(),
                phone: "+51 999 999 999".to_string(),
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();
        assert!(owner.pets.is_empty());

        // Add pet under that owner
        let pet = add_pet(
            &store,
            &mut state,
            owner.id,
            AddPetInput {
                name: "Max".to_string(),
                species: "Perro".to_string(),
                breed: "Labrador".to_string(),
                age: PetAge::years(3),
                medical_alerts: None,
            },
        )
        .await
        .unwrap();

        // Add history and reminder under Max
        add_history(
            &store,
            &mut state,
            pet.id,
            AddHistoryInput {
                date: "15/10/2025".to_string(),
                entry_type: HistoryType::Vacunacion,
                description: "Vacuna antirrábica".to_string(),
                veterinarian: "Dr. García".to_string(),
                weight: None,
            },
        )
        .await
        .unwrap();

        let reminder = add_reminder(
            &store,
            &mut state,
            pet.id,
            AddReminderInput {
                date: "01/11/2025".to_string(),
                reminder_type: ReminderType::Control,
                description: "Control post-vacuna".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(!reminder.completed);

        // A fresh aggregation sees exactly what the patched state sees
        let reloaded = load_clinic(&store, vet_id).await.unwrap();
        assert_eq!(reloaded.owners.len(), 1);
        assert_eq!(reloaded.owners[0].pets.len(), 1);
        let max = &reloaded.owners[0].pets[0];
        assert_eq!(max.history.len(), 1);
        assert_eq!(max.history[0].entry_type, HistoryType::Vacunacion);
        assert_eq!(max.reminders.len(), 1);
        assert!(!max.reminders[0].completed);
        assert_eq!(state.owners, reloaded.owners);

        // Mark the reminder done, twice (idempotent)
        mark_reminder_done(&store, &mut state, reminder.id).await.unwrap();
        mark_reminder_done(&store, &mut state, reminder.id).await.unwrap();
        let done = &state.owners[0].pets[0].reminders[0];
        assert!(done.completed);
        assert_eq!(done.description, "Control post-vacuna");
        assert_eq!(crate::clinic::dates::format_display(done.date), "01/11/2025");

        // Storage agrees
        let reloaded = load_clinic(&store, vet_id).await.unwrap();
        assert!(reloaded.owners[0].pets[0].reminders[0].completed);
    }

    #[tokio::test]
    async fn history_date_converts_to_iso_for_storage() {
        let store = MemoryStore::new();
        let (vet_id, mut state) = clinic_with_state(&store).await;
        let owner = add_owner(
            &store,
            &mut state,
            vet_id,
            AddOwnerInput {
                name: "Ana García".to_string(),
                phone: "+51888".to_string(),
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();
        let pet = add_pet(
            &store,
            &mut state,
            owner.id,
            AddPetInput {
                name: "Luna".to_string(),
                species: "Gato".to_string(),
                breed: "Siamés".to_string(),
                age: PetAge::months(4),
                medical_alerts: None,
            },
        )
        .await
        .unwrap();

        add_history(
            &store,
            &mut state,
            pet.id,
            AddHistoryInput {
                date: "05/06/2025".to_string(),
                entry_type: HistoryType::Consulta,
                description: "Chequeo dental".to_string(),
                veterinarian: "Dr. Martínez".to_string(),
                weight: Some(3.2),
            },
        )
        .await
        .unwrap();

        let rows = store.list_history(&[pet.id]).await.unwrap();
        assert_eq!(crate::clinic::dates::format_iso(rows[0].history_date), "2025-06-05");
    }

    #[tokio::test]
    async fn bad_display_date_is_rejected_before_any_write() {
        let store = MemoryStore::new();
        let (vet_id, mut state) = clinic_with_state(&store).await;
        let owner = add_owner(
            &store,
            &mut state,
            vet_id,
            AddOwnerInput {
                name: "Ana García".to_string(),
                phone: "+51888".to_string(),
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();
        let pet = add_pet(
            &store,
            &mut state,
            owner.id,
            AddPetInput {
                name: "Luna".to_string(),
                species: "Gato".to_string(),
                breed: "Siamés".to_string(),
                age: PetAge::years(2),
                medical_alerts: None,
            },
        )
        .await
        .unwrap();

        let result = add_reminder(
            &store,
            &mut state,
            pet.id,
            AddReminderInput {
                date: "2025-11-01".to_string(), // ISO where display is expected
                reminder_type: ReminderType::Control,
                description: "Control".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(MutationError::Validation(_))));
        assert!(store.list_reminders(&[pet.id]).await.unwrap().is_empty());
        assert!(state.owners[0].pets[0].reminders.is_empty());
    }

    #[tokio::test]
    async fn update_pet_merges_only_provided_fields_and_age_round_trips() {
        let store = MemoryStore::new();
        let (vet_id, mut state) = clinic_with_state(&store).await;
        let owner = add_owner(
            &store,
            &mut state,
            vet_id,
            AddOwnerInput {
                name: "Carlos Ramírez".to_string(),
                phone: "+51999".to_string(),
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();
        let pet = add_pet(
            &store,
            &mut state,
            owner.id,
            AddPetInput {
                name: "Max".to_string(),
                species: "Perro".to_string(),
                breed: "Labrador".to_string(),
                age: PetAge::years(3),
                medical_alerts: None,
            },
        )
        .await
        .unwrap();

        let updated = update_pet(
            &store,
            &mut state,
            pet.id,
            UpdatePetInput {
                age: Some(PetAge::months(4)),
                medical_alerts: Some("Alergia a penicilina".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Max");
        assert_eq!(updated.breed, "Labrador");
        assert_eq!(updated.age, PetAge::months(4));
        assert_eq!(updated.medical_alerts.as_deref(), Some("Alergia a penicilina"));

        // Storage kept canonical text and it parses back identically
        let rows = store.list_pets(&[owner.id]).await.unwrap();
        assert_eq!(rows[0].age, "4 meses");
        assert_eq!(PetAge::parse_lossy(&rows[0].age), PetAge::months(4));
    }

    #[tokio::test]
    async fn mutations_against_foreign_entities_are_refused() {
        let store = MemoryStore::new();
        let (_vet_a, mut state_a) = clinic_with_state(&store).await;
        let (vet_b, mut state_b) = clinic_with_state(&store).await;

        let foreign_owner = add_owner(
            &store,
            &mut state_b,
            vet_b,
            AddOwnerInput {
                name: "Ana García".to_string(),
                phone: "+51888".to_string(),
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();

        // Clinic A's state does not contain clinic B's owner
        let result = update_owner(
            &store,
            &mut state_a,
            foreign_owner.id,
            UpdateOwnerInput { name: Some("Hacked".to_string()), ..Default::default() },
        )
        .await;
        assert!(matches!(result, Err(MutationError::NotFound(_))));
    }
}
