//! The in-memory mirror of one clinic's data: the nested owner tree the
//! dashboard renders from. Mutation handlers patch this structure only after
//! the corresponding store write has succeeded, so it never runs ahead of
//! storage within a session.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::types::{HistoryEntry, Owner, Pet, Reminder, ReminderType};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClinicState {
    pub owners: Vec<Owner>,
}

/// An uncompleted reminder with its ancestry, for the upcoming-appointments
/// widget.
#[derive(Debug, Clone, Serialize)]
pub struct PendingReminder {
    pub owner_id: Uuid,
    pub owner_name: String,
    pub pet_id: Uuid,
    pub pet_name: String,
    #[serde(with = "super::dates::serde_display")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub description: String,
    pub reminder_id: Uuid,
}

/// One weight measurement for the chart, in display-date form.
#[derive(Debug, Clone, Serialize)]
pub struct WeightPoint {
    #[serde(with = "super::dates::serde_display")]
    pub date: NaiveDate,
    pub weight: f64,
}

/// A pet's weight measurements over time, oldest first, for the
/// weight-chart widget. Pets with no weighed entries are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct PetWeightChart {
    pub pet_id: Uuid,
    pub pet_name: String,
    pub points: Vec<WeightPoint>,
}

impl ClinicState {
    pub fn new(owners: Vec<Owner>) -> Self {
        Self { owners }
    }

    /// New owners show up at the top of the list.
    pub fn prepend_owner(&mut self, owner: Owner) {
        self.owners.insert(0, owner);
    }

    pub fn owner_mut(&mut self, owner_id: Uuid) -> Option<&mut Owner> {
        self.owners.iter_mut().find(|o| o.id == owner_id)
    }

    pub fn pet_mut(&mut self, pet_id: Uuid) -> Option<&mut Pet> {
        self.owners
            .iter_mut()
            .flat_map(|o| o.pets.iter_mut())
            .find(|p| p.id == pet_id)
    }

    pub fn contains_history(&self, history_id: Uuid) -> bool {
        self.owners
            .iter()
            .flat_map(|o| o.pets.iter())
            .flat_map(|p| p.history.iter())
            .any(|h| h.id == history_id)
    }

    pub fn contains_reminder(&self, reminder_id: Uuid) -> bool {
        self.owners
            .iter()
            .flat_map(|o| o.pets.iter())
            .flat_map(|p| p.reminders.iter())
            .any(|r| r.id == reminder_id)
    }

    pub fn append_pet(&mut self, owner_id: Uuid, pet: Pet) -> bool {
        match self.owner_mut(owner_id) {
            Some(owner) => {
                owner.pets.push(pet);
                true
            }
            None => false,
        }
    }

    /// Replace the entry with the same id, or append. Display re-sorts by
    /// date; insertion order here is not a contract.
    pub fn upsert_history(&mut self, pet_id: Uuid, entry: HistoryEntry) -> bool {
        match self.pet_mut(pet_id) {
            Some(pet) => {
                if let Some(existing) = pet.history.iter_mut().find(|h| h.id == entry.id) {
                    *existing = entry;
                } else {
                    pet.history.push(entry);
                }
                true
            }
            None => false,
        }
    }

    pub fn upsert_reminder(&mut self, pet_id: Uuid, reminder: Reminder) -> bool {
        match self.pet_mut(pet_id) {
            Some(pet) => {
                if let Some(existing) = pet.reminders.iter_mut().find(|r| r.id == reminder.id) {
                    *existing = reminder;
                } else {
                    pet.reminders.push(reminder);
                }
                true
            }
            None => false,
        }
    }

    /// Flip one reminder to completed, wherever it lives in the tree. The
    /// caller only knows the reminder id, not its owner/pet ancestry.
    pub fn mark_reminder_done(&mut self, reminder_id: Uuid) -> bool {
        for owner in &mut self.owners {
            for pet in &mut owner.pets {
                for reminder in &mut pet.reminders {
                    if reminder.id == reminder_id {
                        reminder.completed = true;
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Uncompleted reminders across the clinic, soonest first.
    pub fn pending_reminders(&self) -> Vec<PendingReminder> {
        let mut pending: Vec<PendingReminder> = self
            .owners
            .iter()
            .flat_map(|owner| {
                owner.pets.iter().flat_map(move |pet| {
                    pet.reminders
                        .iter()
                        .filter(|r| !r.completed)
                        .map(move |r| PendingReminder {
                            owner_id: owner.id,
                            owner_name: owner.name.clone(),
                            pet_id: pet.id,
                            pet_name: pet.name.clone(),
                            date: r.date,
                            reminder_type: r.reminder_type,
                            description: r.description.clone(),
                            reminder_id: r.id,
                        })
                })
            })
            .collect();
        pending.sort_by_key(|p| p.date);
        pending
    }

    /// Weight charts for every pet that has at least one weighed history
    /// entry.
    pub fn weight_charts(&self) -> Vec<PetWeightChart> {
        self.owners
            .iter()
            .flat_map(|owner| owner.pets.iter())
            .filter_map(|pet| {
                let points: Vec<WeightPoint> = pet
                    .weight_series()
                    .into_iter()
                    .map(|(date, weight)| WeightPoint { date, weight })
                    .collect();
                if points.is_empty() {
                    return None;
                }
                Some(PetWeightChart {
                    pet_id: pet.id,
                    pet_name: pet.name.clone(),
                    points,
                })
            })
            .collect()
    }
}
