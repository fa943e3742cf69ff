//! Clinic domain: the nested owner/pet data model, aggregation from flat
//! rows, local search, and the two-phase mutation handlers.

pub mod aggregate;
pub mod dates;
pub mod mutations;
pub mod search;
pub mod state;
pub mod types;

pub use aggregate::load_clinic;
pub use search::filter_owners;
pub use state::{ClinicState, PendingReminder, PetWeightChart, WeightPoint};
pub use types::{HistoryEntry, HistoryType, Owner, Pet, PetAge, Reminder, ReminderType, VetProfile};
