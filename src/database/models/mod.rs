pub mod history;
pub mod owner;
pub mod pet;
pub mod reminder;
pub mod user;
pub mod vet;

pub use history::PetHistoryRow;
pub use owner::OwnerRow;
pub use pet::PetRow;
pub use reminder::ReminderRow;
pub use user::UserRow;
pub use vet::VetRow;
