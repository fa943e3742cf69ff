//! Test support: an in-memory [`ClinicStore`] so domain and router tests run
//! without a database.

pub mod store;

pub use store::MemoryStore;
