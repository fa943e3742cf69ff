pub mod auth;
pub mod dashboard;
pub mod data;
pub mod profile;
mod utils;
