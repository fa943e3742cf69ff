//! Date handling for the dashboard.
//!
//! Forms and API payloads use the Spanish display convention `dd/mm/yyyy`;
//! the store keeps ISO `yyyy-mm-dd` (a SQL DATE). The two representations
//! must round-trip exactly for every valid calendar date.

use chrono::NaiveDate;
use thiserror::Error;

const DISPLAY_FORMAT: &str = "%d/%m/%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum DateError {
    #[error("Invalid date '{0}', expected dd/mm/yyyy")]
    InvalidDisplayDate(String),

    #[error("Invalid stored date '{0}', expected yyyy-mm-dd")]
    InvalidIsoDate(String),
}

/// Parse a `dd/mm/yyyy` form value. Rejects impossible calendar dates.
pub fn parse_display(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value.trim(), DISPLAY_FORMAT)
        .map_err(|_| DateError::InvalidDisplayDate(value.to_string()))
}

pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn parse_iso(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
        .map_err(|_| DateError::InvalidIsoDate(value.to_string()))
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Serde adapter so domain types carry `NaiveDate` internally while the
/// JSON surface speaks `dd/mm/yyyy`.
pub mod serde_display {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_display(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_display(&raw).map_err(de::Error::custom)
    }
}
