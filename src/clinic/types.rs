//! Domain types for the clinic dashboard: the nested owner tree and the
//! category/age vocabularies shared by the store boundary and the API.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::dates;

/// Category vocabulary for medical-history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryType {
    Consulta,
    #[serde(rename = "Vacunación")]
    Vacunacion,
    #[serde(rename = "Cirugía")]
    Cirugia,
    #[serde(rename = "Desparasitación")]
    Desparasitacion,
    #[serde(rename = "Análisis")]
    Analisis,
    Otro,
    #[serde(rename = "Baño")]
    Bano,
}

impl HistoryType {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryType::Consulta => "Consulta",
            HistoryType::Vacunacion => "Vacunación",
            HistoryType::Cirugia => "Cirugía",
            HistoryType::Desparasitacion => "Desparasitación",
            HistoryType::Analisis => "Análisis",
            HistoryType::Otro => "Otro",
            HistoryType::Bano => "Baño",
        }
    }

    /// Strict parse for API input.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Consulta" => Some(HistoryType::Consulta),
            "Vacunación" => Some(HistoryType::Vacunacion),
            "Cirugía" => Some(HistoryType::Cirugia),
            "Desparasitación" => Some(HistoryType::Desparasitacion),
            "Análisis" => Some(HistoryType::Analisis),
            "Otro" => Some(HistoryType::Otro),
            "Baño" => Some(HistoryType::Bano),
            _ => None,
        }
    }

    /// Lenient parse for stored rows written by older clients.
    pub fn from_label_lossy(label: &str) -> Self {
        Self::from_label(label).unwrap_or(HistoryType::Otro)
    }
}

impl fmt::Display for HistoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reminder categories: the history vocabulary plus "Control".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderType {
    Consulta,
    #[serde(rename = "Vacunación")]
    Vacunacion,
    #[serde(rename = "Cirugía")]
    Cirugia,
    #[serde(rename = "Desparasitación")]
    Desparasitacion,
    #[serde(rename = "Análisis")]
    Analisis,
    Otro,
    #[serde(rename = "Baño")]
    Bano,
    Control,
}

impl ReminderType {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderType::Consulta => "Consulta",
            ReminderType::Vacunacion => "Vacunación",
            ReminderType::Cirugia => "Cirugía",
            ReminderType::Desparasitacion => "Desparasitación",
            ReminderType::Analisis => "Análisis",
            ReminderType::Otro => "Otro",
            ReminderType::Bano => "Baño",
            ReminderType::Control => "Control",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Consulta" => Some(ReminderType::Consulta),
            "Vacunación" => Some(ReminderType::Vacunacion),
            "Cirugía" => Some(ReminderType::Cirugia),
            "Desparasitación" => Some(ReminderType::Desparasitacion),
            "Análisis" => Some(ReminderType::Analisis),
            "Otro" => Some(ReminderType::Otro),
            "Baño" => Some(ReminderType::Bano),
            "Control" => Some(ReminderType::Control),
            _ => None,
        }
    }

    pub fn from_label_lossy(label: &str) -> Self {
        Self::from_label(label).unwrap_or(ReminderType::Otro)
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeUnit {
    Years,
    Months,
}

#[derive(Debug, Error)]
#[error("Invalid age '{0}', expected a number of years or e.g. \"4 meses\"")]
pub struct AgeParseError(String);

/// Canonical pet age. The source data mixed bare numbers ("3") with
/// unit-suffixed text ("4 meses"); this is the single representation both
/// collapse into. Stored as the canonical Spanish text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PetAge {
    pub amount: u32,
    pub unit: AgeUnit,
}

impl PetAge {
    pub fn years(amount: u32) -> Self {
        Self { amount, unit: AgeUnit::Years }
    }

    pub fn months(amount: u32) -> Self {
        Self { amount, unit: AgeUnit::Months }
    }

    /// Lenient parse for stored rows: leading integer plus an optional unit
    /// keyword, anything unrecognized defaults to years. Rows with no
    /// leading digits come back as zero years rather than failing the load.
    pub fn parse_lossy(raw: &str) -> Self {
        let trimmed = raw.trim();
        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        let amount = digits.parse().unwrap_or(0);
        let rest = trimmed[digits.len()..].trim().to_lowercase();
        if matches!(rest.as_str(), "mes" | "meses" | "month" | "months" | "m") {
            Self::months(amount)
        } else {
            Self::years(amount)
        }
    }

    /// Canonical storage/display text, e.g. "3 años", "1 mes".
    pub fn to_storage(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PetAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.unit, self.amount) {
            (AgeUnit::Years, 1) => write!(f, "1 año"),
            (AgeUnit::Years, n) => write!(f, "{} años", n),
            (AgeUnit::Months, 1) => write!(f, "1 mes"),
            (AgeUnit::Months, n) => write!(f, "{} meses", n),
        }
    }
}

impl FromStr for PetAge {
    type Err = AgeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(AgeParseError(raw.to_string()));
        }
        let amount: u32 = digits.parse().map_err(|_| AgeParseError(raw.to_string()))?;
        let rest = trimmed[digits.len()..].trim().to_lowercase();
        match rest.as_str() {
            "" | "año" | "años" | "ano" | "anos" | "year" | "years" | "y" => Ok(Self::years(amount)),
            "mes" | "meses" | "month" | "months" | "m" => Ok(Self::months(amount)),
            _ => Err(AgeParseError(raw.to_string())),
        }
    }
}

// Forms may submit a bare number (years), a unit-suffixed string, or the
// tagged object; all three deserialize into the canonical value.
impl<'de> Deserialize<'de> for PetAge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum AgeInput {
            Tagged { amount: u32, unit: AgeUnit },
            Number(u32),
            Text(String),
        }

        match AgeInput::deserialize(deserializer)? {
            AgeInput::Tagged { amount, unit } => Ok(PetAge { amount, unit }),
            AgeInput::Number(years) => Ok(PetAge::years(years)),
            AgeInput::Text(raw) => raw.parse().map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VetProfile {
    pub id: Uuid,
    pub clinic_name: String,
    pub doctor_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(with = "dates::serde_display")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: HistoryType,
    pub description: String,
    pub veterinarian: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    #[serde(with = "dates::serde_display")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub description: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: PetAge,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_alerts: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub reminders: Vec<Reminder>,
}

impl Pet {
    /// Weight measurements from history entries, oldest first, for charting.
    pub fn weight_series(&self) -> Vec<(NaiveDate, f64)> {
        let mut points: Vec<(NaiveDate, f64)> = self
            .history
            .iter()
            .filter_map(|h| h.weight.map(|w| (h.date, w)))
            .collect();
        points.sort_by_key(|(date, _)| *date);
        points
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub pets: Vec<Pet>,
}
