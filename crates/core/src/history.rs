//! Past medication intakes shown on the history screen.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntakeStatus {
    Taken,
    Missed,
    Skipped,
}

impl std::fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Taken => write!(f, "taken"),
            Self::Missed => write!(f, "missed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

impl std::str::FromStr for IntakeStatus {
    type Err = crate::AdherenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "taken" => Ok(Self::Taken),
            "missed" => Ok(Self::Missed),
            "skipped" => Ok(Self::Skipped),
            other => Err(crate::AdherenceError::InvalidInput(format!(
                "unknown intake status '{}' (expected taken, missed or skipped)",
                other
            ))),
        }
    }
}

/// One row of the history list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryIntake {
    pub id: i64,
    pub owner: UserId,
    pub patient_name: String,
    pub medication_name: String,
    pub status: IntakeStatus,
    /// Human readable moment, e.g. "Today, 08:10".
    pub when_text: String,
    pub recorded_at: DateTime<Utc>,
}

/// Input for recording an intake through a gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewIntake {
    pub owner: UserId,
    pub patient_name: String,
    pub medication_name: adherence_types::NonEmptyText,
    pub status: IntakeStatus,
    pub when_text: String,
    pub recorded_at: DateTime<Utc>,
}
