//! Medication types.
//!
//! [`Medication`] is the persisted row a gateway stores for a patient. [`MedicationIntakeItem`]
//! is the per-day view of it that screen snapshots carry: the same identity plus a taken flag
//! that only lives in memory for the current screen.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of a medication, assigned by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationId(i64);

impl MedicationId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MedicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MedicationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// One scheduled medication on a dashboard.
///
/// Fields are private: an item is never edited in place. Flipping the taken flag produces a
/// new item via [`MedicationIntakeItem::toggled`], and the identity cannot change at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationIntakeItem {
    id: MedicationId,
    name: String,
    time: String,
    taken: bool,
}

impl MedicationIntakeItem {
    /// Creates an item that has not been taken yet.
    pub fn new(id: MedicationId, name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            time: time.into(),
            taken: false,
        }
    }

    /// Returns a copy with the given taken flag.
    pub fn with_taken(&self, taken: bool) -> Self {
        Self {
            taken,
            ..self.clone()
        }
    }

    /// Returns a copy with the taken flag inverted.
    pub fn toggled(&self) -> Self {
        self.with_taken(!self.taken)
    }

    pub fn id(&self) -> MedicationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn taken(&self) -> bool {
        self.taken
    }
}

/// A medication as stored by a gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub owner: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Time of day shown on the dashboard, e.g. "08:00".
    pub scheduled_time: String,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    /// Dashboard view of this medication. The display name includes the dosage when known.
    pub fn intake_item(&self) -> MedicationIntakeItem {
        let name = match &self.dosage {
            Some(dosage) if !dosage.trim().is_empty() => format!("{} {}", self.name, dosage.trim()),
            _ => self.name.clone(),
        };
        MedicationIntakeItem::new(self.id, name, self.scheduled_time.clone())
    }
}

/// Input for adding a medication through a gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewMedication {
    pub owner: UserId,
    pub name: adherence_types::NonEmptyText,
    pub scheduled_time: adherence_types::NonEmptyText,
    pub description: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl NewMedication {
    /// Minimal medication with only a name and a scheduled time.
    pub fn new(
        owner: UserId,
        name: adherence_types::NonEmptyText,
        scheduled_time: adherence_types::NonEmptyText,
    ) -> Self {
        Self {
            owner,
            name,
            scheduled_time,
            description: None,
            dosage: None,
            frequency: None,
            start_date: None,
            end_date: None,
        }
    }
}
