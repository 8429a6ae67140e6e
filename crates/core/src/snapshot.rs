//! The caregiver dashboard snapshot.

use crate::medication::{MedicationId, MedicationIntakeItem};
use crate::reducer;
use serde::Serialize;

/// Everything the caregiver dashboard needs to render, at one point in time.
///
/// Fields are only writable inside the crate so `progress_percent` can never disagree with
/// `items`: every constructor and reducer recomputes it from the collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UiSnapshot {
    pub(crate) date_label: String,
    pub(crate) items: Vec<MedicationIntakeItem>,
    pub(crate) progress_percent: u8,
    pub(crate) is_loading: bool,
    pub(crate) error: Option<String>,
}

impl UiSnapshot {
    /// A fully computed snapshot over `items`.
    pub fn new(date_label: impl Into<String>, items: Vec<MedicationIntakeItem>) -> Self {
        let progress_percent = reducer::progress_percent(&items);
        Self {
            date_label: date_label.into(),
            items,
            progress_percent,
            is_loading: false,
            error: None,
        }
    }

    /// Placeholder published before the first load completes.
    pub fn loading(date_label: impl Into<String>) -> Self {
        Self {
            is_loading: true,
            ..Self::new(date_label, Vec::new())
        }
    }

    pub fn with_error(self, error: Option<String>) -> Self {
        Self { error, ..self }
    }

    pub fn date_label(&self) -> &str {
        &self.date_label
    }

    pub fn items(&self) -> &[MedicationIntakeItem] {
        &self.items
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn taken_count(&self) -> usize {
        self.items.iter().filter(|item| item.taken()).count()
    }

    /// The item a toggle for `id` would act on (the last one, if ids repeat).
    pub fn item(&self, id: MedicationId) -> Option<&MedicationIntakeItem> {
        self.items.iter().rev().find(|item| item.id() == id)
    }
}
