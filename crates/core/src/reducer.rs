//! Pure transitions for the caregiver dashboard.
//!
//! Nothing here performs I/O or touches shared state. Each function takes a snapshot by
//! reference or by value and returns a new one; screen models compose them inside their
//! event handlers.

use crate::medication::{MedicationId, MedicationIntakeItem};
use crate::snapshot::UiSnapshot;
use std::collections::HashMap;

/// `floor(100 * taken / total)`, or 0 for an empty collection.
///
/// Duplicate ids are not collapsed: every entry counts on its own.
pub fn progress_percent(items: &[MedicationIntakeItem]) -> u8 {
    let total = items.len();
    if total == 0 {
        return 0;
    }
    let taken = items.iter().filter(|item| item.taken()).count();
    // taken <= total, so the quotient is at most 100
    (100 * taken / total) as u8
}

/// Inverts the taken flag of the item identified by `id`.
///
/// Only the last matching item is flipped when ids repeat. An unknown id yields a snapshot
/// equal to the input. The derived progress is left as-is; follow with
/// [`recompute_progress`].
pub fn toggle(snapshot: &UiSnapshot, id: MedicationId) -> UiSnapshot {
    let mut next = snapshot.clone();
    if let Some(index) = next.items.iter().rposition(|item| item.id() == id) {
        next.items[index] = next.items[index].toggled();
    }
    next
}

/// Recomputes every derived field from the collection. Idempotent.
pub fn recompute_progress(snapshot: UiSnapshot) -> UiSnapshot {
    let progress_percent = progress_percent(&snapshot.items);
    UiSnapshot {
        progress_percent,
        ..snapshot
    }
}

/// Replaces the date label and recomputes derived fields, leaving the collection untouched.
pub fn restamp(snapshot: &UiSnapshot, date_label: String) -> UiSnapshot {
    recompute_progress(UiSnapshot {
        date_label,
        ..snapshot.clone()
    })
}

/// Ids that occur more than once, in order of first appearance.
pub fn duplicate_ids(items: &[MedicationIntakeItem]) -> Vec<MedicationId> {
    let mut seen: HashMap<MedicationId, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for item in items {
        let count = seen.entry(item.id()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(item.id());
        }
    }
    duplicates
}

/// Data-quality warning for a collection with repeated ids, if any.
pub fn duplicate_warning(items: &[MedicationIntakeItem]) -> Option<String> {
    let duplicates = duplicate_ids(items);
    if duplicates.is_empty() {
        return None;
    }
    let ids = duplicates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("duplicate medication ids: {}", ids))
}

/// Carries taken flags from `previous` over to a freshly loaded collection.
///
/// Items are matched by id; items that are new in `fresh` stay not taken and items that
/// disappeared are dropped.
pub fn carry_taken(
    previous: &[MedicationIntakeItem],
    fresh: Vec<MedicationIntakeItem>,
) -> Vec<MedicationIntakeItem> {
    // later entries overwrite earlier ones, matching the last-match toggle rule
    let taken: HashMap<MedicationId, bool> =
        previous.iter().map(|item| (item.id(), item.taken())).collect();

    fresh
        .into_iter()
        .map(|item| match taken.get(&item.id()) {
            Some(&flag) => item.with_taken(flag),
            None => item,
        })
        .collect()
}
