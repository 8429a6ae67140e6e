//! Caregiver dashboard: today's medications for one patient and how many have been taken.

use crate::clock::DateLabelSource;
use crate::gateway::PersistenceGateway;
use crate::medication::{MedicationId, MedicationIntakeItem};
use crate::reducer;
use crate::snapshot::UiSnapshot;
use crate::store::{ScreenModel, Store};
use crate::UserId;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaregiverEvent {
    /// Flip the taken flag of one medication.
    ToggleTaken(MedicationId),
    /// The caregiver asked to contact the patient's doctor. Handled by the front-end.
    ContactAction,
    /// Re-stamp the date label. The medication list is left alone.
    Refresh,
    /// Re-read medications from the gateway, keeping taken flags for ids that survive.
    Reload,
}

pub struct CaregiverModel {
    gateway: Arc<dyn PersistenceGateway>,
    owner: UserId,
    labels: Arc<dyn DateLabelSource>,
}

pub type CaregiverStore = Store<CaregiverModel>;

impl CaregiverModel {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        owner: UserId,
        labels: Arc<dyn DateLabelSource>,
    ) -> Self {
        Self {
            gateway,
            owner,
            labels,
        }
    }

    async fn load_items(&self) -> Result<Vec<MedicationIntakeItem>, String> {
        match self.gateway.load_medications(self.owner).await {
            Ok(medications) => Ok(medications.iter().map(|m| m.intake_item()).collect()),
            Err(e) => {
                tracing::warn!(owner = %self.owner, error = %e, "failed to load medications");
                Err(format!("Could not load medications: {}", e))
            }
        }
    }

    /// Snapshot over `items` with any duplicate-id warning in the error field.
    fn fresh_snapshot(&self, items: Vec<MedicationIntakeItem>) -> UiSnapshot {
        let warning = reducer::duplicate_warning(&items);
        if let Some(warning) = &warning {
            tracing::warn!(owner = %self.owner, "{}", warning);
        }
        UiSnapshot::new(self.labels.today_label(), items).with_error(warning)
    }
}

#[async_trait]
impl ScreenModel for CaregiverModel {
    type Snapshot = UiSnapshot;
    type Event = CaregiverEvent;
    const NAME: &'static str = "caregiver";

    fn initial(&self) -> UiSnapshot {
        UiSnapshot::loading(self.labels.today_label())
    }

    async fn seed(&self, _placeholder: &UiSnapshot) -> UiSnapshot {
        match self.load_items().await {
            Ok(items) => self.fresh_snapshot(items),
            Err(message) => {
                UiSnapshot::new(self.labels.today_label(), Vec::new()).with_error(Some(message))
            }
        }
    }

    fn pending(&self, current: &UiSnapshot, event: &CaregiverEvent) -> Option<UiSnapshot> {
        match event {
            CaregiverEvent::Reload => Some(UiSnapshot {
                is_loading: true,
                ..current.clone()
            }),
            _ => None,
        }
    }

    async fn handle(&self, current: &UiSnapshot, event: CaregiverEvent) -> UiSnapshot {
        match event {
            CaregiverEvent::ToggleTaken(id) => {
                reducer::recompute_progress(reducer::toggle(current, id))
            }
            CaregiverEvent::ContactAction => {
                tracing::info!(owner = %self.owner, "contact action requested");
                current.clone()
            }
            CaregiverEvent::Refresh => reducer::restamp(current, self.labels.today_label()),
            CaregiverEvent::Reload => match self.load_items().await {
                Ok(fresh) => self.fresh_snapshot(reducer::carry_taken(current.items(), fresh)),
                Err(message) => current.clone().with_error(Some(message)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedDateLabel;
    use crate::gateway::InMemoryGateway;
    use crate::medication::Medication;
    use crate::store::Lifecycle;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const OWNER: UserId = UserId::new(1);

    fn medication(id: i64, name: &str, time: &str) -> Medication {
        Medication {
            id: MedicationId::new(id),
            owner: OWNER,
            name: name.into(),
            description: None,
            dosage: None,
            frequency: None,
            start_date: None,
            end_date: None,
            status: None,
            scheduled_time: time.into(),
            created_at: Utc::now(),
        }
    }

    async fn gateway_with(ids: &[i64]) -> Arc<InMemoryGateway> {
        let gateway = Arc::new(InMemoryGateway::new());
        for &id in ids {
            gateway
                .push_medication(medication(id, &format!("Medication {id}"), "08:00"))
                .await;
        }
        gateway
    }

    fn store_over(gateway: Arc<InMemoryGateway>) -> CaregiverStore {
        let labels = Arc::new(FixedDateLabel("Mon, Jan 1".into()));
        Store::new(CaregiverModel::new(gateway, OWNER, labels), 16)
    }

    async fn toggle(store: &CaregiverStore, id: i64) -> Arc<UiSnapshot> {
        store
            .dispatch(CaregiverEvent::ToggleTaken(MedicationId::new(id)))
            .await;
        store.flush().await;
        store.current()
    }

    /// Returns "day 1", "day 2", ... on successive calls.
    struct CountingLabel(AtomicUsize);

    impl DateLabelSource for CountingLabel {
        fn today_label(&self) -> String {
            format!("day {}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_loading() {
        let model = CaregiverModel::new(
            Arc::new(InMemoryGateway::new()),
            OWNER,
            Arc::new(FixedDateLabel("Mon, Jan 1".into())),
        );
        let placeholder = model.initial();
        assert!(placeholder.is_loading());
        assert!(placeholder.items().is_empty());
        assert_eq!(placeholder.date_label(), "Mon, Jan 1");
    }

    #[tokio::test]
    async fn test_three_item_dashboard() {
        let store = store_over(gateway_with(&[1, 2, 3]).await);
        store.flush().await;

        let s0 = store.current();
        assert_eq!(store.lifecycle(), Lifecycle::Ready);
        assert!(!s0.is_loading());
        assert_eq!(s0.total(), 3);
        assert_eq!(s0.progress_percent(), 0);

        assert_eq!(toggle(&store, 1).await.progress_percent(), 33);
        assert_eq!(toggle(&store, 2).await.progress_percent(), 66);
        let s3 = toggle(&store, 1).await;
        assert_eq!(s3.progress_percent(), 33);
        assert!(!s3.item(MedicationId::new(1)).unwrap().taken());
        assert!(s3.item(MedicationId::new(2)).unwrap().taken());
    }

    #[tokio::test]
    async fn test_empty_dashboard_has_zero_progress() {
        let store = store_over(gateway_with(&[]).await);
        store.flush().await;
        assert_eq!(store.current().progress_percent(), 0);
        assert_eq!(store.current().error(), None);
    }

    #[tokio::test]
    async fn test_unknown_id_does_not_notify() {
        let store = store_over(gateway_with(&[1, 2]).await);
        store.flush().await;
        let before = store.current();
        let mut subscription = store.subscribe();

        let after = toggle(&store, 42).await;
        assert_eq!(*after, *before);
        let woke = tokio::time::timeout(Duration::from_millis(50), subscription.next()).await;
        assert!(woke.is_err(), "no snapshot should be published for an unknown id");
    }

    #[tokio::test]
    async fn test_duplicate_ids_warn_and_toggle_last_match() {
        let store = store_over(gateway_with(&[5, 6, 5]).await);
        store.flush().await;
        assert_eq!(
            store.current().error(),
            Some("duplicate medication ids: 5")
        );

        let next = toggle(&store, 5).await;
        let flags: Vec<bool> = next.items().iter().map(|i| i.taken()).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert_eq!(next.progress_percent(), 33);
    }

    #[tokio::test]
    async fn test_seed_failure_keeps_store_usable() {
        let gateway = gateway_with(&[1, 2]).await;
        gateway.set_unavailable(true);
        let store = store_over(gateway.clone());
        store.flush().await;

        let failed = store.current();
        assert!(!failed.is_loading());
        assert!(failed.items().is_empty());
        assert!(failed.error().unwrap().contains("Could not load medications"));
        assert_eq!(store.lifecycle(), Lifecycle::Ready);

        gateway.set_unavailable(false);
        store.dispatch(CaregiverEvent::Reload).await;
        store.flush().await;
        let recovered = store.current();
        assert_eq!(recovered.total(), 2);
        assert_eq!(recovered.error(), None);
    }

    #[tokio::test]
    async fn test_reload_keeps_taken_flags_and_picks_up_changes() {
        let gateway = gateway_with(&[1, 2]).await;
        let store = store_over(gateway.clone());
        store.flush().await;
        toggle(&store, 1).await;

        gateway.remove_medication(MedicationId::new(2)).await.unwrap();
        gateway.push_medication(medication(3, "Medication 3", "20:00")).await;
        store.dispatch(CaregiverEvent::Reload).await;
        store.flush().await;

        let snapshot = store.current();
        let ids: Vec<i64> = snapshot.items().iter().map(|i| i.id().get()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(snapshot.item(MedicationId::new(1)).unwrap().taken());
        assert_eq!(snapshot.progress_percent(), 50);
    }

    #[tokio::test]
    async fn test_reload_failure_retains_previous_items() {
        let gateway = gateway_with(&[1, 2]).await;
        let store = store_over(gateway.clone());
        store.flush().await;
        toggle(&store, 2).await;

        gateway.set_unavailable(true);
        store.dispatch(CaregiverEvent::Reload).await;
        store.flush().await;

        let snapshot = store.current();
        assert_eq!(snapshot.total(), 2);
        assert_eq!(snapshot.progress_percent(), 50);
        assert!(snapshot.error().is_some());
        assert!(!snapshot.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_restamps_label_only() {
        let gateway = gateway_with(&[1, 2]).await;
        let labels = Arc::new(CountingLabel(AtomicUsize::new(0)));
        let store = Store::new(CaregiverModel::new(gateway, OWNER, labels), 16);
        store.flush().await;
        let before = toggle(&store, 1).await;

        store.dispatch(CaregiverEvent::Refresh).await;
        store.flush().await;
        let after = store.current();

        assert_ne!(after.date_label(), before.date_label());
        assert_eq!(after.items(), before.items());
        assert_eq!(after.progress_percent(), 50);
    }

    #[tokio::test]
    async fn test_contact_action_leaves_state_alone() {
        let store = store_over(gateway_with(&[1]).await);
        store.flush().await;
        let before = store.current();
        store.dispatch(CaregiverEvent::ContactAction).await;
        store.flush().await;
        assert_eq!(*store.current(), *before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_toggles_are_serialised() {
        let ids: Vec<i64> = (1..=20).collect();
        let store = Arc::new(store_over(gateway_with(&ids).await));

        let mut tasks = Vec::new();
        for id in ids {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .dispatch(CaregiverEvent::ToggleTaken(MedicationId::new(id)))
                    .await;
            }));
        }
        for task in tasks {
            task.await.expect("dispatch task should not panic");
        }
        store.flush().await;

        let snapshot = store.current();
        assert_eq!(snapshot.taken_count(), 20);
        assert_eq!(snapshot.progress_percent(), 100);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_latest() {
        let store = store_over(gateway_with(&[1, 2, 3, 4]).await);
        toggle(&store, 1).await;
        toggle(&store, 2).await;

        let subscription = store.subscribe();
        assert_eq!(subscription.initial().progress_percent(), 50);
    }
}
