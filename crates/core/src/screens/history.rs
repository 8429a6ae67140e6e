//! Intake history list with an optional status filter.

use crate::gateway::PersistenceGateway;
use crate::history::{HistoryIntake, IntakeStatus};
use crate::store::{ScreenModel, Store};
use crate::UserId;
use async_trait::async_trait;
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HistorySnapshot {
    pub is_loading: bool,
    pub entries: Vec<HistoryIntake>,
    pub filter: Option<IntakeStatus>,
    pub error: Option<String>,
}

impl HistorySnapshot {
    /// Entries that pass the filter, newest first.
    pub fn visible(&self) -> Vec<&HistoryIntake> {
        let mut visible: Vec<&HistoryIntake> = self
            .entries
            .iter()
            .filter(|entry| self.filter.is_none_or(|status| entry.status == status))
            .collect();
        visible.sort_by_key(|entry| Reverse((entry.recorded_at, entry.id)));
        visible
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryEvent {
    Reload,
    /// `None` shows every entry.
    Filter(Option<IntakeStatus>),
}

pub struct HistoryModel {
    gateway: Arc<dyn PersistenceGateway>,
    owner: UserId,
}

pub type HistoryStore = Store<HistoryModel>;

impl HistoryModel {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, owner: UserId) -> Self {
        Self { gateway, owner }
    }

    async fn load(&self, current: &HistorySnapshot) -> HistorySnapshot {
        match self.gateway.load_history(self.owner).await {
            Ok(entries) => HistorySnapshot {
                is_loading: false,
                entries,
                filter: current.filter,
                error: None,
            },
            Err(e) => {
                tracing::warn!(owner = %self.owner, error = %e, "failed to load history");
                HistorySnapshot {
                    is_loading: false,
                    error: Some(format!("Could not load history: {}", e)),
                    ..current.clone()
                }
            }
        }
    }
}

#[async_trait]
impl ScreenModel for HistoryModel {
    type Snapshot = HistorySnapshot;
    type Event = HistoryEvent;
    const NAME: &'static str = "history";

    fn initial(&self) -> HistorySnapshot {
        HistorySnapshot {
            is_loading: true,
            ..HistorySnapshot::default()
        }
    }

    async fn seed(&self, placeholder: &HistorySnapshot) -> HistorySnapshot {
        self.load(placeholder).await
    }

    async fn handle(&self, current: &HistorySnapshot, event: HistoryEvent) -> HistorySnapshot {
        match event {
            HistoryEvent::Reload => self.load(current).await,
            HistoryEvent::Filter(filter) => HistorySnapshot {
                filter,
                ..current.clone()
            },
        }
    }
}
