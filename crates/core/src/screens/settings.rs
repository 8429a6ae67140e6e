//! Settings screen: the dark mode preference.

use crate::gateway::PersistenceGateway;
use crate::store::{ScreenModel, Store};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SettingsSnapshot {
    pub dark_mode: bool,
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEvent {
    SetDarkMode(bool),
}

pub struct SettingsModel {
    gateway: Arc<dyn PersistenceGateway>,
}

pub type SettingsStore = Store<SettingsModel>;

impl SettingsModel {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ScreenModel for SettingsModel {
    type Snapshot = SettingsSnapshot;
    type Event = SettingsEvent;
    const NAME: &'static str = "settings";

    /// Dark mode is off until the stored preference has been read.
    fn initial(&self) -> SettingsSnapshot {
        SettingsSnapshot::default()
    }

    async fn seed(&self, placeholder: &SettingsSnapshot) -> SettingsSnapshot {
        match self.gateway.dark_mode().await {
            Ok(dark_mode) => SettingsSnapshot {
                dark_mode,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to read dark mode preference");
                SettingsSnapshot {
                    error: Some(format!("Could not load settings: {}", e)),
                    ..placeholder.clone()
                }
            }
        }
    }

    async fn handle(&self, current: &SettingsSnapshot, event: SettingsEvent) -> SettingsSnapshot {
        match event {
            SettingsEvent::SetDarkMode(enabled) => match self.gateway.set_dark_mode(enabled).await {
                Ok(()) => SettingsSnapshot {
                    dark_mode: enabled,
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(error = %e, enabled, "failed to store dark mode preference");
                    SettingsSnapshot {
                        error: Some(format!("Could not save settings: {}", e)),
                        ..current.clone()
                    }
                }
            },
        }
    }
}
