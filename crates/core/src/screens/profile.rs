//! Profile screen: view and edit the signed-in user's details.

use crate::gateway::PersistenceGateway;
use crate::store::{ScreenModel, Store};
use crate::user::User;
use crate::{AdherenceResult, UserId};
use adherence_types::{EmailAddress, NonEmptyText};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub is_loading: bool,
    pub user: Option<User>,
    pub error: Option<String>,
}

/// Editable profile fields as typed into the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Blank clears the stored number.
    pub phone_number: String,
}

impl ProfileUpdate {
    /// Produces the updated account, or a validation error.
    fn apply_to(&self, user: &User) -> AdherenceResult<User> {
        let phone = self.phone_number.trim();
        Ok(User {
            first_name: NonEmptyText::new(&self.first_name)?,
            last_name: NonEmptyText::new(&self.last_name)?,
            email: EmailAddress::parse(&self.email)?,
            phone_number: (!phone.is_empty()).then(|| phone.to_owned()),
            ..user.clone()
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileEvent {
    Reload,
    Update(ProfileUpdate),
}

pub struct ProfileModel {
    gateway: Arc<dyn PersistenceGateway>,
    user_id: UserId,
}

pub type ProfileStore = Store<ProfileModel>;

impl ProfileModel {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, user_id: UserId) -> Self {
        Self { gateway, user_id }
    }

    async fn load(&self, current: &ProfileSnapshot) -> ProfileSnapshot {
        let error = match self.gateway.find_user(self.user_id).await {
            Ok(Some(user)) => {
                return ProfileSnapshot {
                    is_loading: false,
                    user: Some(user),
                    error: None,
                };
            }
            Ok(None) => format!("No account with id {}", self.user_id),
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, error = %e, "failed to load profile");
                format!("Could not load profile: {}", e)
            }
        };
        ProfileSnapshot {
            is_loading: false,
            error: Some(error),
            ..current.clone()
        }
    }

    async fn update(&self, current: &ProfileSnapshot, update: ProfileUpdate) -> ProfileSnapshot {
        let with_error = |error: String| ProfileSnapshot {
            error: Some(error),
            ..current.clone()
        };

        let Some(user) = &current.user else {
            return with_error("Profile is not loaded yet".to_owned());
        };
        let updated = match update.apply_to(user) {
            Ok(updated) => updated,
            Err(e) => return with_error(e.to_string()),
        };

        match self.gateway.update_user(updated.clone()).await {
            Ok(()) => {
                tracing::info!(user_id = %self.user_id, "profile updated");
                ProfileSnapshot {
                    is_loading: false,
                    user: Some(updated),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, error = %e, "failed to update profile");
                with_error(format!("Could not save profile: {}", e))
            }
        }
    }
}

#[async_trait]
impl ScreenModel for ProfileModel {
    type Snapshot = ProfileSnapshot;
    type Event = ProfileEvent;
    const NAME: &'static str = "profile";

    fn initial(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            is_loading: true,
            user: None,
            error: None,
        }
    }

    async fn seed(&self, placeholder: &ProfileSnapshot) -> ProfileSnapshot {
        self.load(placeholder).await
    }

    async fn handle(&self, current: &ProfileSnapshot, event: ProfileEvent) -> ProfileSnapshot {
        match event {
            ProfileEvent::Reload => self.load(current).await,
            ProfileEvent::Update(update) => self.update(current, update).await,
        }
    }
}
