//! Screen models, one per screen of the application.
//!
//! Each model plugs into the generic [`Store`](crate::store::Store) and folds gateway failures
//! into its snapshot's `error` field.

pub mod caregiver;
pub mod history;
pub mod login;
pub mod profile;
pub mod settings;

pub use caregiver::{CaregiverEvent, CaregiverModel, CaregiverStore};
pub use history::{HistoryEvent, HistoryModel, HistorySnapshot, HistoryStore};
pub use login::{LoginEvent, LoginModel, LoginSnapshot, LoginStore, Registration, Session};
pub use profile::{ProfileEvent, ProfileModel, ProfileSnapshot, ProfileStore, ProfileUpdate};
pub use settings::{SettingsEvent, SettingsModel, SettingsSnapshot, SettingsStore};
