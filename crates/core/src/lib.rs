//! # Adherence Core
//!
//! Core state management for the medication adherence application.
//!
//! This crate contains the data model and the reactive plumbing behind each screen:
//! - Immutable snapshots and pure reducers (progress, toggling, duplicate detection)
//! - A generic single-writer [`Store`] with replay-latest subscriptions
//! - Screen models for the caregiver dashboard, login, settings, profile and history
//! - The [`PersistenceGateway`] seam with in-memory and JSON-file implementations
//!
//! **No presentation concerns**: rendering and input handling belong to the binaries.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod history;
pub mod medication;
pub mod reducer;
pub mod screens;
pub mod snapshot;
pub mod store;
pub mod user;

pub use clock::{DateLabelSource, FixedDateLabel, SystemDateLabel};
pub use config::CoreConfig;
pub use error::{AdherenceError, AdherenceResult};
pub use gateway::{InMemoryGateway, JsonFileGateway, PersistenceGateway};
pub use history::{HistoryIntake, IntakeStatus, NewIntake};
pub use medication::{Medication, MedicationId, MedicationIntakeItem, NewMedication};
pub use snapshot::UiSnapshot;
pub use store::{Lifecycle, ScreenModel, Store, Subscription};
pub use user::{NewUser, RegisterOutcome, User, UserId, UserRole};
