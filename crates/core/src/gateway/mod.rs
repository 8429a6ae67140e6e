//! Persistence seam between screen models and wherever the data lives.
//!
//! Screen models only ever see `Arc<dyn PersistenceGateway>`. Two implementations are
//! provided:
//! - [`InMemoryGateway`] for tests and demos, with switchable failure injection
//! - [`JsonFileGateway`] which keeps one JSON document under the configured data directory
//!
//! Both share the same record-keeping rules (id allocation, credential checks, uniqueness of
//! usernames and emails) through an internal document type.

mod document;
mod json_file;
mod memory;

pub use json_file::JsonFileGateway;
pub use memory::InMemoryGateway;

use crate::history::{HistoryIntake, NewIntake};
use crate::medication::{Medication, MedicationId, NewMedication};
use crate::user::{NewUser, RegisterOutcome, User};
use crate::{AdherenceResult, UserId};
use async_trait::async_trait;

/// Storage operations used by the screen models.
///
/// Every method may fail with an [`AdherenceError`](crate::AdherenceError); callers decide
/// how to surface it. Implementations must be safe to share between tasks.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Medications belonging to `owner`, in insertion order.
    async fn load_medications(&self, owner: UserId) -> AdherenceResult<Vec<Medication>>;

    /// Stores a medication and returns it with its assigned id.
    async fn add_medication(&self, new: NewMedication) -> AdherenceResult<Medication>;

    /// Returns `false` if no medication had that id.
    async fn remove_medication(&self, id: MedicationId) -> AdherenceResult<bool>;

    /// Returns the user only when both the username and the password match.
    async fn login(&self, username: &str, password: &str) -> AdherenceResult<Option<User>>;

    /// Creates an account unless the username or the email is already taken.
    async fn register(&self, new: NewUser) -> AdherenceResult<RegisterOutcome>;

    async fn find_user(&self, id: UserId) -> AdherenceResult<Option<User>>;

    /// Overwrites the stored account with the same id.
    ///
    /// # Errors
    ///
    /// Returns `AdherenceError::UnknownUser` if there is no such account and
    /// `AdherenceError::InvalidInput` if the new username or email belongs to someone else.
    async fn update_user(&self, user: User) -> AdherenceResult<()>;

    /// Intake history for `owner`, in the order it was recorded.
    async fn load_history(&self, owner: UserId) -> AdherenceResult<Vec<HistoryIntake>>;

    async fn record_intake(&self, new: NewIntake) -> AdherenceResult<HistoryIntake>;

    async fn dark_mode(&self) -> AdherenceResult<bool>;

    async fn set_dark_mode(&self, enabled: bool) -> AdherenceResult<()>;
}
