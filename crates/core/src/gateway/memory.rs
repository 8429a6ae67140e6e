//! In-process gateway.

use super::document::Document;
use super::PersistenceGateway;
use crate::history::{HistoryIntake, NewIntake};
use crate::medication::{Medication, MedicationId, NewMedication};
use crate::user::{NewUser, RegisterOutcome, User};
use crate::{AdherenceError, AdherenceResult, UserId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Keeps everything in memory. Nothing survives the process.
///
/// [`InMemoryGateway::set_unavailable`] makes every call fail with
/// `AdherenceError::Unavailable` until it is switched back, which lets tests exercise the
/// error paths of the screen models.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    doc: RwLock<Document>,
    unavailable: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inserts a medication row verbatim, including its id.
    ///
    /// Unlike [`PersistenceGateway::add_medication`] this can create repeated ids, which the
    /// dashboard has to tolerate when reading data written by other tools.
    pub async fn push_medication(&self, medication: Medication) {
        self.doc.write().await.push_medication(medication);
    }

    fn check(&self) -> AdherenceResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AdherenceError::Unavailable("in-memory gateway switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn load_medications(&self, owner: UserId) -> AdherenceResult<Vec<Medication>> {
        self.check()?;
        Ok(self.doc.read().await.medications_for(owner))
    }

    async fn add_medication(&self, new: NewMedication) -> AdherenceResult<Medication> {
        self.check()?;
        Ok(self.doc.write().await.add_medication(new))
    }

    async fn remove_medication(&self, id: MedicationId) -> AdherenceResult<bool> {
        self.check()?;
        Ok(self.doc.write().await.remove_medication(id))
    }

    async fn login(&self, username: &str, password: &str) -> AdherenceResult<Option<User>> {
        self.check()?;
        Ok(self.doc.read().await.login(username, password))
    }

    async fn register(&self, new: NewUser) -> AdherenceResult<RegisterOutcome> {
        self.check()?;
        Ok(self.doc.write().await.register(new))
    }

    async fn find_user(&self, id: UserId) -> AdherenceResult<Option<User>> {
        self.check()?;
        Ok(self.doc.read().await.find_user(id))
    }

    async fn update_user(&self, user: User) -> AdherenceResult<()> {
        self.check()?;
        self.doc.write().await.update_user(user)
    }

    async fn load_history(&self, owner: UserId) -> AdherenceResult<Vec<HistoryIntake>> {
        self.check()?;
        Ok(self.doc.read().await.history_for(owner))
    }

    async fn record_intake(&self, new: NewIntake) -> AdherenceResult<HistoryIntake> {
        self.check()?;
        Ok(self.doc.write().await.record_intake(new))
    }

    async fn dark_mode(&self) -> AdherenceResult<bool> {
        self.check()?;
        Ok(self.doc.read().await.dark_mode())
    }

    async fn set_dark_mode(&self, enabled: bool) -> AdherenceResult<()> {
        self.check()?;
        self.doc.write().await.set_dark_mode(enabled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adherence_types::NonEmptyText;

    #[tokio::test]
    async fn test_unavailable_gateway_fails_every_call() {
        let gateway = InMemoryGateway::new();
        gateway.set_unavailable(true);

        let err = gateway
            .load_medications(UserId::new(1))
            .await
            .expect_err("switched-off gateway should fail");
        assert!(matches!(err, AdherenceError::Unavailable(_)));
        assert!(gateway.dark_mode().await.is_err());

        gateway.set_unavailable(false);
        assert!(gateway.load_medications(UserId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_then_load_medication() {
        let gateway = InMemoryGateway::new();
        let owner = UserId::new(3);
        let added = gateway
            .add_medication(NewMedication::new(
                owner,
                NonEmptyText::new("Aspirin").unwrap(),
                NonEmptyText::new("08:00").unwrap(),
            ))
            .await
            .unwrap();

        let loaded = gateway.load_medications(owner).await.unwrap();
        assert_eq!(loaded, vec![added]);
    }

    #[tokio::test]
    async fn test_dark_mode_defaults_off() {
        let gateway = InMemoryGateway::new();
        assert!(!gateway.dark_mode().await.unwrap());
        gateway.set_dark_mode(true).await.unwrap();
        assert!(gateway.dark_mode().await.unwrap());
    }
}
