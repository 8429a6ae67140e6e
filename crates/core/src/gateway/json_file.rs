//! File-backed gateway.
//!
//! The whole record set is one pretty-printed JSON document, `adherence.json`, inside the
//! configured data directory. It is read once when the gateway opens and rewritten after
//! every change: the new content goes to `adherence.json.tmp` first and is then renamed over
//! the old file, so a crash mid-write leaves the previous document intact.
//!
//! Writers are serialised through an async `RwLock`. A failed write leaves both the file and
//! the in-memory copy as they were.

use super::document::Document;
use super::PersistenceGateway;
use crate::config::CoreConfig;
use crate::history::{HistoryIntake, NewIntake};
use crate::medication::{Medication, MedicationId, NewMedication};
use crate::user::{NewUser, RegisterOutcome, User};
use crate::{AdherenceError, AdherenceResult, UserId};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct JsonFileGateway {
    store_file: PathBuf,
    tmp_file: PathBuf,
    doc: RwLock<Document>,
}

impl JsonFileGateway {
    /// Opens (or creates) the store under `cfg.data_dir()`.
    ///
    /// A missing file is treated as an empty store; nothing is written until the first change.
    ///
    /// # Errors
    ///
    /// Returns an `AdherenceError` if:
    /// - the data directory cannot be created (`DataDirCreation`),
    /// - the existing file cannot be read (`FileRead`),
    /// - the existing file is not a valid store document (`Deserialization`).
    pub async fn open(cfg: &CoreConfig) -> AdherenceResult<Self> {
        tokio::fs::create_dir_all(cfg.data_dir())
            .await
            .map_err(AdherenceError::DataDirCreation)?;

        let store_file = cfg.store_file();
        let doc = match tokio::fs::read(&store_file).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(AdherenceError::Deserialization)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Document::default(),
            Err(e) => return Err(AdherenceError::FileRead(e)),
        };

        tracing::debug!(path = %store_file.display(), "opened json store");

        Ok(Self {
            store_file,
            tmp_file: cfg.store_tmp_file(),
            doc: RwLock::new(doc),
        })
    }

    pub fn store_file(&self) -> &Path {
        &self.store_file
    }

    /// Applies `change` to a copy of the document, persists the copy and only then installs it.
    async fn mutate<T, F>(&self, change: F) -> AdherenceResult<T>
    where
        F: FnOnce(&mut Document) -> AdherenceResult<T> + Send,
        T: Send,
    {
        let mut doc = self.doc.write().await;
        let mut next = doc.clone();
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *doc = next;
        Ok(out)
    }

    async fn persist(&self, doc: &Document) -> AdherenceResult<()> {
        let json = serde_json::to_vec_pretty(doc).map_err(AdherenceError::Serialization)?;
        tokio::fs::write(&self.tmp_file, json)
            .await
            .map_err(AdherenceError::FileWrite)?;
        tokio::fs::rename(&self.tmp_file, &self.store_file)
            .await
            .map_err(AdherenceError::FileWrite)?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn load_medications(&self, owner: UserId) -> AdherenceResult<Vec<Medication>> {
        Ok(self.doc.read().await.medications_for(owner))
    }

    async fn add_medication(&self, new: NewMedication) -> AdherenceResult<Medication> {
        self.mutate(|doc| Ok(doc.add_medication(new))).await
    }

    async fn remove_medication(&self, id: MedicationId) -> AdherenceResult<bool> {
        self.mutate(|doc| Ok(doc.remove_medication(id))).await
    }

    async fn login(&self, username: &str, password: &str) -> AdherenceResult<Option<User>> {
        Ok(self.doc.read().await.login(username, password))
    }

    async fn register(&self, new: NewUser) -> AdherenceResult<RegisterOutcome> {
        self.mutate(|doc| Ok(doc.register(new))).await
    }

    async fn find_user(&self, id: UserId) -> AdherenceResult<Option<User>> {
        Ok(self.doc.read().await.find_user(id))
    }

    async fn update_user(&self, user: User) -> AdherenceResult<()> {
        self.mutate(|doc| doc.update_user(user)).await
    }

    async fn load_history(&self, owner: UserId) -> AdherenceResult<Vec<HistoryIntake>> {
        Ok(self.doc.read().await.history_for(owner))
    }

    async fn record_intake(&self, new: NewIntake) -> AdherenceResult<HistoryIntake> {
        self.mutate(|doc| Ok(doc.record_intake(new))).await
    }

    async fn dark_mode(&self) -> AdherenceResult<bool> {
        Ok(self.doc.read().await.dark_mode())
    }

    async fn set_dark_mode(&self, enabled: bool) -> AdherenceResult<()> {
        self.mutate(|doc| {
            doc.set_dark_mode(enabled);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_DATE_LABEL_FORMAT, DEFAULT_DISPATCH_QUEUE_CAPACITY};
    use adherence_types::NonEmptyText;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> CoreConfig {
        CoreConfig::new(
            dir.to_path_buf(),
            DEFAULT_DATE_LABEL_FORMAT.into(),
            DEFAULT_DISPATCH_QUEUE_CAPACITY,
        )
        .expect("test config should be valid")
    }

    #[tokio::test]
    async fn test_open_creates_data_dir_without_writing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = config_in(&temp_dir.path().join("nested").join("data"));

        let gateway = JsonFileGateway::open(&cfg).await.expect("open should succeed");
        assert!(cfg.data_dir().is_dir());
        assert!(!gateway.store_file().exists());
    }

    #[tokio::test]
    async fn test_changes_persist_across_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = config_in(temp_dir.path());
        let owner = UserId::new(1);

        {
            let gateway = JsonFileGateway::open(&cfg).await.unwrap();
            gateway
                .add_medication(NewMedication::new(
                    owner,
                    NonEmptyText::new("Metformin").unwrap(),
                    NonEmptyText::new("08:00").unwrap(),
                ))
                .await
                .unwrap();
            gateway.set_dark_mode(true).await.unwrap();
            let user = NewUser::new("alex", "Alex", "A", "alex@example.com", "pw", true).unwrap();
            gateway.register(user).await.unwrap();
        }

        let reopened = JsonFileGateway::open(&cfg).await.unwrap();
        let medications = reopened.load_medications(owner).await.unwrap();
        assert_eq!(medications.len(), 1);
        assert_eq!(medications[0].name, "Metformin");
        assert!(reopened.dark_mode().await.unwrap());
        assert!(reopened.login("alex", "pw").await.unwrap().is_some());
        assert!(!cfg.store_tmp_file().exists(), "temp file should be renamed away");

        let next = reopened
            .add_medication(NewMedication::new(
                owner,
                NonEmptyText::new("Aspirin").unwrap(),
                NonEmptyText::new("20:00").unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(next.id, MedicationId::new(2), "id counter should survive reopen");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = config_in(temp_dir.path());
        std::fs::write(cfg.store_file(), b"not json").unwrap();

        let err = JsonFileGateway::open(&cfg)
            .await
            .expect_err("corrupt store should fail to open");
        assert!(matches!(err, AdherenceError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_untouched() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = config_in(temp_dir.path());
        let gateway = JsonFileGateway::open(&cfg).await.unwrap();

        // a directory where the temp file should go makes the write fail
        std::fs::create_dir(cfg.store_tmp_file()).unwrap();
        let err = gateway
            .set_dark_mode(true)
            .await
            .expect_err("write should fail");
        assert!(matches!(err, AdherenceError::FileWrite(_)));
        assert!(!gateway.dark_mode().await.unwrap());
    }
}
