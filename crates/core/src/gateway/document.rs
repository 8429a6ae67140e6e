//! The record set both gateways operate on.

use crate::history::{HistoryIntake, NewIntake};
use crate::medication::{Medication, MedicationId, NewMedication};
use crate::user::{NewUser, RegisterOutcome, User};
use crate::{AdherenceError, AdherenceResult, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Preferences {
    pub(crate) dark_mode: bool,
}

/// Everything a gateway stores. Serialised as-is by [`super::JsonFileGateway`].
///
/// Id counters hold the last id handed out, so a fresh document starts at 1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Document {
    users: Vec<User>,
    medications: Vec<Medication>,
    history: Vec<HistoryIntake>,
    preferences: Preferences,
    last_user_id: i64,
    last_medication_id: i64,
    last_intake_id: i64,
}

impl Document {
    pub(crate) fn medications_for(&self, owner: UserId) -> Vec<Medication> {
        self.medications
            .iter()
            .filter(|m| m.owner == owner)
            .cloned()
            .collect()
    }

    pub(crate) fn add_medication(&mut self, new: NewMedication) -> Medication {
        self.last_medication_id += 1;
        let medication = Medication {
            id: MedicationId::new(self.last_medication_id),
            owner: new.owner,
            name: new.name.into_inner(),
            description: new.description,
            dosage: new.dosage,
            frequency: new.frequency,
            start_date: new.start_date,
            end_date: new.end_date,
            status: None,
            scheduled_time: new.scheduled_time.into_inner(),
            created_at: Utc::now(),
        };
        self.medications.push(medication.clone());
        medication
    }

    /// Appends a row exactly as given, id included. Does not touch the id counter beyond
    /// keeping it ahead of the inserted id.
    pub(crate) fn push_medication(&mut self, medication: Medication) {
        self.last_medication_id = self.last_medication_id.max(medication.id.get());
        self.medications.push(medication);
    }

    pub(crate) fn remove_medication(&mut self, id: MedicationId) -> bool {
        let before = self.medications.len();
        self.medications.retain(|m| m.id != id);
        self.medications.len() != before
    }

    pub(crate) fn login(&self, username: &str, password: &str) -> Option<User> {
        let username = username.trim();
        self.users
            .iter()
            .find(|u| u.username.as_str() == username && u.password.verify(password))
            .cloned()
    }

    pub(crate) fn register(&mut self, new: NewUser) -> RegisterOutcome {
        let taken = self
            .users
            .iter()
            .any(|u| u.username == new.username || u.email == new.email);
        if taken {
            return RegisterOutcome::AlreadyExists;
        }

        self.last_user_id += 1;
        let user = new.into_user(UserId::new(self.last_user_id));
        self.users.push(user.clone());
        RegisterOutcome::Created(user)
    }

    pub(crate) fn find_user(&self, id: UserId) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    pub(crate) fn update_user(&mut self, user: User) -> AdherenceResult<()> {
        let clash = self
            .users
            .iter()
            .any(|u| u.id != user.id && (u.username == user.username || u.email == user.email));
        if clash {
            return Err(AdherenceError::InvalidInput(
                "username or email already belongs to another account".into(),
            ));
        }

        let slot = self
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AdherenceError::UnknownUser(user.id))?;
        *slot = user;
        Ok(())
    }

    pub(crate) fn history_for(&self, owner: UserId) -> Vec<HistoryIntake> {
        self.history
            .iter()
            .filter(|h| h.owner == owner)
            .cloned()
            .collect()
    }

    pub(crate) fn record_intake(&mut self, new: NewIntake) -> HistoryIntake {
        self.last_intake_id += 1;
        let intake = HistoryIntake {
            id: self.last_intake_id,
            owner: new.owner,
            patient_name: new.patient_name,
            medication_name: new.medication_name.into_inner(),
            status: new.status,
            when_text: new.when_text,
            recorded_at: new.recorded_at,
        };
        self.history.push(intake.clone());
        intake
    }

    pub(crate) fn dark_mode(&self) -> bool {
        self.preferences.dark_mode
    }

    pub(crate) fn set_dark_mode(&mut self, enabled: bool) {
        self.preferences.dark_mode = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::IntakeStatus;
    use adherence_types::NonEmptyText;

    fn text(value: &str) -> NonEmptyText {
        NonEmptyText::new(value).unwrap()
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser::new(username, "Test", "User", email, "pw", true).unwrap()
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut doc = Document::default();
        let a = doc.add_medication(NewMedication::new(UserId::new(1), text("A"), text("08:00")));
        let b = doc.add_medication(NewMedication::new(UserId::new(1), text("B"), text("09:00")));
        assert_eq!(a.id, MedicationId::new(1));
        assert_eq!(b.id, MedicationId::new(2));
    }

    #[test]
    fn test_medications_are_scoped_to_owner() {
        let mut doc = Document::default();
        doc.add_medication(NewMedication::new(UserId::new(1), text("A"), text("08:00")));
        doc.add_medication(NewMedication::new(UserId::new(2), text("B"), text("08:00")));
        let mine = doc.medications_for(UserId::new(1));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "A");
    }

    #[test]
    fn test_remove_reports_whether_anything_was_removed() {
        let mut doc = Document::default();
        let a = doc.add_medication(NewMedication::new(UserId::new(1), text("A"), text("08:00")));
        assert!(doc.remove_medication(a.id));
        assert!(!doc.remove_medication(a.id));
    }

    #[test]
    fn test_push_medication_keeps_counter_ahead() {
        let mut doc = Document::default();
        let mut row = doc.add_medication(NewMedication::new(UserId::new(1), text("A"), text("08:00")));
        row.id = MedicationId::new(10);
        doc.push_medication(row);
        let next = doc.add_medication(NewMedication::new(UserId::new(1), text("B"), text("08:00")));
        assert_eq!(next.id, MedicationId::new(11));
    }

    #[test]
    fn test_register_rejects_duplicate_username_or_email() {
        let mut doc = Document::default();
        assert!(matches!(
            doc.register(new_user("alex", "alex@example.com")),
            RegisterOutcome::Created(_)
        ));
        assert_eq!(
            doc.register(new_user("alex", "other@example.com")),
            RegisterOutcome::AlreadyExists
        );
        assert_eq!(
            doc.register(new_user("sam", "ALEX@example.com")),
            RegisterOutcome::AlreadyExists
        );
    }

    #[test]
    fn test_login_checks_password() {
        let mut doc = Document::default();
        doc.register(new_user("alex", "alex@example.com"));
        assert!(doc.login("alex", "pw").is_some());
        assert!(doc.login(" alex ", "pw").is_some());
        assert!(doc.login("alex", "wrong").is_none());
        assert!(doc.login("nobody", "pw").is_none());
    }

    #[test]
    fn test_update_user_requires_existing_account_and_unique_email() {
        let mut doc = Document::default();
        let RegisterOutcome::Created(mut alex) = doc.register(new_user("alex", "alex@example.com"))
        else {
            panic!("registration should succeed");
        };
        doc.register(new_user("sam", "sam@example.com"));

        alex.phone_number = Some("555-0100".into());
        doc.update_user(alex.clone()).expect("update should succeed");
        assert_eq!(doc.find_user(alex.id).unwrap().phone_number.as_deref(), Some("555-0100"));

        alex.email = adherence_types::EmailAddress::parse("sam@example.com").unwrap();
        let err = doc.update_user(alex.clone()).expect_err("email clash should fail");
        assert!(matches!(err, AdherenceError::InvalidInput(_)));

        let mut ghost = alex;
        ghost.id = UserId::new(99);
        ghost.username = text("ghost");
        ghost.email = adherence_types::EmailAddress::parse("ghost@example.com").unwrap();
        let err = doc.update_user(ghost).expect_err("unknown user should fail");
        assert!(matches!(err, AdherenceError::UnknownUser(id) if id == UserId::new(99)));
    }

    #[test]
    fn test_record_intake_assigns_ids() {
        let mut doc = Document::default();
        let intake = doc.record_intake(NewIntake {
            owner: UserId::new(1),
            patient_name: "Alex".into(),
            medication_name: text("Metformin"),
            status: IntakeStatus::Taken,
            when_text: "Today, 08:10".into(),
            recorded_at: Utc::now(),
        });
        assert_eq!(intake.id, 1);
        assert_eq!(doc.history_for(UserId::new(1)), vec![intake]);
        assert!(doc.history_for(UserId::new(2)).is_empty());
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, Document::default());
        assert!(!doc.dark_mode());
    }
}
