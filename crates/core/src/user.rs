//! User accounts and credentials.

use crate::constants::PASSWORD_SALT_LEN;
use crate::{AdherenceError, AdherenceResult};
use adherence_types::{EmailAddress, NonEmptyText};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable identity of a user account, assigned by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Which flow a user lands in after logging in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Patient,
    Caregiver,
}

impl UserRole {
    pub fn from_patient_flag(patient: bool) -> Self {
        if patient {
            Self::Patient
        } else {
            Self::Caregiver
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patient => write!(f, "patient"),
            Self::Caregiver => write!(f, "caregiver"),
        }
    }
}

/// Salted SHA-256 digest of a password.
///
/// The salt is kept as hex and hashed as text ahead of the password bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordDigest {
    salt: String,
    digest: String,
}

impl PasswordDigest {
    /// Hashes `password` with a fresh random salt.
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; PASSWORD_SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = hex::encode(salt);
        let digest = Self::hash(&salt, password);
        Self { salt, digest }
    }

    /// Returns true if `password` hashes to the stored digest.
    pub fn verify(&self, password: &str) -> bool {
        Self::hash(&self.salt, password) == self.digest
    }

    fn hash(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A registered account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: NonEmptyText,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub email: EmailAddress,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub patient: bool,
    pub password: PasswordDigest,
}

impl User {
    pub fn role(&self) -> UserRole {
        UserRole::from_patient_flag(self.patient)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration input, validated on construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub username: NonEmptyText,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub email: EmailAddress,
    pub patient: bool,
    password: String,
}

impl NewUser {
    /// Validates raw form input.
    ///
    /// # Errors
    ///
    /// Returns `AdherenceError::Text` for blank names or a malformed email and
    /// `AdherenceError::InvalidInput` for an empty password.
    pub fn new(
        username: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        patient: bool,
    ) -> AdherenceResult<Self> {
        if password.is_empty() {
            return Err(AdherenceError::InvalidInput("password cannot be empty".into()));
        }

        Ok(Self {
            username: NonEmptyText::new(username)?,
            first_name: NonEmptyText::new(first_name)?,
            last_name: NonEmptyText::new(last_name)?,
            email: EmailAddress::parse(email)?,
            patient,
            password: password.to_owned(),
        })
    }

    /// Builds the stored account, hashing the password.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            password: PasswordDigest::new(&self.password),
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: None,
            patient: self.patient,
        }
    }
}

/// Result of a registration attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(User),
    /// The username or the email is already taken.
    AlreadyExists,
}
