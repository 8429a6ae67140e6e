//! Login and registration.
//!
//! A successful login or registration opens a [`Session`]; the role decides whether the
//! front-end continues to the patient or the caregiver flow.

use crate::constants::INVALID_CREDENTIALS_MESSAGE;
use crate::gateway::PersistenceGateway;
use crate::store::{ScreenModel, Store};
use crate::user::{NewUser, RegisterOutcome, User, UserRole};
use crate::UserId;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// The signed-in account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.as_str().to_owned(),
            display_name: user.display_name(),
            role: user.role(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoginSnapshot {
    pub is_loading: bool,
    pub session: Option<Session>,
    pub error: Option<String>,
}

/// Raw registration form input. Validated when the event is handled.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub patient: bool,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("patient", &self.patient)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum LoginEvent {
    Login { username: String, password: String },
    Register(Registration),
    Logout,
}

// Events are logged; keep passwords out of the output.
impl std::fmt::Debug for LoginEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Register(registration) => f.debug_tuple("Register").field(registration).finish(),
            Self::Logout => write!(f, "Logout"),
        }
    }
}

pub struct LoginModel {
    gateway: Arc<dyn PersistenceGateway>,
}

pub type LoginStore = Store<LoginModel>;

impl LoginModel {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    async fn login(&self, username: &str, password: &str) -> LoginSnapshot {
        match self.gateway.login(username, password).await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, role = %user.role(), "user logged in");
                signed_in(&user)
            }
            Ok(None) => failed(INVALID_CREDENTIALS_MESSAGE.to_owned()),
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                failed(format!("Could not log in: {}", e))
            }
        }
    }

    async fn register(&self, registration: Registration) -> LoginSnapshot {
        let new_user = match NewUser::new(
            &registration.username,
            &registration.first_name,
            &registration.last_name,
            &registration.email,
            &registration.password,
            registration.patient,
        ) {
            Ok(new_user) => new_user,
            Err(e) => return failed(e.to_string()),
        };

        match self.gateway.register(new_user).await {
            Ok(RegisterOutcome::Created(user)) => {
                tracing::info!(user_id = %user.id, role = %user.role(), "user registered");
                signed_in(&user)
            }
            Ok(RegisterOutcome::AlreadyExists) => {
                failed("An account with that username or email already exists".to_owned())
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                failed(format!("Could not register: {}", e))
            }
        }
    }
}

fn signed_in(user: &User) -> LoginSnapshot {
    LoginSnapshot {
        is_loading: false,
        session: Some(Session::from(user)),
        error: None,
    }
}

fn failed(error: String) -> LoginSnapshot {
    LoginSnapshot {
        is_loading: false,
        session: None,
        error: Some(error),
    }
}

#[async_trait]
impl ScreenModel for LoginModel {
    type Snapshot = LoginSnapshot;
    type Event = LoginEvent;
    const NAME: &'static str = "login";

    fn initial(&self) -> LoginSnapshot {
        LoginSnapshot::default()
    }

    async fn seed(&self, placeholder: &LoginSnapshot) -> LoginSnapshot {
        placeholder.clone()
    }

    fn pending(&self, current: &LoginSnapshot, event: &LoginEvent) -> Option<LoginSnapshot> {
        match event {
            LoginEvent::Login { .. } | LoginEvent::Register(_) => Some(LoginSnapshot {
                is_loading: true,
                error: None,
                ..current.clone()
            }),
            LoginEvent::Logout => None,
        }
    }

    async fn handle(&self, current: &LoginSnapshot, event: LoginEvent) -> LoginSnapshot {
        match event {
            LoginEvent::Login { username, password } => self.login(&username, &password).await,
            LoginEvent::Register(registration) => self.register(registration).await,
            LoginEvent::Logout => {
                if let Some(session) = &current.session {
                    tracing::info!(user_id = %session.user_id, "user logged out");
                }
                LoginSnapshot::default()
            }
        }
    }
}
