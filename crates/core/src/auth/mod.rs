//! Auth module - session models, the auth service contract and the password
//! update gate.

mod auth_model;
mod auth_traits;
mod password_update;

pub use auth_model::{AuthUser, Credentials, Session, SessionEvent};
pub use auth_traits::AuthServiceTrait;
pub use password_update::{
    PasswordUpdateFlow, PasswordUpdateOutcome, MIN_PASSWORD_LENGTH, SESSION_EXPIRED_MESSAGE,
};
