use async_trait::async_trait;

use super::auth_model::{Credentials, Session};
use crate::errors::Result;

/// Contract of the third-party auth service.
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    /// Creates an account. Returns a session when the service signs the user
    /// in immediately, `None` when an email confirmation is pending.
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Session>>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session>;

    async fn sign_out(&self, session: &Session) -> Result<()>;

    /// Sends a password-reset email. `redirect_to` is the page the link opens.
    async fn request_password_reset(&self, email: &str, redirect_to: Option<&str>) -> Result<()>;

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<()>;
}
