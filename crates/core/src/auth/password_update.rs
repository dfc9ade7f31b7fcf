//! Gate for the password update page.
//!
//! The page is reachable from a recovery email. It only lets the user set a new
//! password once the auth service reported a session; otherwise the user is
//! sent back to sign-in with a notice.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::sync::Arc;

use super::auth_model::{Session, SessionEvent};
use super::auth_traits::AuthServiceTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::notices::{Notice, NoticeSink};

pub const SESSION_EXPIRED_MESSAGE: &str =
    "Votre session a expiré. Veuillez vous reconnecter pour modifier votre mot de passe.";

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Where the view should go after handling the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordUpdateOutcome {
    /// Stay on the page, waiting for the auth service to report a session.
    Waiting,
    /// A session is present; the form can be shown.
    Ready,
    Updated,
    RedirectToSignIn,
}

pub struct PasswordUpdateFlow {
    auth: Arc<dyn AuthServiceTrait>,
    notices: Arc<dyn NoticeSink>,
    session: Option<Session>,
    outcome: PasswordUpdateOutcome,
}

impl PasswordUpdateFlow {
    pub fn new(auth: Arc<dyn AuthServiceTrait>, notices: Arc<dyn NoticeSink>) -> Self {
        PasswordUpdateFlow {
            auth,
            notices,
            session: None,
            outcome: PasswordUpdateOutcome::Waiting,
        }
    }

    pub fn outcome(&self) -> PasswordUpdateOutcome {
        self.outcome
    }

    /// Reacts to a session-change notification.
    pub fn on_session_event(&mut self, event: SessionEvent) -> PasswordUpdateOutcome {
        match event {
            SessionEvent::Established(session) | SessionEvent::PasswordRecovery(session) => {
                debug!("Password update flow received a session");
                self.session = Some(session);
                self.outcome = PasswordUpdateOutcome::Ready;
            }
            SessionEvent::Absent => {
                self.session = None;
                self.redirect();
            }
        }
        self.outcome
    }

    fn redirect(&mut self) {
        self.notices.emit(Notice::error(SESSION_EXPIRED_MESSAGE));
        self.outcome = PasswordUpdateOutcome::RedirectToSignIn;
    }

    /// Sets the new password for the current session.
    pub async fn submit(
        &mut self,
        new_password: &str,
        confirmation: &str,
        now: DateTime<Utc>,
    ) -> Result<PasswordUpdateOutcome> {
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Le mot de passe doit contenir au moins {} caractères",
                MIN_PASSWORD_LENGTH
            ))));
        }
        if new_password != confirmation {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Les mots de passe ne correspondent pas".to_string(),
            )));
        }

        let current = self
            .session
            .as_ref()
            .filter(|s| !s.is_expired(now))
            .cloned();
        let Some(session) = current else {
            warn!("Password update attempted without a valid session");
            self.session = None;
            self.redirect();
            return Err(Error::Session(SESSION_EXPIRED_MESSAGE.to_string()));
        };

        match self.auth.update_password(&session, new_password).await {
            Ok(()) => {
                self.notices.emit(Notice::success("Votre mot de passe a été mis à jour"));
                self.outcome = PasswordUpdateOutcome::Updated;
                Ok(self.outcome)
            }
            Err(e) => {
                self.notices.emit(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }
}
