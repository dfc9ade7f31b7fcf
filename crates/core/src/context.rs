//! Application context passed to every controller.
//!
//! Controllers receive the session, the store handles and the notice sink
//! explicitly instead of reading them from shared global state. Write access is
//! limited: the contribution list controller owns the contribution cache and the
//! savings goal service owns the cached profile.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

use crate::auth::Session;
use crate::catalog::CatalogRepositoryTrait;
use crate::collaborations::CollaborationRepositoryTrait;
use crate::contributions::ContributionRepositoryTrait;
use crate::errors::{Error, Result};
use crate::incomes::IncomeRepositoryTrait;
use crate::notices::{LogNoticeSink, Notice, NoticeSink};
use crate::profile::ProfileRepositoryTrait;

/// Source of the current date and time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Clock frozen at midnight UTC of `date`.
    pub fn on(date: NaiveDate) -> Self {
        FixedClock(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Handles to the remote store, one per table family.
#[derive(Clone)]
pub struct StoreHandle {
    pub contributions: Arc<dyn ContributionRepositoryTrait>,
    pub profiles: Arc<dyn ProfileRepositoryTrait>,
    pub incomes: Arc<dyn IncomeRepositoryTrait>,
    pub collaborations: Arc<dyn CollaborationRepositoryTrait>,
    pub catalog: Arc<dyn CatalogRepositoryTrait>,
}

#[derive(Clone)]
pub struct AppContext {
    session: Option<Session>,
    store: Option<StoreHandle>,
    notices: Arc<dyn NoticeSink>,
    clock: Arc<dyn Clock>,
}

impl AppContext {
    pub fn new(session: Option<Session>, store: Option<StoreHandle>) -> Self {
        AppContext {
            session,
            store,
            notices: Arc::new(LogNoticeSink),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
        self.notices = notices;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn notices(&self) -> &Arc<dyn NoticeSink> {
        &self.notices
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn notify(&self, notice: Notice) {
        self.notices.emit(notice);
    }

    /// The signed-in user's id, or `Error::Unauthorized`.
    pub fn require_user(&self) -> Result<&str> {
        self.session
            .as_ref()
            .map(Session::user_id)
            .ok_or_else(Error::signed_in_required)
    }

    /// The store handle, or `Error::Unauthorized` when none is configured.
    pub fn require_store(&self) -> Result<&StoreHandle> {
        self.store.as_ref().ok_or_else(Error::signed_in_required)
    }

    /// Both the user id and the store handle, emitting the "must be signed in"
    /// notice when either is missing.
    pub fn require_signed_in(&self) -> Result<(&str, &StoreHandle)> {
        match (self.require_user(), self.require_store()) {
            (Ok(user_id), Ok(store)) => Ok((user_id, store)),
            (Err(e), _) | (_, Err(e)) => {
                self.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }
}
