//! Savings goal: target amount and debounced persistence of the percentage.
//!
//! Dragging the percentage control produces a burst of changes. Only the last
//! value of a burst is written: each change re-arms a quiet-period deadline and
//! the write happens once the deadline passes without further input.
//!
//! ```text
//!   Idle --change--> Dirty --deadline--> Persisting --ok--> Idle
//!                      ^                     |
//!                      +-------err-----------+
//! ```

use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::constants::{DISPLAY_DECIMAL_PRECISION, GOAL_PERSIST_DEBOUNCE};
use crate::context::AppContext;
use crate::errors::Result;
use crate::notices::Notice;
use crate::profile::{clamp_goal_percentage, Profile};

pub const GOAL_SAVE_FAILED_MESSAGE: &str = "Impossible d'enregistrer votre objectif d'épargne";
pub const GOAL_SYNCED_MESSAGE: &str = "Objectif d'épargne synchronisé avec vos collaborateurs";

/// Monthly amount to save: income x percentage / 100, rounded to cents.
pub fn target_amount(monthly_income_total: Decimal, percentage: u8) -> Decimal {
    let percentage = Decimal::from(percentage);
    let target = match monthly_income_total.checked_mul(percentage) {
        Some(scaled) => scaled / Decimal::ONE_HUNDRED,
        // Dividing first cannot overflow since percentage <= 100
        None => monthly_income_total / Decimal::ONE_HUNDRED * percentage,
    };
    target.round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalWriteState {
    /// Displayed percentage equals the persisted one.
    Idle,
    /// Changed locally. `deadline` is `None` after a failed write: nothing is
    /// retried until the next change.
    Dirty {
        value: u8,
        deadline: Option<Instant>,
    },
    /// A write of `value` is in flight.
    Persisting { value: u8 },
}

/// Debounce state machine. Time is passed in by the caller.
#[derive(Debug, Clone)]
pub struct GoalPercentageDebouncer {
    quiet_period: Duration,
    state: GoalWriteState,
    /// Newer value typed while a write was in flight
    queued: Option<(u8, Instant)>,
}

impl Default for GoalPercentageDebouncer {
    fn default() -> Self {
        Self::new(GOAL_PERSIST_DEBOUNCE)
    }
}

impl GoalPercentageDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        GoalPercentageDebouncer {
            quiet_period,
            state: GoalWriteState::Idle,
            queued: None,
        }
    }

    pub fn state(&self) -> GoalWriteState {
        self.state
    }

    /// Records a change and (re)schedules the write. A pending write is
    /// cancelled and replaced.
    pub fn change(&mut self, value: u8, now: Instant) {
        let deadline = now + self.quiet_period;
        match self.state {
            GoalWriteState::Persisting { .. } => self.queued = Some((value, deadline)),
            _ => {
                self.state = GoalWriteState::Dirty {
                    value,
                    deadline: Some(deadline),
                }
            }
        }
    }

    /// When the pending write is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            GoalWriteState::Dirty { deadline, .. } => deadline,
            _ => None,
        }
    }

    /// Returns the value to write if the quiet period has elapsed, moving to
    /// `Persisting`.
    pub fn take_due(&mut self, now: Instant) -> Option<u8> {
        match self.state {
            GoalWriteState::Dirty {
                value,
                deadline: Some(deadline),
            } if now >= deadline => {
                self.state = GoalWriteState::Persisting { value };
                Some(value)
            }
            _ => None,
        }
    }

    /// Settles the in-flight write.
    pub fn complete(&mut self, succeeded: bool) {
        let GoalWriteState::Persisting { value } = self.state else {
            return;
        };
        self.state = match (self.queued.take(), succeeded) {
            (Some((queued, deadline)), _) => GoalWriteState::Dirty {
                value: queued,
                deadline: Some(deadline),
            },
            (None, true) => GoalWriteState::Idle,
            (None, false) => GoalWriteState::Dirty {
                value,
                deadline: None,
            },
        };
    }

    /// Drops a pending (not yet started) write. A failed write stays dirty.
    pub fn cancel(&mut self) {
        self.queued = None;
        if let GoalWriteState::Dirty {
            value,
            deadline: Some(_),
        } = self.state
        {
            self.state = GoalWriteState::Idle;
            debug!("Cancelled pending goal write of {}", value);
        }
    }
}

struct GoalState {
    displayed: u8,
    profile: Profile,
    debouncer: GoalPercentageDebouncer,
}

/// Owns the displayed goal percentage and the cached profile.
pub struct SavingsGoalService {
    context: AppContext,
    collaborating: bool,
    state: Mutex<GoalState>,
}

impl SavingsGoalService {
    pub fn new(context: AppContext, profile: Profile, collaborating: bool) -> Self {
        Self::with_quiet_period(context, profile, collaborating, GOAL_PERSIST_DEBOUNCE)
    }

    pub fn with_quiet_period(
        context: AppContext,
        profile: Profile,
        collaborating: bool,
        quiet_period: Duration,
    ) -> Self {
        SavingsGoalService {
            context,
            collaborating,
            state: Mutex::new(GoalState {
                displayed: profile.savings_goal_percentage,
                profile,
                debouncer: GoalPercentageDebouncer::new(quiet_period),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GoalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Percentage currently shown by the control.
    pub fn percentage(&self) -> u8 {
        self.lock().displayed
    }

    /// Cached profile; reflects only successfully persisted values.
    pub fn profile(&self) -> Profile {
        self.lock().profile.clone()
    }

    pub fn write_state(&self) -> GoalWriteState {
        self.lock().debouncer.state()
    }

    pub fn target_amount(&self, monthly_income_total: Decimal) -> Decimal {
        target_amount(monthly_income_total, self.percentage())
    }

    /// Records a percentage change from the control. Values are clamped to 0..=100.
    pub fn set_percentage(&self, value: i64, now: Instant) -> u8 {
        let value = clamp_goal_percentage(value);
        let mut state = self.lock();
        state.displayed = value;
        state.debouncer.change(value, now);
        value
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.lock().debouncer.next_deadline()
    }

    pub fn cancel_pending(&self) {
        self.lock().debouncer.cancel();
    }

    /// Writes the pending percentage if its quiet period has elapsed.
    ///
    /// Returns the persisted value, or `None` when nothing was due.
    pub async fn flush_due(&self, now: Instant) -> Result<Option<u8>> {
        let Some(value) = self.lock().debouncer.take_due(now) else {
            return Ok(None);
        };

        let (user_id, store) = match self.context.require_signed_in() {
            Ok((user_id, store)) => (user_id.to_string(), store.profiles.clone()),
            Err(e) => {
                self.lock().debouncer.complete(false);
                return Err(e);
            }
        };

        debug!("Persisting savings goal percentage {}", value);
        match store.update_savings_goal_percentage(&user_id, value).await {
            Ok(updated) => {
                {
                    let mut state = self.lock();
                    state.profile.savings_goal_percentage = updated.savings_goal_percentage;
                    state.debouncer.complete(true);
                }
                if self.collaborating {
                    match store.sync_savings_goal_percentage(value).await {
                        Ok(()) => self.context.notify(Notice::info(GOAL_SYNCED_MESSAGE)),
                        Err(e) => {
                            warn!("Failed to sync savings goal with collaborators: {}", e);
                            self.context.notify(Notice::error(e.to_string()));
                        }
                    }
                }
                Ok(Some(value))
            }
            Err(e) => {
                warn!("Failed to persist savings goal percentage: {}", e);
                self.lock().debouncer.complete(false);
                let message = format!("{}: {}", GOAL_SAVE_FAILED_MESSAGE, e);
                self.context.notify(Notice::error(message));
                Err(e)
            }
        }
    }
}

/// Handle to the background goal writer.
///
/// Dropping the handle (or calling `shutdown`) cancels a pending write; a write
/// already in flight runs to completion.
pub struct GoalWriterHandle {
    tx: Option<mpsc::UnboundedSender<i64>>,
    task: Option<JoinHandle<()>>,
}

impl GoalWriterHandle {
    pub fn set_percentage(&self, value: i64) {
        if let Some(tx) = &self.tx {
            if tx.send(value).is_err() {
                debug!("Goal writer stopped; dropping percentage change");
            }
        }
    }

    /// Cancels the pending write and waits for the worker to stop.
    pub async fn shutdown(mut self) {
        self.tx.take();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Goal writer task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for GoalWriterHandle {
    fn drop(&mut self) {
        self.tx.take();
    }
}

/// Spawns the task that drives `service` from percentage changes.
pub fn spawn_goal_writer(service: Arc<SavingsGoalService>) -> GoalWriterHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(goal_writer_loop(service, rx));
    GoalWriterHandle {
        tx: Some(tx),
        task: Some(task),
    }
}

async fn goal_writer_loop(
    service: Arc<SavingsGoalService>,
    mut rx: mpsc::UnboundedReceiver<i64>,
) {
    debug!("Savings goal writer started");
    loop {
        let deadline = service.next_deadline();
        let wake_at = deadline.unwrap_or_else(Instant::now);
        tokio::select! {
            change = rx.recv() => {
                match change {
                    Some(value) => {
                        service.set_percentage(value, Instant::now());
                    }
                    None => {
                        service.cancel_pending();
                        debug!("Savings goal writer shutting down");
                        return;
                    }
                }
            }
            _ = tokio::time::sleep_until(wake_at), if deadline.is_some() => {
                // Errors were already surfaced as notices.
                let _ = service.flush_due(Instant::now()).await;
            }
        }
    }
}
