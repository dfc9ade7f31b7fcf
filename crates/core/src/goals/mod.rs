//! Goals module - savings goal percentage, its debounced persistence, and
//! progress of monthly savings against it.

mod progress;
mod savings_goal;


pub use progress::{
    compute_savings_progress, effective_monthly_amount, monthly_savings_total, progress_percent,
    SavingsProgress,
};
pub use savings_goal::{
    spawn_goal_writer, target_amount, GoalPercentageDebouncer, GoalWriteState, GoalWriterHandle,
    SavingsGoalService, GOAL_SAVE_FAILED_MESSAGE, GOAL_SYNCED_MESSAGE,
};
