//! Profile module - per-user settings and the savings goal percentage.

mod profile_model;
mod profile_traits;

pub use profile_model::{clamp_goal_percentage, Profile};
pub use profile_traits::ProfileRepositoryTrait;
