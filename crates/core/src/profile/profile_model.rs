//! Profile domain models.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SAVINGS_GOAL_PERCENTAGE, MAX_SAVINGS_GOAL_PERCENTAGE};

/// Per-user settings stored in the remote `profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    #[serde(default = "default_goal_percentage")]
    pub savings_goal_percentage: u8,
    #[serde(default)]
    pub display_name: Option<String>,
}

fn default_goal_percentage() -> u8 {
    DEFAULT_SAVINGS_GOAL_PERCENTAGE
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Profile {
            id: id.into(),
            savings_goal_percentage: DEFAULT_SAVINGS_GOAL_PERCENTAGE,
            display_name: None,
        }
    }
}

/// Clamps a requested goal percentage into 0..=100.
pub fn clamp_goal_percentage(value: i64) -> u8 {
    let clamped = value.clamp(0, i64::from(MAX_SAVINGS_GOAL_PERCENTAGE));
    u8::try_from(clamped).unwrap_or(MAX_SAVINGS_GOAL_PERCENTAGE)
}
