use std::time::Duration;

/// Savings goal percentage used when a profile has none
pub const DEFAULT_SAVINGS_GOAL_PERCENTAGE: u8 = 10;

/// Upper bound of the savings goal percentage
pub const MAX_SAVINGS_GOAL_PERCENTAGE: u8 = 100;

/// Quiet period before a goal percentage change is written to the store
pub const GOAL_PERSIST_DEBOUNCE: Duration = Duration::from_millis(500);

/// Rows per page on the contributions list
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes offered by the contributions list (plus "all")
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 20, 50];

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Currency symbol appended to formatted amounts
pub const CURRENCY_SYMBOL: &str = "€";

/// Remote procedure that propagates a goal percentage to collaborators
pub const SYNC_SAVINGS_GOAL_RPC: &str = "sync_savings_goal_percentage";
