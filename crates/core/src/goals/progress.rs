//! Progress of monthly savings against the goal.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::savings_goal::target_amount;
use crate::contributions::Contribution;

/// Monthly savings compared with the goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsProgress {
    /// Percent of the goal reached, 0..=100
    pub percent: u8,
    /// Sum of monthly equivalents of the contributions already started
    pub monthly_saved: Decimal,
    /// Monthly income x goal percentage
    pub target_amount: Decimal,
}

/// Monthly rate of a contribution, or zero if it starts after `today`.
pub fn effective_monthly_amount(contribution: &Contribution, today: NaiveDate) -> Decimal {
    if contribution.start_date > today {
        return Decimal::ZERO;
    }
    contribution.monthly_equivalent()
}

/// Sum of monthly equivalents of contributions started on or before `today`.
pub fn monthly_savings_total(contributions: &[Contribution], today: NaiveDate) -> Decimal {
    contributions
        .iter()
        .map(|c| effective_monthly_amount(c, today))
        .fold(Decimal::ZERO, |total, amount| {
            total.checked_add(amount).unwrap_or(Decimal::MAX)
        })
}

/// Ratio of saved to target as a rounded percentage capped at 100.
///
/// A zero (or negative) target yields 0.
pub fn progress_percent(monthly_saved: Decimal, target: Decimal) -> u8 {
    if target <= Decimal::ZERO || monthly_saved <= Decimal::ZERO {
        return 0;
    }
    if monthly_saved >= target {
        return 100;
    }
    let ratio = monthly_saved
        .checked_div(target)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(|r| r.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero));
    match ratio {
        Some(ratio) if ratio < Decimal::ONE_HUNDRED => ratio.to_u8().unwrap_or(0),
        _ => 100,
    }
}

pub fn compute_savings_progress(
    monthly_income_total: Decimal,
    goal_percentage: u8,
    contributions: &[Contribution],
    today: NaiveDate,
) -> SavingsProgress {
    let target = target_amount(monthly_income_total, goal_percentage);
    let saved = monthly_savings_total(contributions, today);
    SavingsProgress {
        percent: progress_percent(saved, target),
        monthly_saved: saved,
        target_amount: target,
    }
}
