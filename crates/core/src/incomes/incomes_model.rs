//! Income domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::contributions::ContributionFrequency;

/// Recurring income record. Managed by the income feature; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Income {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub amount: Decimal,
    pub frequency: ContributionFrequency,
}

impl Income {
    pub fn monthly_equivalent(&self) -> Decimal {
        self.frequency.monthly_equivalent(self.amount)
    }
}

/// Sums incomes normalized to a monthly rate. One-time incomes are ignored.
pub fn monthly_income_total(incomes: &[Income]) -> Decimal {
    incomes
        .iter()
        .map(Income::monthly_equivalent)
        .fold(Decimal::ZERO, |total, amount| {
            total.checked_add(amount).unwrap_or(Decimal::MAX)
        })
}
