//! Incomes module - read-only input to the goal and progress calculators.

mod incomes_model;
mod incomes_traits;

pub use incomes_model::{monthly_income_total, Income};
pub use incomes_traits::IncomeRepositoryTrait;
