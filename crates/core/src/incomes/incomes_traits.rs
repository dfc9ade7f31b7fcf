use async_trait::async_trait;

use super::incomes_model::Income;
use crate::errors::Result;

/// Read access to incomes of the user and their collaborators.
#[async_trait]
pub trait IncomeRepositoryTrait: Send + Sync {
    async fn list(&self, owner_ids: &[String]) -> Result<Vec<Income>>;
}
