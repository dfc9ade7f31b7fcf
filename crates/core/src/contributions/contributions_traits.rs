use async_trait::async_trait;

use super::contributions_model::{Contribution, ContributionUpdate, NewContribution};
use crate::errors::Result;

/// Trait defining the contract for contribution storage.
///
/// Every call goes to the remote store. Mutations return the persisted record,
/// including the server-assigned identifier and the joined account type name.
#[async_trait]
pub trait ContributionRepositoryTrait: Send + Sync {
    /// Lists contributions owned by any of `owner_ids`, in store order.
    async fn list(&self, owner_ids: &[String]) -> Result<Vec<Contribution>>;

    async fn insert(&self, new_contribution: NewContribution) -> Result<Contribution>;

    async fn update(&self, update: ContributionUpdate) -> Result<Contribution>;

    /// Deletes a contribution by its ID.
    async fn delete(&self, contribution_id: &str) -> Result<()>;
}
