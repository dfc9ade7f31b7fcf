use async_trait::async_trait;

use super::profile_model::Profile;
use crate::errors::Result;

/// Trait defining the contract for profile storage.
#[async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Profile>;

    /// Writes the goal percentage and returns the updated profile.
    async fn update_savings_goal_percentage(&self, user_id: &str, percentage: u8)
        -> Result<Profile>;

    /// Calls the remote procedure that copies the percentage to every accepted
    /// collaborator of the signed-in user.
    async fn sync_savings_goal_percentage(&self, percentage: u8) -> Result<()>;
}
