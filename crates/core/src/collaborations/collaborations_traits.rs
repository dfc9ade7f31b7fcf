use async_trait::async_trait;

use super::collaborations_model::Collaboration;
use crate::errors::Result;

#[async_trait]
pub trait CollaborationRepositoryTrait: Send + Sync {
    /// Collaborations where the user is requester or addressee.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Collaboration>>;
}
