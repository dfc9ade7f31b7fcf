//! Collaborations module - sharing relationships between users.

mod collaborations_model;
mod collaborations_traits;

pub use collaborations_model::{
    has_active_collaboration, visible_owner_ids, Collaboration, CollaborationStatus,
};
pub use collaborations_traits::CollaborationRepositoryTrait;
