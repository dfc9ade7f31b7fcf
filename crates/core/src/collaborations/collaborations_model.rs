//! Collaboration domain models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    /// Any status this version does not know about; never treated as accepted.
    #[serde(other)]
    Unknown,
}

/// Sharing relationship between two users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collaboration {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    #[serde(default)]
    pub status: CollaborationStatus,
}

impl Collaboration {
    pub fn is_accepted(&self) -> bool {
        self.status == CollaborationStatus::Accepted
    }

    /// The other party of the relationship, if `user_id` takes part in it.
    pub fn partner_of(&self, user_id: &str) -> Option<&str> {
        if self.requester_id == user_id {
            Some(&self.addressee_id)
        } else if self.addressee_id == user_id {
            Some(&self.requester_id)
        } else {
            None
        }
    }
}

/// True when at least one collaboration has been accepted.
pub fn has_active_collaboration(collaborations: &[Collaboration]) -> bool {
    collaborations.iter().any(Collaboration::is_accepted)
}

/// The user followed by every accepted collaborator, deduplicated.
pub fn visible_owner_ids(user_id: &str, collaborations: &[Collaboration]) -> Vec<String> {
    let mut ids = vec![user_id.to_string()];
    for partner in collaborations
        .iter()
        .filter(|c| c.is_accepted())
        .filter_map(|c| c.partner_of(user_id))
    {
        if !ids.iter().any(|id| id == partner) {
            ids.push(partner.to_string());
        }
    }
    ids
}
