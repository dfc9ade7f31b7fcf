//! Lookup rows used by the contribution form.

use serde::{Deserialize, Serialize};

/// Kind of savings account (Livret A, PEL, assurance vie...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountType {
    pub id: String,
    pub name: String,
}

/// Parent category of an institution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnseigneCategory {
    pub name: String,
}

/// Financial institution or brand holding a savings account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enseigne {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Joined parent category
    #[serde(rename = "categories", default)]
    pub category: Option<EnseigneCategory>,
}

impl Enseigne {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Person a contribution can be earmarked for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Beneficiary {
    pub id: String,
    pub user_id: String,
    pub name: String,
}
