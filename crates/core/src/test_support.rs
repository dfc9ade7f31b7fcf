//! In-memory store used by unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

use crate::auth::{AuthUser, Session};
use crate::catalog::{AccountType, Beneficiary, CatalogRepositoryTrait, Enseigne, EnseigneCategory};
use crate::collaborations::{Collaboration, CollaborationRepositoryTrait};
use crate::context::{AppContext, FixedClock, StoreHandle};
use crate::contributions::{
    AccountTypeRef, Contribution, ContributionFrequency, ContributionRepositoryTrait,
    ContributionUpdate, NewContribution,
};
use crate::errors::{Error, RemoteError, Result};
use crate::incomes::{Income, IncomeRepositoryTrait};
use crate::notices::MockNoticeSink;
use crate::profile::{Profile, ProfileRepositoryTrait};

pub const USER_ID: &str = "9b2f6c1e-1d4a-4e8b-9c3f-5a6b7c8d9e01";
pub const LIVRET_A_ID: &str = "0d6a8c3e-2f4b-4a1c-8e7d-6b5a4c3d2e10";
pub const PEL_ID: &str = "1e7b9d4f-3a5c-4b2d-9f8e-7c6b5a4d3e21";
pub const BANQUE_ID: &str = "2f8cae5a-4b6d-4c3e-8a9f-8d7c6b5a4f32";
pub const BENEFICIARY_ID: &str = "3a9dbf6b-5c7e-4d4f-9b0a-9e8d7c6b5a43";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn session() -> Session {
    Session {
        access_token: "token".to_string(),
        refresh_token: None,
        expires_at: None,
        user: AuthUser {
            id: USER_ID.to_string(),
            email: Some("camille@example.com".to_string()),
        },
    }
}

pub fn contribution(id: &str, account_type: &str, amount: Decimal) -> Contribution {
    Contribution {
        id: id.to_string(),
        user_id: USER_ID.to_string(),
        account_type_id: Some(LIVRET_A_ID.to_string()),
        enseigne_id: None,
        amount,
        frequency: ContributionFrequency::Monthly,
        start_date: date(2024, 1, 1),
        beneficiary_id: None,
        is_shared: false,
        logo_url: None,
        organization_name: None,
        account_type: Some(AccountTypeRef {
            name: account_type.to_string(),
        }),
        created_at: None,
    }
}

pub fn enseignes() -> Vec<Enseigne> {
    vec![
        Enseigne {
            id: BANQUE_ID.to_string(),
            name: "Banque Populaire".to_string(),
            logo_url: Some("https://cdn.example.com/bp.png".to_string()),
            category: Some(EnseigneCategory {
                name: "Banques mutualistes".to_string(),
            }),
        },
        Enseigne {
            id: "4b0ec07c-6d8f-4e5a-8c1b-0f9e8d7c6b54".to_string(),
            name: "Boursorama".to_string(),
            logo_url: None,
            category: Some(EnseigneCategory {
                name: "Banques en ligne".to_string(),
            }),
        },
    ]
}

/// In-memory implementation of every repository trait.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub contributions: Arc<Mutex<Vec<Contribution>>>,
    pub profile: Arc<Mutex<Option<Profile>>>,
    pub incomes: Arc<Mutex<Vec<Income>>>,
    pub collaborations: Arc<Mutex<Vec<Collaboration>>>,
    pub goal_writes: Arc<Mutex<Vec<u8>>>,
    pub goal_syncs: Arc<Mutex<Vec<u8>>>,
    pub fail_with: Arc<Mutex<Option<String>>>,
    next_id: Arc<Mutex<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contributions(contributions: Vec<Contribution>) -> Self {
        let store = Self::new();
        *store.contributions.lock().unwrap() = contributions;
        store
    }

    pub fn set_failure(&self, message: Option<&str>) {
        *self.fail_with.lock().unwrap() = message.map(str::to_string);
    }

    fn check_failure(&self) -> Result<()> {
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(Error::Remote(RemoteError::Rejected {
                status: 400,
                message,
            })),
            None => Ok(()),
        }
    }

    pub fn handle(&self) -> StoreHandle {
        let store = Arc::new(self.clone());
        StoreHandle {
            contributions: store.clone(),
            profiles: store.clone(),
            incomes: store.clone(),
            collaborations: store.clone(),
            catalog: store,
        }
    }

    /// Context with a signed-in user, this store, a mock notice sink and a
    /// clock frozen on 2024-06-15.
    pub fn context(&self, notices: &MockNoticeSink) -> AppContext {
        AppContext::new(Some(session()), Some(self.handle()))
            .with_notices(Arc::new(notices.clone()))
            .with_clock(Arc::new(FixedClock::on(date(2024, 6, 15))))
    }

    fn account_type_name(id: Option<&str>) -> Option<AccountTypeRef> {
        let name = match id {
            Some(LIVRET_A_ID) => "Livret A",
            Some(PEL_ID) => "PEL",
            _ => return None,
        };
        Some(AccountTypeRef {
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl ContributionRepositoryTrait for MemoryStore {
    async fn list(&self, owner_ids: &[String]) -> Result<Vec<Contribution>> {
        self.check_failure()?;
        Ok(self
            .contributions
            .lock()
            .unwrap()
            .iter()
            .filter(|c| owner_ids.contains(&c.user_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, new_contribution: NewContribution) -> Result<Contribution> {
        self.check_failure()?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("new-{}", *next)
        };
        let contribution = Contribution {
            id,
            user_id: new_contribution.user_id,
            account_type: Self::account_type_name(new_contribution.account_type_id.as_deref()),
            account_type_id: new_contribution.account_type_id,
            enseigne_id: new_contribution.enseigne_id,
            amount: new_contribution.amount,
            frequency: new_contribution.frequency,
            start_date: new_contribution.start_date,
            beneficiary_id: new_contribution.beneficiary_id,
            is_shared: new_contribution.is_shared,
            logo_url: new_contribution.logo_url,
            organization_name: new_contribution.organization_name,
            created_at: None,
        };
        self.contributions
            .lock()
            .unwrap()
            .push(contribution.clone());
        Ok(contribution)
    }

    async fn update(&self, update: ContributionUpdate) -> Result<Contribution> {
        self.check_failure()?;
        let mut contributions = self.contributions.lock().unwrap();
        let existing = contributions
            .iter_mut()
            .find(|c| c.id == update.id)
            .ok_or_else(|| Error::Remote(RemoteError::NotFound(update.id.clone())))?;
        existing.account_type = Self::account_type_name(update.account_type_id.as_deref());
        existing.account_type_id = update.account_type_id;
        existing.enseigne_id = update.enseigne_id;
        existing.amount = update.amount;
        existing.frequency = update.frequency;
        existing.start_date = update.start_date;
        existing.beneficiary_id = update.beneficiary_id;
        existing.is_shared = update.is_shared;
        existing.logo_url = update.logo_url;
        existing.organization_name = update.organization_name;
        Ok(existing.clone())
    }

    async fn delete(&self, contribution_id: &str) -> Result<()> {
        self.check_failure()?;
        self.contributions
            .lock()
            .unwrap()
            .retain(|c| c.id != contribution_id);
        Ok(())
    }
}

#[async_trait]
impl ProfileRepositoryTrait for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.check_failure()?;
        Ok(self
            .profile
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Profile::new(user_id)))
    }

    async fn update_savings_goal_percentage(
        &self,
        user_id: &str,
        percentage: u8,
    ) -> Result<Profile> {
        self.check_failure()?;
        self.goal_writes.lock().unwrap().push(percentage);
        let mut profile = self.profile.lock().unwrap();
        let mut updated = profile.clone().unwrap_or_else(|| Profile::new(user_id));
        updated.savings_goal_percentage = percentage;
        *profile = Some(updated.clone());
        Ok(updated)
    }

    async fn sync_savings_goal_percentage(&self, percentage: u8) -> Result<()> {
        self.check_failure()?;
        self.goal_syncs.lock().unwrap().push(percentage);
        Ok(())
    }
}

#[async_trait]
impl IncomeRepositoryTrait for MemoryStore {
    async fn list(&self, owner_ids: &[String]) -> Result<Vec<Income>> {
        self.check_failure()?;
        Ok(self
            .incomes
            .lock()
            .unwrap()
            .iter()
            .filter(|i| owner_ids.contains(&i.user_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CollaborationRepositoryTrait for MemoryStore {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Collaboration>> {
        self.check_failure()?;
        Ok(self
            .collaborations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.partner_of(user_id).is_some())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogRepositoryTrait for MemoryStore {
    async fn list_account_types(&self) -> Result<Vec<AccountType>> {
        Ok(vec![
            AccountType {
                id: LIVRET_A_ID.to_string(),
                name: "Livret A".to_string(),
            },
            AccountType {
                id: PEL_ID.to_string(),
                name: "PEL".to_string(),
            },
        ])
    }

    async fn list_enseignes(&self) -> Result<Vec<Enseigne>> {
        Ok(enseignes())
    }

    async fn list_beneficiaries(&self, _owner_ids: &[String]) -> Result<Vec<Beneficiary>> {
        Ok(vec![Beneficiary {
            id: BENEFICIARY_ID.to_string(),
            user_id: USER_ID.to_string(),
            name: "Léa".to_string(),
        }])
    }
}
