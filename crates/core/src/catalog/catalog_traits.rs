use async_trait::async_trait;

use super::catalog_model::{AccountType, Beneficiary, Enseigne};
use crate::errors::Result;

/// Read access to the lookup tables behind the contribution form.
#[async_trait]
pub trait CatalogRepositoryTrait: Send + Sync {
    async fn list_account_types(&self) -> Result<Vec<AccountType>>;

    /// Institutions with their parent category joined.
    async fn list_enseignes(&self) -> Result<Vec<Enseigne>>;

    async fn list_beneficiaries(&self, owner_ids: &[String]) -> Result<Vec<Beneficiary>>;
}
