use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError, RwLock};

use super::contributions_model::{
    Contribution, ContributionPage, ContributionUpdate, NewContribution, OrganizationSnapshot,
    PageSize, ValidContribution,
};
use super::contributions_validation::ContributionField;
use crate::catalog::{Beneficiary, Enseigne};
use crate::collaborations::visible_owner_ids;
use crate::context::AppContext;
use crate::errors::{Error, FieldErrors, Result};
use crate::notices::Notice;

pub const CONTRIBUTION_CREATED_MESSAGE: &str = "Versement ajouté";
pub const CONTRIBUTION_UPDATED_MESSAGE: &str = "Versement mis à jour";
pub const CONTRIBUTION_DELETED_MESSAGE: &str = "Versement supprimé";
pub const MUTATION_IN_PROGRESS_MESSAGE: &str = "Une opération est déjà en cours sur ce versement";

/// Keys of the in-flight mutation guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MutationKey {
    Create,
    Record(String),
}

/// Removes its key from the in-flight set when dropped.
struct InFlightGuard<'a> {
    in_flight: &'a Mutex<HashSet<MutationKey>>,
    key: MutationKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Case-insensitive substring match on the account type name.
pub fn matches_filter(contribution: &Contribution, filter_text: &str) -> bool {
    let needle = filter_text.trim().to_lowercase();
    needle.is_empty()
        || contribution
            .account_type_name()
            .to_lowercase()
            .contains(&needle)
}

/// Slices `items` for a 1-based `page`. Out-of-range pages are clamped.
pub fn paginate(items: Vec<Contribution>, page: usize, page_size: PageSize) -> ContributionPage {
    let total = items.len();
    let size = match page_size {
        PageSize::Count(n) if n > 0 => n,
        _ => {
            return ContributionPage {
                items,
                page: 1,
                page_count: 1,
                total,
            }
        }
    };

    let page_count = total.div_ceil(size).max(1);
    let page = page.clamp(1, page_count);
    let items = items
        .into_iter()
        .skip((page - 1) * size)
        .take(size)
        .collect();

    ContributionPage {
        items,
        page,
        page_count,
        total,
    }
}

/// Owns the in-memory contribution collection and every mutation of it.
///
/// The cache is patched only after the store confirmed a mutation; a failed
/// call leaves it untouched. Two mutations on different records may be in
/// flight at once and the last to resolve wins, like in the store. A second
/// mutation on the same record (or a second create) is refused with
/// `Error::Busy` until the first one settles.
pub struct ContributionListController {
    context: AppContext,
    contributions: RwLock<Vec<Contribution>>,
    enseignes: RwLock<Vec<Enseigne>>,
    beneficiaries: RwLock<Option<Vec<Beneficiary>>>,
    in_flight: Mutex<HashSet<MutationKey>>,
}

impl ContributionListController {
    pub fn new(context: AppContext) -> Self {
        Self::with_contributions(context, Vec::new())
    }

    pub fn with_contributions(context: AppContext, contributions: Vec<Contribution>) -> Self {
        ContributionListController {
            context,
            contributions: RwLock::new(contributions),
            enseignes: RwLock::new(Vec::new()),
            beneficiaries: RwLock::new(None),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Snapshot of the cached collection, in store order.
    pub fn contributions(&self) -> Vec<Contribution> {
        self.contributions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn enseignes(&self) -> Vec<Enseigne> {
        self.enseignes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_enseignes(&self, enseignes: Vec<Enseigne>) {
        *self
            .enseignes
            .write()
            .unwrap_or_else(PoisonError::into_inner) = enseignes;
    }

    pub fn set_beneficiaries(&self, beneficiaries: Vec<Beneficiary>) {
        *self
            .beneficiaries
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(beneficiaries);
    }

    /// Fetches contributions visible to the user (own and accepted
    /// collaborators'), institutions and beneficiaries, replacing the cache.
    pub async fn load(&self) -> Result<usize> {
        let (user_id, store) = self.context.require_signed_in()?;
        let user_id = user_id.to_string();
        let store = store.clone();

        let result = async {
            let collaborations = store.collaborations.list_for_user(&user_id).await?;
            let owner_ids = visible_owner_ids(&user_id, &collaborations);
            let contributions = store.contributions.list(&owner_ids).await?;
            let enseignes = store.catalog.list_enseignes().await?;
            let beneficiaries = store.catalog.list_beneficiaries(&owner_ids).await?;
            Ok::<_, Error>((contributions, enseignes, beneficiaries))
        }
        .await;

        match result {
            Ok((contributions, enseignes, beneficiaries)) => {
                let count = contributions.len();
                debug!("Loaded {} contributions", count);
                *self
                    .contributions
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = contributions;
                self.set_enseignes(enseignes);
                self.set_beneficiaries(beneficiaries);
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to load contributions: {}", e);
                self.context.notify(Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Contributions whose account type name contains `filter_text`
    /// (case-insensitive), in existing order.
    pub fn list(&self, filter_text: &str) -> Vec<Contribution> {
        self.contributions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| matches_filter(c, filter_text))
            .cloned()
            .collect()
    }

    pub fn paginate(
        &self,
        filter_text: &str,
        page: usize,
        page_size: PageSize,
    ) -> ContributionPage {
        paginate(self.list(filter_text), page, page_size)
    }

    /// Institution name and logo as they are now, copied onto the record.
    fn organization_snapshot(&self, enseigne_id: Option<&str>) -> OrganizationSnapshot {
        let Some(enseigne_id) = enseigne_id else {
            return OrganizationSnapshot::default();
        };
        let enseignes = self
            .enseignes
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match enseignes.iter().find(|e| e.id == enseigne_id) {
            Some(enseigne) => OrganizationSnapshot {
                name: Some(enseigne.name.clone()),
                logo_url: enseigne.logo_url.clone(),
            },
            None => {
                warn!(
                    "Enseigne {} not found; saving without snapshot",
                    enseigne_id
                );
                OrganizationSnapshot::default()
            }
        }
    }

    /// Rejects a beneficiary that is not among the loaded beneficiaries.
    fn ensure_known_beneficiary(&self, valid: &ValidContribution) -> Result<()> {
        let Some(beneficiary_id) = valid.beneficiary_id.as_deref() else {
            return Ok(());
        };
        let beneficiaries = self
            .beneficiaries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match beneficiaries.as_ref() {
            Some(known) if !known.iter().any(|b| b.id == beneficiary_id) => {
                let mut errors = FieldErrors::new();
                errors.add(
                    ContributionField::BeneficiaryId.as_str(),
                    "Bénéficiaire inconnu",
                );
                Err(errors.into())
            }
            _ => Ok(()),
        }
    }

    fn begin(&self, key: MutationKey) -> Result<InFlightGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.clone()) {
            drop(in_flight);
            debug!("Refusing concurrent mutation {:?}", key);
            self.context.notify(Notice::error(MUTATION_IN_PROGRESS_MESSAGE));
            return Err(Error::Busy(MUTATION_IN_PROGRESS_MESSAGE.to_string()));
        }
        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            key,
        })
    }

    fn relay_failure(&self, error: Error) -> Error {
        self.context.notify(Notice::error(error.to_string()));
        error
    }

    pub async fn create(&self, valid: ValidContribution) -> Result<Contribution> {
        let (user_id, store) = self.context.require_signed_in()?;
        let store = store.contributions.clone();
        let user_id = user_id.to_string();
        self.ensure_known_beneficiary(&valid).map_err(|e| self.relay_failure(e))?;
        let _guard = self.begin(MutationKey::Create)?;

        let organization = self.organization_snapshot(valid.enseigne_id.as_deref());
        let new_contribution = NewContribution::from_valid(&user_id, valid, organization);

        let created = store
            .insert(new_contribution)
            .await
            .map_err(|e| self.relay_failure(e))?;

        info!("Created contribution {}", created.id);
        self.contributions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(created.clone());
        self.context.notify(Notice::success(CONTRIBUTION_CREATED_MESSAGE));
        self.context.notify(Notice::Celebration);
        Ok(created)
    }

    pub async fn update(&self, id: &str, valid: ValidContribution) -> Result<Contribution> {
        let (_, store) = self.context.require_signed_in()?;
        let store = store.contributions.clone();
        self.ensure_known_beneficiary(&valid).map_err(|e| self.relay_failure(e))?;
        let _guard = self.begin(MutationKey::Record(id.to_string()))?;

        let organization = self.organization_snapshot(valid.enseigne_id.as_deref());
        let update = ContributionUpdate::from_valid(id, valid, organization);

        let updated = store
            .update(update)
            .await
            .map_err(|e| self.relay_failure(e))?;

        info!("Updated contribution {}", updated.id);
        {
            let mut contributions = self
                .contributions
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = contributions.iter_mut().find(|c| c.id == updated.id) {
                *existing = updated.clone();
            }
        }
        self.context.notify(Notice::success(CONTRIBUTION_UPDATED_MESSAGE));
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let (_, store) = self.context.require_signed_in()?;
        let store = store.contributions.clone();
        let _guard = self.begin(MutationKey::Record(id.to_string()))?;

        store.delete(id).await.map_err(|e| self.relay_failure(e))?;

        info!("Deleted contribution {}", id);
        self.contributions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|c| c.id != id);
        self.context.notify(Notice::success(CONTRIBUTION_DELETED_MESSAGE));
        Ok(())
    }
}
