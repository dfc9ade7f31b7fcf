use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::collaborations::{has_active_collaboration, visible_owner_ids, Collaboration};
use crate::context::AppContext;
use crate::contributions::Contribution;
use crate::errors::{Error, Result};
use crate::goals::{compute_savings_progress, SavingsProgress};
use crate::incomes::monthly_income_total;
use crate::notices::Notice;
use crate::profile::Profile;

/// Values derived from the signed-in user's household data.
///
/// Incomes and contributions include those of accepted collaborators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsOverview {
    pub profile: Profile,
    pub contributions: Vec<Contribution>,
    pub collaborations: Vec<Collaboration>,
    pub monthly_income_total: Decimal,
    pub progress: SavingsProgress,
    pub has_active_collaboration: bool,
}

impl SavingsOverview {
    pub fn goal_percentage(&self) -> u8 {
        self.profile.savings_goal_percentage
    }

    pub fn target_amount(&self) -> Decimal {
        self.progress.target_amount
    }

    /// Fetches profile, collaborations, incomes and contributions.
    ///
    /// A failure is relayed as an error notice and returned.
    pub async fn load(context: &AppContext) -> Result<SavingsOverview> {
        let (user_id, store) = context.require_signed_in()?;

        let result = async {
            let profile = store.profiles.get_profile(user_id).await?;
            let collaborations = store.collaborations.list_for_user(user_id).await?;
            let owner_ids = visible_owner_ids(user_id, &collaborations);
            let incomes = store.incomes.list(&owner_ids).await?;
            let contributions = store.contributions.list(&owner_ids).await?;
            Ok::<_, Error>((profile, collaborations, incomes, contributions))
        }
        .await;

        let (profile, collaborations, incomes, contributions) = match result {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Failed to load savings overview: {}", e);
                context.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };

        let income_total = monthly_income_total(&incomes);
        let progress = compute_savings_progress(
            income_total,
            profile.savings_goal_percentage,
            &contributions,
            context.clock().today(),
        );
        debug!(
            "Savings overview: {} contributions, {}% of goal",
            contributions.len(),
            progress.percent
        );

        Ok(SavingsOverview {
            has_active_collaboration: has_active_collaboration(&collaborations),
            profile,
            contributions,
            collaborations,
            monthly_income_total: income_total,
            progress,
        })
    }
}
