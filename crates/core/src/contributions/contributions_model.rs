//! Contribution domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// How often a contribution is deposited.
///
/// Serialized with the labels stored in the remote `contributions.frequency`
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContributionFrequency {
    #[serde(rename = "Ponctuel")]
    OneTime,
    #[default]
    #[serde(rename = "Mensuel")]
    Monthly,
    #[serde(rename = "Trimestriel")]
    Quarterly,
    #[serde(rename = "Annuel")]
    Annual,
}

impl ContributionFrequency {
    pub const ALL: [ContributionFrequency; 4] = [
        ContributionFrequency::OneTime,
        ContributionFrequency::Monthly,
        ContributionFrequency::Quarterly,
        ContributionFrequency::Annual,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContributionFrequency::OneTime => "Ponctuel",
            ContributionFrequency::Monthly => "Mensuel",
            ContributionFrequency::Quarterly => "Trimestriel",
            ContributionFrequency::Annual => "Annuel",
        }
    }

    /// Normalizes an amount paid at this frequency to a monthly rate.
    ///
    /// One-time deposits have no recurring rate and yield zero.
    pub fn monthly_equivalent(&self, amount: Decimal) -> Decimal {
        match self {
            ContributionFrequency::Monthly => amount,
            ContributionFrequency::Quarterly => amount / Decimal::from(3),
            ContributionFrequency::Annual => amount / Decimal::from(12),
            ContributionFrequency::OneTime => Decimal::ZERO,
        }
    }
}

impl fmt::Display for ContributionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContributionFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ContributionFrequency::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown frequency '{}'",
                    wanted
                )))
            })
    }
}

/// Parses a calendar date as stored by the remote store.
///
/// Accepts plain `YYYY-MM-DD` dates and RFC 3339 timestamps, in which case the
/// date part (in UTC) is kept.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, Error> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    let timestamp = DateTime::parse_from_rfc3339(value)?;
    Ok(timestamp.with_timezone(&Utc).date_naive())
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}

/// Account type name joined onto a contribution row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountTypeRef {
    pub name: String,
}

/// A single planned or completed savings deposit, as stored remotely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contribution {
    pub id: String,
    pub user_id: String,
    pub account_type_id: Option<String>,
    pub enseigne_id: Option<String>,
    pub amount: Decimal,
    pub frequency: ContributionFrequency,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub start_date: NaiveDate,
    pub beneficiary_id: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
    /// Snapshot of the institution logo taken when the contribution was saved
    pub logo_url: Option<String>,
    /// Snapshot of the institution name taken when the contribution was saved
    pub organization_name: Option<String>,
    /// Joined `account_types(name)`; read-only
    #[serde(
        rename = "account_types",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub account_type: Option<AccountTypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Contribution {
    /// Display name of the account type, empty when the join is missing.
    pub fn account_type_name(&self) -> &str {
        self.account_type
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("")
    }

    /// Monthly rate of this contribution.
    pub fn monthly_equivalent(&self) -> Decimal {
        self.frequency.monthly_equivalent(self.amount)
    }
}

/// Raw values collected by the contribution form, before validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ContributionInput {
    pub account_type_id: Option<String>,
    pub enseigne_id: Option<String>,
    /// Amount as typed by the user; coerced during validation
    pub amount: String,
    pub frequency: String,
    pub start_date: Option<NaiveDate>,
    pub logo_url: Option<String>,
    pub beneficiary_id: Option<String>,
    pub is_shared: Option<bool>,
}

impl From<&Contribution> for ContributionInput {
    fn from(contribution: &Contribution) -> Self {
        ContributionInput {
            account_type_id: contribution.account_type_id.clone(),
            enseigne_id: contribution.enseigne_id.clone(),
            amount: contribution.amount.normalize().to_string(),
            frequency: contribution.frequency.label().to_string(),
            start_date: Some(contribution.start_date),
            logo_url: contribution.logo_url.clone(),
            beneficiary_id: contribution.beneficiary_id.clone(),
            is_shared: Some(contribution.is_shared),
        }
    }
}

/// A contribution payload that passed schema validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidContribution {
    pub account_type_id: Option<String>,
    pub enseigne_id: Option<String>,
    pub amount: Decimal,
    pub frequency: ContributionFrequency,
    pub start_date: NaiveDate,
    pub logo_url: Option<String>,
    pub beneficiary_id: Option<String>,
    pub is_shared: bool,
}

/// Insert payload sent to the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewContribution {
    pub user_id: String,
    pub account_type_id: Option<String>,
    pub enseigne_id: Option<String>,
    pub amount: Decimal,
    pub frequency: ContributionFrequency,
    pub start_date: NaiveDate,
    pub beneficiary_id: Option<String>,
    pub is_shared: bool,
    pub logo_url: Option<String>,
    pub organization_name: Option<String>,
}

/// Full replace of the mutable fields of an existing contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributionUpdate {
    #[serde(skip_serializing)]
    pub id: String,
    pub account_type_id: Option<String>,
    pub enseigne_id: Option<String>,
    pub amount: Decimal,
    pub frequency: ContributionFrequency,
    pub start_date: NaiveDate,
    pub beneficiary_id: Option<String>,
    pub is_shared: bool,
    pub logo_url: Option<String>,
    pub organization_name: Option<String>,
}

/// Institution details copied onto a contribution at submission time.
///
/// This is a snapshot, not a live reference: renaming an institution later
/// does not change contributions saved before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationSnapshot {
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

impl NewContribution {
    pub fn from_valid(
        user_id: &str,
        valid: ValidContribution,
        organization: OrganizationSnapshot,
    ) -> Self {
        NewContribution {
            user_id: user_id.to_string(),
            account_type_id: valid.account_type_id,
            enseigne_id: valid.enseigne_id,
            amount: valid.amount,
            frequency: valid.frequency,
            start_date: valid.start_date,
            beneficiary_id: valid.beneficiary_id,
            is_shared: valid.is_shared,
            logo_url: organization.logo_url.or(valid.logo_url),
            organization_name: organization.name,
        }
    }
}

impl ContributionUpdate {
    pub fn from_valid(
        id: &str,
        valid: ValidContribution,
        organization: OrganizationSnapshot,
    ) -> Self {
        ContributionUpdate {
            id: id.to_string(),
            account_type_id: valid.account_type_id,
            enseigne_id: valid.enseigne_id,
            amount: valid.amount,
            frequency: valid.frequency,
            start_date: valid.start_date,
            beneficiary_id: valid.beneficiary_id,
            is_shared: valid.is_shared,
            logo_url: organization.logo_url.or(valid.logo_url),
            organization_name: organization.name,
        }
    }
}

/// Requested page size on the contributions list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSize {
    All,
    Count(usize),
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Count(crate::constants::DEFAULT_PAGE_SIZE)
    }
}

/// One page of the filtered contributions list.
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionPage {
    pub items: Vec<Contribution>,
    /// 1-based page actually returned
    pub page: usize,
    pub page_count: usize,
    /// Number of contributions matching the filter
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_frequency_labels_round_trip_through_serde() {
        assert_eq!(
            serde_json::to_string(&ContributionFrequency::Quarterly).unwrap(),
            "\"Trimestriel\""
        );
        assert_eq!(
            serde_json::from_str::<ContributionFrequency>("\"Ponctuel\"").unwrap(),
            ContributionFrequency::OneTime
        );
    }

    #[test]
    fn test_frequency_from_str_is_case_insensitive() {
        assert_eq!(
            "annuel".parse::<ContributionFrequency>().unwrap(),
            ContributionFrequency::Annual
        );
        assert!("weekly".parse::<ContributionFrequency>().is_err());
    }

    #[test]
    fn test_parse_calendar_date_accepts_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_calendar_date("2024-03-01").unwrap(), expected);
        assert_eq!(
            parse_calendar_date("2024-03-01T00:00:00+00:00").unwrap(),
            expected
        );
        assert!(parse_calendar_date("01/03/2024").is_err());
    }

    #[test]
    fn test_contribution_row_with_join() {
        let row = r#"{
            "id": "c1",
            "user_id": "u1",
            "account_type_id": "t1",
            "enseigne_id": null,
            "amount": 42.5,
            "frequency": "Mensuel",
            "start_date": "2024-02-10",
            "beneficiary_id": null,
            "is_shared": true,
            "logo_url": null,
            "organization_name": "Crédit Mutuel",
            "account_types": { "name": "Livret A" }
        }"#;
        let contribution: Contribution = serde_json::from_str(row).unwrap();
        assert_eq!(contribution.amount, dec!(42.5));
        assert_eq!(contribution.account_type_name(), "Livret A");
        assert_eq!(
            contribution.start_date,
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
        );
        assert!(contribution.is_shared);
    }

    #[test]
    fn test_new_contribution_takes_snapshot_over_typed_logo() {
        let valid = ValidContribution {
            account_type_id: Some("t1".to_string()),
            enseigne_id: Some("e1".to_string()),
            amount: dec!(10),
            frequency: ContributionFrequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            logo_url: Some("https://typed.example.com/logo.png".to_string()),
            beneficiary_id: None,
            is_shared: false,
        };
        let snapshot = OrganizationSnapshot {
            name: Some("Boursorama".to_string()),
            logo_url: Some("https://cdn.example.com/bourso.png".to_string()),
        };
        let new_contribution = NewContribution::from_valid("u1", valid, snapshot);
        assert_eq!(new_contribution.user_id, "u1");
        assert_eq!(
            new_contribution.logo_url.as_deref(),
            Some("https://cdn.example.com/bourso.png")
        );
        assert_eq!(
            new_contribution.organization_name.as_deref(),
            Some("Boursorama")
        );
    }
}
