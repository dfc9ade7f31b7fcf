//! Schema rules for a savings contribution payload.

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use super::contributions_model::{ContributionFrequency, ContributionInput, ValidContribution};
use crate::errors::FieldErrors;

/// Whether a missing account type is tolerated.
///
/// `EditInProgress` is only used while an existing contribution without an
/// account type is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Create,
    EditInProgress,
}

/// Fields of a contribution payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContributionField {
    AccountTypeId,
    EnseigneId,
    Amount,
    Frequency,
    StartDate,
    LogoUrl,
    BeneficiaryId,
    IsShared,
}

impl ContributionField {
    pub const ALL: [ContributionField; 8] = [
        ContributionField::AccountTypeId,
        ContributionField::EnseigneId,
        ContributionField::Amount,
        ContributionField::Frequency,
        ContributionField::StartDate,
        ContributionField::LogoUrl,
        ContributionField::BeneficiaryId,
        ContributionField::IsShared,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionField::AccountTypeId => "account_type_id",
            ContributionField::EnseigneId => "enseigne_id",
            ContributionField::Amount => "amount",
            ContributionField::Frequency => "frequency",
            ContributionField::StartDate => "start_date",
            ContributionField::LogoUrl => "logo_url",
            ContributionField::BeneficiaryId => "beneficiary_id",
            ContributionField::IsShared => "is_shared",
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn is_identifier(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Coerces a typed amount into a decimal.
///
/// Accepts a comma as decimal separator and ignores spaces used as thousands
/// separators.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{202f}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

fn check_field(
    field: ContributionField,
    input: &ContributionInput,
    mode: ValidationMode,
    errors: &mut FieldErrors,
) {
    let key = field.as_str();
    match field {
        ContributionField::AccountTypeId => match non_empty(&input.account_type_id) {
            Some(id) if !is_identifier(id) => errors.add(key, "Type de compte invalide"),
            Some(_) => {}
            None if mode == ValidationMode::EditInProgress => {}
            None => errors.add(key, "Le type de compte est requis"),
        },
        ContributionField::EnseigneId => {
            if let Some(id) = non_empty(&input.enseigne_id) {
                if !is_identifier(id) {
                    errors.add(key, "Enseigne invalide");
                }
            }
        }
        ContributionField::Amount => match parse_amount(&input.amount) {
            None => errors.add(key, "Le montant doit être un nombre"),
            Some(amount) if amount <= Decimal::ZERO => {
                errors.add(key, "Le montant doit être supérieur à 0")
            }
            Some(_) => {}
        },
        ContributionField::Frequency => {
            let frequency = input.frequency.trim();
            if frequency.is_empty() {
                errors.add(key, "La fréquence est requise");
            } else if ContributionFrequency::from_str(frequency).is_err() {
                errors.add(key, "Fréquence invalide");
            }
        }
        ContributionField::StartDate => {
            if input.start_date.is_none() {
                errors.add(key, "La date de début est requise");
            }
        }
        ContributionField::LogoUrl => {
            if let Some(url) = non_empty(&input.logo_url) {
                if url::Url::parse(url).is_err() {
                    errors.add(key, "URL du logo invalide");
                }
            }
        }
        ContributionField::BeneficiaryId => {
            if let Some(id) = non_empty(&input.beneficiary_id) {
                if !is_identifier(id) {
                    errors.add(key, "Bénéficiaire invalide");
                }
            }
        }
        ContributionField::IsShared => {
            if input.is_shared.is_none() {
                errors.add(key, "Le partage doit être précisé");
            }
        }
    }
}

/// Validates only the given subset of fields.
///
/// Used by the form to gate a single step; returns every error found for
/// those fields.
pub fn validate_fields(
    input: &ContributionInput,
    fields: &[ContributionField],
    mode: ValidationMode,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for field in fields {
        check_field(*field, input, mode, &mut errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a candidate contribution and returns the coerced values.
pub fn validate_contribution(
    input: &ContributionInput,
    mode: ValidationMode,
) -> Result<ValidContribution, FieldErrors> {
    validate_fields(input, &ContributionField::ALL, mode)?;

    // Every field passed its rule, so the conversions below cannot fail.
    let (Some(amount), Ok(frequency), Some(start_date), Some(shared)) = (
        parse_amount(&input.amount),
        ContributionFrequency::from_str(&input.frequency),
        input.start_date,
        input.is_shared,
    ) else {
        let mut errors = FieldErrors::new();
        errors.add(ContributionField::Amount.as_str(), "Valeurs invalides");
        return Err(errors);
    };

    Ok(ValidContribution {
        account_type_id: non_empty(&input.account_type_id).map(str::to_string),
        enseigne_id: non_empty(&input.enseigne_id).map(str::to_string),
        amount,
        frequency,
        start_date,
        logo_url: non_empty(&input.logo_url).map(str::to_string),
        beneficiary_id: non_empty(&input.beneficiary_id).map(str::to_string),
        is_shared: shared,
    })
}
