//! Contributions module - domain models, schema validation, storage trait and
//! the list controller.

mod contributions_controller;
mod contributions_model;
mod contributions_traits;
mod contributions_validation;

#[cfg(test)]
mod contributions_controller_tests;

pub use contributions_controller::{
    matches_filter, paginate, ContributionListController, CONTRIBUTION_CREATED_MESSAGE,
    CONTRIBUTION_DELETED_MESSAGE, CONTRIBUTION_UPDATED_MESSAGE, MUTATION_IN_PROGRESS_MESSAGE,
};
pub use contributions_model::{
    parse_calendar_date, AccountTypeRef, Contribution, ContributionFrequency, ContributionInput,
    ContributionPage, ContributionUpdate, NewContribution, OrganizationSnapshot, PageSize,
    ValidContribution,
};
pub use contributions_traits::ContributionRepositoryTrait;
pub use contributions_validation::{
    parse_amount, validate_contribution, validate_fields, ContributionField, ValidationMode,
};
