//! Form module - the contribution wizard and its search helpers.

mod contribution_form;
mod search;


pub use contribution_form::{
    ConfirmationKind, ConfirmationPrompt, ContributionForm, FormMode, FormStep, FormSubmission,
};
pub use search::{filter_account_types, filter_enseignes};
