//! Three-step contribution wizard.
//!
//! 1. Identification: account type and institution
//! 2. Conditions: amount, frequency and start date
//! 3. Sharing: beneficiary and shared flag
//!
//! The form never talks to the store. On confirmed submission it hands the
//! validated payload to the caller's callback.

use chrono::NaiveDate;
use log::debug;

use crate::contributions::{
    parse_calendar_date, validate_contribution, validate_fields, Contribution, ContributionField,
    ContributionFrequency, ContributionInput, ValidContribution, ValidationMode,
};
use crate::errors::{Error, FieldErrors, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Identification,
    Conditions,
    Sharing,
}

impl FormStep {
    /// Fields validated before leaving this step.
    pub fn fields(&self) -> &'static [ContributionField] {
        match self {
            FormStep::Identification => &[
                ContributionField::AccountTypeId,
                ContributionField::EnseigneId,
            ],
            FormStep::Conditions => &[
                ContributionField::Amount,
                ContributionField::Frequency,
                ContributionField::StartDate,
            ],
            FormStep::Sharing => &[ContributionField::BeneficiaryId, ContributionField::IsShared],
        }
    }

    pub fn next(&self) -> Option<FormStep> {
        match self {
            FormStep::Identification => Some(FormStep::Conditions),
            FormStep::Conditions => Some(FormStep::Sharing),
            FormStep::Sharing => None,
        }
    }

    pub fn previous(&self) -> Option<FormStep> {
        match self {
            FormStep::Identification => None,
            FormStep::Conditions => Some(FormStep::Identification),
            FormStep::Sharing => Some(FormStep::Conditions),
        }
    }

    /// 1-based position, for the step indicator.
    pub fn number(&self) -> usize {
        match self {
            FormStep::Identification => 1,
            FormStep::Conditions => 2,
            FormStep::Sharing => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationKind {
    Create,
    Update,
}

/// Prompt shown before a submission is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub kind: ConfirmationKind,
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
}

impl ConfirmationPrompt {
    fn for_mode(mode: &FormMode) -> Self {
        match mode {
            FormMode::Create => ConfirmationPrompt {
                kind: ConfirmationKind::Create,
                title: "Ajouter ce versement ?",
                message: "Le versement sera ajouté à votre épargne.",
                confirm_label: "Ajouter",
            },
            FormMode::Edit { .. } => ConfirmationPrompt {
                kind: ConfirmationKind::Update,
                title: "Mettre à jour ce versement ?",
                message: "Les modifications remplaceront les valeurs actuelles du versement.",
                confirm_label: "Mettre à jour",
            },
        }
    }
}

/// Values handed to the submit callback.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub mode: FormMode,
    pub contribution: ValidContribution,
}

pub struct ContributionForm {
    step: FormStep,
    mode: FormMode,
    values: ContributionInput,
    errors: FieldErrors,
    has_active_collaboration: bool,
    pending_confirmation: Option<ConfirmationPrompt>,
}

impl ContributionForm {
    /// A form in create mode with default values.
    pub fn new(today: NaiveDate, has_active_collaboration: bool) -> Self {
        let mut form = ContributionForm {
            step: FormStep::Identification,
            mode: FormMode::Create,
            values: ContributionInput::default(),
            errors: FieldErrors::new(),
            has_active_collaboration,
            pending_confirmation: None,
        };
        form.start_create(today);
        form
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn values(&self) -> &ContributionInput {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    /// The shared toggle is offered only to users with an accepted collaboration.
    pub fn show_sharing_toggle(&self) -> bool {
        self.has_active_collaboration
    }

    pub fn set_has_active_collaboration(&mut self, active: bool) {
        self.has_active_collaboration = active;
    }

    fn validation_mode(&self) -> ValidationMode {
        match (&self.mode, &self.values.account_type_id) {
            (FormMode::Edit { .. }, None) => ValidationMode::EditInProgress,
            _ => ValidationMode::Create,
        }
    }

    /// Resets to an empty creation form.
    pub fn start_create(&mut self, today: NaiveDate) {
        self.mode = FormMode::Create;
        self.step = FormStep::Identification;
        self.values = ContributionInput {
            frequency: ContributionFrequency::Monthly.label().to_string(),
            start_date: Some(today),
            is_shared: Some(false),
            ..ContributionInput::default()
        };
        self.errors.clear();
        self.pending_confirmation = None;
    }

    /// Pre-fills every field from an existing contribution.
    pub fn start_edit(&mut self, contribution: &Contribution) {
        debug!("Editing contribution {}", contribution.id);
        self.mode = FormMode::Edit {
            id: contribution.id.clone(),
        };
        self.step = FormStep::Identification;
        self.values = ContributionInput::from(contribution);
        self.errors.clear();
        self.pending_confirmation = None;
    }

    fn touch(&mut self, field: ContributionField) {
        self.errors.remove(field.as_str());
    }

    fn optional(value: Option<String>) -> Option<String> {
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn set_account_type(&mut self, id: Option<String>) {
        self.values.account_type_id = Self::optional(id);
        self.touch(ContributionField::AccountTypeId);
    }

    pub fn set_enseigne(&mut self, id: Option<String>) {
        self.values.enseigne_id = Self::optional(id);
        self.touch(ContributionField::EnseigneId);
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.values.amount = amount.into();
        self.touch(ContributionField::Amount);
    }

    pub fn set_frequency(&mut self, frequency: impl Into<String>) {
        self.values.frequency = frequency.into();
        self.touch(ContributionField::Frequency);
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>) {
        self.values.start_date = date;
        self.touch(ContributionField::StartDate);
    }

    /// Sets the start date from text. An unparsable value clears the date and
    /// records a field error.
    pub fn set_start_date_text(&mut self, text: &str) {
        match parse_calendar_date(text) {
            Ok(date) => self.set_start_date(Some(date)),
            Err(_) => {
                self.values.start_date = None;
                self.errors.add(ContributionField::StartDate.as_str(), "Date invalide");
            }
        }
    }

    pub fn set_beneficiary(&mut self, id: Option<String>) {
        self.values.beneficiary_id = Self::optional(id);
        self.touch(ContributionField::BeneficiaryId);
    }

    pub fn set_shared(&mut self, shared: bool) {
        self.values.is_shared = Some(shared);
        self.touch(ContributionField::IsShared);
    }

    pub fn set_logo_url(&mut self, url: Option<String>) {
        self.values.logo_url = Self::optional(url);
        self.touch(ContributionField::LogoUrl);
    }

    /// Validates the current step and advances when it is valid.
    ///
    /// On failure the form stays on the step and the field errors are kept for
    /// inline display.
    pub fn next(&mut self) -> std::result::Result<FormStep, FieldErrors> {
        let fields = self.step.fields();
        for field in fields {
            self.touch(*field);
        }
        if let Err(errors) = validate_fields(&self.values, fields, self.validation_mode()) {
            debug!(
                "Step {} blocked by {} invalid field(s)",
                self.step.number(),
                errors.len()
            );
            self.errors.extend(errors.clone());
            return Err(errors);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> FormStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Asks for confirmation before submitting. Only available on the last step.
    pub fn request_submit(&mut self) -> Option<&ConfirmationPrompt> {
        if self.step != FormStep::Sharing {
            return None;
        }
        self.pending_confirmation = Some(ConfirmationPrompt::for_mode(&self.mode));
        self.pending_confirmation.as_ref()
    }

    pub fn pending_confirmation(&self) -> Option<&ConfirmationPrompt> {
        self.pending_confirmation.as_ref()
    }

    pub fn cancel_submit(&mut self) {
        self.pending_confirmation = None;
    }

    /// Validates every field and passes the payload to `on_submit`.
    ///
    /// Requires a prior `request_submit`. The callback's return value (usually
    /// a future performing the store call) is returned as-is.
    pub fn confirm_submit<R>(&mut self, on_submit: impl FnOnce(FormSubmission) -> R) -> Result<R> {
        if self.pending_confirmation.take().is_none() {
            return Err(Error::Unexpected(
                "Submission was not confirmed".to_string(),
            ));
        }

        if !self.show_sharing_toggle() {
            self.values.is_shared = Some(false);
        }

        let contribution = match validate_contribution(&self.values, self.validation_mode()) {
            Ok(valid) => valid,
            Err(errors) => {
                self.errors.extend(errors.clone());
                if let Some(step) = self.first_step_with_errors() {
                    self.step = step;
                }
                return Err(errors.into());
            }
        };

        Ok(on_submit(FormSubmission {
            mode: self.mode.clone(),
            contribution,
        }))
    }

    fn first_step_with_errors(&self) -> Option<FormStep> {
        [FormStep::Identification, FormStep::Conditions, FormStep::Sharing]
            .into_iter()
            .find(|step| step.fields().iter().any(|f| self.errors.contains(f.as_str())))
    }
}
