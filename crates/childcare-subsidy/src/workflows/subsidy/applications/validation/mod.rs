//! Per-step field validation.
//!
//! Every validator is a pure function of the draft and a [`ValidationContext`] and reports
//! problems as a [`FieldErrors`] mapping; an empty mapping means the step passes. Nothing in
//! this module returns `Err` for invalid input.

mod fields;
mod steps;

use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationDraft, WizardStep};
use crate::config::ProgramConfig;
use crate::workflows::subsidy::providers::ProviderDirectory;

pub use fields::{age_on, digits_only};

/// Field path to human-readable message. Absence of a key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Later messages for the same field replace earlier ones.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }
}

impl IntoIterator for FieldErrors {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Read-only inputs every validator may consult.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub program: &'a ProgramConfig,
    pub providers: &'a dyn ProviderDirectory,
    pub today: NaiveDate,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        program: &'a ProgramConfig,
        providers: &'a dyn ProviderDirectory,
        today: NaiveDate,
    ) -> Self {
        Self {
            program,
            providers,
            today,
        }
    }
}

pub type StepValidator = fn(&ApplicationDraft, &ValidationContext<'_>) -> FieldErrors;

/// Validators indexed by `WizardStep::index`.
const STEP_VALIDATORS: [StepValidator; 8] = [
    steps::personal_contact,
    steps::household,
    steps::employment,
    steps::children,
    steps::provider,
    steps::documents,
    steps::certification,
    review,
];

pub fn validator_for(step: WizardStep) -> StepValidator {
    STEP_VALIDATORS[step.index()]
}

pub fn validate_step(
    step: WizardStep,
    draft: &ApplicationDraft,
    context: &ValidationContext<'_>,
) -> FieldErrors {
    validator_for(step)(draft, context)
}

/// Union of every step before Review.
pub fn validate_all(draft: &ApplicationDraft, context: &ValidationContext<'_>) -> FieldErrors {
    review(draft, context)
}

fn review(draft: &ApplicationDraft, context: &ValidationContext<'_>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for validator in &STEP_VALIDATORS[..WizardStep::Review.index()] {
        errors.extend(validator(draft, context));
    }
    errors
}
