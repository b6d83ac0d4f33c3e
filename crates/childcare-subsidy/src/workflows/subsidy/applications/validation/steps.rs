use std::collections::HashMap;

use super::fields::{self, age_on, digits_only, required, required_text};
use super::{FieldErrors, ValidationContext};
use crate::workflows::subsidy::applications::domain::{ApplicationDraft, Certification};
use crate::workflows::subsidy::applications::eligibility::required_documents;
use crate::workflows::subsidy::providers::ProviderStatus;

const MAX_NAME: usize = 50;
const MAX_STREET: usize = 100;
const ADULT_AGE: i32 = 18;

pub(super) fn personal_contact(
    draft: &ApplicationDraft,
    context: &ValidationContext<'_>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let applicant = &draft.applicant;

    required_text(
        &mut errors,
        "applicant.first_name",
        "First name",
        &applicant.first_name,
        Some(MAX_NAME),
    );
    required_text(
        &mut errors,
        "applicant.last_name",
        "Last name",
        &applicant.last_name,
        Some(MAX_NAME),
    );

    match applicant.date_of_birth {
        None => errors.insert("applicant.date_of_birth", "Date of birth is required"),
        Some(dob) if age_on(dob, context.today) < ADULT_AGE => {
            errors.insert(
                "applicant.date_of_birth",
                "Applicant must be 18 years or older",
            );
        }
        Some(_) => {}
    }

    fields::ssn(
        &mut errors,
        "applicant.ssn",
        "Social Security Number",
        &applicant.ssn,
    );
    required(
        &mut errors,
        "applicant.marital_status",
        "Marital status",
        &applicant.marital_status,
    );
    required(
        &mut errors,
        "applicant.primary_language",
        "Primary language",
        &applicant.primary_language,
    );

    let contact = &draft.contact;
    required_text(
        &mut errors,
        "contact.street_address",
        "Street address",
        &contact.street_address,
        Some(MAX_STREET),
    );
    required_text(
        &mut errors,
        "contact.city",
        "City",
        &contact.city,
        Some(MAX_NAME),
    );
    fields::zip_code(
        &mut errors,
        "contact.zip_code",
        "ZIP code",
        &contact.zip_code,
        "ZIP code must be 5 numeric digits",
    );
    if contact
        .county
        .as_deref()
        .map_or(true, |county| county.trim().is_empty())
    {
        errors.insert("contact.county", "County is required");
    }
    fields::phone(
        &mut errors,
        "contact.phone",
        "Phone number",
        &contact.phone,
        "Phone number must be 10 digits",
    );
    fields::email(&mut errors, "contact.email", "Email address", &contact.email);
    required(
        &mut errors,
        "contact.preferred_contact_method",
        "Preferred contact method",
        &contact.preferred_contact_method,
    );

    errors
}

pub(super) fn household(draft: &ApplicationDraft, context: &ValidationContext<'_>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let household = &draft.household;
    let program = context.program;

    match household.size {
        None | Some(0) => errors.insert("household.size", "Household size is required"),
        Some(size) if size > program.max_household_size => errors.insert(
            "household.size",
            format!(
                "Household size must be between 1 and {}",
                program.max_household_size
            ),
        ),
        Some(_) => {}
    }

    match household.dependents {
        None => errors.insert("household.dependents", "Number of dependents is required"),
        Some(dependents) if dependents > program.max_dependents => errors.insert(
            "household.dependents",
            format!(
                "Number of dependents must be between 0 and {}",
                program.max_dependents
            ),
        ),
        Some(dependents) if household.size.is_some_and(|size| dependents >= size) => errors.insert(
            "household.dependents",
            "Dependents must be less than household size",
        ),
        Some(_) => {}
    }

    match household.monthly_income {
        None => errors.insert(
            "household.monthly_income",
            "Monthly household income is required",
        ),
        Some(income) if !income.is_finite() || income < 0.0 => {
            errors.insert("household.monthly_income", "Income cannot be negative")
        }
        Some(income) if income > program.max_monthly_income => errors.insert(
            "household.monthly_income",
            format!(
                "Income cannot exceed ${:.0} per month",
                program.max_monthly_income
            ),
        ),
        Some(_) => {}
    }

    required(
        &mut errors,
        "household.income_frequency",
        "Income frequency",
        &household.income_frequency,
    );
    required(
        &mut errors,
        "household.primary_income_source",
        "Primary income source",
        &household.primary_income_source,
    );

    errors
}

pub(super) fn employment(draft: &ApplicationDraft, context: &ValidationContext<'_>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let employment = &draft.employment;
    let program = context.program;

    let Some(status) = employment.status else {
        errors.insert("employment.status", "Employment status is required");
        return errors;
    };

    if status.has_employer() {
        required_text(
            &mut errors,
            "employment.employer_name",
            "Employer name",
            &employment.employer_name,
            None,
        );
        required_text(
            &mut errors,
            "employment.job_title",
            "Job title",
            &employment.job_title,
            None,
        );

        let address = &employment.employer_address;
        required_text(
            &mut errors,
            "employment.employer_street",
            "Employer street address",
            &address.street,
            None,
        );
        required_text(
            &mut errors,
            "employment.employer_city",
            "Employer city",
            &address.city,
            None,
        );
        if address
            .state
            .as_deref()
            .map_or(true, |state| state.trim().is_empty())
        {
            errors.insert("employment.employer_state", "Employer state is required");
        }
        fields::zip_code(
            &mut errors,
            "employment.employer_zip",
            "Employer ZIP code",
            &address.zip_code,
            "ZIP code must be 5 digits",
        );
        fields::phone(
            &mut errors,
            "employment.employer_phone",
            "Employer phone",
            &employment.employer_phone,
            "Phone must be 10 digits",
        );

        match employment.start_date {
            None => errors.insert(
                "employment.start_date",
                "Employment start date is required",
            ),
            Some(start) if start > context.today => errors.insert(
                "employment.start_date",
                "Start date cannot be in the future",
            ),
            Some(_) => {}
        }
    }

    if status.is_working() {
        match employment.hours_per_week {
            None | Some(0) => {
                errors.insert("employment.hours_per_week", "Hours per week is required")
            }
            Some(hours) if hours > program.max_hours_per_week => errors.insert(
                "employment.hours_per_week",
                format!(
                    "Hours must be between 1 and {}",
                    program.max_hours_per_week
                ),
            ),
            Some(hours) if hours < program.min_work_hours => errors.insert(
                "employment.hours_per_week",
                format!(
                    "Minimum {} hours required for eligibility",
                    program.min_work_hours
                ),
            ),
            Some(_) => {}
        }

        match employment.gross_monthly_income {
            None => errors.insert(
                "employment.gross_monthly_income",
                "Gross monthly income is required",
            ),
            Some(income) if !income.is_finite() || income < 0.0 => errors.insert(
                "employment.gross_monthly_income",
                "Income cannot be negative",
            ),
            Some(_) => {}
        }
    }

    errors
}

pub(super) fn children(draft: &ApplicationDraft, context: &ValidationContext<'_>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let program = context.program;

    if draft.children.is_empty() {
        errors.insert("children", "At least one child is required");
        return errors;
    }
    if draft.children.len() > program.max_children {
        errors.insert(
            "children",
            format!(
                "No more than {} children may be included",
                program.max_children
            ),
        );
    }

    for (index, child) in draft.children.iter().enumerate() {
        let field = |name: &str| format!("children[{index}].{name}");

        required_text(
            &mut errors,
            &field("first_name"),
            "First name",
            &child.first_name,
            Some(MAX_NAME),
        );
        required_text(
            &mut errors,
            &field("last_name"),
            "Last name",
            &child.last_name,
            Some(MAX_NAME),
        );

        match child.date_of_birth {
            None => errors.insert(field("date_of_birth"), "Date of birth is required"),
            Some(dob) => {
                let age = age_on(dob, context.today);
                let max_age = if child.special_needs {
                    program.child_max_age_special_needs
                } else {
                    program.child_max_age
                };
                if age < 0 {
                    errors.insert(
                        field("date_of_birth"),
                        "Date of birth cannot be in the future",
                    );
                } else if (age as u32) > max_age {
                    let suffix = if child.special_needs {
                        " (special needs)"
                    } else {
                        ""
                    };
                    errors.insert(
                        field("date_of_birth"),
                        format!("Child must be {max_age} years or younger{suffix}"),
                    );
                }
            }
        }

        fields::ssn(&mut errors, &field("ssn"), "SSN", &child.ssn);
        required(
            &mut errors,
            &field("relationship"),
            "Relationship",
            &child.relationship,
        );

        if child.care_needed.is_empty() {
            errors.insert(field("care_needed"), "At least one care type is required");
        }

        match child.preferred_start_date {
            None => errors.insert(
                field("preferred_start_date"),
                "Preferred start date is required",
            ),
            Some(start) if start <= context.today => errors.insert(
                field("preferred_start_date"),
                "Start date must be in the future",
            ),
            Some(_) => {}
        }

        if child.special_needs {
            if child.special_needs_description.trim().is_empty() {
                errors.insert(
                    field("special_needs_description"),
                    "Special needs description is required",
                );
            } else if child.special_needs_description.chars().count()
                > program.max_special_needs_description
            {
                errors.insert(
                    field("special_needs_description"),
                    format!(
                        "Description must be {} characters or less",
                        program.max_special_needs_description
                    ),
                );
            }
        }
    }

    flag_duplicate_ssns(draft, &mut errors);
    errors
}

/// Every child sharing a normalized SSN with another child is flagged.
fn flag_duplicate_ssns(draft: &ApplicationDraft, errors: &mut FieldErrors) {
    let mut by_ssn: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, child) in draft.children.iter().enumerate() {
        let ssn = digits_only(&child.ssn);
        if ssn.len() == 9 {
            by_ssn.entry(ssn).or_default().push(index);
        }
    }

    for indices in by_ssn.values().filter(|indices| indices.len() > 1) {
        for index in indices {
            errors.insert(
                format!("children[{index}].ssn"),
                "Duplicate SSN - each child must have a unique SSN",
            );
        }
    }
}

pub(super) fn provider(draft: &ApplicationDraft, context: &ValidationContext<'_>) -> FieldErrors {
    const FIELD: &str = "provider_selection.provider_id";

    let selected = draft
        .provider_selection
        .as_ref()
        .map(|selection| selection.provider_id.trim())
        .filter(|id| !id.is_empty());

    let Some(provider_id) = selected else {
        return FieldErrors::single(FIELD, "Please select a childcare provider to continue");
    };

    match context.providers.find_provider(provider_id) {
        None => FieldErrors::single(FIELD, "Selected provider not found"),
        Some(provider) if provider.status != ProviderStatus::Active => {
            FieldErrors::single(FIELD, "Selected provider is no longer active")
        }
        Some(provider) if !provider.accepts_subsidy => {
            FieldErrors::single(FIELD, "Selected provider does not accept subsidies")
        }
        Some(_) => FieldErrors::new(),
    }
}

pub(super) fn documents(draft: &ApplicationDraft, _context: &ValidationContext<'_>) -> FieldErrors {
    let missing: Vec<String> = required_documents(draft.employment.status, &draft.children)
        .into_iter()
        .filter(|requirement| draft.document(requirement.kind).is_none())
        .map(|requirement| requirement.label)
        .collect();

    if missing.is_empty() {
        FieldErrors::new()
    } else {
        FieldErrors::single(
            "documents",
            format!("Missing required documents: {}", missing.join(", ")),
        )
    }
}

pub(super) fn certification(
    draft: &ApplicationDraft,
    _context: &ValidationContext<'_>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for certification in Certification::ALL {
        if !draft.certifications.is_acknowledged(certification) {
            errors.insert(
                format!("certifications.{}", certification.key()),
                format!("You must agree to the {}", certification.label()),
            );
        }
    }

    let signature = draft.signature.full_name.trim();
    if signature.is_empty() {
        errors.insert("signature.full_name", "Electronic signature is required");
    } else {
        let expected = draft.applicant.full_name();
        if !expected.is_empty() && signature.to_lowercase() != expected.to_lowercase() {
            errors.insert(
                "signature.full_name",
                format!("Signature must match your full legal name: {expected}"),
            );
        }
    }

    if draft.signature.date.is_none() {
        errors.insert("signature.date", "Signature date is required");
    }

    errors
}
