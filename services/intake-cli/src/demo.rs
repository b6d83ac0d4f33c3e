use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, Duration, Local, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use childcare_subsidy::config::AppConfig;
use childcare_subsidy::error::AppError;
use childcare_subsidy::workflows::subsidy::applications::{
    Applicant, ApplicationStatus, CareType, Certifications, Contact, ContactMethod, DocumentKind,
    DraftPatch, EmployerAddress, Employment, EmploymentStatus, FieldErrors, FixedClock, Household,
    IncomeFrequency, IncomeSource, JsonFileSnapshotStore, MaritalStatus, PrimaryLanguage,
    Relationship, Signature, StepOutcome, SubmittedApplication, WizardError,
};
use childcare_subsidy::workflows::subsidy::{
    DraftWizard, InMemoryProviderDirectory, ProviderDirectory, ProviderFilter,
};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::infra::{sample_providers, InMemoryApplicationStore};

type DemoWizard =
    DraftWizard<JsonFileSnapshotStore, InMemoryProviderDirectory, InMemoryApplicationStore>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Provider roster CSV. Defaults to a small built-in directory.
    #[arg(long)]
    pub(crate) providers: Option<PathBuf>,
    /// Date the demo runs on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Stop at the review step and leave the draft on disk instead of submitting.
    #[arg(long)]
    pub(crate) keep_draft: bool,
}

pub(crate) fn run_demo(config: &AppConfig, args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        providers,
        today,
        keep_draft,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let clock = Arc::new(FixedClock::new(
        Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN)) + Duration::hours(9),
    ));

    let directory = match providers {
        Some(path) => InMemoryProviderDirectory::from_csv_path(path)?,
        None => InMemoryProviderDirectory::new(sample_providers()),
    };
    let snapshots = Arc::new(JsonFileSnapshotStore::new(&config.snapshots.directory));
    let records = Arc::new(InMemoryApplicationStore::new(today.year()));
    let providers = Arc::new(directory);

    let mut wizard = DraftWizard::with_clock(
        snapshots.clone(),
        providers.clone(),
        records,
        Arc::new(config.program.clone()),
        clock.clone(),
    );

    println!("Childcare subsidy application demo ({today})");
    println!("Draft snapshot: {}", snapshots.path().display());
    info!(providers = providers.len(), "provider directory loaded");

    if let Some(existing) = wizard.resume()? {
        println!(
            "Found a saved draft on '{}'; discarding it for a fresh run",
            existing.current_step.label()
        );
        wizard.discard()?;
    }
    wizard.start()?;

    println!("\nPersonal & contact details");
    advance(&mut wizard)?;
    wizard.edit(personal_details(today))?;
    advance(&mut wizard)?;

    println!("\nHousehold");
    wizard.edit(DraftPatch::household(Household {
        size: Some(3),
        dependents: Some(2),
        monthly_income: Some(2450.0),
        income_frequency: Some(IncomeFrequency::BiWeekly),
        primary_income_source: Some(IncomeSource::Employment),
        fpl_percentage: None,
    }))?;
    if let Some(assessment) = wizard.eligibility()? {
        let verdict = if assessment.within_ceiling {
            "within"
        } else {
            "above"
        };
        println!(
            "- Income is {}% of the poverty level ({} the {}% ceiling)",
            assessment.fpl_percentage, verdict, assessment.ceiling
        );
    }
    advance(&mut wizard)?;

    println!("\nEmployment");
    wizard.edit(DraftPatch::employment(employment(today)))?;
    advance(&mut wizard)?;

    println!("\nChildren");
    let mut child = wizard
        .draft()
        .and_then(|draft| draft.children.first().cloned())
        .ok_or(WizardError::NoActiveDraft)?;
    child.first_name = "Ava".to_string();
    child.last_name = "Doe".to_string();
    child.date_of_birth = Some(years_before(today, 4));
    child.ssn = "987-65-4321".to_string();
    child.relationship = Some(Relationship::Child);
    child.care_needed = BTreeSet::from([CareType::FullTime]);
    child.preferred_start_date = Some(today + Duration::days(21));
    wizard.edit(DraftPatch::children(vec![child]))?;
    advance(&mut wizard)?;

    println!("\nProvider");
    let eligible = providers.list_providers(&ProviderFilter::subsidy_eligible());
    println!("- {} subsidy-eligible providers listed", eligible.len());
    let Some(provider) = eligible.first() else {
        println!("  No provider accepts subsidy payments; stopping with the draft saved");
        return Ok(());
    };
    let errors = wizard.select_provider(&provider.id)?;
    print_errors(&errors);
    println!("- Selected {} ({})", provider.name, provider.formatted_address());
    advance(&mut wizard)?;

    println!("\nDocuments");
    upload(&mut wizard, DocumentKind::IncomeProof, "pay-stub-notes.txt")?;
    for requirement in wizard.required_documents()? {
        let name = sample_file_name(requirement.kind);
        upload(&mut wizard, requirement.kind, &name)?;
        clock.advance(Duration::minutes(1));
    }
    let progress = wizard.document_progress()?;
    println!(
        "- {}/{} required documents uploaded",
        progress.satisfied, progress.required
    );
    advance(&mut wizard)?;

    println!("\nCertification");
    wizard.edit(DraftPatch {
        certifications: Some(Certifications::all_acknowledged()),
        signature: Some(Signature {
            full_name: "Jane Doe".to_string(),
            date: Some(today),
        }),
        ..DraftPatch::default()
    })?;
    advance(&mut wizard)?;

    println!("\nReview");
    for status in wizard.review()?.sections {
        let mark = if status.complete { "x" } else { " " };
        println!("  [{}] {}", mark, status.section.label());
    }
    if advance(&mut wizard)? != StepOutcome::ConfirmSubmission {
        println!("Review did not pass; the draft stays saved for correction");
        return Ok(());
    }

    if keep_draft {
        println!("Draft kept at {} without submitting", snapshots.path().display());
        return Ok(());
    }

    clock.advance(Duration::minutes(5));
    let submitted = wizard.submit()?;
    print_submission(&submitted);

    Ok(())
}

fn advance(wizard: &mut DemoWizard) -> Result<StepOutcome, AppError> {
    let outcome = wizard.next()?;
    match &outcome {
        StepOutcome::Advanced { from, to } => {
            println!("- {} -> {}", from.label(), to.label());
        }
        StepOutcome::Blocked { step, errors } => {
            println!("- {} blocked by {} error(s)", step.label(), errors.len());
            print_errors(errors);
        }
        StepOutcome::ConfirmSubmission => println!("- Review passed; ready to submit"),
    }
    Ok(outcome)
}

fn upload(wizard: &mut DemoWizard, kind: DocumentKind, name: &str) -> Result<(), AppError> {
    let mime = mime_guess::from_path(name).first_or_octet_stream();
    let size_bytes = 180_000 + name.len() as u64 * 1_000;
    let errors = wizard.register_upload(kind, name, size_bytes, mime.essence_str())?;

    if errors.is_empty() {
        println!("- Uploaded {name} ({})", mime.essence_str());
    } else {
        println!("- Rejected {name}");
        print_errors(&errors);
    }
    Ok(())
}

fn print_errors(errors: &FieldErrors) {
    for (field, message) in errors.iter() {
        println!("    {field}: {message}");
    }
}

fn sample_file_name(kind: DocumentKind) -> String {
    let extension = match kind {
        DocumentKind::IdentityDocument => "jpg",
        DocumentKind::ResidencyProof | DocumentKind::Immunization { .. } => "png",
        _ => "pdf",
    };
    format!("{}.{}", kind.code().replace('_', "-"), extension)
}

fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(years * 12)).unwrap_or(date)
}

fn personal_details(today: NaiveDate) -> DraftPatch {
    DraftPatch {
        applicant: Some(Applicant {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: Some(years_before(today, 34)),
            ssn: "123-45-6789".to_string(),
            marital_status: Some(MaritalStatus::Single),
            primary_language: Some(PrimaryLanguage::English),
            ..Applicant::default()
        }),
        contact: Some(Contact {
            street_address: "42 Oak Ave".to_string(),
            city: "Columbus".to_string(),
            zip_code: "43215".to_string(),
            county: Some("Franklin".to_string()),
            phone: "(614) 555-0142".to_string(),
            email: "jane.doe@example.org".to_string(),
            preferred_contact_method: Some(ContactMethod::Email),
            ..Contact::default()
        }),
        ..DraftPatch::default()
    }
}

fn employment(today: NaiveDate) -> Employment {
    Employment {
        status: Some(EmploymentStatus::PartTime),
        employer_name: "Acme Foods".to_string(),
        job_title: "Cashier".to_string(),
        employer_address: EmployerAddress {
            street: "9 Market St".to_string(),
            city: "Columbus".to_string(),
            state: Some("OH".to_string()),
            zip_code: "43215".to_string(),
        },
        employer_phone: "614-555-0199".to_string(),
        start_date: Some(years_before(today, 2)),
        hours_per_week: Some(30),
        gross_monthly_income: Some(2450.0),
        schedule: Vec::new(),
    }
}

/// Submission payload with identifying numbers left out.
#[derive(Serialize)]
struct SubmissionView<'a> {
    id: &'a str,
    status: ApplicationStatus,
    submitted_at: String,
    applicant: String,
    children: usize,
    provider: Option<&'a str>,
    documents: usize,
    fpl_percentage: Option<u32>,
}

fn print_submission(submitted: &SubmittedApplication) {
    println!("\nSubmitted application {}", submitted.id);
    for entry in &submitted.history {
        println!(
            "- {} by {} at {}",
            entry.action,
            entry.performed_by,
            entry.timestamp.format("%Y-%m-%d %H:%M UTC")
        );
    }

    let application = &submitted.application;
    let view = SubmissionView {
        id: &submitted.id.0,
        status: submitted.status,
        submitted_at: submitted.submitted_at.to_rfc3339(),
        applicant: application.applicant.full_name(),
        children: application.children.len(),
        provider: application
            .provider_selection
            .as_ref()
            .map(|selection| selection.provider_name.as_str()),
        documents: application.documents.len(),
        fpl_percentage: application.household.fpl_percentage,
    };
    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("Submission payload (identifiers redacted):\n{}", json),
        Err(err) => println!("Submission payload unavailable: {}", err),
    }
}
