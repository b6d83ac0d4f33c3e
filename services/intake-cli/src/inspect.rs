use childcare_subsidy::config::AppConfig;
use childcare_subsidy::error::AppError;
use childcare_subsidy::workflows::subsidy::applications::{
    annual_fpl_threshold, document_progress, poverty_level_percentage, required_documents, Child,
    EmploymentStatus, JsonFileSnapshotStore, ReviewSummary, SnapshotError, SnapshotStore,
    WizardError,
};
use clap::Args;
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct EligibilityArgs {
    /// Number of people in the household
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=20))]
    pub(crate) household_size: u8,
    /// Gross monthly household income in dollars
    #[arg(long)]
    pub(crate) monthly_income: f64,
}

#[derive(Args, Debug)]
pub(crate) struct DocumentsArgs {
    /// Employment status label, e.g. "Full-Time" or "Unemployed"
    #[arg(long, value_parser = crate::infra::parse_employment_status)]
    pub(crate) status: EmploymentStatus,
    /// Number of children on the application
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub(crate) children: u8,
    /// At least one child has special needs
    #[arg(long)]
    pub(crate) special_needs: bool,
}

pub(crate) fn print_eligibility(config: &AppConfig, args: EligibilityArgs) {
    let program = &config.program;
    let threshold = annual_fpl_threshold(program, args.household_size);

    println!(
        "Household of {} | poverty guideline ${} per year",
        args.household_size, threshold
    );
    match poverty_level_percentage(program, args.household_size, args.monthly_income) {
        Some(percentage) => {
            println!(
                "Monthly income ${:.2} is {}% of the federal poverty level",
                args.monthly_income, percentage
            );
            if percentage <= program.fpl_ceiling_percentage {
                println!(
                    "Within the {}% program ceiling: likely eligible",
                    program.fpl_ceiling_percentage
                );
            } else {
                println!(
                    "Above the {}% program ceiling: eligibility unlikely",
                    program.fpl_ceiling_percentage
                );
            }
        }
        None => println!("Enter a positive monthly income to estimate eligibility"),
    }
}

pub(crate) fn print_document_checklist(args: DocumentsArgs) {
    let mut children: Vec<Child> = (1..=args.children)
        .map(|index| Child::blank(format!("child-{index}")))
        .collect();
    if let Some(first) = children.first_mut() {
        first.special_needs = args.special_needs;
    }

    let documents = required_documents(Some(args.status), &children);
    println!(
        "Required documents for {} with {} child(ren): {}",
        args.status.label(),
        args.children,
        documents.len()
    );
    for document in documents {
        let marker = if document.conditional { " (conditional)" } else { "" };
        println!("- {}{}: {}", document.label, marker, document.description);
    }
}

pub(crate) fn show_draft(config: &AppConfig) -> Result<(), AppError> {
    let store = JsonFileSnapshotStore::new(&config.snapshots.directory);

    let draft = match store.load_snapshot() {
        Ok(Some(draft)) => draft,
        Ok(None) => {
            println!("No draft stored at {}", store.path().display());
            return Ok(());
        }
        Err(SnapshotError::Malformed(err)) => {
            warn!(error = %err, "stored draft is unreadable");
            println!(
                "Stored draft at {} could not be read; it will be replaced by the next draft",
                store.path().display()
            );
            return Ok(());
        }
        Err(err) => return Err(WizardError::from(err).into()),
    };

    println!("Draft stored at {}", store.path().display());
    println!(
        "Step {}/8: {}",
        draft.current_step.index() + 1,
        draft.current_step.label()
    );
    println!("Started {}", draft.created_at.format("%Y-%m-%d %H:%M UTC"));
    match draft.last_saved {
        Some(saved) => println!("Last saved {}", saved.format("%Y-%m-%d %H:%M UTC")),
        None => println!("Not edited yet"),
    }

    let applicant = draft.applicant.full_name();
    if !applicant.is_empty() {
        println!("Applicant: {applicant}");
    }
    if let Some(percentage) = draft.household.fpl_percentage {
        println!("Household at {percentage}% of the federal poverty level");
    }

    let progress = document_progress(&draft);
    println!(
        "Documents: {}/{} uploaded ({:.0}%)",
        progress.satisfied,
        progress.required,
        progress.ratio() * 100.0
    );

    println!("Sections");
    for status in ReviewSummary::for_draft(&draft).sections {
        let mark = if status.complete { "x" } else { " " };
        println!("  [{}] {}", mark, status.section.label());
    }

    Ok(())
}

pub(crate) fn discard_draft(config: &AppConfig) -> Result<(), AppError> {
    let store = JsonFileSnapshotStore::new(&config.snapshots.directory);
    store.clear_snapshot().map_err(WizardError::from)?;
    println!("Removed any draft stored at {}", store.path().display());
    Ok(())
}
