//! Childcare subsidy application drafts.
//!
//! A parent fills in an [`ApplicationDraft`] one [`WizardStep`] at a time through a
//! [`DraftWizard`]. Each step is guarded by a pure validator from [`validation`]; the
//! document checklist and poverty-level figures come from [`eligibility`]. Persistence of
//! the in-progress draft and of submitted applications sits behind the traits in
//! [`repository`].

pub mod domain;
pub mod eligibility;
pub mod repository;
pub mod review;
pub mod snapshot;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    Applicant, ApplicationDraft, ApplicationId, ApplicationStatus, CareType, Certification,
    Certifications, Child, Contact, ContactMethod, DocumentKind, DocumentRecord, DraftPatch,
    EmployerAddress, Employment, EmploymentStatus, HistoryEntry, Household, IncomeFrequency,
    IncomeSource, MaritalStatus, PrimaryLanguage, ProviderSelection, Relationship, Signature,
    StatusChangeError, SubmittedApplication, VerificationStatus, WizardStep, WorkShift,
};
pub use eligibility::{
    annual_fpl_threshold, assess_household, document_progress, poverty_level_percentage,
    required_documents, section_visibility, DocumentProgress, EligibilityAssessment,
    RequiredDocument, SectionVisibility,
};
pub use repository::{
    ApplicationRecordStore, RepositoryError, SnapshotError, SnapshotStore, DRAFT_SNAPSHOT_KEY,
};
pub use review::{ReviewSection, ReviewSummary, SectionStatus};
pub use snapshot::{JsonFileSnapshotStore, MemorySnapshotStore};
pub use validation::{validate_all, validate_step, FieldErrors, ValidationContext};
pub use wizard::{Clock, DraftWizard, FixedClock, StepOutcome, SystemClock, WizardError};
