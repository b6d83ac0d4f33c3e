pub mod applications;
pub mod providers;

pub use applications::{
    ApplicationDraft, ApplicationId, DraftWizard, FieldErrors, StepOutcome, SubmittedApplication,
    WizardStep,
};
pub use providers::{InMemoryProviderDirectory, Provider, ProviderDirectory, ProviderFilter};
