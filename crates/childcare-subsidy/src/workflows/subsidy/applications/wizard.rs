use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::domain::{
    ApplicationDraft, ApplicationId, Child, DocumentKind, DocumentRecord, DraftPatch,
    ProviderSelection, SubmittedApplication, VerificationStatus, WizardStep,
};
use super::eligibility::{
    assess_household, document_progress, poverty_level_percentage, required_documents,
    DocumentProgress, EligibilityAssessment, RequiredDocument,
};
use super::repository::{ApplicationRecordStore, RepositoryError, SnapshotError, SnapshotStore};
use super::review::ReviewSummary;
use super::validation::{validate_step, FieldErrors, ValidationContext};
use crate::config::ProgramConfig;
use crate::workflows::subsidy::providers::ProviderDirectory;

/// Source of "now" for timestamps and age checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and scripted runs.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.lock().expect("clock mutex poisoned") = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().expect("clock mutex poisoned")
    }
}

/// Result of asking the wizard to move forward.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advanced { from: WizardStep, to: WizardStep },
    /// The active step failed validation; the draft stays where it is.
    Blocked {
        step: WizardStep,
        errors: FieldErrors,
    },
    /// Review passed. Call `submit` to finish.
    ConfirmSubmission,
}

/// Misuse of the wizard or a collaborator failure. Invalid input is never reported here.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("no application draft is open")]
    NoActiveDraft,
    #[error("an application draft is already open")]
    DraftInProgress,
    #[error("submission has not been confirmed from the review step")]
    ConfirmationRequired,
    #[error("an application may list at most {max} children")]
    TooManyChildren { max: usize },
    #[error("an application must list at least one child")]
    LastChild,
    #[error("child {index} does not exist (draft lists {len})")]
    ChildIndex { index: usize, len: usize },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

enum WizardState {
    NoDraft,
    Editing {
        draft: ApplicationDraft,
        errors: FieldErrors,
        confirmation_pending: bool,
    },
    Submitted {
        id: ApplicationId,
        /// The snapshot outlived the submission and must be cleared before another draft opens.
        stale_snapshot: bool,
    },
}

/// State holder driving one applicant's draft from creation to submission.
pub struct DraftWizard<S, P, R> {
    snapshots: Arc<S>,
    providers: Arc<P>,
    records: Arc<R>,
    program: Arc<ProgramConfig>,
    clock: Arc<dyn Clock>,
    state: WizardState,
}

impl<S, P, R> DraftWizard<S, P, R>
where
    S: SnapshotStore + 'static,
    P: ProviderDirectory + 'static,
    R: ApplicationRecordStore + 'static,
{
    pub fn new(
        snapshots: Arc<S>,
        providers: Arc<P>,
        records: Arc<R>,
        program: Arc<ProgramConfig>,
    ) -> Self {
        Self::with_clock(snapshots, providers, records, program, Arc::new(SystemClock))
    }

    pub fn with_clock(
        snapshots: Arc<S>,
        providers: Arc<P>,
        records: Arc<R>,
        program: Arc<ProgramConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            snapshots,
            providers,
            records,
            program,
            clock,
            state: WizardState::NoDraft,
        }
    }

    pub fn draft(&self) -> Option<&ApplicationDraft> {
        match &self.state {
            WizardState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Errors from the last blocked `next`, cleared by `back` and by the next successful move.
    pub fn errors(&self) -> Option<&FieldErrors> {
        match &self.state {
            WizardState::Editing { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn current_step(&self) -> Option<WizardStep> {
        self.draft().map(|draft| draft.current_step)
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        matches!(
            self.state,
            WizardState::Editing {
                confirmation_pending: true,
                ..
            }
        )
    }

    /// Identifier of the application submitted by this wizard, once finished.
    pub fn last_submitted(&self) -> Option<&ApplicationId> {
        match &self.state {
            WizardState::Submitted { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn program(&self) -> &ProgramConfig {
        &self.program
    }

    /// Create a fresh draft on the first step and persist it.
    pub fn start(&mut self) -> Result<&ApplicationDraft, WizardError> {
        self.ensure_idle()?;

        let draft = ApplicationDraft::new(self.clock.now());
        self.snapshots.save_snapshot(&draft)?;
        info!(created_at = %draft.created_at, "started application draft");

        self.enter_editing(draft);
        self.draft().ok_or(WizardError::NoActiveDraft)
    }

    /// Load the persisted draft, if one exists and can be decoded.
    pub fn resume(&mut self) -> Result<Option<&ApplicationDraft>, WizardError> {
        self.ensure_idle()?;

        let draft = match self.snapshots.load_snapshot() {
            Ok(Some(draft)) => draft,
            Ok(None) => return Ok(None),
            Err(SnapshotError::Malformed(err)) => {
                warn!(error = %err, "stored draft is unreadable; treating it as absent");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        info!(step = draft.current_step.label(), "resumed application draft");
        self.enter_editing(draft);
        Ok(self.draft())
    }

    /// The open draft, else the stored one, else a new one.
    pub fn open(&mut self) -> Result<&ApplicationDraft, WizardError> {
        if self.draft().is_none() && self.resume()?.is_none() {
            self.start()?;
        }
        self.draft().ok_or(WizardError::NoActiveDraft)
    }

    /// Merge `patch` into the draft without moving between steps.
    ///
    /// A new children list without an explicit documents list carries each per-child upload
    /// along with its child, matched by child id. Uploads of children no longer listed are dropped.
    pub fn edit(&mut self, mut patch: DraftPatch) -> Result<&ApplicationDraft, WizardError> {
        let max_children = self.program.max_children;
        if let Some(children) = &patch.children {
            if children.len() > max_children {
                return Err(WizardError::TooManyChildren { max: max_children });
            }
            if children.is_empty() {
                return Err(WizardError::LastChild);
            }
        }

        let touches_household = patch.touches_household();
        let now = self.clock.now();
        let program = Arc::clone(&self.program);
        let snapshots = Arc::clone(&self.snapshots);

        let (draft, _, confirmation_pending) = self.editing_mut()?;
        if patch.documents.is_none() {
            if let Some(children) = &patch.children {
                patch.documents = Some(remap_child_documents(
                    &draft.documents,
                    &draft.children,
                    children,
                ));
            }
        }
        draft.merge(patch);
        if touches_household {
            let household = &mut draft.household;
            household.fpl_percentage = match (household.size, household.monthly_income) {
                (Some(size), Some(income)) => poverty_level_percentage(&program, size, income),
                _ => None,
            };
        }
        draft.last_saved = Some(now);
        *confirmation_pending = false;
        snapshots.save_snapshot(draft)?;
        debug!(step = draft.current_step.label(), "merged draft edit");

        Ok(&*draft)
    }

    /// Validate the active step and advance when it passes.
    pub fn next(&mut self) -> Result<StepOutcome, WizardError> {
        let today = self.clock.today();
        let now = self.clock.now();
        let program = Arc::clone(&self.program);
        let providers = Arc::clone(&self.providers);
        let snapshots = Arc::clone(&self.snapshots);

        let (draft, errors, confirmation_pending) = self.editing_mut()?;
        let step = draft.current_step;
        let context = ValidationContext::new(&program, providers.as_ref(), today);
        let found = validate_step(step, draft, &context);

        if !found.is_empty() {
            debug!(step = step.label(), errors = found.len(), "step blocked by validation");
            *errors = found.clone();
            *confirmation_pending = false;
            return Ok(StepOutcome::Blocked {
                step,
                errors: found,
            });
        }

        *errors = FieldErrors::new();
        let Some(to) = step.next() else {
            *confirmation_pending = true;
            debug!("review passed; awaiting submission confirmation");
            return Ok(StepOutcome::ConfirmSubmission);
        };

        draft.current_step = to;
        draft.last_saved = Some(now);
        snapshots.save_snapshot(draft)?;
        debug!(from = step.label(), to = to.label(), "advanced step");

        Ok(StepOutcome::Advanced { from: step, to })
    }

    /// Step back without validating. Stays put on the first step.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let now = self.clock.now();
        let snapshots = Arc::clone(&self.snapshots);

        let (draft, errors, confirmation_pending) = self.editing_mut()?;
        *errors = FieldErrors::new();
        *confirmation_pending = false;

        if let Some(previous) = draft.current_step.previous() {
            debug!(from = draft.current_step.label(), to = previous.label(), "stepped back");
            draft.current_step = previous;
            draft.last_saved = Some(now);
            snapshots.save_snapshot(draft)?;
        }

        Ok(draft.current_step)
    }

    /// Turn the confirmed draft into a submitted application and clear the snapshot.
    pub fn submit(&mut self) -> Result<SubmittedApplication, WizardError> {
        let WizardState::Editing {
            draft,
            confirmation_pending,
            ..
        } = &self.state
        else {
            return Err(WizardError::NoActiveDraft);
        };
        if !*confirmation_pending {
            return Err(WizardError::ConfirmationRequired);
        }

        let id = self.records.next_application_id()?;
        let submitted =
            SubmittedApplication::from_draft(id.clone(), draft.clone(), self.clock.now());
        self.records.append(submitted.clone())?;
        info!(application_id = %id, "submitted application");

        // The case list owns the record now. A failed clear must not reopen the draft.
        let stale_snapshot = match self.snapshots.clear_snapshot() {
            Ok(()) => false,
            Err(err) => {
                warn!(
                    application_id = %id,
                    error = %err,
                    "submitted draft is still stored; clearing it later"
                );
                true
            }
        };
        self.state = WizardState::Submitted { id, stale_snapshot };
        Ok(submitted)
    }

    /// Drop the open draft and its snapshot without submitting.
    pub fn discard(&mut self) -> Result<(), WizardError> {
        self.snapshots.clear_snapshot()?;
        if matches!(self.state, WizardState::Editing { .. }) {
            info!("discarded application draft");
        }
        self.state = WizardState::NoDraft;
        Ok(())
    }

    /// Errors the active step would report right now, without moving.
    pub fn validate_current(&self) -> Result<FieldErrors, WizardError> {
        let draft = self.draft().ok_or(WizardError::NoActiveDraft)?;
        let context =
            ValidationContext::new(&self.program, self.providers.as_ref(), self.clock.today());
        Ok(validate_step(draft.current_step, draft, &context))
    }

    /// Append a blank child entry, returning its index.
    pub fn add_child(&mut self) -> Result<usize, WizardError> {
        let max = self.program.max_children;
        let draft = self.draft().ok_or(WizardError::NoActiveDraft)?;
        if draft.children.len() >= max {
            return Err(WizardError::TooManyChildren { max });
        }

        let mut children = draft.children.clone();
        children.push(Child::blank(next_child_id(&children)));
        let index = children.len() - 1;
        self.edit(DraftPatch::children(children))?;
        Ok(index)
    }

    /// Remove the child at `index` along with its uploads. Later children keep theirs.
    pub fn remove_child(&mut self, index: usize) -> Result<(), WizardError> {
        let draft = self.draft().ok_or(WizardError::NoActiveDraft)?;
        let len = draft.children.len();
        if index >= len {
            return Err(WizardError::ChildIndex { index, len });
        }
        if len == 1 {
            return Err(WizardError::LastChild);
        }

        let mut children = draft.children.clone();
        children.remove(index);
        self.edit(DraftPatch::children(children))?;
        Ok(())
    }

    /// Copy a directory entry into the draft. Unknown ids leave the draft untouched.
    pub fn select_provider(&mut self, provider_id: &str) -> Result<FieldErrors, WizardError> {
        if self.draft().is_none() {
            return Err(WizardError::NoActiveDraft);
        }

        let Some(provider) = self.providers.find_provider(provider_id) else {
            return Ok(FieldErrors::single(
                "provider_selection.provider_id",
                "Selected provider was not found",
            ));
        };

        let selection = ProviderSelection {
            provider_id: provider.id.clone(),
            provider_address: provider.formatted_address(),
            provider_name: provider.name,
            provider_license: provider.license_number,
            provider_phone: provider.phone,
        };
        self.edit(DraftPatch::provider_selection(selection))?;
        Ok(FieldErrors::new())
    }

    /// Drop the provider choice. Returns whether one was selected.
    pub fn clear_provider(&mut self) -> Result<bool, WizardError> {
        let now = self.clock.now();
        let snapshots = Arc::clone(&self.snapshots);

        let (draft, _, confirmation_pending) = self.editing_mut()?;
        if draft.provider_selection.take().is_none() {
            return Ok(false);
        }
        draft.last_saved = Some(now);
        *confirmation_pending = false;
        snapshots.save_snapshot(draft)?;
        debug!("cleared provider selection");

        Ok(true)
    }

    /// Record an uploaded file's metadata, replacing any earlier upload of the same kind.
    pub fn register_upload(
        &mut self,
        kind: DocumentKind,
        name: &str,
        size_bytes: u64,
        mime_type: &str,
    ) -> Result<FieldErrors, WizardError> {
        let draft = self.draft().ok_or(WizardError::NoActiveDraft)?;

        if let Some(message) = upload_problem(&self.program, name, size_bytes, mime_type) {
            return Ok(FieldErrors::single("documents", message));
        }

        let now = self.clock.now();
        let mut documents: Vec<DocumentRecord> = draft
            .documents
            .iter()
            .filter(|record| record.kind != kind)
            .cloned()
            .collect();
        documents.push(DocumentRecord {
            id: format!("{}-{}", kind.code(), now.timestamp_millis()),
            kind,
            name: name.trim().to_string(),
            size_bytes,
            mime_type: mime_type.trim().to_ascii_lowercase(),
            uploaded_at: now,
            status: VerificationStatus::Pending,
        });

        self.edit(DraftPatch::documents(documents))?;
        debug!(kind = %kind.code(), size_bytes, "registered upload");
        Ok(FieldErrors::new())
    }

    /// Returns whether a record was removed.
    pub fn remove_document(&mut self, kind: DocumentKind) -> Result<bool, WizardError> {
        let draft = self.draft().ok_or(WizardError::NoActiveDraft)?;
        if draft.document(kind).is_none() {
            return Ok(false);
        }

        let documents = draft
            .documents
            .iter()
            .filter(|record| record.kind != kind)
            .cloned()
            .collect();
        self.edit(DraftPatch::documents(documents))?;
        Ok(true)
    }

    pub fn required_documents(&self) -> Result<Vec<RequiredDocument>, WizardError> {
        let draft = self.draft().ok_or(WizardError::NoActiveDraft)?;
        Ok(required_documents(draft.employment.status, &draft.children))
    }

    pub fn document_progress(&self) -> Result<DocumentProgress, WizardError> {
        self.draft()
            .map(document_progress)
            .ok_or(WizardError::NoActiveDraft)
    }

    pub fn eligibility(&self) -> Result<Option<EligibilityAssessment>, WizardError> {
        let draft = self.draft().ok_or(WizardError::NoActiveDraft)?;
        Ok(assess_household(&self.program, &draft.household))
    }

    pub fn review(&self) -> Result<ReviewSummary, WizardError> {
        self.draft()
            .map(ReviewSummary::for_draft)
            .ok_or(WizardError::NoActiveDraft)
    }

    fn ensure_idle(&mut self) -> Result<(), WizardError> {
        match &mut self.state {
            WizardState::Editing { .. } => Err(WizardError::DraftInProgress),
            WizardState::Submitted { stale_snapshot, .. } if *stale_snapshot => {
                self.snapshots.clear_snapshot()?;
                *stale_snapshot = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn enter_editing(&mut self, draft: ApplicationDraft) {
        self.state = WizardState::Editing {
            draft,
            errors: FieldErrors::new(),
            confirmation_pending: false,
        };
    }

    fn editing_mut(
        &mut self,
    ) -> Result<(&mut ApplicationDraft, &mut FieldErrors, &mut bool), WizardError> {
        match &mut self.state {
            WizardState::Editing {
                draft,
                errors,
                confirmation_pending,
            } => Ok((draft, errors, confirmation_pending)),
            _ => Err(WizardError::NoActiveDraft),
        }
    }
}

fn next_child_id(children: &[Child]) -> String {
    let highest = children
        .iter()
        .filter_map(|child| child.id.strip_prefix("child-")?.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    format!("child-{}", highest.max(children.len()) + 1)
}

/// Re-point per-child uploads from positions in `before` to positions in `after` by child id.
fn remap_child_documents(
    documents: &[DocumentRecord],
    before: &[Child],
    after: &[Child],
) -> Vec<DocumentRecord> {
    let moved = |child: usize| -> Option<usize> {
        let id = &before.get(child)?.id;
        after.iter().position(|candidate| &candidate.id == id)
    };

    documents
        .iter()
        .filter_map(|record| {
            let kind = match record.kind {
                DocumentKind::BirthCertificate { child } => DocumentKind::BirthCertificate {
                    child: moved(child)?,
                },
                DocumentKind::Immunization { child } => DocumentKind::Immunization {
                    child: moved(child)?,
                },
                other => other,
            };
            Some(DocumentRecord {
                kind,
                ..record.clone()
            })
        })
        .collect()
}

fn upload_problem(
    program: &ProgramConfig,
    name: &str,
    size_bytes: u64,
    mime_type: &str,
) -> Option<String> {
    if name.trim().is_empty() {
        return Some("Uploaded file must have a name".to_string());
    }

    let accepted = mime_type
        .trim()
        .parse::<mime::Mime>()
        .map(|parsed| parsed.essence_str().to_ascii_lowercase())
        .is_ok_and(|essence| {
            program
                .accepted_upload_types
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(&essence))
        });
    if !accepted {
        return Some("File type not supported. Please upload PDF, JPG, or PNG files.".to_string());
    }

    if size_bytes > program.max_upload_bytes {
        return Some(format!(
            "File size exceeds {}MB limit",
            program.max_upload_bytes / (1024 * 1024)
        ));
    }

    None
}
