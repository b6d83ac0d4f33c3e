use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::config::ProgramConfig;
use crate::workflows::subsidy::applications::domain::{
    Applicant, ApplicationDraft, ApplicationId, CareType, Certifications, Child, Contact,
    ContactMethod, DocumentKind, DocumentRecord, DraftPatch, EmployerAddress, Employment,
    EmploymentStatus, Household, IncomeFrequency, IncomeSource, MaritalStatus, PrimaryLanguage,
    ProviderSelection, Relationship, Signature, SubmittedApplication, VerificationStatus,
};
use crate::workflows::subsidy::applications::eligibility::required_documents;
use crate::workflows::subsidy::applications::repository::{
    ApplicationRecordStore, RepositoryError, SnapshotError, SnapshotStore,
};
use crate::workflows::subsidy::applications::snapshot::MemorySnapshotStore;
use crate::workflows::subsidy::applications::validation::ValidationContext;
use crate::workflows::subsidy::applications::wizard::{DraftWizard, FixedClock};
use crate::workflows::subsidy::providers::{InMemoryProviderDirectory, Provider, ProviderStatus};

pub(super) type TestWizard =
    DraftWizard<MemorySnapshotStore, InMemoryProviderDirectory, MemoryRecordStore>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2026, 3, 1)
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 15, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn program() -> ProgramConfig {
    ProgramConfig::default()
}

fn provider(id: &str, name: &str, status: ProviderStatus, accepts_subsidy: bool) -> Provider {
    Provider {
        id: id.to_string(),
        name: name.to_string(),
        provider_type: "Center".to_string(),
        license_number: format!("OH-CC-{}", &id[4..]),
        address: "100 Main St".to_string(),
        city: "Columbus".to_string(),
        state: "OH".to_string(),
        zip_code: "43215".to_string(),
        county: "Franklin".to_string(),
        phone: "614-555-0100".to_string(),
        status,
        accepts_subsidy,
        capacity: 60,
        rating: Some(4.5),
    }
}

pub(super) fn providers() -> InMemoryProviderDirectory {
    InMemoryProviderDirectory::new(vec![
        provider("PRV-001", "Sunshine Learning Center", ProviderStatus::Active, true),
        provider("PRV-002", "Little Sprouts Home Care", ProviderStatus::Active, false),
        provider("PRV-003", "Bright Futures Academy", ProviderStatus::Pending, true),
    ])
}

pub(super) fn child(id: &str, first_name: &str, ssn: &str) -> Child {
    Child {
        first_name: first_name.to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: Some(date(2021, 6, 10)),
        ssn: ssn.to_string(),
        relationship: Some(Relationship::Child),
        care_needed: BTreeSet::from([CareType::FullTime]),
        preferred_start_date: Some(date(2026, 4, 1)),
        ..Child::blank(id)
    }
}

pub(super) fn upload(kind: DocumentKind) -> DocumentRecord {
    DocumentRecord {
        id: kind.code(),
        kind,
        name: format!("{}.pdf", kind.code()),
        size_bytes: 48_000,
        mime_type: "application/pdf".to_string(),
        uploaded_at: now(),
        status: VerificationStatus::Pending,
    }
}

/// Draft that passes every step for a part-time parent with one child.
pub(super) fn valid_draft() -> ApplicationDraft {
    let mut draft = ApplicationDraft::new(now());
    draft.applicant = Applicant {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: Some(date(1990, 5, 20)),
        ssn: "123-45-6789".to_string(),
        marital_status: Some(MaritalStatus::Single),
        primary_language: Some(PrimaryLanguage::English),
        ..Applicant::default()
    };
    draft.contact = Contact {
        street_address: "42 Oak Ave".to_string(),
        city: "Columbus".to_string(),
        zip_code: "43215".to_string(),
        county: Some("Franklin".to_string()),
        phone: "(614) 555-0142".to_string(),
        email: "jane.doe@example.org".to_string(),
        preferred_contact_method: Some(ContactMethod::Email),
        ..Contact::default()
    };
    draft.household = Household {
        size: Some(3),
        dependents: Some(2),
        monthly_income: Some(2500.0),
        income_frequency: Some(IncomeFrequency::Monthly),
        primary_income_source: Some(IncomeSource::Employment),
        fpl_percentage: None,
    };
    draft.employment = Employment {
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
        start_date: Some(date(2024, 1, 15)),
        hours_per_week: Some(30),
        gross_monthly_income: Some(2500.0),
        schedule: Vec::new(),
    };
    draft.children = vec![child("child-1", "Ava", "987-65-4321")];
    draft.provider_selection = Some(ProviderSelection {
        provider_id: "PRV-001".to_string(),
        provider_name: "Sunshine Learning Center".to_string(),
        ..ProviderSelection::default()
    });
    draft.documents = required_documents(draft.employment.status, &draft.children)
        .into_iter()
        .map(|requirement| upload(requirement.kind))
        .collect();
    draft.certifications = Certifications::all_acknowledged();
    draft.signature = Signature {
        full_name: "Jane Doe".to_string(),
        date: Some(today()),
    };
    draft
}

/// Every section of `draft` as one patch.
pub(super) fn full_patch(draft: ApplicationDraft) -> DraftPatch {
    DraftPatch {
        applicant: Some(draft.applicant),
        contact: Some(draft.contact),
        household: Some(draft.household),
        employment: Some(draft.employment),
        children: Some(draft.children),
        provider_selection: draft.provider_selection,
        documents: Some(draft.documents),
        certifications: Some(draft.certifications),
        signature: Some(draft.signature),
    }
}

pub(super) fn with_context<T>(
    program: &ProgramConfig,
    run: impl FnOnce(&ValidationContext<'_>) -> T,
) -> T {
    let directory = providers();
    let context = ValidationContext::new(program, &directory, today());
    run(&context)
}

#[derive(Default)]
pub(super) struct MemoryRecordStore {
    sequence: AtomicU64,
    records: Mutex<Vec<SubmittedApplication>>,
    offline: AtomicBool,
}

impl MemoryRecordStore {
    pub(super) fn records(&self) -> Vec<SubmittedApplication> {
        self.records.lock().expect("records mutex poisoned").clone()
    }

    /// Appends fail with `Unavailable` while offline.
    pub(super) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl ApplicationRecordStore for MemoryRecordStore {
    fn next_application_id(&self) -> Result<ApplicationId, RepositoryError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(ApplicationId::sequenced(2026, sequence))
    }

    fn append(&self, record: SubmittedApplication) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("case list offline".to_string()));
        }
        let mut guard = self.records.lock().expect("records mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<SubmittedApplication>, RepositoryError> {
        let guard = self.records.lock().expect("records mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }
}

/// Memory store whose next `failing_clears` clears report an I/O error.
pub(super) struct StubbornSnapshotStore {
    pub(super) inner: MemorySnapshotStore,
    failing_clears: AtomicUsize,
}

impl StubbornSnapshotStore {
    pub(super) fn failing_clears(count: usize) -> Self {
        Self {
            inner: MemorySnapshotStore::new(),
            failing_clears: AtomicUsize::new(count),
        }
    }
}

impl SnapshotStore for StubbornSnapshotStore {
    fn load_snapshot(&self) -> Result<Option<ApplicationDraft>, SnapshotError> {
        self.inner.load_snapshot()
    }

    fn save_snapshot(&self, draft: &ApplicationDraft) -> Result<(), SnapshotError> {
        self.inner.save_snapshot(draft)
    }

    fn clear_snapshot(&self) -> Result<(), SnapshotError> {
        let remaining = self.failing_clears.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_clears.store(remaining - 1, Ordering::SeqCst);
            return Err(SnapshotError::Io(std::io::Error::other("disk")));
        }
        self.inner.clear_snapshot()
    }
}

pub(super) struct Harness {
    pub(super) wizard: TestWizard,
    pub(super) snapshots: Arc<MemorySnapshotStore>,
    pub(super) records: Arc<MemoryRecordStore>,
    pub(super) clock: Arc<FixedClock>,
}

pub(super) fn harness_with(snapshots: MemorySnapshotStore) -> Harness {
    let snapshots = Arc::new(snapshots);
    let records = Arc::new(MemoryRecordStore::default());
    let clock = Arc::new(FixedClock::new(now()));
    let wizard = DraftWizard::with_clock(
        snapshots.clone(),
        Arc::new(providers()),
        records.clone(),
        Arc::new(program()),
        clock.clone(),
    );

    Harness {
        wizard,
        snapshots,
        records,
        clock,
    }
}

pub(super) fn harness() -> Harness {
    harness_with(MemorySnapshotStore::new())
}
