use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use childcare_subsidy::workflows::subsidy::applications::{
    ApplicationId, ApplicationRecordStore, EmploymentStatus, RepositoryError,
    SubmittedApplication,
};
use childcare_subsidy::workflows::subsidy::providers::{Provider, ProviderStatus};

/// Process-local record of submitted applications, numbered per calendar year.
#[derive(Clone)]
pub(crate) struct InMemoryApplicationStore {
    year: i32,
    sequence: Arc<AtomicU64>,
    records: Arc<Mutex<HashMap<ApplicationId, SubmittedApplication>>>,
}

impl InMemoryApplicationStore {
    pub(crate) fn new(year: i32) -> Self {
        Self {
            year,
            sequence: Arc::new(AtomicU64::new(1)),
            records: Arc::default(),
        }
    }
}

impl ApplicationRecordStore for InMemoryApplicationStore {
    fn next_application_id(&self) -> Result<ApplicationId, RepositoryError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        Ok(ApplicationId::sequenced(self.year, sequence))
    }

    fn append(&self, record: SubmittedApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<SubmittedApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

fn sample_provider(
    id: &str,
    name: &str,
    provider_type: &str,
    address: &str,
    status: ProviderStatus,
    accepts_subsidy: bool,
) -> Provider {
    Provider {
        id: id.to_string(),
        name: name.to_string(),
        provider_type: provider_type.to_string(),
        license_number: format!("OH-{}", id.trim_start_matches("PRV-")),
        address: address.to_string(),
        city: "Columbus".to_string(),
        state: "OH".to_string(),
        zip_code: "43215".to_string(),
        county: "Franklin".to_string(),
        phone: "614-555-0100".to_string(),
        status,
        accepts_subsidy,
        capacity: 40,
        rating: Some(4.2),
    }
}

/// Directory used when no roster CSV is supplied.
pub(crate) fn sample_providers() -> Vec<Provider> {
    vec![
        sample_provider(
            "PRV-001",
            "Sunshine Learning Center",
            "Center",
            "100 Main St",
            ProviderStatus::Active,
            true,
        ),
        sample_provider(
            "PRV-002",
            "Little Sprouts Home Care",
            "Family Home",
            "22 Elm St",
            ProviderStatus::Active,
            false,
        ),
        sample_provider(
            "PRV-003",
            "Bright Futures Academy",
            "Center",
            "9 Lake Ave",
            ProviderStatus::Pending,
            true,
        ),
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_employment_status(raw: &str) -> Result<EmploymentStatus, String> {
    EmploymentStatus::from_label(raw).ok_or_else(|| {
        let known: Vec<&str> = EmploymentStatus::ALL
            .into_iter()
            .map(EmploymentStatus::label)
            .collect();
        format!("unknown employment status '{raw}' (expected one of {})", known.join(", "))
    })
}
