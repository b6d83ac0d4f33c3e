//! Licensed childcare provider directory consulted by the provider step.

mod import;

pub use import::ProviderImportError;

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub provider_type: String,
    pub license_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub county: String,
    pub phone: String,
    pub status: ProviderStatus,
    pub accepts_subsidy: bool,
    pub capacity: u16,
    pub rating: Option<f32>,
}

impl Provider {
    /// Active and accepting subsidy payments.
    pub fn is_subsidy_eligible(&self) -> bool {
        self.status == ProviderStatus::Active && self.accepts_subsidy
    }

    pub fn formatted_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address, self.city, self.state, self.zip_code
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderStatus {
    Active,
    Pending,
    Inactive,
}

impl ProviderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Lookup collaborator; implementations must be cheap to query repeatedly.
pub trait ProviderDirectory: Send + Sync {
    fn find_provider(&self, id: &str) -> Option<Provider>;
    fn list_providers(&self, filter: &ProviderFilter) -> Vec<Provider>;
}

/// Conjunctive search filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFilter {
    /// Case-insensitive substring of the provider name or city.
    pub search: Option<String>,
    pub provider_type: Option<String>,
    pub county: Option<String>,
    pub status: Option<ProviderStatus>,
    pub zip_prefix: Option<String>,
    pub subsidy_eligible_only: bool,
}

impl ProviderFilter {
    /// The filter the provider step starts from.
    pub fn subsidy_eligible() -> Self {
        Self {
            subsidy_eligible_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, provider: &Provider) -> bool {
        if self.subsidy_eligible_only && !provider.is_subsidy_eligible() {
            return false;
        }
        if let Some(status) = self.status {
            if provider.status != status {
                return false;
            }
        }
        if let Some(kind) = &self.provider_type {
            if !provider.provider_type.eq_ignore_ascii_case(kind) {
                return false;
            }
        }
        if let Some(county) = &self.county {
            if !provider.county.eq_ignore_ascii_case(county) {
                return false;
            }
        }
        if let Some(prefix) = &self.zip_prefix {
            if !provider.zip_code.starts_with(prefix.trim()) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !provider.name.to_lowercase().contains(&needle)
                && !provider.city.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Directory backed by a fixed list, typically loaded from a CSV roster.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProviderDirectory {
    providers: Vec<Provider>,
}

impl InMemoryProviderDirectory {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, ProviderImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ProviderImportError> {
        import::parse_providers(reader).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderDirectory for InMemoryProviderDirectory {
    fn find_provider(&self, id: &str) -> Option<Provider> {
        self.providers
            .iter()
            .find(|provider| provider.id == id)
            .cloned()
    }

    fn list_providers(&self, filter: &ProviderFilter) -> Vec<Provider> {
        self.providers
            .iter()
            .filter(|provider| filter.matches(provider))
            .cloned()
            .collect()
    }
}
