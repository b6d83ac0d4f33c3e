use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::{Provider, ProviderStatus};

#[derive(Debug)]
pub enum ProviderImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for ProviderImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderImportError::Io(err) => write!(f, "failed to read provider roster: {}", err),
            ProviderImportError::Csv(err) => write!(f, "invalid provider CSV data: {}", err),
            ProviderImportError::InvalidRow { line, reason } => {
                write!(f, "provider roster line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for ProviderImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderImportError::Io(err) => Some(err),
            ProviderImportError::Csv(err) => Some(err),
            ProviderImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for ProviderImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ProviderImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub(super) fn parse_providers<R: Read>(reader: R) -> Result<Vec<Provider>, ProviderImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut providers = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        let row: ProviderRow = record.deserialize(Some(&headers))?;
        providers.push(row.into_provider(line)?);
    }

    Ok(providers)
}

#[derive(Debug, Deserialize)]
struct ProviderRow {
    id: String,
    name: String,
    #[serde(rename = "type")]
    provider_type: String,
    license_number: String,
    address: String,
    city: String,
    state: String,
    zip_code: String,
    county: String,
    phone: String,
    status: String,
    accepts_subsidy: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    capacity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rating: Option<String>,
}

impl ProviderRow {
    fn into_provider(self, line: u64) -> Result<Provider, ProviderImportError> {
        let invalid = |reason: String| ProviderImportError::InvalidRow { line, reason };

        let status = ProviderStatus::parse(&self.status)
            .ok_or_else(|| invalid(format!("unknown status '{}'", self.status)))?;
        let accepts_subsidy = parse_flag(&self.accepts_subsidy).ok_or_else(|| {
            invalid(format!(
                "accepts_subsidy must be yes/no (found '{}')",
                self.accepts_subsidy
            ))
        })?;
        let capacity = match self.capacity.as_deref() {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| invalid(format!("invalid capacity '{value}'")))?,
            None => 0,
        };
        let rating = match self.rating.as_deref() {
            Some(value) => Some(
                value
                    .parse::<f32>()
                    .map_err(|_| invalid(format!("invalid rating '{value}'")))?,
            ),
            None => None,
        };

        Ok(Provider {
            id: self.id,
            name: self.name,
            provider_type: self.provider_type,
            license_number: self.license_number,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            county: self.county,
            phone: self.phone,
            status,
            accepts_subsidy,
            capacity,
            rating,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
