use super::domain::{ApplicationDraft, ApplicationId, SubmittedApplication};

/// Well-known key the in-progress draft is stored under.
pub const DRAFT_SNAPSHOT_KEY: &str = "scms_draft_application";

/// Key-value persistence for the single in-progress draft.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing is stored. A stored value that cannot be decoded is reported
    /// as `SnapshotError::Malformed`.
    fn load_snapshot(&self) -> Result<Option<ApplicationDraft>, SnapshotError>;
    fn save_snapshot(&self, draft: &ApplicationDraft) -> Result<(), SnapshotError>;
    fn clear_snapshot(&self) -> Result<(), SnapshotError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("stored draft could not be decoded: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("draft could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("snapshot storage unavailable: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for submitted applications; owned by the case-tracking side.
pub trait ApplicationRecordStore: Send + Sync {
    fn next_application_id(&self) -> Result<ApplicationId, RepositoryError>;
    fn append(&self, record: SubmittedApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<SubmittedApplication>, RepositoryError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
