use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::domain::ApplicationDraft;
use super::repository::{SnapshotError, SnapshotStore, DRAFT_SNAPSHOT_KEY};

/// Process-local store holding the encoded draft, the way browser local storage would.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an already-encoded value.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().expect("snapshot mutex poisoned").clone()
    }

    pub fn is_empty(&self) -> bool {
        self.raw().is_none()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load_snapshot(&self) -> Result<Option<ApplicationDraft>, SnapshotError> {
        let guard = self.slot.lock().expect("snapshot mutex poisoned");
        guard
            .as_deref()
            .map(|raw| serde_json::from_str(raw).map_err(SnapshotError::Malformed))
            .transpose()
    }

    fn save_snapshot(&self, draft: &ApplicationDraft) -> Result<(), SnapshotError> {
        let encoded = serde_json::to_string(draft).map_err(SnapshotError::Encode)?;
        *self.slot.lock().expect("snapshot mutex poisoned") = Some(encoded);
        Ok(())
    }

    fn clear_snapshot(&self) -> Result<(), SnapshotError> {
        self.slot.lock().expect("snapshot mutex poisoned").take();
        Ok(())
    }
}

/// One JSON file named after the snapshot key inside `directory`.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            path: directory
                .as_ref()
                .join(format!("{DRAFT_SNAPSHOT_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn load_snapshot(&self) -> Result<Option<ApplicationDraft>, SnapshotError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(SnapshotError::Malformed)
    }

    fn save_snapshot(&self, draft: &ApplicationDraft) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let encoded = serde_json::to_vec_pretty(draft).map_err(SnapshotError::Encode)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn clear_snapshot(&self) -> Result<(), SnapshotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
