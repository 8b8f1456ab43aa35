//! State management for reconciled environments
//!
//! Manages the `.envflow/state.json` file which holds the last observed
//! record of every environment, and the lock file that keeps two
//! reconciliations from running against the same project at once.

use crate::error::{CloudError, Result};
use crate::model::EnvironmentRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".envflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const STATE_TMP: &str = "state.json.tmp";
const LOCK_FILE: &str = "lock.json";

/// Persisted state of all environments, keyed by declared name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    pub environments: BTreeMap<String, EnvironmentState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            environments: BTreeMap::new(),
        }
    }
}

impl StateFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&EnvironmentState> {
        self.environments.get(name)
    }

    /// Record a successfully reconciled environment
    pub fn set_active(&mut self, name: impl Into<String>, record: EnvironmentRecord) {
        self.environments
            .insert(name.into(), EnvironmentState::active(record));
        self.updated_at = Utc::now();
    }

    /// Mark an environment as errored, keeping its last known record
    pub fn mark_errored(&mut self, name: &str, error: impl Into<String>) {
        if let Some(state) = self.environments.get_mut(name) {
            state.status = ResourceStatus::Errored;
            state.last_error = Some(error.into());
            state.updated_at = Utc::now();
            self.updated_at = state.updated_at;
        }
    }

    /// Remove an environment
    pub fn remove(&mut self, name: &str) -> Option<EnvironmentState> {
        let result = self.environments.remove(name);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }
}

/// Last observed state of one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentState {
    pub record: EnvironmentRecord,

    pub status: ResourceStatus,

    /// Error of the last failed operation, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl EnvironmentState {
    pub fn active(record: EnvironmentRecord) -> Self {
        Self {
            record,
            status: ResourceStatus::Active,
            last_error: None,
            updated_at: Utc::now(),
        }
    }

    /// Whether the record must be re-read before another update
    pub fn needs_refresh(&self) -> bool {
        self.status == ResourceStatus::Errored
    }
}

/// Status of an environment. An environment missing from the state file
/// does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Environment exists and matched its record after the last operation
    Active,
    /// The last operation failed; remote state is unknown
    Errored,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Active => write!(f, "active"),
            ResourceStatus::Errored => write!(f, "errored"),
        }
    }
}

/// State manager for reading/writing state files
pub struct StateManager {
    /// Project root directory
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    /// Path of the state file
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state
    pub async fn load(&self) -> Result<StateFile> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(StateFile::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: StateFile = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} environments", state.environments.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup
    ///
    /// The new content is written to a temporary file and renamed into
    /// place, so a failed write leaves the current state file untouched.
    pub async fn save(&self, state: &StateFile) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let tmp = self.state_dir().join(STATE_TMP);

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&tmp, content).await?;

        if path.exists() {
            fs::copy(&path, self.backup_path()).await?;
            tracing::debug!("Created state backup");
        }
        fs::rename(&tmp, &path).await?;

        tracing::debug!("Saved state with {} environments", state.environments.len());
        Ok(())
    }

    /// Acquire a lock for exclusive access
    ///
    /// The lock file is created with `create_new`, so of two concurrent
    /// callers exactly one succeeds.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();
        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&lock_info)?;

        match create_lock_file(&lock_path, &content).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                remove_stale_lock(&lock_path).await?;
                match create_lock_file(&lock_path, &content).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        return Err(CloudError::LockError(
                            "State lock was taken by another process".to_string(),
                        ));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

async fn create_lock_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}

/// Remove the lock at `path` if it is older than one hour
///
/// A fresh lock (or one still being written) is a `LockError`.
async fn remove_stale_lock(path: &Path) -> Result<()> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let Ok(lock_info) = serde_json::from_str::<LockInfo>(&content) else {
        return Err(CloudError::LockError(format!(
            "State is locked (unreadable lock file {})",
            path.display()
        )));
    };

    let age = Utc::now().signed_duration_since(lock_info.acquired_at);
    if age.num_hours() < 1 {
        return Err(CloudError::LockError(format!(
            "State is locked by {} since {}",
            lock_info.holder, lock_info.acquired_at
        )));
    }

    tracing::warn!("Removing stale lock from {}", lock_info.holder);
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Release the lock
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
