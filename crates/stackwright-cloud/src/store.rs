//! Manifest storage
//!
//! Rendered manifests live in `.stackwright/<stack>.json` where the
//! provisioning engine picks them up. The previous manifest is kept as
//! `<stack>.json.backup`; writers hold `<stack>.lock` while saving.
//!
//! Stored manifests may carry secret envelopes, so they are created with
//! mode `0600` on unix.

use crate::error::{CloudError, Result};
use crate::manifest::{DeploymentManifest, MANIFEST_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STORE_DIR: &str = ".stackwright";
const STALE_LOCK_HOURS: i64 = 1;

pub struct ManifestStore {
    project_root: PathBuf,
}

impl ManifestStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn store_dir(&self) -> PathBuf {
        self.project_root.join(STORE_DIR)
    }

    /// Path of the stored manifest for `stack`
    pub fn manifest_path(&self, stack: &str) -> PathBuf {
        self.store_dir().join(format!("{}.json", stack))
    }

    fn backup_path(&self, stack: &str) -> PathBuf {
        self.store_dir().join(format!("{}.json.backup", stack))
    }

    fn lock_path(&self, stack: &str) -> PathBuf {
        self.store_dir().join(format!("{}.lock", stack))
    }

    async fn ensure_store_dir(&self) -> Result<()> {
        let dir = self.store_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created store directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the stored manifest for `stack`, if one exists
    pub async fn load(&self, stack: &str) -> Result<Option<DeploymentManifest>> {
        let path = self.manifest_path(stack);
        if !path.exists() {
            tracing::debug!(stack, "No stored manifest");
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let manifest: DeploymentManifest = serde_json::from_str(&content)?;

        if manifest.version > MANIFEST_VERSION {
            return Err(CloudError::StoreError(format!(
                "Manifest version {} is newer than supported version {}",
                manifest.version, MANIFEST_VERSION
            )));
        }

        tracing::debug!(
            stack,
            resources = manifest.resources.len(),
            "Loaded stored manifest"
        );
        Ok(Some(manifest))
    }

    /// Save a manifest, keeping the previous one as a backup
    pub async fn save(&self, manifest: &DeploymentManifest) -> Result<PathBuf> {
        self.ensure_store_dir().await?;

        let path = self.manifest_path(&manifest.stack);
        let backup = self.backup_path(&manifest.stack);

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Backed up previous manifest");
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&path).await?;
        file.write_all(manifest.to_json()?.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(
            stack = %manifest.stack,
            resources = manifest.resources.len(),
            "Saved manifest"
        );
        Ok(path)
    }

    /// Remove the stored manifest for `stack`; the backup is kept
    pub async fn remove(&self, stack: &str) -> Result<bool> {
        let path = self.manifest_path(stack);
        if !path.exists() {
            return Ok(false);
        }
        self.ensure_store_dir().await?;
        fs::rename(&path, self.backup_path(stack)).await?;
        Ok(true)
    }

    /// Acquire the exclusive write lock for `stack`
    pub async fn acquire_lock(&self, stack: &str) -> Result<StoreLock> {
        self.ensure_store_dir().await?;

        let lock_path = self.lock_path(stack);

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            match serde_json::from_str::<LockInfo>(&content) {
                Ok(lock_info) => {
                    let age = Utc::now().signed_duration_since(lock_info.acquired_at);
                    if age.num_hours() < STALE_LOCK_HOURS {
                        return Err(CloudError::LockError(format!(
                            "Stack '{}' is locked by {} since {}",
                            stack, lock_info.holder, lock_info.acquired_at
                        )));
                    }
                    tracing::warn!("Removing stale lock from {}", lock_info.holder);
                }
                // a half-written lock has no holder to wait for
                Err(e) => tracing::warn!("Removing unreadable lock: {}", e),
            }
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };

        fs::write(&lock_path, serde_json::to_string_pretty(&lock_info)?).await?;

        tracing::debug!(stack, "Acquired store lock");
        Ok(StoreLock {
            lock_path,
            released: false,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// Guard for a stack's write lock; released on drop
#[derive(Debug)]
pub struct StoreLock {
    lock_path: PathBuf,
    released: bool,
}

impl StoreLock {
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released store lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
