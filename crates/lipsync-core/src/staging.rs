//! Scratch storage for uploaded assets
//!
//! Every upload is written to `<scratch_dir>/<uuid>.<ext>`. The returned
//! [`StagedFile`] owns that path and removes it when dropped, so staged
//! inputs disappear on every exit path of a request, including cancellation.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Upload received over HTTP, held in memory for one request.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub data: Bytes,
}

impl UploadedAsset {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Directory that receives staged uploads.
#[derive(Debug, Clone)]
pub struct ScratchStorage {
    dir: PathBuf,
    retain: bool,
}

impl ScratchStorage {
    /// Open the scratch directory, creating it if needed.
    pub async fn new(dir: impl Into<PathBuf>, retain: bool) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| {
            Error::StagingError(format!(
                "Failed to create scratch directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir, retain })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an asset to a fresh uniquely named file.
    pub async fn stage(&self, asset: &UploadedAsset, extension: &str) -> Result<StagedFile> {
        let path = self.dir.join(format!("{}.{}", Uuid::new_v4(), extension));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                Error::StagingError(format!("Failed to create {}: {}", path.display(), e))
            })?;

        // Owned from here on so a failed write still cleans up.
        let staged = StagedFile {
            path,
            retain: self.retain,
        };

        file.write_all(&asset.data).await.map_err(|e| {
            Error::StagingError(format!("Failed to write {}: {}", staged.path.display(), e))
        })?;
        file.flush().await?;

        debug!(
            "Staged {} bytes at {}",
            asset.len(),
            staged.path.display()
        );
        Ok(staged)
    }
}

/// A staged upload, removed from disk on drop unless retention is on.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    retain: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.retain {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staged file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staged file {}: {}", self.path.display(), e),
        }
    }
}
