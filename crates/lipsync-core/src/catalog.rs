//! Server-side library of reference face videos

use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const FACE_EXTENSION: &str = "mp4";

/// Read-only catalog of face videos addressed by name.
#[derive(Debug, Clone)]
pub struct FaceCatalog {
    dir: PathBuf,
}

impl FaceCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an entry name maps to, whether or not it exists.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{FACE_EXTENSION}"))
    }

    /// Resolve a caller-supplied name to an existing catalog file.
    ///
    /// Names must be a single plain path component so the result always stays
    /// inside the catalog directory.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf> {
        let path = self.entry_path(name);

        if !is_plain_name(name) {
            warn!("Rejected face name {:?}", name);
            return Err(Error::FaceNotFound(path));
        }

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                debug!("Resolved face '{}' to {}", name, path.display());
                Ok(path)
            }
            _ => Err(Error::FaceNotFound(path)),
        }
    }
}

fn is_plain_name(name: &str) -> bool {
    if name.trim().is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
