//! Request lifecycle shared by both face input shapes
//!
//! Resolve the face, stage the uploads, run inference under a concurrency
//! permit and a deadline, then check the produced file is really there.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::FaceCatalog;
use crate::config::{InferenceConfig, QualityMode};
use crate::error::{Error, Result};
use crate::inference::{InferenceRequest, InferenceRunner};
use crate::staging::{ScratchStorage, StagedFile, UploadedAsset};

const AUDIO_EXTENSION: &str = "wav";
const VIDEO_EXTENSION: &str = "mp4";

/// Where the reference face comes from for one job.
#[derive(Debug, Clone)]
pub enum FaceReference {
    ByCatalogName(String),
    ByUpload(UploadedAsset),
}

enum ResolvedFace {
    Catalog(PathBuf),
    Upload(UploadedAsset),
}

/// A verified inference output.
#[derive(Debug, Clone)]
pub struct ProcessedVideo {
    pub job_id: Uuid,
    pub path: PathBuf,
}

pub struct LipsyncPipeline {
    catalog: FaceCatalog,
    scratch: ScratchStorage,
    runner: Arc<dyn InferenceRunner>,
    quality: QualityMode,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl LipsyncPipeline {
    pub fn new(
        catalog: FaceCatalog,
        scratch: ScratchStorage,
        runner: Arc<dyn InferenceRunner>,
        config: &InferenceConfig,
    ) -> Self {
        Self {
            catalog,
            scratch,
            runner,
            quality: config.quality,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Inference slots currently free.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run one lip-sync job end to end.
    ///
    /// Catalog lookups happen before anything is written. The deadline covers
    /// both the wait for an inference slot and the inference itself. Staged
    /// inputs are removed when this returns, whatever the outcome.
    pub async fn process(
        &self,
        face: FaceReference,
        audio: UploadedAsset,
    ) -> Result<ProcessedVideo> {
        let job_id = Uuid::new_v4();

        let face = match face {
            FaceReference::ByCatalogName(name) => {
                ResolvedFace::Catalog(self.catalog.resolve(&name).await?)
            }
            FaceReference::ByUpload(asset) => ResolvedFace::Upload(asset),
        };

        let audio_file = self.scratch.stage(&audio, AUDIO_EXTENSION).await?;
        let (video_file, _staged_face): (PathBuf, Option<StagedFile>) = match face {
            ResolvedFace::Catalog(path) => (path, None),
            ResolvedFace::Upload(asset) => {
                let staged = self.scratch.stage(&asset, VIDEO_EXTENSION).await?;
                (staged.path().to_path_buf(), Some(staged))
            }
        };

        info!(
            %job_id,
            face = %video_file.display(),
            audio = %audio_file.path().display(),
            audio_bytes = audio.len(),
            "Job staged"
        );

        let request = InferenceRequest {
            video_file,
            vocal_file: audio_file.path().to_path_buf(),
            quality: self.quality,
        };

        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.timeout;
        let timed_out = || {
            warn!(%job_id, "Job timed out after {:?}", self.timeout);
            Error::Timeout(self.timeout.as_secs())
        };

        let _permit = tokio::time::timeout_at(deadline, self.permits.acquire())
            .await
            .map_err(|_| timed_out())?
            .map_err(|_| Error::InferenceUnavailable("inference pool is closed".to_string()))?;

        let result = tokio::time::timeout_at(deadline, self.runner.run(&request))
            .await
            .map_err(|_| timed_out())?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let path = match result {
            Ok(path) => path,
            Err(e) => {
                warn!(%job_id, elapsed_ms, "Inference failed: {}", e);
                return Err(e);
            }
        };

        info!(%job_id, elapsed_ms, "Inference result path: {}", path.display());

        if !output_exists(&path).await {
            warn!(%job_id, "Inference reported {:?} but no file is there", path);
            return Err(Error::OutputMissing);
        }

        Ok(ProcessedVideo { job_id, path })
    }
}

async fn output_exists(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        return false;
    }
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
