//! Application state management

use lipsync_core::{
    FaceCatalog, FaceSource, InferenceRunner, LipsyncConfig, LipsyncPipeline, PythonBridge,
    ScratchStorage,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<LipsyncPipeline>,
    /// Face input shape this deployment accepts
    pub face_source: FaceSource,
    pub legacy_failure_status: bool,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build state backed by the inference script.
    pub async fn new(config: &LipsyncConfig) -> lipsync_core::Result<Self> {
        let runner = Arc::new(PythonBridge::from_config(&config.inference));
        Self::with_runner(config, runner).await
    }

    /// Build state around any inference backend.
    pub async fn with_runner(
        config: &LipsyncConfig,
        runner: Arc<dyn InferenceRunner>,
    ) -> lipsync_core::Result<Self> {
        config.validate()?;

        let scratch = ScratchStorage::new(
            &config.storage.scratch_dir,
            config.storage.retain_staged_files,
        )
        .await?;
        info!("Scratch directory: {}", scratch.dir().display());

        let catalog = FaceCatalog::new(&config.storage.catalog_dir);
        if config.inference.face_source == FaceSource::Catalog && !catalog.dir().is_dir() {
            warn!(
                "Face catalog {} does not exist; every request will be rejected",
                catalog.dir().display()
            );
        }

        let pipeline = LipsyncPipeline::new(catalog, scratch, runner, &config.inference);

        Ok(Self {
            pipeline: Arc::new(pipeline),
            face_source: config.inference.face_source,
            legacy_failure_status: config.responses.legacy_failure_status,
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}
