//! External lip-sync inference

mod python_bridge;

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::QualityMode;
use crate::error::Result;

pub use python_bridge::PythonBridge;

/// One inference job as handed to the external routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceRequest {
    pub video_file: PathBuf,
    pub vocal_file: PathBuf,
    pub quality: QualityMode,
}

/// Backend that turns a face video and a vocal track into a lip-synced video.
///
/// Implementations return the path of the produced file. An empty path or a
/// path with nothing behind it is treated by the caller as a missing output,
/// not as an implementation error. Dropping the returned future must abandon
/// the job.
#[async_trait]
pub trait InferenceRunner: Send + Sync {
    async fn run(&self, request: &InferenceRequest) -> Result<PathBuf>;
}
