//! Error types for the lip-sync pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Face video '{}' not found.", .0.display())]
    FaceNotFound(PathBuf),

    #[error("Staging failed: {0}")]
    StagingError(String),

    /// The external inference process failed; carries its diagnostic text.
    #[error("Processing failed: {0}")]
    ProcessFailed(String),

    #[error("Processing timed out after {0}s.")]
    Timeout(u64),

    #[error("Processing failed, output file not found.")]
    OutputMissing,

    #[error("Inference unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
