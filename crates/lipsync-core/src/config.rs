//! Configuration types for the lip-sync server

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LipsyncConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub responses: ResponseConfig,
}

impl LipsyncConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.inference.max_concurrent == 0 {
            return Err(Error::ConfigError(
                "inference.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.inference.timeout_secs == 0 {
            return Err(Error::ConfigError(
                "inference.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.inference.program.trim().is_empty() {
            return Err(Error::ConfigError(
                "inference.program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on a multipart request body, enforced by the transport
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_enabled: default_cors_enabled(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    512 * 1024 * 1024
}

fn default_cors_enabled() -> bool {
    true
}

/// Scratch and catalog locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory that receives staged uploads
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Read-only library of reference face videos
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,

    /// Keep staged uploads after the request finishes (debugging aid)
    #[serde(default)]
    pub retain_staged_files: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            catalog_dir: default_catalog_dir(),
            retain_staged_files: false,
        }
    }
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("lipsync-uploads")
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("videos")
}

/// Which shape of `face` input a deployment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceSource {
    /// `face` names an entry of the server-side catalog
    #[default]
    Catalog,
    /// `face` is an uploaded video
    Upload,
}

impl fmt::Display for FaceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceSource::Catalog => write!(f, "catalog"),
            FaceSource::Upload => write!(f, "upload"),
        }
    }
}

/// Inference profile handed to the external routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QualityMode {
    Fast,
    #[default]
    Improved,
}

impl QualityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityMode::Fast => "Fast",
            QualityMode::Improved => "Improved",
        }
    }
}

impl fmt::Display for QualityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub face_source: FaceSource,

    #[serde(default)]
    pub quality: QualityMode,

    /// Program spawned for each job
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Number of inference jobs allowed to run at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            face_source: FaceSource::default(),
            quality: QualityMode::default(),
            program: default_program(),
            args: default_args(),
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    vec!["scripts/lipsync_inference.py".to_string()]
}

fn default_max_concurrent() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    600
}

/// Response compatibility switches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Answer inference process failures with 200 instead of 502
    #[serde(default)]
    pub legacy_failure_status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LipsyncConfig = toml::from_str(
            r#"
            [inference]
            face_source = "upload"
            quality = "Fast"
            "#,
        )
        .unwrap();

        assert_eq!(config.inference.face_source, FaceSource::Upload);
        assert_eq!(config.inference.quality, QualityMode::Fast);
        assert_eq!(config.inference.program, "python3");
        assert_eq!(config.inference.max_concurrent, 1);
        assert_eq!(config.storage.catalog_dir, PathBuf::from("videos"));
        assert_eq!(config.server.port, 8000);
        assert!(!config.responses.legacy_failure_status);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = LipsyncConfig::default();
        config.inference.max_concurrent = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = LipsyncConfig::default();
        config.inference.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }
}
