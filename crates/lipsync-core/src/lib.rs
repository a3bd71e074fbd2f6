//! Lipsync Core - job pipeline for lip-synchronized video generation
//!
//! A job takes a reference face video and a vocal track and hands both to an
//! external inference routine that renders the lip-synced video.
//!
//! # Architecture
//!
//! - [`FaceCatalog`] resolves named faces inside a read-only video library
//! - [`ScratchStorage`] stages uploads under unique names and cleans them up
//! - [`InferenceRunner`] is the seam to the external routine; [`PythonBridge`]
//!   drives the inference script as a child process
//! - [`LipsyncPipeline`] ties them together with bounded concurrency and a
//!   per-job deadline
//!
//! # Example
//!
//! ```ignore
//! use lipsync_core::{FaceReference, LipsyncPipeline, UploadedAsset};
//!
//! let video = pipeline
//!     .process(FaceReference::ByCatalogName("trump".into()), UploadedAsset::new(wav_bytes))
//!     .await?;
//! println!("{}", video.path.display());
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod staging;

pub use catalog::FaceCatalog;
pub use config::{
    FaceSource, InferenceConfig, LipsyncConfig, QualityMode, ResponseConfig, ServerConfig,
    StorageConfig,
};
pub use error::{Error, Result};
pub use inference::{InferenceRequest, InferenceRunner, PythonBridge};
pub use pipeline::{FaceReference, LipsyncPipeline, ProcessedVideo};
pub use staging::{ScratchStorage, StagedFile, UploadedAsset};
