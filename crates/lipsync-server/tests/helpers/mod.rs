//! Test helpers: build a router over temporary directories and a scripted
//! inference backend.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use lipsync_core::{FaceSource, InferenceRequest, InferenceRunner, LipsyncConfig};
use lipsync_server::{create_router, AppState};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "lipsync-test-boundary";

/// What the scripted backend does when called.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Write these bytes to a fresh output file and report its path
    Produce(Vec<u8>),
    /// Fail like a crashed process with this stderr
    Fail(String),
    /// Report a path that was never written
    ReportMissing,
    /// Never finish within the test's timeout
    Hang,
}

/// A call the backend saw, with whether its inputs were on disk at the time.
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub request: InferenceRequest,
    pub face_bytes: Option<Vec<u8>>,
    pub audio_bytes: Option<Vec<u8>>,
}

pub struct ScriptedRunner {
    behavior: Behavior,
    output_dir: PathBuf,
    calls: Mutex<Vec<SeenCall>>,
}

impl ScriptedRunner {
    pub fn calls(&self) -> Vec<SeenCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceRunner for ScriptedRunner {
    async fn run(&self, request: &InferenceRequest) -> lipsync_core::Result<PathBuf> {
        self.calls.lock().unwrap().push(SeenCall {
            request: request.clone(),
            face_bytes: std::fs::read(&request.video_file).ok(),
            audio_bytes: std::fs::read(&request.vocal_file).ok(),
        });

        match &self.behavior {
            Behavior::Produce(bytes) => {
                let path = self
                    .output_dir
                    .join(format!("result-{}.mp4", self.calls.lock().unwrap().len()));
                std::fs::write(&path, bytes)?;
                Ok(path)
            }
            Behavior::Fail(stderr) => Err(lipsync_core::Error::ProcessFailed(stderr.clone())),
            Behavior::ReportMissing => Ok(self.output_dir.join("missing.mp4")),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(PathBuf::new())
            }
        }
    }
}

/// Test application over isolated scratch, catalog and output directories.
pub struct TestApp {
    pub router: Router,
    pub runner: Arc<ScriptedRunner>,
    pub scratch_dir: PathBuf,
    pub catalog_dir: PathBuf,
    _root: TempDir,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Files currently sitting in scratch storage.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.scratch_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    pub fn add_face(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.catalog_dir.join(format!("{name}.mp4")), bytes).unwrap();
    }
}

pub struct TestAppBuilder {
    face_source: FaceSource,
    behavior: Behavior,
    legacy_failure_status: bool,
    retain_staged_files: bool,
    timeout_secs: u64,
    max_upload_bytes: Option<usize>,
}

impl TestAppBuilder {
    pub fn new(face_source: FaceSource, behavior: Behavior) -> Self {
        Self {
            face_source,
            behavior,
            legacy_failure_status: false,
            retain_staged_files: false,
            timeout_secs: 600,
            max_upload_bytes: None,
        }
    }

    pub fn legacy_failure_status(mut self) -> Self {
        self.legacy_failure_status = true;
        self
    }

    pub fn retain_staged_files(mut self) -> Self {
        self.retain_staged_files = true;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = Some(limit);
        self
    }

    pub async fn build(self) -> TestApp {
        let root = tempfile::tempdir().unwrap();
        let scratch_dir = root.path().join("uploads");
        let catalog_dir = root.path().join("videos");
        let output_dir = root.path().join("results");
        std::fs::create_dir_all(&catalog_dir).unwrap();
        std::fs::create_dir_all(&output_dir).unwrap();

        let mut config = LipsyncConfig::default();
        config.storage.scratch_dir = scratch_dir.clone();
        config.storage.catalog_dir = catalog_dir.clone();
        config.storage.retain_staged_files = self.retain_staged_files;
        config.inference.face_source = self.face_source;
        config.inference.timeout_secs = self.timeout_secs;
        if let Some(limit) = self.max_upload_bytes {
            config.server.max_upload_bytes = limit;
        }
        config.responses.legacy_failure_status = self.legacy_failure_status;

        let runner = Arc::new(ScriptedRunner {
            behavior: self.behavior,
            output_dir,
            calls: Mutex::new(Vec::new()),
        });
        let state = AppState::with_runner(&config, runner.clone())
            .await
            .unwrap();

        TestApp {
            router: create_router(state, config.server.cors_enabled),
            runner,
            scratch_dir,
            catalog_dir,
            _root: root,
        }
    }
}

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn is_inside(path: &Path, dir: &Path) -> bool {
    path.parent() == Some(dir)
}
