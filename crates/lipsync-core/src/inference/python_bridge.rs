//! Python bridge for lip-sync inference
//! Spawns the inference script once per job and talks JSON over stdin/stdout

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{InferenceRequest, InferenceRunner};
use crate::config::{InferenceConfig, QualityMode};
use crate::error::{Error, Result};

/// Request written to the script's stdin
#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    command: &'static str,
    video_file: String,
    vocal_file: String,
    quality: &'a QualityMode,
}

/// Response read from the script's stdout
#[derive(Debug, Deserialize)]
struct BridgeResponse {
    result_path: Option<String>,
    error: Option<String>,
}

/// Runs the inference script as a child process
pub struct PythonBridge {
    program: String,
    args: Vec<String>,
}

impl PythonBridge {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    /// Call the script with a JSON request
    async fn call_python(&self, request_json: &str) -> Result<BridgeResponse> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::ProcessFailed(format!(
                    "Failed to start inference process '{}': {}",
                    self.program, e
                ))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A script that exits without reading stdin is judged by its exit status.
            if let Err(e) = stdin.write_all(request_json.as_bytes()).await {
                warn!("Failed to write inference request: {}", e);
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::ProcessFailed(format!("Inference process failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Inference process exited with {}", output.status);
            return Err(Error::ProcessFailed(stderr.into_owned()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);

        // Model libraries print warnings to stdout ahead of the JSON line
        let json_str = stdout
            .lines()
            .find(|line| line.trim().starts_with('{'))
            .unwrap_or(&stdout);

        serde_json::from_str(json_str).map_err(|e| {
            Error::ProcessFailed(format!(
                "Failed to parse inference response: {} - {}",
                e, json_str
            ))
        })
    }
}

impl Default for PythonBridge {
    fn default() -> Self {
        Self::from_config(&InferenceConfig::default())
    }
}

#[async_trait]
impl InferenceRunner for PythonBridge {
    async fn run(&self, request: &InferenceRequest) -> Result<PathBuf> {
        info!(
            "Running inference: face={}, audio={}, quality={}",
            request.video_file.display(),
            request.vocal_file.display(),
            request.quality
        );

        let bridge_request = BridgeRequest {
            command: "infer",
            video_file: request.video_file.to_string_lossy().into_owned(),
            vocal_file: request.vocal_file.to_string_lossy().into_owned(),
            quality: &request.quality,
        };
        let request_json = serde_json::to_string(&bridge_request)?;

        let response = self.call_python(&request_json).await?;

        if let Some(err) = response.error {
            return Err(Error::ProcessFailed(err));
        }

        let result_path = response.result_path.unwrap_or_default();
        debug!("Inference result path: {:?}", result_path);
        Ok(PathBuf::from(result_path))
    }
}
