//! Lip-sync job endpoint

use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, State},
    http::{header, StatusCode},
    response::Response,
};
use lipsync_core::{FaceReference, FaceSource, UploadedAsset};
use std::path::Path;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

const VIDEO_CONTENT_TYPE: &str = "video/mp4";
const DOWNLOAD_DISPOSITION: &str = "attachment; filename=\"processed_video.mp4\"";

/// Multipart form for one job, fully buffered before any validation
#[derive(Debug)]
struct ProcessForm {
    face: FaceReference,
    audio: UploadedAsset,
}

/// Run a lip-sync job and stream the produced video back
pub async fn process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = parse_process_form(multipart, state.face_source).await?;

    match &form.face {
        FaceReference::ByCatalogName(name) => {
            info!("Process request: face '{}', audio {} bytes", name, form.audio.len())
        }
        FaceReference::ByUpload(face) => info!(
            "Process request: face upload {} bytes, audio {} bytes",
            face.len(),
            form.audio.len()
        ),
    }

    let video = state
        .pipeline
        .process(form.face, form.audio)
        .await
        .map_err(|e| ApiError::from(e).with_legacy_status(state.legacy_failure_status))?;

    info!(job_id = %video.job_id, "Streaming {}", video.path.display());
    stream_video(&video.path).await
}

async fn parse_process_form(
    mut multipart: Multipart,
    face_source: FaceSource,
) -> Result<ProcessForm, ApiError> {
    let mut face: Option<FaceReference> = None;
    let mut audio: Option<UploadedAsset> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "face" => {
                face = Some(match face_source {
                    FaceSource::Catalog => FaceReference::ByCatalogName(field.text().await?),
                    FaceSource::Upload => FaceReference::ByUpload(read_upload(field).await?),
                });
            }
            "audio" => audio = Some(read_upload(field).await?),
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    let face = face.ok_or_else(|| ApiError::unprocessable("Missing required form field 'face'"))?;
    let audio =
        audio.ok_or_else(|| ApiError::unprocessable("Missing required form field 'audio'"))?;

    Ok(ProcessForm { face, audio })
}

async fn read_upload(field: Field<'_>) -> Result<UploadedAsset, ApiError> {
    let name = field.name().unwrap_or_default().to_string();

    let data = field.bytes().await?;
    if data.is_empty() {
        return Err(ApiError::unprocessable(format!(
            "Multipart '{name}' field is empty"
        )));
    }

    Ok(UploadedAsset::new(data))
}

/// Stream a file in chunks rather than loading it whole
async fn stream_video(path: &Path) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        ApiError::internal(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let len = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to stat {}: {}", path.display(), e)))?
        .len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, VIDEO_CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION)
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {e}")))
}
