// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::error::LabelError;
use crate::pipeline::{LabelReport, PipelineOptions};
use crate::vision::UploadedImage;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use base64::Engine;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Multipart field carrying the label photo.
pub const IMAGE_FIELD: &str = "image";

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub locale: String,
    pub pipeline: PipelineOptionsView,
    pub max_upload_bytes: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineOptionsView {
    pub normalize: bool,
    pub enforce_size_limit: bool,
    pub extract_summary: bool,
}

impl From<PipelineOptions> for PipelineOptionsView {
    fn from(o: PipelineOptions) -> Self {
        Self {
            normalize: o.normalize,
            enforce_size_limit: o.enforce_size_limit,
            extract_summary: o.extract_summary,
        }
    }
}

/// Successful (possibly partial) result of `/api/interpret`.
#[derive(Debug, Serialize, Deserialize)]
pub struct InterpretResponse {
    pub text: String,
    pub narration: String,
    pub summary_fallback: bool,
    pub audio: Option<AudioPayload>,
    pub audio_error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudioPayload {
    pub mime_type: String,
    pub locale: String,
    /// Base64 MP3
    pub data: String,
}

impl From<LabelReport> for InterpretResponse {
    fn from(report: LabelReport) -> Self {
        let (audio, audio_error) = match report.audio {
            Ok(clip) => (
                Some(AudioPayload {
                    mime_type: clip.mime_type().to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(&clip.bytes),
                    locale: clip.locale,
                }),
                None,
            ),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            text: report.text,
            narration: report.narration,
            summary_fallback: report.summary_fallback,
            audio,
            audio_error,
        }
    }
}

/// Upload page
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.pipeline.interpreter().model().to_string(),
        locale: state.pipeline.synthesizer().locale().to_string(),
        pipeline: state.pipeline.options().into(),
        max_upload_bytes: state.config.pipeline.max_upload_bytes,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

/// Handler for `POST /api/interpret` (multipart upload, field `image`)
pub async fn interpret_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let start = Instant::now();

    let result = match multipart {
        Ok(multipart) => interpret(&state, multipart).await,
        Err(rejection) => Err(LabelError::InvalidRequest(rejection.body_text())),
    };

    let response = match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => e.into_response(),
    };

    crate::metrics::record_request(
        "/api/interpret",
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

async fn interpret(state: &AppState, multipart: Multipart) -> Result<InterpretResponse, LabelError> {
    let pipeline = &state.config.pipeline;
    let limit = pipeline.enforce_size_limit.then_some(pipeline.max_upload_bytes);

    let upload = read_upload(multipart, limit).await.map_err(|e| {
        if matches!(e, LabelError::FileTooLarge { .. }) {
            crate::metrics::record_pipeline_failure("validate", e.error_type());
        }
        e
    })?;
    let report = state.pipeline.run(upload).await?;

    info!(
        "Label interpreted: {} chars, audio {}",
        report.text.chars().count(),
        if report.audio.is_ok() { "ok" } else { "failed" }
    );

    Ok(report.into())
}

/// Pull the `image` file field out of the form.
///
/// With a `limit`, reading stops as soon as the field grows past it, so an
/// oversized photo is never buffered whole.
async fn read_upload(mut multipart: Multipart, limit: Option<usize>) -> Result<UploadedImage, LabelError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| LabelError::InvalidRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        let mut bytes = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| LabelError::InvalidRequest(format!("failed to read upload: {}", e)))?
        {
            bytes.extend_from_slice(&chunk);
            if let Some(limit) = limit {
                if bytes.len() > limit {
                    return Err(LabelError::FileTooLarge {
                        size: bytes.len(),
                        limit,
                    });
                }
            }
        }

        let mut upload = UploadedImage::new(bytes.freeze());
        upload.file_name = file_name;
        upload.content_type = content_type;
        return Ok(upload);
    }

    Err(LabelError::InvalidRequest(format!(
        "missing `{}` file field",
        IMAGE_FIELD
    )))
}
