// ABOUTME: Upload and analysis route handlers for images and videos
// ABOUTME: Validates MIME type and size while streaming, then runs the vision path or the mock generator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Analysis routes
//!
//! `POST /api/analyze` accepts a multipart upload with a `file` part and an
//! optional `exerciseType` part. Validation failures are the only errors a
//! client ever sees; anything after the file is accepted degrades instead of
//! failing.
//!
//! `POST /api/analyze-image` accepts an already-encoded still frame as JSON and
//! returns the vision collaborator's analysis.

use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use moveid_analysis::{AnalysisRequest, ImageAnalysis};
use moveid_core::constants::service::DEFAULT_EXERCISE_LABEL;
use moveid_core::errors::{AppError, AppResult};
use moveid_core::models::{AnalysisReport, FileMetadata, MediaKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::request_id;
use crate::llm::{analyze_image, VisionRequest};
use crate::resources::ServerResources;

const FILE_FIELD: &str = "file";
const EXERCISE_FIELD: &str = "exerciseType";
const UNKNOWN_MIME: &str = "application/octet-stream";

/// Which engine produced the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Banded mock generator
    Mock,
    /// Vision collaborator
    Vision,
}

/// Analysis payload, shaped by its source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    /// Full structured report
    Report(AnalysisReport),
    /// Vision reply
    Image(ImageAnalysis),
}

/// Upload metadata echoed back to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// Original file name
    pub file_name: String,
    /// Size in bytes
    pub file_size: u64,
    /// Declared MIME type
    pub mime_type: String,
    /// Exercise label used for the analysis
    pub exercise_type: String,
    /// Engine that produced the analysis
    pub source: AnalysisSource,
    /// RFC 3339 processing time
    pub processed_at: String,
}

/// Success envelope for `POST /api/analyze`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Always `true`
    pub success: bool,
    /// Analysis result
    pub analysis: AnalysisPayload,
    /// Upload metadata
    pub metadata: AnalysisMetadata,
}

/// Body of `POST /api/analyze-image`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageBody {
    /// Base64 image, optionally as a `data:` URL
    pub image: String,
    /// MIME type, defaults to `image/jpeg`
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Exercise label declared by the user
    #[serde(default)]
    pub exercise_type: Option<String>,
}

/// Accepted upload held in memory
struct Upload {
    metadata: FileMetadata,
    kind: MediaKind,
    // only images are buffered; videos are counted and discarded
    bytes: Vec<u8>,
}

/// Analysis routes handler
pub struct AnalysisRoutes;

impl AnalysisRoutes {
    /// Create all analysis routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/analyze", post(Self::handle_analyze))
            .route("/api/analyze-image", post(Self::handle_analyze_image))
            .with_state(resources)
    }

    /// Handle POST /api/analyze - Validate an upload and analyze it
    #[instrument(skip_all)]
    async fn handle_analyze(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        multipart: Multipart,
    ) -> Result<Response, AppError> {
        let request_id = request_id(&headers);
        let (upload, exercise_type) = Self::read_upload(&resources, multipart)
            .await
            .map_err(|error| error.with_request_id(request_id.clone()))?;

        info!(
            request_id = %request_id,
            file_name = %upload.metadata.name,
            file_size = upload.metadata.size,
            kind = upload.kind.label(),
            exercise = %exercise_type,
            "upload accepted"
        );

        let (analysis, source) = match (upload.kind, &resources.vision) {
            (MediaKind::Image, Some(provider)) => {
                let request = VisionRequest::new(
                    &upload.bytes,
                    upload.metadata.mime_type.clone(),
                    exercise_type.clone(),
                );
                let analysis = analyze_image(provider.as_ref(), &request).await;
                (AnalysisPayload::Image(analysis), AnalysisSource::Vision)
            }
            _ => {
                let request = AnalysisRequest {
                    exercise_type: exercise_type.clone(),
                    file: Some(upload.metadata.clone()),
                };
                let report = resources.analyzer.analyze(&request);
                (AnalysisPayload::Report(report), AnalysisSource::Mock)
            }
        };

        let response = AnalyzeResponse {
            success: true,
            analysis,
            metadata: AnalysisMetadata {
                file_name: upload.metadata.name,
                file_size: upload.metadata.size,
                mime_type: upload.metadata.mime_type,
                exercise_type,
                source,
                processed_at: Utc::now().to_rfc3339(),
            },
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/analyze-image - Analyze a base64 still frame
    #[instrument(skip_all)]
    async fn handle_analyze_image(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<AnalyzeImageBody>,
    ) -> Result<Response, AppError> {
        let request_id = request_id(&headers);
        let mime_type = body.mime_type.unwrap_or_else(|| "image/jpeg".to_owned());
        if MediaKind::from_mime(&mime_type) != Some(MediaKind::Image) {
            return Err(AppError::unsupported_media(&mime_type).with_request_id(request_id));
        }
        let image = decode_base64_image(&body.image)
            .map_err(|error| error.with_request_id(request_id.clone()))?;
        if image.is_empty() {
            return Err(AppError::missing_field("image").with_request_id(request_id));
        }
        let size = image.len() as u64;
        if size > resources.limits.max_image_bytes {
            return Err(AppError::payload_too_large(
                MediaKind::Image.label(),
                size,
                resources.limits.max_image_bytes,
            )
            .with_request_id(request_id));
        }

        let exercise_type = exercise_or_default(body.exercise_type.as_deref());
        let analysis = match &resources.vision {
            Some(provider) => {
                let request = VisionRequest::new(&image, mime_type, exercise_type);
                analyze_image(provider.as_ref(), &request).await
            }
            None => {
                warn!(request_id = %request_id, "vision analysis requested but not configured");
                ImageAnalysis::unavailable("vision analysis is not configured")
            }
        };
        Ok((StatusCode::OK, Json(analysis)).into_response())
    }

    /// Read parts until the upload and the exercise label are known
    async fn read_upload(
        resources: &ServerResources,
        mut multipart: Multipart,
    ) -> AppResult<(Upload, String)> {
        let mut upload = None;
        let mut exercise_type = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::invalid_input(format!("Malformed multipart body: {}", e.body_text()))
        })? {
            match field.name() {
                Some(FILE_FIELD) => upload = Some(Self::read_file(resources, field).await?),
                Some(EXERCISE_FIELD) => {
                    let text = field.text().await.map_err(|e| {
                        AppError::invalid_input(format!(
                            "Invalid {EXERCISE_FIELD}: {}",
                            e.body_text()
                        ))
                    })?;
                    exercise_type = Some(text);
                }
                other => debug!(field = ?other, "ignoring multipart field"),
            }
        }

        let upload = upload.ok_or_else(|| AppError::missing_field(FILE_FIELD))?;
        Ok((upload, exercise_or_default(exercise_type.as_deref())))
    }

    /// Validate the MIME type, then stream the part while enforcing the size limit
    async fn read_file(resources: &ServerResources, mut field: Field<'_>) -> AppResult<Upload> {
        let mime_type = field.content_type().unwrap_or(UNKNOWN_MIME).to_owned();
        let kind = MediaKind::from_mime(&mime_type)
            .ok_or_else(|| AppError::unsupported_media(&mime_type))?;
        let name = field.file_name().unwrap_or("upload").to_owned();
        let limit = match kind {
            MediaKind::Image => resources.limits.max_image_bytes,
            MediaKind::Video => resources.limits.max_video_bytes,
        };

        let mut size: u64 = 0;
        let mut bytes = Vec::new();
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    size += chunk.len() as u64;
                    if size <= limit && kind == MediaKind::Image {
                        bytes.extend_from_slice(&chunk);
                    }
                }
                Ok(None) => break,
                // the body limit cut the stream short of an already oversized file
                Err(_) if size > limit => break,
                Err(e) => {
                    return Err(AppError::invalid_input(format!(
                        "Failed to read uploaded file: {}",
                        e.body_text()
                    )));
                }
            }
        }

        if size > limit {
            warn!(kind = kind.label(), size, limit, "upload rejected for size");
            return Err(AppError::payload_too_large(kind.label(), size, limit));
        }
        if size == 0 {
            return Err(AppError::invalid_input("Uploaded file is empty"));
        }

        Ok(Upload {
            metadata: FileMetadata {
                name,
                size,
                mime_type,
            },
            kind,
            bytes,
        })
    }
}

fn exercise_or_default(label: Option<&str>) -> String {
    label
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .unwrap_or(DEFAULT_EXERCISE_LABEL)
        .to_owned()
}

/// Decode base64 image data, accepting a `data:<mime>;base64,` prefix
///
/// # Errors
///
/// Returns an `InvalidInput` error when the payload is not valid base64.
pub fn decode_base64_image(encoded: &str) -> AppResult<Vec<u8>> {
    let payload = encoded
        .trim()
        .split_once(";base64,")
        .map_or(encoded.trim(), |(_, data)| data);
    STANDARD
        .decode(payload)
        .map_err(|e| AppError::invalid_input(format!("Image is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_accepts_data_url() {
        assert_eq!(decode_base64_image("data:image/png;base64,YWJj").unwrap(), b"abc");
        assert_eq!(decode_base64_image(" YWJj ").unwrap(), b"abc");
        assert!(decode_base64_image("not base64!").is_err());
    }

    #[test]
    fn test_exercise_defaults() {
        assert_eq!(exercise_or_default(None), "default");
        assert_eq!(exercise_or_default(Some("  ")), "default");
        assert_eq!(exercise_or_default(Some(" supino ")), "supino");
    }

    #[test]
    fn test_payload_serializes_untagged() {
        let payload = AnalysisPayload::Image(ImageAnalysis::text_only("hello", 0.7));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["description"], "hello");
        assert!(json.get("Image").is_none());
    }
}
