// ABOUTME: Report rendering route returning an analysis report as a PDF download
// ABOUTME: Decodes the optional source frame and renders on the blocking pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Report routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use moveid_core::errors::{AppError, AppResult};
use moveid_core::models::{AnalysisReport, MediaKind};
use moveid_report::{
    report_file_name, RenderOptions, RenderRequest, RenderedDocument, ReportRenderer,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::analysis::decode_base64_image;
use super::request_id;
use crate::resources::ServerResources;

const DEFAULT_SUBJECT: &str = "Athlete";

const fn default_true() -> bool {
    true
}

/// Body of `POST /api/report`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
    /// Report to render
    pub report: AnalysisReport,
    /// Subject shown in the header
    #[serde(default)]
    pub subject_name: Option<String>,
    /// Exercise label, also used in the file name
    #[serde(default)]
    pub exercise_type: Option<String>,
    /// Generation time, defaults to now
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Draw the joint angle chart
    #[serde(default = "default_true")]
    pub include_charts: bool,
    /// Embed the source frame when present
    #[serde(default = "default_true")]
    pub include_source_image: bool,
    /// Base64 JPEG or PNG, optionally as a `data:` URL
    #[serde(default)]
    pub source_image: Option<String>,
}

/// Report routes handler
pub struct ReportRoutes;

impl ReportRoutes {
    /// Create all report routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/report", post(Self::handle_render))
            .with_state(resources)
    }

    /// Handle POST /api/report - Render a report to PDF
    #[instrument(skip_all)]
    async fn handle_render(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ReportBody>,
    ) -> Result<Response, AppError> {
        let request_id = request_id(&headers);
        body.report
            .ensure_valid()
            .map_err(|error| error.with_request_id(request_id.clone()))?;
        let source_image = Self::source_image(&resources, &body)
            .map_err(|error| error.with_request_id(request_id.clone()))?;

        let generated_at = body.timestamp.unwrap_or_else(Utc::now);
        let exercise_label = body
            .exercise_type
            .clone()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| "default".to_owned());
        let subject_name = body
            .subject_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_owned());
        let options = RenderOptions {
            include_charts: body.include_charts,
            include_source_image: body.include_source_image,
        };
        let renderer = resources.renderer;
        let file_name = report_file_name(&exercise_label, generated_at);

        let document = tokio::task::spawn_blocking(move || {
            render_document(
                renderer,
                &body.report,
                &subject_name,
                &exercise_label,
                generated_at,
                source_image.as_deref(),
                options,
            )
        })
        .await
        .map_err(|e| AppError::internal(format!("Render task failed: {e}")))?
        .map_err(|error| error.with_request_id(request_id.clone()))?;

        info!(
            request_id = %request_id,
            file_name = %file_name,
            pages = document.page_count,
            size_bytes = document.bytes.len(),
            "report generated"
        );

        let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
            .map_err(|e| AppError::internal(format!("Invalid file name header: {e}")))?;
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            document.bytes,
        )
            .into_response())
    }

    /// Decode the source frame when it will actually be embedded
    fn source_image(resources: &ServerResources, body: &ReportBody) -> AppResult<Option<Vec<u8>>> {
        if !body.include_source_image {
            return Ok(None);
        }
        let Some(encoded) = body.source_image.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let bytes = decode_base64_image(encoded)?;
        let size = bytes.len() as u64;
        if size > resources.limits.max_image_bytes {
            return Err(AppError::payload_too_large(
                MediaKind::Image.label(),
                size,
                resources.limits.max_image_bytes,
            ));
        }
        Ok(Some(bytes))
    }
}

/// Render a report synchronously
///
/// # Errors
///
/// Returns a `RenderError` coded error if the PDF cannot be serialized.
pub fn render_document(
    renderer: ReportRenderer,
    report: &AnalysisReport,
    subject_name: &str,
    exercise_label: &str,
    generated_at: DateTime<Utc>,
    source_image: Option<&[u8]>,
    options: RenderOptions,
) -> AppResult<RenderedDocument> {
    renderer
        .render(&RenderRequest {
            report,
            subject_name,
            exercise_label,
            generated_at,
            source_image,
            options,
        })
        .map_err(|e| AppError::render(e.to_string()))
}
