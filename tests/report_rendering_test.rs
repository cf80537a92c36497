// ABOUTME: Integration tests for report rendering and its layout invariants
// ABOUTME: Covers idempotence, block placement, word wrapping and the PDF route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{TimeZone, Utc};
use helpers::axum_test::AxumTestRequest;
use helpers::test_utils::{mock_router, tiny_jpeg};
use moveid_analysis::{AnalysisRequest, MockAnalysisGenerator};
use moveid_core::models::{AnalysisReport, PhaseResult};
use moveid_report::layout::PageGeometry;
use moveid_report::metrics::{text_width, wrap_text, Font};
use moveid_report::{RenderOptions, RenderRequest, ReportRenderer, Section};
use proptest::prelude::*;
use serde_json::Value;

fn squat_report() -> AnalysisReport {
    MockAnalysisGenerator::new().generate_seeded(&AnalysisRequest::for_exercise("agachamento"), 11)
}

fn render(
    report: &AnalysisReport,
    image: Option<&[u8]>,
    options: RenderOptions,
) -> moveid_report::RenderedDocument {
    ReportRenderer::new()
        .render(&RenderRequest {
            report,
            subject_name: "Maria Souza",
            exercise_label: "agachamento",
            generated_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            source_image: image,
            options,
        })
        .unwrap()
}

fn long_report() -> AnalysisReport {
    let mut report = squat_report();
    let paragraph = "Keep the trunk braced and the knees aligned with the toes while controlling \
                     the descent tempo. ";
    report.description = paragraph.repeat(30);
    report.movement_phases = (0..12)
        .map(|i| PhaseResult {
            phase: format!("Phase {i}"),
            timestamp_percent: f64::from(i) * 8.0,
            analysis: paragraph.repeat(4),
            quality_score: 70,
        })
        .collect();
    report.recommendations = (0..30).map(|i| format!("{i}: {paragraph}")).collect();
    report.biomechanics.risk_factors = (0..10).map(|i| format!("Risk {i}: {paragraph}")).collect();
    report
}

#[test]
fn test_rendering_is_idempotent() {
    let report = long_report();
    let first = render(&report, Some(&tiny_jpeg()), RenderOptions::default());
    let second = render(&report, Some(&tiny_jpeg()), RenderOptions::default());

    assert_eq!(first.page_count, second.page_count);
    assert_eq!(first.sections, second.sections);
    assert_eq!(first.placements, second.placements);
}

#[test]
fn test_blocks_never_cross_the_bottom_margin() {
    let document = render(&long_report(), Some(&tiny_jpeg()), RenderOptions::default());
    let geometry = PageGeometry::a4();

    assert!(document.page_count >= 3);
    for placement in &document.placements {
        assert!(placement.top >= geometry.margin - 1e-9, "{placement:?}");
        assert!(placement.bottom <= geometry.bottom_limit() + 1e-9, "{placement:?}");
        assert!(placement.top <= placement.bottom, "{placement:?}");
    }

    // placements on the same page never go back up
    for pair in document.placements.windows(2) {
        if pair[0].page == pair[1].page {
            assert!(pair[1].top >= pair[0].bottom - 1e-9, "{pair:?}");
        } else {
            assert!(pair[1].page > pair[0].page, "{pair:?}");
        }
    }
}

#[test]
fn test_optional_sections_follow_flags() {
    let report = squat_report();

    let full = render(&report, Some(&tiny_jpeg()), RenderOptions::default());
    assert!(full.sections.contains(&Section::SourceImage));
    assert!(full.sections.contains(&Section::JointAngleChart));

    let bare = render(
        &report,
        Some(&tiny_jpeg()),
        RenderOptions {
            include_charts: false,
            include_source_image: false,
        },
    );
    assert!(!bare.sections.contains(&Section::SourceImage));
    assert!(!bare.sections.contains(&Section::JointAngleChart));
    assert_eq!(bare.sections.first(), Some(&Section::Header));
    assert_eq!(bare.sections.last(), Some(&Section::Footer));
}

#[test]
fn test_rendered_pdf_is_loadable() {
    let document = render(&squat_report(), Some(&tiny_jpeg()), RenderOptions::default());
    let pdf = lopdf::Document::load_mem(&document.bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), document.page_count);
}

#[test]
fn test_report_without_collections_renders() {
    let report: AnalysisReport =
        serde_json::from_str(r#"{"score": 40, "confidenceScore": 0.3}"#).unwrap();
    let document = render(&report, None, RenderOptions::default());
    assert!(!document.sections.contains(&Section::JointAngleChart));
    assert!(document.sections.contains(&Section::RiskAssessment));
}

proptest! {
    #[test]
    fn wrapped_lines_never_exceed_the_column(
        text in "[a-zA-Z,.]{1,40}( {1,3}[a-zA-Z,.]{1,40}){0,40}",
        max_width in 40.0_f64..400.0
    ) {
        for line in wrap_text(&text, Font::Regular, 10.0, max_width) {
            prop_assert!(text_width(&line, Font::Regular, 10.0) <= max_width, "{:?}", line);
        }
    }

    #[test]
    fn wrapped_lines_rejoin_to_the_input(
        text in "[a-zA-Z,.]{1,8}( {1,3}[a-zA-Z,.]{1,8}){0,40}",
        max_width in 80.0_f64..400.0
    ) {
        // eight Helvetica characters never exceed 80 pt at 10 pt size, so no word is shortened
        let lines = wrap_text(&text, Font::Regular, 10.0, max_width);
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        prop_assert_eq!(lines.join(" "), normalized);
    }
}

#[tokio::test]
async fn test_report_route_returns_pdf_attachment() {
    let report = squat_report();
    let response = AxumTestRequest::post("/api/report")
        .json(&serde_json::json!({
            "report": report,
            "subjectName": "Maria Souza",
            "exerciseType": "agachamento",
            "timestamp": "2025-06-01T12:00:00Z",
            "sourceImage": format!("data:image/jpeg;base64,{}", STANDARD.encode(tiny_jpeg())),
        }))
        .send(mock_router())
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(response.header("content-type").as_deref(), Some("application/pdf"));
    assert_eq!(
        response.header("content-disposition").as_deref(),
        Some("attachment; filename=\"moveid-agachamento-20250601-120000.pdf\"")
    );
    let bytes = response.bytes();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(!lopdf::Document::load_mem(&bytes).unwrap().get_pages().is_empty());
}

#[tokio::test]
async fn test_report_route_rejects_invalid_image() {
    let body: Value = AxumTestRequest::post("/api/report")
        .json(&serde_json::json!({
            "report": squat_report(),
            "sourceImage": "***",
        }))
        .send(mock_router())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_report_route_ignores_image_when_disabled() {
    let response = AxumTestRequest::post("/api/report")
        .json(&serde_json::json!({
            "report": squat_report(),
            "includeSourceImage": false,
            "includeCharts": false,
            "sourceImage": "***",
        }))
        .send(mock_router())
        .await;

    assert_eq!(response.status(), 200);
    assert!(response
        .header("content-disposition")
        .unwrap()
        .starts_with("attachment; filename=\"moveid-default-"));
}

#[tokio::test]
async fn test_report_route_rejects_out_of_range_scores() {
    let response = AxumTestRequest::post("/api/report")
        .header("x-request-id", "req-bounds-1")
        .json(&serde_json::json!({
            "report": { "score": 200, "confidenceScore": 0.9 },
            "exerciseType": "agachamento",
        }))
        .send(mock_router())
        .await;

    assert_eq!(response.status(), 400);
    assert_ne!(response.header("content-type").as_deref(), Some("application/pdf"));
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["request_id"], "req-bounds-1");
    assert!(body["error"].as_str().unwrap().contains("score"), "{body}");
}

#[tokio::test]
async fn test_report_route_rejects_out_of_range_confidence_and_phase() {
    let mut phase_report = serde_json::to_value(squat_report()).unwrap();
    phase_report["movementPhases"][0]["qualityScore"] = serde_json::json!(150);

    for report in [
        serde_json::json!({ "score": 80, "confidenceScore": 7.5 }),
        phase_report,
    ] {
        let body: Value = AxumTestRequest::post("/api/report")
            .json(&serde_json::json!({ "report": report }))
            .send(mock_router())
            .await
            .assert_status(StatusCode::BAD_REQUEST)
            .json();
        assert_eq!(body["code"], "INVALID_INPUT");
    }
}
