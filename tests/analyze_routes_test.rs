// ABOUTME: Integration tests for the upload analysis endpoints
// ABOUTME: Covers validation rejections, the mock path for videos and the vision path for images
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use helpers::axum_test::{AxumTestRequest, MultipartForm};
use helpers::test_utils::{mock_router, router_with, CountingAnalyzer, ScriptedVision};
use moveid_core::constants::limits::MIB;
use moveid_server::config::UploadLimits;
use serde_json::Value;

#[tokio::test]
async fn test_oversized_video_is_rejected_before_analysis() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let app = router_with(analyzer.clone(), None, UploadLimits::default());
    let video = vec![0_u8; (50 * MIB + 1) as usize];

    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(
            MultipartForm::new()
                .text("exerciseType", "agachamento")
                .file("file", "squat.mp4", "video/mp4", &video),
        )
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["code"], "FILE_TOO_LARGE");
    assert!(body["error"].as_str().unwrap().contains("50 MB"), "{body}");
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn test_oversized_image_uses_image_limit() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let limits = UploadLimits {
        max_image_bytes: MIB,
        max_video_bytes: 4 * MIB,
    };
    let app = router_with(analyzer.clone(), None, limits);
    let image = vec![0_u8; (MIB + 10) as usize];

    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(MultipartForm::new().file("file", "frame.jpg", "image/jpeg", &image))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert!(body["error"].as_str().unwrap().starts_with("Image file is too large"));
    assert!(body["error"].as_str().unwrap().contains("Maximum size is 1 MB"));
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_mime_is_rejected() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let app = router_with(analyzer.clone(), None, UploadLimits::default());

    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(MultipartForm::new().file("file", "notes.pdf", "application/pdf", b"%PDF-1.4"))
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(body["error"].as_str().unwrap().contains("application/pdf"));
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn test_missing_file_is_rejected() {
    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(MultipartForm::new().text("exerciseType", "supino"))
        .send(mock_router())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["code"], "MISSING_REQUIRED_FIELD");
    assert_eq!(body["error"], "Missing required field: file");
}

#[tokio::test]
async fn test_request_id_is_echoed_on_errors() {
    let response = AxumTestRequest::post("/api/analyze")
        .header("x-request-id", "req-test-123")
        .multipart(MultipartForm::new())
        .send(mock_router())
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(response.header("x-request-id").as_deref(), Some("req-test-123"));
    let body: Value = response.json();
    assert_eq!(body["request_id"], "req-test-123");
}

#[tokio::test]
async fn test_video_upload_returns_mock_envelope() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let app = router_with(analyzer.clone(), None, UploadLimits::default());

    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(
            MultipartForm::new()
                .file("file", "squat.mp4", "video/mp4", &[1_u8; 2048])
                .text("exerciseType", "agachamento"),
        )
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["success"], true);
    assert_eq!(body["metadata"]["fileName"], "squat.mp4");
    assert_eq!(body["metadata"]["fileSize"], 2048);
    assert_eq!(body["metadata"]["mimeType"], "video/mp4");
    assert_eq!(body["metadata"]["exerciseType"], "agachamento");
    assert_eq!(body["metadata"]["source"], "mock");
    assert!(body["metadata"]["processedAt"].is_string());

    let angles = body["analysis"]["biomechanics"]["jointAngles"].as_object().unwrap();
    for joint in [
        "right_knee",
        "left_knee",
        "right_hip",
        "left_hip",
        "right_ankle",
        "left_ankle",
        "trunk",
    ] {
        assert!(angles.contains_key(joint), "missing {joint}");
    }
    assert_eq!(analyzer.calls(), 1);
}

#[tokio::test]
async fn test_missing_exercise_label_uses_default() {
    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(MultipartForm::new().file("file", "clip.webm", "video/webm", &[0_u8; 16]))
        .send(mock_router())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["metadata"]["exerciseType"], "default");
    assert!(body["analysis"]["movementPhases"].as_array().is_some());
    assert!(body["analysis"]["recommendations"].as_array().is_some());
}

#[tokio::test]
async fn test_image_without_vision_uses_generator() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let app = router_with(analyzer.clone(), None, UploadLimits::default());

    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(MultipartForm::new().file("file", "frame.png", "image/png", &[7_u8; 64]))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["metadata"]["source"], "mock");
    assert_eq!(analyzer.calls(), 1);
}

#[tokio::test]
async fn test_non_json_vision_reply_falls_back_to_text() {
    let analyzer = Arc::new(CountingAnalyzer::default());
    let vision = Arc::new(ScriptedVision::replying(
        "The lifter keeps a neutral spine throughout the movement.",
    ));
    let app = router_with(analyzer.clone(), Some(vision), UploadLimits::default());

    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(
            MultipartForm::new()
                .text("exerciseType", "deadlift")
                .file("file", "frame.jpg", "image/jpeg", &[0xFF, 0xD8, 0xFF, 0xD9]),
        )
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["metadata"]["source"], "vision");
    assert_eq!(
        body["analysis"]["description"],
        "The lifter keeps a neutral spine throughout the movement."
    );
    assert_eq!(body["analysis"]["confidence_score"], 0.7);
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn test_json_vision_reply_is_structured() {
    let reply = r#"```json
{"exercise_detected":"squat","score":82,"description":"Good depth",
 "joint_angles":{"right_knee":95.0},"confidence_score":0.9}
```"#;
    let vision = Arc::new(ScriptedVision::replying(reply));
    let app = router_with(
        Arc::new(CountingAnalyzer::default()),
        Some(vision),
        UploadLimits::default(),
    );

    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(MultipartForm::new().file("file", "frame.jpg", "image/jpeg", &[1_u8; 32]))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["analysis"]["exercise_detected"], "squat");
    assert_eq!(body["analysis"]["joint_angles"]["right_knee"], 95.0);
    assert_eq!(body["analysis"]["confidence_score"], 0.9);
}

#[tokio::test]
async fn test_vision_failure_degrades_to_success() {
    let vision = Arc::new(ScriptedVision::failing("connection reset"));
    let app = router_with(
        Arc::new(CountingAnalyzer::default()),
        Some(vision),
        UploadLimits::default(),
    );

    let body: Value = AxumTestRequest::post("/api/analyze")
        .multipart(MultipartForm::new().file("file", "frame.jpg", "image/jpeg", &[1_u8; 32]))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["success"], true);
    assert_eq!(body["analysis"]["confidence_score"], 0.5);
    assert!(body["analysis"]["description"]
        .as_str()
        .unwrap()
        .contains("connection reset"));
}

#[tokio::test]
async fn test_analyze_image_json_endpoint() {
    let vision = Arc::new(ScriptedVision::replying("Knees track over toes."));
    let app = router_with(
        Arc::new(CountingAnalyzer::default()),
        Some(vision),
        UploadLimits::default(),
    );

    let body: Value = AxumTestRequest::post("/api/analyze-image")
        .json(&serde_json::json!({
            "image": "data:image/jpeg;base64,/9j/2Q==",
            "mimeType": "image/jpeg",
            "exerciseType": "agachamento"
        }))
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["description"], "Knees track over toes.");
    assert_eq!(body["confidence_score"], 0.7);
}

#[tokio::test]
async fn test_analyze_image_rejects_bad_base64() {
    let body: Value = AxumTestRequest::post("/api/analyze-image")
        .json(&serde_json::json!({ "image": "%%%not-base64%%%" }))
        .send(mock_router())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    assert_eq!(body["code"], "INVALID_INPUT");
}
