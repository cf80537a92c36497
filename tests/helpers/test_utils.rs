// ABOUTME: Test doubles and router construction shared by route tests
// ABOUTME: Counting analyzer, scripted vision provider and small valid image fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use moveid_analysis::{AnalysisRequest, MockAnalysisGenerator, MovementAnalyzer};
use moveid_core::errors::AppError;
use moveid_core::models::AnalysisReport;
use moveid_server::config::{CorsConfig, Environment, UploadLimits};
use moveid_server::llm::{VisionCapabilities, VisionProvider, VisionRequest};
use moveid_server::resources::ServerResources;
use moveid_server::server::build_router;

/// Analyzer that counts invocations and delegates to a seeded generator
#[derive(Default)]
pub struct CountingAnalyzer {
    calls: AtomicUsize,
    generator: MockAnalysisGenerator,
}

impl CountingAnalyzer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MovementAnalyzer for CountingAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.generator.generate_seeded(request, 7)
    }
}

/// Vision provider returning a fixed reply or error
pub struct ScriptedVision {
    reply: Result<String, String>,
    capabilities: VisionCapabilities,
}

impl ScriptedVision {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_owned()),
            capabilities: VisionCapabilities::multimodal(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_owned()),
            capabilities: VisionCapabilities::multimodal(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: VisionCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

#[async_trait]
impl VisionProvider for ScriptedVision {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn capabilities(&self) -> VisionCapabilities {
        self.capabilities
    }

    async fn describe_image(&self, _request: &VisionRequest) -> Result<String, AppError> {
        self.reply
            .clone()
            .map_err(|message| AppError::external_service("Scripted", message))
    }
}

/// Router over the given analyzer and optional vision provider
pub fn router_with(
    analyzer: Arc<dyn MovementAnalyzer>,
    vision: Option<Arc<dyn VisionProvider>>,
    limits: UploadLimits,
) -> Router {
    let resources = ServerResources::new(analyzer, vision, limits, Environment::Testing);
    build_router(Arc::new(resources), &CorsConfig::default())
}

/// Router with the mock generator and default limits
pub fn mock_router() -> Router {
    build_router(
        Arc::new(ServerResources::mock(UploadLimits::default())),
        &CorsConfig::default(),
    )
}

/// Smallest baseline JPEG header the renderer accepts: SOI, SOF0 8x8 RGB, EOI
pub fn tiny_jpeg() -> Vec<u8> {
    vec![
        0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x08, 0x00, 0x08, 0x03, 0x01, 0x22, 0x00,
        0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xD9,
    ]
}
