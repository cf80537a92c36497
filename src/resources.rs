// ABOUTME: Shared resource container handed to every route as axum state
// ABOUTME: Holds the analyzer, the optional vision provider, the renderer and upload limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! # Server Resources
//!
//! Everything a request needs is created once at startup and shared through
//! an `Arc<ServerResources>`. Nothing in here is mutated after construction,
//! so concurrent requests never contend on shared state.

use std::sync::Arc;

use moveid_analysis::{MockAnalysisGenerator, MovementAnalyzer};
use moveid_core::errors::AppResult;
use moveid_report::ReportRenderer;
use tracing::{info, warn};

use crate::config::{Environment, ServerConfig, UploadLimits};
use crate::llm::{OpenAiVisionProvider, VisionProvider};

/// Resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Report source for videos and for images when vision is disabled
    pub analyzer: Arc<dyn MovementAnalyzer>,
    /// Vision collaborator, present only when an API key is configured
    pub vision: Option<Arc<dyn VisionProvider>>,
    /// PDF renderer
    pub renderer: ReportRenderer,
    /// Upload size limits
    pub limits: UploadLimits,
    /// Deployment environment
    pub environment: Environment,
}

impl ServerResources {
    /// Assemble resources from explicit parts
    ///
    /// A vision provider without image input is dropped, so images fall back
    /// to the analyzer.
    #[must_use]
    pub fn new(
        analyzer: Arc<dyn MovementAnalyzer>,
        vision: Option<Arc<dyn VisionProvider>>,
        limits: UploadLimits,
        environment: Environment,
    ) -> Self {
        let vision = vision.filter(|provider| {
            let supported = provider.capabilities().supports_images();
            if !supported {
                warn!(
                    provider = provider.name(),
                    model = provider.model(),
                    "vision provider does not accept images, using the mock generator"
                );
            }
            supported
        });
        Self {
            analyzer,
            vision,
            renderer: ReportRenderer::new(),
            limits,
            environment,
        }
    }

    /// Build resources from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the vision HTTP client cannot be created.
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let vision: Option<Arc<dyn VisionProvider>> = if config.vision.is_enabled() {
            let provider = OpenAiVisionProvider::new(config.vision.clone())?;
            info!(
                provider = provider.name(),
                model = provider.model(),
                "vision analysis enabled"
            );
            Some(Arc::new(provider))
        } else {
            info!("vision analysis disabled, images use the mock generator");
            None
        };

        Ok(Self::new(
            Arc::new(MockAnalysisGenerator::new()),
            vision,
            config.uploads,
            config.environment,
        ))
    }

    /// Resources with the mock generator only, for tests and the CLI
    #[must_use]
    pub fn mock(limits: UploadLimits) -> Self {
        Self::new(
            Arc::new(MockAnalysisGenerator::new()),
            None,
            limits,
            Environment::Testing,
        )
    }

    /// Whether still images go through the vision collaborator
    #[must_use]
    pub const fn vision_enabled(&self) -> bool {
        self.vision.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{VisionCapabilities, VisionRequest};

    #[test]
    fn test_from_config_without_key_uses_mock() {
        let resources = ServerResources::from_config(&ServerConfig::default()).unwrap();
        assert!(!resources.vision_enabled());
        assert_eq!(resources.limits, UploadLimits::default());
    }

    #[test]
    fn test_from_config_with_key_enables_vision() {
        let mut config = ServerConfig::default();
        config.vision.api_key = Some("sk-test".to_owned());
        let resources = ServerResources::from_config(&config).unwrap();
        assert!(resources.vision_enabled());
    }

    #[test]
    fn test_text_only_provider_is_dropped() {
        struct TextOnly;

        #[async_trait::async_trait]
        impl VisionProvider for TextOnly {
            fn name(&self) -> &'static str {
                "text-only"
            }

            fn model(&self) -> &str {
                "text-model"
            }

            fn capabilities(&self) -> VisionCapabilities {
                VisionCapabilities::JSON_MODE | VisionCapabilities::SYSTEM_MESSAGES
            }

            async fn describe_image(&self, _request: &VisionRequest) -> AppResult<String> {
                Ok(String::new())
            }
        }

        let resources = ServerResources::new(
            Arc::new(MockAnalysisGenerator::new()),
            Some(Arc::new(TextOnly)),
            UploadLimits::default(),
            Environment::Testing,
        );
        assert!(!resources.vision_enabled());
    }
}
