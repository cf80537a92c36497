// ABOUTME: Vision collaborator abstraction for still-image movement analysis
// ABOUTME: Defines the provider trait, capability flags and the never-failing analysis entry point
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! # Vision Providers
//!
//! A [`VisionProvider`] sends one image plus an instruction to a multimodal
//! model and returns the raw reply text. [`analyze_image`] wraps a provider so
//! that neither transport failures nor malformed replies reach the caller.
//!
//! ```rust,no_run
//! use moveid_server::llm::{analyze_image, OpenAiVisionProvider, VisionRequest};
//! use moveid_server::config::VisionConfig;
//! use moveid_core::errors::AppError;
//!
//! # async fn example(image: &[u8]) -> Result<(), AppError> {
//! let config = VisionConfig { api_key: Some("sk-...".into()), ..VisionConfig::default() };
//! let provider = OpenAiVisionProvider::new(config)?;
//! let request = VisionRequest::new(image, "image/jpeg", "agachamento");
//! let analysis = analyze_image(&provider, &request).await;
//! println!("{}", analysis.description);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use moveid_analysis::vision::{parse_vision_reply, ImageAnalysis};
use moveid_core::errors::AppError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// OpenAI-compatible chat completions client
pub mod openai;

/// Prompts sent with each image
pub mod prompts;

pub use openai::OpenAiVisionProvider;

bitflags::bitflags! {
    /// Vision provider capability flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct VisionCapabilities: u8 {
        /// Accepts image input
        const IMAGE_INPUT = 0b0000_0001;
        /// Can be asked for JSON-only output
        const JSON_MODE = 0b0000_0010;
        /// Honors system messages
        const SYSTEM_MESSAGES = 0b0000_0100;
    }
}

impl VisionCapabilities {
    /// Capabilities of a full multimodal chat model
    #[must_use]
    pub const fn multimodal() -> Self {
        Self::IMAGE_INPUT
            .union(Self::JSON_MODE)
            .union(Self::SYSTEM_MESSAGES)
    }

    /// Check if image input is supported
    #[must_use]
    pub const fn supports_images(&self) -> bool {
        self.contains(Self::IMAGE_INPUT)
    }

    /// Check if JSON mode is supported
    #[must_use]
    pub const fn supports_json_mode(&self) -> bool {
        self.contains(Self::JSON_MODE)
    }
}

/// One image analysis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionRequest {
    /// Base64-encoded image bytes
    pub image_base64: String,
    /// MIME type of the image
    pub mime_type: String,
    /// Exercise label declared by the user
    pub exercise_label: String,
}

impl VisionRequest {
    /// Encode `image` for transport
    pub fn new(
        image: &[u8],
        mime_type: impl Into<String>,
        exercise_label: impl Into<String>,
    ) -> Self {
        Self {
            image_base64: STANDARD.encode(image),
            mime_type: mime_type.into(),
            exercise_label: exercise_label.into(),
        }
    }

    /// `data:` URL embedding the image
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.image_base64)
    }
}

/// Multimodal model able to describe an image
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Unique provider identifier
    fn name(&self) -> &'static str;

    /// Model used for requests
    fn model(&self) -> &str;

    /// Supported features
    fn capabilities(&self) -> VisionCapabilities;

    /// Send the image and return the raw reply text
    async fn describe_image(&self, request: &VisionRequest) -> Result<String, AppError>;
}

/// Analyze an image, degrading instead of failing
///
/// Transport errors yield [`ImageAnalysis::unavailable`]; replies that are not
/// the requested JSON yield a text-only analysis.
pub async fn analyze_image(
    provider: &dyn VisionProvider,
    request: &VisionRequest,
) -> ImageAnalysis {
    match provider.describe_image(request).await {
        Ok(reply) => {
            debug!(
                provider = provider.name(),
                model = provider.model(),
                reply_len = reply.len(),
                "vision reply received"
            );
            parse_vision_reply(&reply)
        }
        Err(error) => {
            warn!(
                provider = provider.name(),
                code = ?error.code,
                error = %error,
                "vision request failed, returning text-only analysis"
            );
            ImageAnalysis::unavailable(&error.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl VisionProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn model(&self) -> &str {
            "none"
        }

        fn capabilities(&self) -> VisionCapabilities {
            VisionCapabilities::multimodal()
        }

        async fn describe_image(&self, _request: &VisionRequest) -> Result<String, AppError> {
            Err(AppError::external_service("Vision", "connection refused"))
        }
    }

    #[tokio::test]
    async fn test_transport_failure_degrades() {
        let request = VisionRequest::new(b"img", "image/png", "squat");
        let analysis = analyze_image(&FailingProvider, &request).await;
        assert!((analysis.confidence_score - 0.5).abs() < f64::EPSILON);
        assert!(analysis.description.contains("connection refused"));
    }

    #[test]
    fn test_data_url() {
        let request = VisionRequest::new(b"abc", "image/jpeg", "");
        assert_eq!(request.data_url(), "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn test_capabilities() {
        let caps = VisionCapabilities::multimodal();
        assert!(caps.supports_images());
        assert!(caps.supports_json_mode());
        assert!(!VisionCapabilities::default().supports_images());
    }
}
