// ABOUTME: OpenAI-compatible vision provider using the chat completions endpoint
// ABOUTME: Sends the image as a data URL content part and maps HTTP failures onto error codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! # `OpenAI`-Compatible Vision Provider
//!
//! Works with any endpoint implementing `POST /chat/completions` with
//! multimodal content parts. Configured through
//! [`VisionConfig`](crate::config::VisionConfig).

use async_trait::async_trait;
use moveid_core::errors::{AppError, ErrorCode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

use super::prompts::{image_analysis_prompt, VISION_SYSTEM_PROMPT};
use super::{VisionCapabilities, VisionProvider, VisionRequest};
use crate::config::VisionConfig;

const SERVICE_NAME: &str = "OpenAI";
const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_REPLY_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Vision provider for `OpenAI` and compatible endpoints
pub struct OpenAiVisionProvider {
    client: Client,
    config: VisionConfig,
}

impl OpenAiVisionProvider {
    /// Create a provider
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client cannot
    /// be created.
    pub fn new(config: VisionConfig) -> Result<Self, AppError> {
        if config.api_key.is_none() {
            return Err(AppError::config("OPENAI_API_KEY is required for image analysis"));
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn build_request<'a>(&'a self, request: &VisionRequest) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages: vec![
                RequestMessage {
                    role: "system",
                    content: MessageContent::Text(VISION_SYSTEM_PROMPT.to_owned()),
                },
                RequestMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: image_analysis_prompt(&request.exercise_label),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: request.data_url(),
                            },
                        },
                    ]),
                },
            ],
            max_tokens: MAX_REPLY_TOKENS,
            temperature: TEMPERATURE,
            response_format: self.capabilities().supports_json_mode().then_some(ResponseFormat {
                format_type: "json_object",
            }),
        }
    }

    /// Map a non-success response onto an application error
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) else {
            return AppError::external_service(
                SERVICE_NAME,
                format!(
                    "API error ({status}): {}",
                    body.chars().take(200).collect::<String>()
                ),
            );
        };
        let message = error_response.error.message;
        match status.as_u16() {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("Vision API authentication failed: {message}"),
            ),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("Vision API rate limit reached: {message}"),
            ),
            400 => {
                AppError::external_service(SERVICE_NAME, format!("Request rejected: {message}"))
            }
            503 => AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("Vision API unavailable: {message}"),
            ),
            _ => AppError::external_service(
                SERVICE_NAME,
                format!(
                    "{} - {message}",
                    error_response.error.error_type.as_deref().unwrap_or("unknown")
                ),
            ),
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAiVisionProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn capabilities(&self) -> VisionCapabilities {
        let mut capabilities = VisionCapabilities::multimodal();
        capabilities.set(VisionCapabilities::JSON_MODE, self.config.json_mode);
        capabilities
    }

    #[instrument(
        skip(self, request),
        fields(model = %self.config.model, mime = %request.mime_type)
    )]
    async fn describe_image(&self, request: &VisionRequest) -> Result<String, AppError> {
        let body = self.build_request(request);
        let response = self
            .add_auth_header(self.client.post(self.api_url("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("Vision API request failed: {e}"),
                )
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("Failed to read reply: {e}"))
        })?;
        if !status.is_success() {
            return Err(Self::parse_error_response(status, &text));
        }

        let completion: CompletionResponse = serde_json::from_str(&text).map_err(|e| {
            AppError::external_service(SERVICE_NAME, format!("Malformed completion: {e}"))
        })?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::external_service(SERVICE_NAME, "Completion has no content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiVisionProvider {
        OpenAiVisionProvider::new(VisionConfig {
            api_key: Some("test-key".into()),
            base_url: "http://localhost:9/v1/".into(),
            ..VisionConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        assert!(OpenAiVisionProvider::new(VisionConfig::default()).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let provider = provider();
        let request = VisionRequest::new(b"abc", "image/png", "supino");
        let body = serde_json::to_value(provider.build_request(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"][0]["type"], "text");
        assert_eq!(body["messages"][1]["content"][1]["type"], "image_url");
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/png;base64,YWJj"
        );
        assert_eq!(
            provider.api_url("chat/completions"),
            "http://localhost:9/v1/chat/completions"
        );
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_json_mode_can_be_turned_off() {
        let provider = OpenAiVisionProvider::new(VisionConfig {
            api_key: Some("test-key".into()),
            json_mode: false,
            ..VisionConfig::default()
        })
        .unwrap();
        assert!(provider.capabilities().supports_images());
        assert!(!provider.capabilities().supports_json_mode());

        let request = VisionRequest::new(b"abc", "image/png", "supino");
        let body = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_error_mapping() {
        let body = r#"{"error":{"message":"bad key","type":"invalid_request_error"}}"#;
        let error =
            OpenAiVisionProvider::parse_error_response(reqwest::StatusCode::UNAUTHORIZED, body);
        assert_eq!(error.code, ErrorCode::ExternalAuthFailed);

        let error = OpenAiVisionProvider::parse_error_response(
            reqwest::StatusCode::BAD_GATEWAY,
            "<html>upstream</html>",
        );
        assert_eq!(error.code, ErrorCode::ExternalServiceError);
    }
}
