// ABOUTME: Environment configuration for deployment-specific settings
// ABOUTME: Parses bind address, upload limits and vision collaborator settings with typed validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Environment-based configuration management

use moveid_core::constants::{limits, service};
use moveid_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Bind host
pub const HTTP_HOST_ENV: &str = "MOVEID_HTTP_HOST";
/// Bind port
pub const HTTP_PORT_ENV: &str = "MOVEID_HTTP_PORT";
/// Image upload limit in bytes
pub const MAX_IMAGE_BYTES_ENV: &str = "MOVEID_MAX_IMAGE_BYTES";
/// Video upload limit in bytes
pub const MAX_VIDEO_BYTES_ENV: &str = "MOVEID_MAX_VIDEO_BYTES";
/// Vision API key; the vision path is disabled without it
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// OpenAI-compatible endpoint
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";
/// Vision model
pub const OPENAI_VISION_MODEL_ENV: &str = "OPENAI_VISION_MODEL";
/// Vision request timeout in seconds
pub const OPENAI_TIMEOUT_SECS_ENV: &str = "OPENAI_TIMEOUT_SECS";
/// Set to `false` for endpoints that reject `response_format`
pub const OPENAI_JSON_MODE_ENV: &str = "OPENAI_JSON_MODE";
/// Deployment environment
pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";
/// Comma-separated CORS origins, `*` for any
pub const CORS_ALLOWED_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";

const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_VISION_MODEL: &str = "gpt-4o";
const DEFAULT_VISION_TIMEOUT_SECS: u64 = 60;

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl HttpConfig {
    /// `host:port` for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upload size limits per media kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest accepted image, in bytes
    pub max_image_bytes: u64,
    /// Largest accepted video, in bytes
    pub max_video_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: limits::MAX_IMAGE_BYTES,
            max_video_bytes: limits::MAX_VIDEO_BYTES,
        }
    }
}

impl UploadLimits {
    /// Request body limit: the larger media limit plus multipart framing
    #[must_use]
    pub fn body_limit(&self) -> usize {
        let bytes = self
            .max_image_bytes
            .max(self.max_video_bytes)
            .saturating_add(limits::MULTIPART_OVERHEAD_BYTES);
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }
}

/// Vision collaborator settings
#[derive(Clone, PartialEq, Eq)]
pub struct VisionConfig {
    /// API key; `None` disables the vision path
    pub api_key: Option<String>,
    /// OpenAI-compatible base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Ask the endpoint for JSON-only replies
    pub json_mode: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_owned(),
            model: DEFAULT_VISION_MODEL.to_owned(),
            timeout_secs: DEFAULT_VISION_TIMEOUT_SECS,
            json_mode: true,
        }
    }
}

impl VisionConfig {
    /// Whether an API key is configured
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

// keep the key out of logs
impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("json_mode", &self.json_mode)
            .finish()
    }
}

/// Cross-origin settings for the browser client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Comma-separated origins; empty or `*` allows any origin
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".to_owned(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Listener
    pub http: HttpConfig,
    /// Upload limits
    pub uploads: UploadLimits,
    /// Vision collaborator
    pub vision: VisionConfig,
    /// Cross-origin policy
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            http: HttpConfig {
                host: DEFAULT_HTTP_HOST.to_owned(),
                port: service::DEFAULT_HTTP_PORT,
            },
            uploads: UploadLimits::default(),
            vision: VisionConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigInvalid` error when a variable is set to a value that
    /// does not parse or violates a limit.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or(
                ENVIRONMENT_ENV,
                "development",
            )),
            http: HttpConfig {
                host: env_var_or(HTTP_HOST_ENV, DEFAULT_HTTP_HOST),
                port: parse_env(HTTP_PORT_ENV, service::DEFAULT_HTTP_PORT)?,
            },
            uploads: UploadLimits {
                max_image_bytes: parse_env(MAX_IMAGE_BYTES_ENV, limits::MAX_IMAGE_BYTES)?,
                max_video_bytes: parse_env(MAX_VIDEO_BYTES_ENV, limits::MAX_VIDEO_BYTES)?,
            },
            vision: VisionConfig {
                api_key: env::var(OPENAI_API_KEY_ENV)
                    .ok()
                    .map(|key| key.trim().to_owned())
                    .filter(|key| !key.is_empty()),
                base_url: env_var_or(OPENAI_BASE_URL_ENV, DEFAULT_OPENAI_BASE_URL)
                    .trim_end_matches('/')
                    .to_owned(),
                model: env_var_or(OPENAI_VISION_MODEL_ENV, DEFAULT_VISION_MODEL),
                timeout_secs: parse_env(OPENAI_TIMEOUT_SECS_ENV, DEFAULT_VISION_TIMEOUT_SECS)?,
                json_mode: parse_env(OPENAI_JSON_MODE_ENV, true)?,
            },
            cors: CorsConfig {
                allowed_origins: env_var_or(CORS_ALLOWED_ORIGINS_ENV, "*"),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigInvalid` error for zero limits, a zero timeout or an
    /// empty host.
    pub fn validate(&self) -> AppResult<()> {
        if self.http.host.trim().is_empty() {
            return Err(AppError::config_invalid(format!("{HTTP_HOST_ENV} cannot be empty")));
        }
        if self.uploads.max_image_bytes == 0 || self.uploads.max_video_bytes == 0 {
            return Err(AppError::config_invalid("Upload limits must be greater than zero"));
        }
        if self.vision.timeout_secs == 0 {
            return Err(AppError::config_invalid(format!(
                "{OPENAI_TIMEOUT_SECS_ENV} must be greater than zero"
            )));
        }
        Ok(())
    }

    /// Log-safe one-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "MoveID configuration: environment={}, bind={}, max_image={} MB, max_video={} MB, vision={}",
            self.environment,
            self.http.bind_address(),
            self.uploads.max_image_bytes / limits::MIB,
            self.uploads.max_video_bytes / limits::MIB,
            if self.vision.is_enabled() {
                format!("enabled ({} via {})", self.vision.model, self.vision.base_url)
            } else {
                "disabled (mock analysis)".to_owned()
            }
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|error: T::Err| {
            AppError::config_invalid(format!("Invalid {key} value '{raw}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
