// ABOUTME: Application constants for upload validation, scoring and service defaults
// ABOUTME: Single place for numeric limits shared across the workspace crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Application-wide constants organized by domain

/// Upload size limits
pub mod limits {
    /// One mebibyte
    pub const MIB: u64 = 1_048_576;
    /// Maximum accepted image size (10 MB)
    pub const MAX_IMAGE_BYTES: u64 = 10 * MIB;
    /// Maximum accepted video size (50 MB)
    pub const MAX_VIDEO_BYTES: u64 = 50 * MIB;
    /// Extra room on top of the largest file for multipart framing
    pub const MULTIPART_OVERHEAD_BYTES: u64 = MIB;
}

/// MIME prefixes accepted by the upload endpoint
pub mod mime {
    /// Prefix for still images
    pub const IMAGE_PREFIX: &str = "image/";
    /// Prefix for videos
    pub const VIDEO_PREFIX: &str = "video/";
}

/// Scoring constants shared by generation and fallbacks
pub mod scoring {
    /// Score of the minimal report produced when generation fails
    pub const FALLBACK_SCORE: u8 = 75;
    /// Confidence of the minimal fallback report
    pub const FALLBACK_CONFIDENCE: f64 = 0.6;
    /// Confidence assigned when the vision model replies with free text
    pub const TEXT_REPLY_CONFIDENCE: f64 = 0.7;
    /// Confidence assigned when the vision model could not be reached
    pub const UNAVAILABLE_CONFIDENCE: f64 = 0.5;
}

/// Service identity and defaults
pub mod service {
    /// Service name used in logs
    pub const SERVICE_NAME: &str = "moveid-server";
    /// Label used when the client sends no exercise type
    pub const DEFAULT_EXERCISE_LABEL: &str = "default";
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}
