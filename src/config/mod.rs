// ABOUTME: Configuration module for the MoveID HTTP service
// ABOUTME: Exposes environment-driven server, upload limit and vision collaborator settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Configuration for the `MoveID` server.
//!
//! All settings come from environment variables; see [`environment`].

/// Environment and server configuration
pub mod environment;

pub use environment::{
    CorsConfig, Environment, HttpConfig, ServerConfig, UploadLimits, VisionConfig,
};
