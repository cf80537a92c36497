// ABOUTME: Main library entry point for the MoveID movement analysis service
// ABOUTME: Wires configuration, logging, the vision client and HTTP routes around the analysis and report crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

#![deny(unsafe_code)]

//! # `MoveID` Server
//!
//! HTTP service that accepts exercise images and videos, returns a structured
//! movement analysis, and renders analyses as downloadable PDF reports.
//!
//! ## Workspace
//!
//! - `moveid-core`: errors, the analysis data model and upload limits
//! - `moveid-analysis`: the banded mock generator and vision reply parsing
//! - `moveid-report`: paginated PDF rendering
//! - this crate: configuration, logging, the vision collaborator, routes and
//!   the server binary
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use moveid_server::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     moveid_server::server::serve(config).await
//! }
//! ```

/// Environment-based configuration
pub mod config;

/// Vision collaborator client and prompts
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Shared per-process resources
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Client view state machine
pub mod view_state;
