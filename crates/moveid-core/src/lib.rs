// ABOUTME: Core types and constants for the MoveID movement analysis service
// ABOUTME: Foundation crate with error handling, the analysis report model, and upload limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

#![deny(unsafe_code)]

//! # `MoveID` Core
//!
//! Shared types for the `MoveID` workspace. The analysis generator, the report
//! renderer and the HTTP service all speak in terms of the types defined here.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and `AppResult`
//! - **models**: `AnalysisReport` and the upload metadata echoed back to clients
//! - **constants**: Upload limits, accepted MIME prefixes and service defaults

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Analysis report data model and upload metadata
pub mod models;

/// Application constants organized by domain
pub mod constants;
