// ABOUTME: Route module organization for the MoveID HTTP endpoints
// ABOUTME: Groups upload analysis, report rendering and health routes by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Route module for the `MoveID` server
//!
//! Each domain module exposes a `*Routes` type whose `routes` function returns
//! a router with its state already applied, so the server only merges them.

use axum::http::HeaderMap;

/// Upload and image analysis routes
pub mod analysis;
/// Health check routes
pub mod health;
/// PDF report routes
pub mod report;

/// Upload analysis route handlers
pub use analysis::AnalysisRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Report rendering route handlers
pub use report::ReportRoutes;

/// Header carrying the per-request identifier
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request identifier set by the request-id layer, or `unknown`
pub(crate) fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_owned()
}
