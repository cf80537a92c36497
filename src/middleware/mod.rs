// ABOUTME: HTTP middleware for the MoveID server
// ABOUTME: Cross-origin policy applied in front of every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

/// CORS layer configuration
pub mod cors;

pub use cors::setup_cors;
