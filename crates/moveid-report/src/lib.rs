// ABOUTME: PDF rendering of MoveID analysis reports
// ABOUTME: Paginates a fixed section order onto A4 pages with charts, tables and an optional source frame
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

#![deny(unsafe_code)]

//! # `MoveID` Report
//!
//! Turns an [`AnalysisReport`](moveid_core::models::AnalysisReport) into a
//! single printable PDF. Rendering is a pure in-memory transformation: no
//! files are read or written and no state is shared between calls.
//!
//! The pipeline is:
//!
//! 1. [`metrics`] measures and wraps text with the standard Helvetica widths
//! 2. [`layout`] places each block with a greedy page cursor
//! 3. [`chart`] rasterizes the joint-angle bar chart
//! 4. [`image`] decodes the optional source frame for embedding
//! 5. [`pdf`] serializes the drawn pages
//!
//! [`renderer::ReportRenderer`] drives all of it.

/// Risk level and joint angle heuristics shown in the report
pub mod assessment;

/// Joint angle bar chart rasterization
pub mod chart;

/// Source image decoding for embedding
pub mod image;

/// Page geometry and the pagination cursor
pub mod layout;

/// Font metrics and word wrapping
pub mod metrics;

/// Minimal PDF drawing surface
pub mod pdf;

/// Section layout and document assembly
pub mod renderer;

pub use assessment::{evaluate_joint_angle, normal_range, AngleEvaluation, RiskLevel};
pub use renderer::{
    report_file_name, BlockPlacement, RenderError, RenderOptions, RenderRequest, RenderedDocument,
    ReportRenderer, Section,
};
