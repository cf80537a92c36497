// ABOUTME: Mock movement analysis engine for the MoveID service
// ABOUTME: Parameter tables per exercise, banded random generation, and vision reply parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

#![deny(unsafe_code)]

//! # `MoveID` Analysis
//!
//! No signal processing happens here. Every numeric field of an
//! [`AnalysisReport`](moveid_core::models::AnalysisReport) is drawn from a
//! hand-tuned band looked up by exercise label, and the text fields are
//! chosen by score thresholds so that worse scores carry more warnings.
//!
//! - [`profiles`]: the single configuration table of bands and thresholds
//! - [`generator`]: [`MockAnalysisGenerator`] with fallback-on-error
//! - [`vision`]: parsing of vision-model replies into [`ImageAnalysis`]

/// Per-exercise parameter tables and risk thresholds
pub mod profiles;

/// Banded random report generation
pub mod generator;

/// Vision model reply parsing with text-only fallback
pub mod vision;

pub use generator::{AnalysisRequest, GenerationError, MockAnalysisGenerator, MovementAnalyzer};
pub use profiles::{Band, ExerciseProfile};
pub use vision::{parse_vision_reply, ImageAnalysis};
