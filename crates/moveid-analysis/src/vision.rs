// ABOUTME: Parsing of vision model replies into image analysis results
// ABOUTME: Free-text or malformed replies degrade to a text-only, lower-confidence analysis
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Vision reply parsing.
//!
//! The vision collaborator is asked for a JSON object but may answer with
//! prose, a fenced code block, or a JSON object missing fields. Every one of
//! those cases yields an [`ImageAnalysis`]; parsing never fails.

use moveid_core::constants::scoring;
use moveid_core::models::{AnalysisReport, BiomechanicsBlock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::generator::movement_quality_label;

/// Confidence assumed when a well-formed reply omits it
const DEFAULT_REPLY_CONFIDENCE: f64 = 0.8;

/// Result of analyzing a single still image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Exercise recognized in the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_detected: Option<String>,
    /// Overall score reported by the model, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Human-readable summary
    #[serde(default)]
    pub description: String,
    /// Posture observations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub posture_analysis: Vec<String>,
    /// Joint name to estimated angle in degrees
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub joint_angles: BTreeMap<String, f64>,
    /// Risk warnings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_factors: Vec<String>,
    /// Recommendations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    /// Certainty of the analysis, 0-1
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,
}

const fn default_confidence() -> f64 {
    DEFAULT_REPLY_CONFIDENCE
}

impl ImageAnalysis {
    /// Text-only analysis wrapping a raw reply
    pub fn text_only(text: impl Into<String>, confidence_score: f64) -> Self {
        Self {
            exercise_detected: None,
            score: None,
            description: text.into(),
            posture_analysis: Vec::new(),
            joint_angles: BTreeMap::new(),
            risk_factors: Vec::new(),
            recommendations: Vec::new(),
            confidence_score,
        }
    }

    /// Analysis used when the vision collaborator could not be reached
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self::text_only(
            format!("Automatic image analysis is currently unavailable ({reason})."),
            scoring::UNAVAILABLE_CONFIDENCE,
        )
    }

    /// Convert into a full report for rendering
    ///
    /// Missing collections become empty; a missing score uses the fallback score.
    #[must_use]
    pub fn into_report(self) -> AnalysisReport {
        let score = self
            .score
            .filter(|value| value.is_finite())
            .map_or(scoring::FALLBACK_SCORE, |value| {
                value.round().clamp(0.0, 100.0) as u8
            });
        let mut recommendations = self.recommendations;
        recommendations.extend(
            self.posture_analysis
                .into_iter()
                .map(|note| format!("Posture: {note}")),
        );

        AnalysisReport {
            score,
            description: self.description,
            movement_phases: Vec::new(),
            biomechanics: BiomechanicsBlock {
                joint_angles: self.joint_angles,
                muscle_activation: std::collections::BTreeSet::new(),
                risk_factors: self.risk_factors,
                movement_quality: movement_quality_label(score).to_owned(),
            },
            recommendations,
            confidence_score: self.confidence_score.clamp(0.0, 1.0),
        }
    }

    fn normalized(mut self) -> Self {
        if !self.confidence_score.is_finite() {
            self.confidence_score = DEFAULT_REPLY_CONFIDENCE;
        }
        self.confidence_score = self.confidence_score.clamp(0.0, 1.0);
        self.score = self
            .score
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, 100.0));
        self
    }
}

/// Parse a vision model reply, falling back to a text-only analysis
///
/// Only a JSON object with a non-empty `description` counts as the requested
/// shape; anything else is wrapped as raw text.
#[must_use]
pub fn parse_vision_reply(reply: &str) -> ImageAnalysis {
    match structured_reply(strip_code_fence(reply)) {
        Ok(analysis) => analysis.normalized(),
        Err(reason) => {
            warn!(
                %reason,
                reply_len = reply.len(),
                "vision reply is not the requested JSON shape, wrapping raw text"
            );
            ImageAnalysis::text_only(reply.trim(), scoring::TEXT_REPLY_CONFIDENCE)
        }
    }
}

fn structured_reply(payload: &str) -> Result<ImageAnalysis, String> {
    let value: serde_json::Value = serde_json::from_str(payload).map_err(|e| e.to_string())?;
    let has_description = value
        .as_object()
        .and_then(|object| object.get("description"))
        .and_then(serde_json::Value::as_str)
        .is_some_and(|description| !description.trim().is_empty());
    if !has_description {
        return Err("reply has no description".to_owned());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Extract the body of a markdown code fence, if the reply is wrapped in one
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string (e.g. "json") on the opening line
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
