// ABOUTME: Analysis report data model shared by the generator, renderer and HTTP layer
// ABOUTME: Also defines uploaded file metadata and the media kind derived from its MIME type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Analysis data model.
//!
//! An [`AnalysisReport`] is created once per request, never mutated, and read by
//! the renderer. Collections deserialize to empty values when absent so that
//! consumers can iterate without null checks.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::{mime, scoring};
use crate::errors::{AppError, AppResult};

/// Result of one temporally-bounded phase of the movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResult {
    /// Phase label (descent, bottom, ascent, ...)
    pub phase: String,
    /// Position of the phase within the movement, 0-100
    pub timestamp_percent: f64,
    /// Free-text commentary for the phase
    #[serde(default)]
    pub analysis: String,
    /// Phase quality, 0-100
    pub quality_score: u8,
}

/// Biomechanical metrics block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomechanicsBlock {
    /// Joint name to angle in degrees
    #[serde(default)]
    pub joint_angles: BTreeMap<String, f64>,
    /// Muscles considered active during the movement
    #[serde(default)]
    pub muscle_activation: BTreeSet<String>,
    /// Ordered free-text warnings
    #[serde(default)]
    pub risk_factors: Vec<String>,
    /// Free-text movement quality label
    #[serde(default)]
    pub movement_quality: String,
}

/// Structured movement analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Overall quality, 0-100
    pub score: u8,
    /// Human-readable summary
    #[serde(default)]
    pub description: String,
    /// Phases ordered by increasing `timestamp_percent`
    #[serde(default)]
    pub movement_phases: Vec<PhaseResult>,
    /// Biomechanical metrics
    #[serde(default)]
    pub biomechanics: BiomechanicsBlock,
    /// Ordered recommendations
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Certainty of the analysis, 0-1
    pub confidence_score: f64,
}

impl AnalysisReport {
    /// Minimal report returned when generation fails
    #[must_use]
    pub fn fallback(exercise_label: &str) -> Self {
        Self {
            score: scoring::FALLBACK_SCORE,
            description: format!(
                "Basic analysis of the {exercise_label} movement. Detailed metrics were not available for this submission."
            ),
            movement_phases: Vec::new(),
            biomechanics: BiomechanicsBlock {
                movement_quality: "Not assessed".to_owned(),
                ..BiomechanicsBlock::default()
            },
            recommendations: vec![
                "Record the exercise again with the whole body in frame".to_owned(),
                "Consult a qualified professional for a personalized assessment".to_owned(),
            ],
            confidence_score: scoring::FALLBACK_CONFIDENCE,
        }
    }

    /// Check the declared numeric ranges and the phase order
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        self.ensure_valid().is_ok()
    }

    /// Check that phases are ordered by non-decreasing timestamp
    #[must_use]
    pub fn phases_are_ordered(&self) -> bool {
        self.movement_phases
            .windows(2)
            .all(|pair| pair[0].timestamp_percent <= pair[1].timestamp_percent)
    }

    /// Reject reports supplied from outside that break the declared ranges
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error naming the first offending field.
    pub fn ensure_valid(&self) -> AppResult<()> {
        if self.score > 100 {
            return Err(AppError::invalid_input(format!(
                "report.score must be between 0 and 100, got {}",
                self.score
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(AppError::invalid_input(format!(
                "report.confidenceScore must be between 0 and 1, got {}",
                self.confidence_score
            )));
        }
        if let Some(phase) = self
            .movement_phases
            .iter()
            .find(|phase| phase.quality_score > 100)
        {
            return Err(AppError::invalid_input(format!(
                "qualityScore of phase '{}' must be between 0 and 100, got {}",
                phase.phase, phase.quality_score
            )));
        }
        if !self.phases_are_ordered() {
            return Err(AppError::invalid_input(
                "report.movementPhases must be ordered by timestampPercent",
            ));
        }
        Ok(())
    }
}

/// Coarse media category of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image
    Image,
    /// Video clip
    Video,
}

impl MediaKind {
    /// Classify a MIME type by prefix
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let lower = mime_type.trim().to_ascii_lowercase();
        if lower.starts_with(mime::IMAGE_PREFIX) {
            Some(Self::Image)
        } else if lower.starts_with(mime::VIDEO_PREFIX) {
            Some(Self::Video)
        } else {
            None
        }
    }

    /// Display label used in messages
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
        }
    }
}

/// Metadata of an uploaded file, echoed back but never analyzed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Original file name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Declared MIME type
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_default_to_empty() {
        let report: AnalysisReport =
            serde_json::from_str(r#"{"score": 80, "confidenceScore": 0.9}"#).unwrap();
        assert!(report.movement_phases.is_empty());
        assert!(report.biomechanics.joint_angles.is_empty());
        assert!(report.biomechanics.risk_factors.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let json = serde_json::to_value(AnalysisReport::fallback("squat")).unwrap();
        assert_eq!(json["score"], 75);
        assert!(json["movementPhases"].as_array().unwrap().is_empty());
        assert!(json["biomechanics"]["riskFactors"].as_array().unwrap().is_empty());
        assert!(json.get("confidenceScore").is_some());
    }

    #[test]
    fn test_ensure_valid_rejects_out_of_range_fields() {
        assert!(AnalysisReport::fallback("squat").ensure_valid().is_ok());

        let mut report = AnalysisReport::fallback("squat");
        report.score = 200;
        let error = report.ensure_valid().unwrap_err();
        assert_eq!(error.code, crate::errors::ErrorCode::InvalidInput);
        assert!(error.message.contains("200"));

        let mut report = AnalysisReport::fallback("squat");
        report.confidence_score = f64::NAN;
        assert!(report.ensure_valid().is_err());

        let mut report = AnalysisReport::fallback("squat");
        report.movement_phases = vec![
            PhaseResult {
                phase: "Ascent".to_owned(),
                timestamp_percent: 70.0,
                analysis: String::new(),
                quality_score: 80,
            },
            PhaseResult {
                phase: "Descent".to_owned(),
                timestamp_percent: 10.0,
                analysis: String::new(),
                quality_score: 80,
            },
        ];
        assert!(report.ensure_valid().unwrap_err().message.contains("ordered"));
    }

    #[test]
    fn test_media_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("Video/MP4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_mime("application/pdf"), None);
    }
}
