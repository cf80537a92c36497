// ABOUTME: Mock analysis generator drawing report fields from exercise parameter bands
// ABOUTME: Never fails toward the caller; generation errors degrade to a fixed fallback report
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Banded random report generation.
//!
//! The overall score is the rounded mean of three independently drawn
//! sub-scores (base, technique, safety). Risk factors and advice depend only
//! on that score and the exercise label, so for a fixed label a lower score
//! never carries fewer warnings than a higher one.

use moveid_core::models::{AnalysisReport, BiomechanicsBlock, FileMetadata, PhaseResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};

use crate::profiles::{self, thresholds, ExerciseProfile};

/// Closing recommendations present in every generated report
pub const CLOSING_RECOMMENDATIONS: [&str; 2] = [
    "Warm up thoroughly before each training session",
    "Reassess your technique periodically with a new recording",
];

/// Errors raised while drawing report values
#[derive(Debug, Error, PartialEq)]
pub enum GenerationError {
    /// A parameter band is empty or not finite
    #[error("invalid band for {field}: [{min}, {max}]")]
    InvalidBand {
        /// Field being generated
        field: &'static str,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// The profile declares no phases or joints
    #[error("profile '{0}' has an empty parameter table")]
    EmptyProfile(&'static str),
}

/// Input of one generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Free-text exercise label
    pub exercise_type: String,
    /// Metadata of the submitted file, echoed only
    pub file: Option<FileMetadata>,
}

impl AnalysisRequest {
    /// Request for a label without file metadata
    pub fn for_exercise(exercise_type: impl Into<String>) -> Self {
        Self {
            exercise_type: exercise_type.into(),
            file: None,
        }
    }
}

/// Source of analysis reports for uploaded media
///
/// Implementations must not fail toward the caller.
pub trait MovementAnalyzer: Send + Sync {
    /// Produce a report for the request
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport;
}

/// Generator of plausible but synthetic analysis reports
#[derive(Debug, Clone)]
pub struct MockAnalysisGenerator {
    profiles: Vec<&'static ExerciseProfile>,
    default_profile: &'static ExerciseProfile,
}

impl Default for MockAnalysisGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalysisGenerator {
    /// Generator over the built-in parameter tables
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: profiles::BUILTIN.to_vec(),
            default_profile: &profiles::DEFAULT,
        }
    }

    /// Generator over custom parameter tables
    #[must_use]
    pub fn with_profiles(
        profiles: Vec<&'static ExerciseProfile>,
        default_profile: &'static ExerciseProfile,
    ) -> Self {
        Self {
            profiles,
            default_profile,
        }
    }

    /// Profile used for `label`
    #[must_use]
    pub fn profile_for(&self, label: &str) -> &'static ExerciseProfile {
        profiles::resolve(&self.profiles, self.default_profile, label)
    }

    /// Generate a report using the thread-local random source
    #[must_use]
    pub fn generate(&self, request: &AnalysisRequest) -> AnalysisReport {
        self.generate_with_rng(request, &mut rand::thread_rng())
    }

    /// Generate a reproducible report from a seed
    #[must_use]
    pub fn generate_seeded(&self, request: &AnalysisRequest, seed: u64) -> AnalysisReport {
        self.generate_with_rng(request, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// Generate a report, substituting the fallback report on any error
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        request: &AnalysisRequest,
        rng: &mut R,
    ) -> AnalysisReport {
        let profile = self.profile_for(&request.exercise_type);
        match self.try_generate(request, rng) {
            Ok(report) => {
                debug!(
                    exercise = %request.exercise_type,
                    profile = profile.key,
                    score = report.score,
                    risks = report.biomechanics.risk_factors.len(),
                    "generated mock analysis"
                );
                report
            }
            Err(error) => {
                warn!(
                    exercise = %request.exercise_type,
                    profile = profile.key,
                    %error,
                    "mock analysis generation failed, returning fallback report"
                );
                AnalysisReport::fallback(profile.display_name)
            }
        }
    }

    /// Generate a report, surfacing generation errors
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved profile has an empty table or an
    /// invalid band.
    pub fn try_generate<R: Rng + ?Sized>(
        &self,
        request: &AnalysisRequest,
        rng: &mut R,
    ) -> Result<AnalysisReport, GenerationError> {
        let profile = self.profile_for(&request.exercise_type);
        if profile.phases.is_empty() || profile.joints.is_empty() {
            return Err(GenerationError::EmptyProfile(profile.key));
        }

        let score = overall_score(profile, rng)?;
        let movement_phases = phases(profile, score, rng)?;
        let joint_angles = joint_angles(profile, rng)?;
        let confidence = profile.confidence.sample(rng, "confidence")?;

        Ok(AnalysisReport {
            score,
            description: describe(profile, score),
            movement_phases,
            biomechanics: BiomechanicsBlock {
                joint_angles,
                muscle_activation: profile
                    .muscles
                    .iter()
                    .map(|muscle| (*muscle).to_owned())
                    .collect::<BTreeSet<_>>(),
                risk_factors: risk_factors(profile, score),
                movement_quality: movement_quality_label(score).to_owned(),
            },
            recommendations: recommendations(profile, score),
            confidence_score: round_to(confidence.clamp(0.0, 1.0), 2),
        })
    }
}

impl MovementAnalyzer for MockAnalysisGenerator {
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        self.generate(request)
    }
}

/// Quality label for an overall score
#[must_use]
pub const fn movement_quality_label(score: u8) -> &'static str {
    if score >= thresholds::EXCELLENT {
        "Excellent"
    } else if score >= thresholds::GOOD {
        "Good"
    } else if score >= thresholds::FAIR {
        "Fair"
    } else {
        "Needs improvement"
    }
}

/// Risk factors triggered by `score` for `profile`
#[must_use]
pub fn risk_factors(profile: &ExerciseProfile, score: u8) -> Vec<String> {
    let mut risks = Vec::new();
    if score < thresholds::EXERCISE_SPECIFIC_RISK {
        risks.push(profile.specific_risk.to_owned());
    }
    if score < thresholds::COMPENSATION_RISK {
        risks.push("Compensatory movement patterns detected during execution".to_owned());
    }
    if score < thresholds::SEVERE_RISK {
        risks.push(
            "High injury risk: significant deviation from safe movement mechanics".to_owned(),
        );
    }
    risks
}

/// Recommendations for `score` and `profile`
#[must_use]
pub fn recommendations(profile: &ExerciseProfile, score: u8) -> Vec<String> {
    let band_advice = if score < thresholds::GOOD {
        "Reduce the load and rebuild the movement pattern with slow, controlled repetitions"
    } else if score < thresholds::EXCELLENT {
        "Focus on consistent tempo and range of motion across all repetitions"
    } else {
        "Maintain the current technique and progress the load gradually"
    };

    std::iter::once(band_advice)
        .chain(profile.advice.iter().copied())
        .chain(CLOSING_RECOMMENDATIONS)
        .map(str::to_owned)
        .collect()
}

fn overall_score<R: Rng + ?Sized>(
    profile: &ExerciseProfile,
    rng: &mut R,
) -> Result<u8, GenerationError> {
    let base = profile.scores.base.sample(rng, "base score")?;
    let technique = profile.scores.technique.sample(rng, "technique score")?;
    let safety = profile.scores.safety.sample(rng, "safety score")?;
    Ok(to_score((base + technique + safety) / 3.0))
}

fn phases<R: Rng + ?Sized>(
    profile: &ExerciseProfile,
    score: u8,
    rng: &mut R,
) -> Result<Vec<PhaseResult>, GenerationError> {
    let mut phases = profile
        .phases
        .iter()
        .map(|template| -> Result<PhaseResult, GenerationError> {
            let offset = template.quality_offset.sample(rng, "phase quality")?;
            Ok(PhaseResult {
                phase: template.name.to_owned(),
                timestamp_percent: template.timestamp_percent,
                analysis: template.analysis.to_owned(),
                quality_score: to_score(f64::from(score) + offset),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    phases.sort_by(|a, b| a.timestamp_percent.total_cmp(&b.timestamp_percent));
    Ok(phases)
}

fn joint_angles<R: Rng + ?Sized>(
    profile: &ExerciseProfile,
    rng: &mut R,
) -> Result<BTreeMap<String, f64>, GenerationError> {
    profile
        .joints
        .iter()
        .map(|joint| -> Result<(String, f64), GenerationError> {
            let degrees = joint.degrees.sample(rng, "joint angle")?;
            // one decimal unless rounding would leave the band
            let rounded = round_to(degrees, 1);
            let value = if joint.degrees.contains(rounded) {
                rounded
            } else {
                degrees
            };
            Ok((joint.joint.to_owned(), value))
        })
        .collect()
}

fn describe(profile: &ExerciseProfile, score: u8) -> String {
    let summary = if score >= thresholds::EXCELLENT {
        "Movement mechanics are consistent and well controlled."
    } else if score >= thresholds::GOOD {
        "Overall mechanics are solid with minor points to refine."
    } else if score >= thresholds::FAIR {
        "Several technical deviations were identified that deserve attention."
    } else {
        "Significant technical deviations were identified; review the risk assessment."
    };
    format!(
        "{} analysis: {} execution with an overall score of {score}/100. {summary}",
        profile.display_name,
        movement_quality_label(score).to_lowercase(),
    )
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{Band, JointBand, PhaseTemplate, ScoreBands, DEFAULT, SQUAT};

    static BROKEN: ExerciseProfile = ExerciseProfile {
        key: "broken",
        display_name: "Broken",
        aliases: &[],
        scores: ScoreBands {
            base: Band::new(90.0, 10.0),
            technique: Band::new(60.0, 90.0),
            safety: Band::new(60.0, 90.0),
        },
        confidence: Band::new(0.7, 0.9),
        phases: &[PhaseTemplate {
            name: "Only",
            timestamp_percent: 50.0,
            analysis: "",
            quality_offset: Band::new(0.0, 0.0),
        }],
        joints: &[JointBand {
            joint: "right_knee",
            degrees: Band::new(90.0, 100.0),
        }],
        muscles: &[],
        specific_risk: "",
        advice: &[],
    };

    #[test]
    fn test_generation_error_degrades_to_fallback() {
        let generator = MockAnalysisGenerator::with_profiles(vec![&BROKEN], &DEFAULT);
        let request = AnalysisRequest::for_exercise("broken");
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(generator.try_generate(&request, &mut rng).is_err());

        let report = generator.generate_with_rng(&request, &mut rng);
        assert_eq!(report.score, 75);
        assert!(report.biomechanics.risk_factors.is_empty());
        assert!(report.movement_phases.is_empty());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = MockAnalysisGenerator::new();
        let request = AnalysisRequest::for_exercise("agachamento");
        assert_eq!(
            generator.generate_seeded(&request, 7),
            generator.generate_seeded(&request, 7)
        );
    }

    #[test]
    fn test_risk_thresholds() {
        assert!(risk_factors(&SQUAT, 90).is_empty());
        assert_eq!(risk_factors(&SQUAT, 74).len(), 1);
        assert_eq!(risk_factors(&SQUAT, 69).len(), 2);
        assert_eq!(risk_factors(&SQUAT, 59).len(), 3);
    }

    #[test]
    fn test_recommendations_always_close_with_fixed_advice() {
        for score in [40, 72, 95] {
            let recs = recommendations(&SQUAT, score);
            assert_eq!(recs.len(), 1 + SQUAT.advice.len() + 2);
            assert_eq!(recs[recs.len() - 2..], CLOSING_RECOMMENDATIONS.map(str::to_owned));
        }
    }

    #[test]
    fn test_quality_labels() {
        assert_eq!(movement_quality_label(85), "Excellent");
        assert_eq!(movement_quality_label(70), "Good");
        assert_eq!(movement_quality_label(60), "Fair");
        assert_eq!(movement_quality_label(59), "Needs improvement");
    }
}
