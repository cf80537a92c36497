// ABOUTME: Exercise parameter tables holding every numeric band and threshold of the generator
// ABOUTME: Labels resolve case-insensitively through aliases; unknown labels use the default table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Exercise parameter tables.
//!
//! These bands are placeholder heuristics, not validated clinical ranges.

use rand::Rng;

use crate::generator::GenerationError;

/// Score thresholds driving risk factors and advice
pub mod thresholds {
    /// Below this score the exercise-specific risk is reported
    pub const EXERCISE_SPECIFIC_RISK: u8 = 75;
    /// Below this score a compensatory-pattern warning is added
    pub const COMPENSATION_RISK: u8 = 70;
    /// Below this score a severe warning is added
    pub const SEVERE_RISK: u8 = 60;
    /// At or above this score technique is considered excellent
    pub const EXCELLENT: u8 = 85;
    /// At or above this score technique is considered good
    pub const GOOD: u8 = 70;
    /// At or above this score technique is considered fair
    pub const FAIR: u8 = 60;
}

/// Inclusive numeric band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl Band {
    /// Create a band from inclusive bounds
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the band
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Draw a value uniformly from the band
    ///
    /// # Errors
    ///
    /// Returns an error if the band is empty or not finite.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        field: &'static str,
    ) -> Result<f64, GenerationError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(GenerationError::InvalidBand {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(rng.gen_range(self.min..=self.max))
    }
}

/// The three sub-score bands blended into the overall score
#[derive(Debug, Clone, Copy)]
pub struct ScoreBands {
    /// Base execution score
    pub base: Band,
    /// Technique score
    pub technique: Band,
    /// Safety score
    pub safety: Band,
}

/// Template for one movement phase
#[derive(Debug, Clone, Copy)]
pub struct PhaseTemplate {
    /// Phase label
    pub name: &'static str,
    /// Position within the movement, 0-100
    pub timestamp_percent: f64,
    /// Commentary emitted for this phase
    pub analysis: &'static str,
    /// Offset applied to the overall score to get the phase quality
    pub quality_offset: Band,
}

/// Angle band of a named joint
#[derive(Debug, Clone, Copy)]
pub struct JointBand {
    /// Joint key as it appears in the report
    pub joint: &'static str,
    /// Angle band in degrees
    pub degrees: Band,
}

impl JointBand {
    const fn new(joint: &'static str, min: f64, max: f64) -> Self {
        Self {
            joint,
            degrees: Band::new(min, max),
        }
    }
}

/// Parameter table for one exercise
#[derive(Debug, Clone, Copy)]
pub struct ExerciseProfile {
    /// Canonical key
    pub key: &'static str,
    /// Name used in report text
    pub display_name: &'static str,
    /// Lower-case labels that resolve to this profile
    pub aliases: &'static [&'static str],
    /// Sub-score bands
    pub scores: ScoreBands,
    /// Confidence band, within 0-1
    pub confidence: Band,
    /// Phases in temporal order
    pub phases: &'static [PhaseTemplate],
    /// Joint angle bands
    pub joints: &'static [JointBand],
    /// Muscles reported as active
    pub muscles: &'static [&'static str],
    /// Risk text added below [`thresholds::EXERCISE_SPECIFIC_RISK`]
    pub specific_risk: &'static str,
    /// Exercise-specific advice, always included
    pub advice: &'static [&'static str],
}

impl ExerciseProfile {
    /// Whether `label` names this profile
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        let normalized = normalize_label(label);
        normalized == self.key || self.aliases.iter().any(|alias| *alias == normalized)
    }
}

/// Lower-case a label and collapse inner whitespace
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

const OFFSET_STEADY: Band = Band::new(-5.0, 5.0);
const OFFSET_DEMANDING: Band = Band::new(-10.0, 3.0);

/// Squat table
pub static SQUAT: ExerciseProfile = ExerciseProfile {
    key: "agachamento",
    display_name: "Squat",
    aliases: &["squat", "agachamento livre", "back squat"],
    scores: ScoreBands {
        base: Band::new(60.0, 95.0),
        technique: Band::new(55.0, 95.0),
        safety: Band::new(60.0, 98.0),
    },
    confidence: Band::new(0.78, 0.95),
    phases: &[
        PhaseTemplate {
            name: "Descent",
            timestamp_percent: 20.0,
            analysis: "Controlled eccentric phase with hips and knees flexing together",
            quality_offset: OFFSET_STEADY,
        },
        PhaseTemplate {
            name: "Bottom",
            timestamp_percent: 50.0,
            analysis: "Depth reached with the trunk inclined over the mid-foot",
            quality_offset: OFFSET_DEMANDING,
        },
        PhaseTemplate {
            name: "Ascent",
            timestamp_percent: 80.0,
            analysis: "Concentric drive through the heels back to full extension",
            quality_offset: OFFSET_STEADY,
        },
    ],
    joints: &[
        JointBand::new("right_knee", 78.0, 115.0),
        JointBand::new("left_knee", 78.0, 115.0),
        JointBand::new("right_hip", 70.0, 100.0),
        JointBand::new("left_hip", 70.0, 100.0),
        JointBand::new("right_ankle", 20.0, 35.0),
        JointBand::new("left_ankle", 20.0, 35.0),
        JointBand::new("trunk", 25.0, 45.0),
    ],
    muscles: &["Quadriceps", "Gluteus maximus", "Hamstrings", "Adductors", "Erector spinae"],
    specific_risk: "Tendency of the knees to collapse inward (valgus) at the bottom position",
    advice: &[
        "Keep the knees tracking over the toes throughout the descent",
        "Strengthen the gluteus medius to stabilize the knees",
    ],
};

/// Deadlift table
pub static DEADLIFT: ExerciseProfile = ExerciseProfile {
    key: "deadlift",
    display_name: "Deadlift",
    aliases: &["levantamento terra", "terra", "conventional deadlift"],
    scores: ScoreBands {
        base: Band::new(58.0, 94.0),
        technique: Band::new(55.0, 93.0),
        safety: Band::new(58.0, 96.0),
    },
    confidence: Band::new(0.75, 0.93),
    phases: &[
        PhaseTemplate {
            name: "Setup",
            timestamp_percent: 10.0,
            analysis: "Bar over the mid-foot with a neutral spine before the pull",
            quality_offset: OFFSET_STEADY,
        },
        PhaseTemplate {
            name: "Lift-off",
            timestamp_percent: 35.0,
            analysis: "Load breaks from the floor as the knees extend",
            quality_offset: OFFSET_DEMANDING,
        },
        PhaseTemplate {
            name: "Lockout",
            timestamp_percent: 70.0,
            analysis: "Hips drive forward to full extension without hyperextending the back",
            quality_offset: OFFSET_STEADY,
        },
        PhaseTemplate {
            name: "Lowering",
            timestamp_percent: 90.0,
            analysis: "Hip hinge controls the bar back to the floor",
            quality_offset: OFFSET_STEADY,
        },
    ],
    joints: &[
        JointBand::new("right_knee", 95.0, 125.0),
        JointBand::new("left_knee", 95.0, 125.0),
        JointBand::new("right_hip", 45.0, 75.0),
        JointBand::new("left_hip", 45.0, 75.0),
        JointBand::new("trunk", 35.0, 55.0),
    ],
    muscles: &["Hamstrings", "Gluteus maximus", "Erector spinae", "Trapezius", "Forearm flexors"],
    specific_risk: "Loss of neutral lumbar curvature during lift-off",
    advice: &[
        "Brace the core and keep the bar in contact with the legs",
        "Practice the hip hinge pattern with light loads",
    ],
};

/// Bench press table
pub static BENCH_PRESS: ExerciseProfile = ExerciseProfile {
    key: "supino",
    display_name: "Bench press",
    aliases: &["bench press", "bench", "supino reto"],
    scores: ScoreBands {
        base: Band::new(62.0, 95.0),
        technique: Band::new(58.0, 94.0),
        safety: Band::new(62.0, 97.0),
    },
    confidence: Band::new(0.76, 0.94),
    phases: &[
        PhaseTemplate {
            name: "Lowering",
            timestamp_percent: 25.0,
            analysis: "Bar descends toward the lower chest with elbows tucked",
            quality_offset: OFFSET_STEADY,
        },
        PhaseTemplate {
            name: "Chest contact",
            timestamp_percent: 50.0,
            analysis: "Brief touch without bouncing off the sternum",
            quality_offset: OFFSET_DEMANDING,
        },
        PhaseTemplate {
            name: "Press",
            timestamp_percent: 75.0,
            analysis: "Bar path returns over the shoulders to lockout",
            quality_offset: OFFSET_STEADY,
        },
    ],
    joints: &[
        JointBand::new("right_elbow", 75.0, 95.0),
        JointBand::new("left_elbow", 75.0, 95.0),
        JointBand::new("right_shoulder", 45.0, 75.0),
        JointBand::new("left_shoulder", 45.0, 75.0),
        JointBand::new("trunk", 5.0, 15.0),
    ],
    muscles: &["Pectoralis major", "Anterior deltoid", "Triceps brachii"],
    specific_risk: "Excessive shoulder abduction under load",
    advice: &[
        "Retract the shoulder blades and keep them pinned to the bench",
        "Keep the wrists stacked over the elbows",
    ],
};

/// Table used for every unrecognized label
pub static DEFAULT: ExerciseProfile = ExerciseProfile {
    key: "default",
    display_name: "Exercise",
    aliases: &[],
    scores: ScoreBands {
        base: Band::new(60.0, 95.0),
        technique: Band::new(55.0, 95.0),
        safety: Band::new(60.0, 98.0),
    },
    confidence: Band::new(0.7, 0.9),
    phases: &[
        PhaseTemplate {
            name: "Initial",
            timestamp_percent: 15.0,
            analysis: "Starting position and preparation",
            quality_offset: OFFSET_STEADY,
        },
        PhaseTemplate {
            name: "Execution",
            timestamp_percent: 50.0,
            analysis: "Main effort of the movement",
            quality_offset: OFFSET_DEMANDING,
        },
        PhaseTemplate {
            name: "Return",
            timestamp_percent: 85.0,
            analysis: "Return to the starting position",
            quality_offset: OFFSET_STEADY,
        },
    ],
    joints: &[
        JointBand::new("right_knee", 85.0, 120.0),
        JointBand::new("left_knee", 85.0, 120.0),
        JointBand::new("right_hip", 80.0, 110.0),
        JointBand::new("left_hip", 80.0, 110.0),
        JointBand::new("trunk", 10.0, 30.0),
    ],
    muscles: &["Core stabilizers", "Lower limb musculature"],
    specific_risk: "Inconsistent range of motion between repetitions",
    advice: &["Keep a steady tempo and full range of motion on every repetition"],
};

/// Built-in recognized profiles
pub static BUILTIN: [&ExerciseProfile; 3] = [&SQUAT, &DEADLIFT, &BENCH_PRESS];

/// First profile in `profiles` that `label` names, otherwise `default`
#[must_use]
pub fn resolve(
    profiles: &[&'static ExerciseProfile],
    default: &'static ExerciseProfile,
    label: &str,
) -> &'static ExerciseProfile {
    profiles
        .iter()
        .copied()
        .find(|profile| profile.matches(label))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_aliases() {
        let key = |label: &str| resolve(&BUILTIN, &DEFAULT, label).key;
        assert_eq!(key("agachamento"), "agachamento");
        assert_eq!(key("  SQUAT "), "agachamento");
        assert_eq!(key("Levantamento   Terra"), "deadlift");
        assert_eq!(key("supino"), "supino");
        assert_eq!(key("burpee"), "default");
        assert_eq!(key(""), "default");
        assert_eq!(resolve(&[&DEADLIFT], &DEFAULT, "squat").key, "default");
    }

    #[test]
    fn test_builtin_tables_are_consistent() {
        for profile in BUILTIN.iter().copied().chain(std::iter::once(&DEFAULT)) {
            assert!(profile.confidence.min >= 0.0 && profile.confidence.max <= 1.0);
            assert!(profile
                .phases
                .windows(2)
                .all(|pair| pair[0].timestamp_percent < pair[1].timestamp_percent));
            for band in [profile.scores.base, profile.scores.technique, profile.scores.safety] {
                assert!(band.min >= 0.0 && band.max <= 100.0 && band.min <= band.max);
            }
        }
    }

    #[test]
    fn test_empty_band_is_rejected() {
        let mut rng = rand::thread_rng();
        let band = Band::new(10.0, 5.0);
        assert!(matches!(
            band.sample(&mut rng, "test"),
            Err(GenerationError::InvalidBand { field: "test", .. })
        ));
    }
}
