// ABOUTME: Placeholder heuristics for the risk box color and the joint angle evaluation column
// ABOUTME: Thresholds are hand-picked display rules, not validated clinical limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

use crate::pdf::Color;

/// Minimum score for a low risk level
const LOW_RISK_MIN_SCORE: u8 = 80;
/// Minimum score for a medium risk level
const MEDIUM_RISK_MIN_SCORE: u8 = 60;
/// Maximum number of risk factors for a medium risk level
const MEDIUM_RISK_MAX_FACTORS: usize = 2;

/// Knee angle band evaluated as normal, in degrees
const KNEE_NORMAL: (f64, f64) = (80.0, 120.0);
/// Knee angles in `[KNEE_ATTENTION_MIN, KNEE_NORMAL.0)` need attention
const KNEE_ATTENTION_MIN: f64 = 70.0;

/// Three-bucket risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    /// No risk factors and a high score
    Low,
    /// Few risk factors and an acceptable score
    Medium,
    /// Everything else
    High,
}

impl RiskLevel {
    /// Classify from the number of risk factors and the overall score
    #[must_use]
    pub const fn assess(risk_factor_count: usize, score: u8) -> Self {
        if risk_factor_count == 0 && score >= LOW_RISK_MIN_SCORE {
            Self::Low
        } else if risk_factor_count <= MEDIUM_RISK_MAX_FACTORS && score >= MEDIUM_RISK_MIN_SCORE {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Label shown in the risk box header
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW RISK",
            Self::Medium => "MEDIUM RISK",
            Self::High => "HIGH RISK",
        }
    }

    /// Fill color of the risk box header
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Low => Color::rgb(46, 160, 67),
            Self::Medium => Color::rgb(230, 145, 30),
            Self::High => Color::rgb(207, 34, 46),
        }
    }
}

/// Evaluation shown next to a joint angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleEvaluation {
    /// Inside the accepted band
    Normal,
    /// Just below the accepted band
    Attention,
    /// Anything else
    Critical,
}

impl AngleEvaluation {
    /// Table label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Attention => "Attention",
            Self::Critical => "Critical",
        }
    }

    /// Text and bar color
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Normal => Color::rgb(46, 160, 67),
            Self::Attention => Color::rgb(230, 145, 30),
            Self::Critical => Color::rgb(207, 34, 46),
        }
    }
}

fn is_knee(joint: &str) -> bool {
    let joint = joint.to_lowercase();
    joint.contains("knee") || joint.contains("joelho")
}

/// Evaluate a joint angle.
///
/// Only knees have real bands. Every other joint evaluates to
/// [`AngleEvaluation::Normal`].
#[must_use]
pub fn evaluate_joint_angle(joint: &str, degrees: f64) -> AngleEvaluation {
    if !is_knee(joint) {
        return AngleEvaluation::Normal;
    }
    if (KNEE_NORMAL.0..=KNEE_NORMAL.1).contains(&degrees) {
        AngleEvaluation::Normal
    } else if (KNEE_ATTENTION_MIN..KNEE_NORMAL.0).contains(&degrees) {
        AngleEvaluation::Attention
    } else {
        AngleEvaluation::Critical
    }
}

/// Reference range printed in the parameter table
#[must_use]
pub fn normal_range(joint: &str) -> &'static str {
    let joint = joint.to_lowercase();
    let table: [(&[&str], &'static str); 6] = [
        (&["knee", "joelho"], "80° - 120°"),
        (&["hip", "quadril"], "70° - 110°"),
        (&["ankle", "tornozelo"], "15° - 35°"),
        (&["trunk", "tronco"], "20° - 50°"),
        (&["elbow", "cotovelo"], "70° - 100°"),
        (&["shoulder", "ombro"], "40° - 80°"),
    ];
    table
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| joint.contains(needle)))
        .map_or("Not established", |(_, range)| *range)
}

/// `right_knee` or `rightKnee` to `Right Knee`
#[must_use]
pub fn format_joint_name(joint: &str) -> String {
    let mut spaced = String::with_capacity(joint.len() + 4);
    let mut previous_lower = false;
    for c in joint.chars() {
        if c == '_' || c == '-' {
            spaced.push(' ');
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower {
            spaced.push(' ');
        }
        previous_lower = c.is_lowercase();
        spaced.push(c);
    }

    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
