// ABOUTME: Prompts for the vision collaborator loaded at compile time
// ABOUTME: The system prompt fixes the JSON reply shape; the user prompt names the declared exercise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! # Vision Prompts

/// System prompt asking for the image analysis JSON shape
pub const VISION_SYSTEM_PROMPT: &str = include_str!("vision_system.md");

/// User instruction accompanying the image
#[must_use]
pub fn image_analysis_prompt(exercise_label: &str) -> String {
    let exercise_label = exercise_label.trim();
    if exercise_label.is_empty() {
        "Analyze the exercise technique shown in this image.".to_owned()
    } else {
        format!(
            "The athlete reports performing: {exercise_label}. Analyze the exercise technique shown in this image."
        )
    }
}
