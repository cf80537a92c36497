// ABOUTME: Generate subcommand producing a mock analysis report as JSON
// ABOUTME: Uses a seeded random source when a seed is given for reproducible output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

use std::path::Path;

use moveid_analysis::{AnalysisRequest, MockAnalysisGenerator};
use moveid_core::errors::{AppError, AppResult};
use tracing::info;

use crate::helpers::display::print_report_summary;

pub fn run(exercise: &str, seed: Option<u64>, out: Option<&Path>) -> AppResult<()> {
    let generator = MockAnalysisGenerator::new();
    let request = AnalysisRequest::for_exercise(exercise);
    let report = match seed {
        Some(seed) => generator.generate_seeded(&request, seed),
        None => generator.generate(&request),
    };
    let json = serde_json::to_string_pretty(&report)?;

    match out {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| {
                AppError::internal(format!("Failed to write {}: {e}", path.display()))
            })?;
            info!(path = %path.display(), "report written");
            print_report_summary(generator.profile_for(exercise).display_name, &report);
            println!("Saved to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
