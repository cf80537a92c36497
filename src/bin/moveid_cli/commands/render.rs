// ABOUTME: Render subcommand turning a JSON analysis report into a PDF file
// ABOUTME: Optionally embeds a still frame and prints the resulting page layout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

use std::path::PathBuf;

use chrono::Utc;
use moveid_core::errors::{AppError, AppResult};
use moveid_core::models::AnalysisReport;
use moveid_report::{RenderOptions, RenderRequest, ReportRenderer};

use crate::helpers::display::print_layout;

pub struct RenderArgs {
    pub report: PathBuf,
    pub out: PathBuf,
    pub subject: String,
    pub exercise: String,
    pub include_charts: bool,
    pub image: Option<PathBuf>,
}

pub fn run(args: &RenderArgs) -> AppResult<()> {
    let raw = std::fs::read_to_string(&args.report).map_err(|e| {
        AppError::invalid_input(format!("Failed to read {}: {e}", args.report.display()))
    })?;
    let report: AnalysisReport = serde_json::from_str(&raw)?;
    report.ensure_valid()?;

    let image = args
        .image
        .as_ref()
        .map(|path| {
            std::fs::read(path).map_err(|e| {
                AppError::invalid_input(format!("Failed to read {}: {e}", path.display()))
            })
        })
        .transpose()?;

    let document = ReportRenderer::new()
        .render(&RenderRequest {
            report: &report,
            subject_name: &args.subject,
            exercise_label: &args.exercise,
            generated_at: Utc::now(),
            source_image: image.as_deref(),
            options: RenderOptions {
                include_charts: args.include_charts,
                include_source_image: image.is_some(),
            },
        })
        .map_err(|e| AppError::render(e.to_string()))?;

    std::fs::write(&args.out, &document.bytes).map_err(|e| {
        AppError::internal(format!("Failed to write {}: {e}", args.out.display()))
    })?;

    print_layout(&document);
    println!("Saved to {}", args.out.display());
    Ok(())
}
