// ABOUTME: Output formatting helpers for moveid-cli
// ABOUTME: Prints report summaries and the page layout of rendered documents
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

use moveid_core::models::AnalysisReport;
use moveid_report::{RenderedDocument, RiskLevel};

/// Short summary of a generated report
pub fn print_report_summary(exercise: &str, report: &AnalysisReport) {
    let risk = RiskLevel::assess(report.biomechanics.risk_factors.len(), report.score);
    println!("\n{exercise} analysis");
    println!("{}", "=".repeat(60));
    println!("   Score:       {}/100", report.score);
    println!("   Quality:     {}", report.biomechanics.movement_quality);
    println!("   Risk:        {}", risk.label());
    println!("   Confidence:  {:.0}%", report.confidence_score * 100.0);
    println!("   Phases:      {}", report.movement_phases.len());
    for (joint, degrees) in &report.biomechanics.joint_angles {
        println!("     {joint:<14} {degrees:>6.1} deg");
    }
}

/// Page count and section order of a rendered document
pub fn print_layout(document: &RenderedDocument) {
    println!(
        "\nRendered {} page(s), {} bytes",
        document.page_count,
        document.bytes.len()
    );
    for section in &document.sections {
        let pages: Vec<usize> = document
            .placements
            .iter()
            .filter(|placement| placement.section == *section)
            .map(|placement| placement.page + 1)
            .collect();
        match (pages.first(), pages.last()) {
            (Some(first), Some(last)) if first != last => {
                println!("   {section:?}: pages {first}-{last}");
            }
            (Some(first), _) => println!("   {section:?}: page {first}"),
            _ => println!("   {section:?}"),
        }
    }
}
