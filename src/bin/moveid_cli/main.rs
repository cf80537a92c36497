// ABOUTME: MoveID CLI for generating mock analyses and rendering PDF reports offline
// ABOUTME: Dispatches generate and render subcommands without starting the HTTP server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID
//!
//! Usage:
//! ```bash
//! # Generate a reproducible squat analysis
//! moveid-cli generate --exercise agachamento --seed 42 --out squat.json
//!
//! # Render it with a source frame
//! moveid-cli render --report squat.json --out squat.pdf --subject "Ana" --image frame.jpg
//!
//! # Skip the joint angle chart
//! moveid-cli render --report squat.json --out squat.pdf --no-charts
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use moveid_core::errors::AppResult;
use moveid_server::logging::{LogFormat, LoggingConfig};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "moveid-cli",
    about = "MoveID command-line tool",
    long_about = "Generate mock movement analyses and render them as PDF reports without running the server."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Generate a mock analysis report as JSON
    Generate {
        /// Exercise label (agachamento, deadlift, supino, ...)
        #[arg(long, default_value = "default")]
        exercise: String,

        /// Seed for a reproducible report
        #[arg(long)]
        seed: Option<u64>,

        /// Output file; prints to stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render a JSON analysis report to PDF
    Render {
        /// Analysis report JSON file
        #[arg(long)]
        report: PathBuf,

        /// Output PDF file
        #[arg(long)]
        out: PathBuf,

        /// Subject name shown in the header
        #[arg(long, default_value = "Athlete")]
        subject: String,

        /// Exercise label shown in the header
        #[arg(long, default_value = "default")]
        exercise: String,

        /// Leave out the joint angle chart
        #[arg(long)]
        no_charts: bool,

        /// JPEG or PNG still frame to embed
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: if cli.verbose { "debug" } else { "warn" }.to_owned(),
        format: LogFormat::Compact,
        ..LoggingConfig::default()
    };
    // a second subscriber only happens in tests; logging is optional for the CLI
    if let Err(e) = logging.init() {
        eprintln!("Logging disabled: {e}");
    }
    debug!("MoveID CLI");

    match cli.command {
        Command::Generate {
            exercise,
            seed,
            out,
        } => commands::generate::run(&exercise, seed, out.as_deref()),
        Command::Render {
            report,
            out,
            subject,
            exercise,
            no_charts,
            image,
        } => commands::render::run(&commands::render::RenderArgs {
            report,
            out,
            subject,
            exercise,
            include_charts: !no_charts,
            image,
        }),
    }
}
