// ABOUTME: Server binary for the MoveID analysis API
// ABOUTME: Loads environment configuration, installs logging and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! # `MoveID` Server Binary
//!
//! ```bash
//! OPENAI_API_KEY=sk-... LOG_FORMAT=json moveid-server --http-port 8081
//! ```

use anyhow::Result;
use clap::Parser;
use moveid_server::{config::ServerConfig, logging::LoggingConfig, server};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "moveid-server")]
#[command(about = "MoveID - exercise movement analysis and PDF reports")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http.port = http_port;
    }
    if let Some(host) = args.host {
        config.http.host = host;
    }
    config.validate()?;

    info!(environment = %config.environment, "Starting MoveID server");
    if let Err(e) = server::serve(config).await {
        error!("Server error: {e:#}");
        return Err(e);
    }
    Ok(())
}
