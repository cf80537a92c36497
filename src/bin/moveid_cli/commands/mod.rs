// ABOUTME: Subcommand implementations for moveid-cli
// ABOUTME: Report generation and PDF rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

pub mod generate;
pub mod render;
