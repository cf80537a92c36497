// ABOUTME: Client view state machine for the upload, analyze and report flow
// ABOUTME: Replaces independent flags with one enum and a pure transition function
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! # View State
//!
//! The client shows exactly one of four screens. [`ViewState::transition`]
//! consumes an event and returns the next state, or an error when the event
//! makes no sense in the current state (for example a completion arriving
//! while nothing is being analyzed).
//!
//! ```text
//! Idle --SelectFile--> FileSelected --StartAnalysis--> Analyzing --AnalysisCompleted--> ReportReady
//!                           ^                              |
//!                           +-------- AnalysisFailed ------+
//! ```

use moveid_core::models::{AnalysisReport, FileMetadata};
use serde::Serialize;
use thiserror::Error;

/// Highest progress value
pub const PROGRESS_COMPLETE: u8 = 100;

/// What the client is currently showing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// Nothing selected
    #[default]
    Idle,
    /// A file is chosen but not yet submitted
    FileSelected {
        /// Selected file
        file: FileMetadata,
    },
    /// Upload and analysis in flight
    Analyzing {
        /// File being analyzed
        file: FileMetadata,
        /// Progress, 0-100, never decreasing
        progress: u8,
    },
    /// Analysis finished
    ReportReady {
        /// Analyzed file
        file: FileMetadata,
        /// Resulting report
        report: Box<AnalysisReport>,
    },
}

/// User actions and async completions driving the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// A file was picked
    SelectFile(FileMetadata),
    /// The user submitted the selected file
    StartAnalysis,
    /// Upload or analysis progress, 0-100
    Progress(u8),
    /// The analysis returned a report
    AnalysisCompleted(AnalysisReport),
    /// The analysis request failed
    AnalysisFailed(String),
    /// Return to the empty screen
    Reset,
}

impl ViewEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::SelectFile(_) => "select_file",
            Self::StartAnalysis => "start_analysis",
            Self::Progress(_) => "progress",
            Self::AnalysisCompleted(_) => "analysis_completed",
            Self::AnalysisFailed(_) => "analysis_failed",
            Self::Reset => "reset",
        }
    }
}

/// Event not accepted in the current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply '{event}' while {state}")]
pub struct TransitionError {
    /// State the event was applied to
    pub state: &'static str,
    /// Rejected event
    pub event: &'static str,
}

impl ViewState {
    /// State name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected { .. } => "file_selected",
            Self::Analyzing { .. } => "analyzing",
            Self::ReportReady { .. } => "report_ready",
        }
    }

    /// Selected file, if any
    #[must_use]
    pub const fn file(&self) -> Option<&FileMetadata> {
        match self {
            Self::Idle => None,
            Self::FileSelected { file }
            | Self::Analyzing { file, .. }
            | Self::ReportReady { file, .. } => Some(file),
        }
    }

    /// Progress while analyzing
    #[must_use]
    pub const fn progress(&self) -> Option<u8> {
        match self {
            Self::Analyzing { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    /// Displayed report
    #[must_use]
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::ReportReady { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }

    /// Whether a request is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Analyzing { .. })
    }

    /// Apply an event
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the event is not valid in this state.
    /// The state itself is consumed either way; callers keep a clone if they
    /// need to stay put on error.
    pub fn transition(self, event: ViewEvent) -> Result<Self, TransitionError> {
        let state = self.name();
        let event_name = event.name();
        match (self, event) {
            (_, ViewEvent::Reset) => Ok(Self::Idle),
            (
                Self::Idle | Self::FileSelected { .. } | Self::ReportReady { .. },
                ViewEvent::SelectFile(file),
            ) => Ok(Self::FileSelected { file }),
            (Self::FileSelected { file }, ViewEvent::StartAnalysis) => {
                Ok(Self::Analyzing { file, progress: 0 })
            }
            (Self::Analyzing { file, progress }, ViewEvent::Progress(next)) => Ok(Self::Analyzing {
                file,
                progress: progress.max(next.min(PROGRESS_COMPLETE)),
            }),
            (Self::Analyzing { file, .. }, ViewEvent::AnalysisCompleted(report)) => {
                Ok(Self::ReportReady {
                    file,
                    report: Box::new(report),
                })
            }
            (Self::Analyzing { file, .. }, ViewEvent::AnalysisFailed(reason)) => {
                tracing::debug!(
                    file = %file.name,
                    reason = %reason,
                    "analysis failed, keeping selection"
                );
                Ok(Self::FileSelected { file })
            }
            _ => Err(TransitionError {
                state,
                event: event_name,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> FileMetadata {
        FileMetadata {
            name: "squat.mp4".to_owned(),
            size: 1024,
            mime_type: "video/mp4".to_owned(),
        }
    }

    #[test]
    fn test_happy_path() {
        let state = ViewState::Idle
            .transition(ViewEvent::SelectFile(video()))
            .and_then(|s| s.transition(ViewEvent::StartAnalysis))
            .and_then(|s| s.transition(ViewEvent::Progress(40)))
            .unwrap();
        assert_eq!(state.progress(), Some(40));
        assert!(state.is_busy());

        let state = state
            .transition(ViewEvent::AnalysisCompleted(AnalysisReport::fallback("squat")))
            .unwrap();
        assert_eq!(state.name(), "report_ready");
        assert_eq!(state.report().map(|r| r.score), Some(75));
        assert_eq!(state.file(), Some(&video()));
    }

    #[test]
    fn test_progress_never_decreases_or_overflows() {
        let state = ViewState::Analyzing {
            file: video(),
            progress: 60,
        };
        let state = state.transition(ViewEvent::Progress(30)).unwrap();
        assert_eq!(state.progress(), Some(60));
        let state = state.transition(ViewEvent::Progress(250)).unwrap();
        assert_eq!(state.progress(), Some(100));
    }

    #[test]
    fn test_failure_keeps_selection() {
        let state = ViewState::Analyzing {
            file: video(),
            progress: 10,
        }
        .transition(ViewEvent::AnalysisFailed("network".to_owned()))
        .unwrap();
        assert_eq!(state, ViewState::FileSelected { file: video() });
    }

    #[test]
    fn test_invalid_transitions() {
        let error = ViewState::Idle.transition(ViewEvent::StartAnalysis).unwrap_err();
        assert_eq!(error.state, "idle");
        assert_eq!(error.event, "start_analysis");

        let analyzing = ViewState::Analyzing {
            file: video(),
            progress: 0,
        };
        assert!(analyzing.clone().transition(ViewEvent::SelectFile(video())).is_err());
        assert!(analyzing.transition(ViewEvent::StartAnalysis).is_err());
        assert!(ViewState::Idle
            .transition(ViewEvent::AnalysisCompleted(AnalysisReport::fallback("x")))
            .is_err());
    }

    #[test]
    fn test_reset_from_anywhere() {
        let ready = ViewState::ReportReady {
            file: video(),
            report: Box::new(AnalysisReport::fallback("squat")),
        };
        assert_eq!(ready.transition(ViewEvent::Reset).unwrap(), ViewState::Idle);
    }
}
