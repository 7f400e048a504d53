//! Completion statuses and guard names for terminal reports.
//!
//! A watchdog execution reports its terminal status exactly once. The guard
//! strings attached to the status are consumed by downstream orchestration
//! to pick the next process in a governance flow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The terminal (or in-flight) status of a governance action execution.
///
/// Only the first recorded status is meaningful to the hosting runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// Work is still running; no terminal status yet.
    InProgress,
    /// The execution finished its work.
    Succeeded,
    /// The request could not be acted on as supplied.
    Invalid,
    /// The execution chose not to act.
    Ignored,
    /// The execution failed.
    Failed,
}

impl CompletionStatus {
    /// True for statuses that end the execution.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InProgress => "in-progress",
            Self::Succeeded => "succeeded",
            Self::Invalid => "invalid",
            Self::Ignored => "ignored",
            Self::Failed => "failed",
        };
        write!(f, "{text}")
    }
}

/// Guard emitted when monitoring could not be established or an event could
/// not be acted on.
pub const MONITORING_FAILED: &str = "monitoring-failed";

/// Guard emitted when single-event monitoring processed its event and ended.
pub const MONITORING_COMPLETE: &str = "monitoring-complete";
