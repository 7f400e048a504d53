//! Error types for metawatch.
//!
//! All errors are strongly typed using thiserror and grouped by concern.
//! The grouping mirrors the propagation policy: configuration and
//! registration errors surface from `start`, orchestration errors surface
//! from event processing, and reporting errors are secondary only: they are
//! audit-logged and never allowed to mask the primary failure.

use thiserror::Error;

/// A mandatory or malformed configuration value was encountered while the
/// watchdog was resolving its filters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Mandatory configuration property '{name}' is missing")]
    MissingProperty { name: String },

    #[error("Configuration property '{name}' has invalid value '{value}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Subscription with the event source failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Event source rejected the listener registration: {message}")]
    Rejected { message: String },

    #[error("Event source is not accepting registrations: {message}")]
    Unavailable { message: String },
}

/// Initiation of a downstream remediation process failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    #[error("Process '{process_name}' could not be initiated: {message}")]
    InitiationFailed {
        process_name: String,
        message: String,
    },

    #[error("Process '{process_name}' is not known to the orchestrator")]
    UnknownProcess { process_name: String },
}

/// Recording a completion status failed.
///
/// These errors only ever occur on the best-effort reporting path, so they
/// are logged through the audit collaborator and never surfaced to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportingError {
    #[error("Completion status could not be recorded: {message}")]
    NotRecorded { message: String },

    #[error("A completion status was already recorded for this execution")]
    AlreadyRecorded,
}

/// Errors raised by the property-value model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("Field '{name}' is not present in the property set")]
    FieldNotFound { name: String },
}

/// Top-level error type for metawatch.
#[derive(Debug, Error)]
pub enum WatchdogError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    #[error("Reporting error: {0}")]
    Reporting(#[from] ReportingError),

    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl WatchdogError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if this is a registration error.
    #[must_use]
    pub const fn is_registration(&self) -> bool {
        matches!(self, Self::Registration(_))
    }

    /// Returns true if this is an orchestration error.
    #[must_use]
    pub const fn is_orchestration(&self) -> bool {
        matches!(self, Self::Orchestration(_))
    }

    /// Returns true if this is a reporting error.
    #[must_use]
    pub const fn is_reporting(&self) -> bool {
        matches!(self, Self::Reporting(_))
    }

    /// Returns true if this error ends the hosting execution when surfaced
    /// from `start` or event processing.
    ///
    /// Reporting errors never do: they are swallowed on the best-effort
    /// path, so observing one here means a caller re-wrapped it.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Registration(_) | Self::Orchestration(_)
        )
    }
}

/// Result type alias for metawatch operations.
pub type WatchdogResult<T> = Result<T, WatchdogError>;
