//! Audit collaborator and the watchdog's audit message set.
//!
//! Audit logging is fire-and-forget operator visibility: it never fails and
//! is never part of the control-flow contract. Each code carries a stable
//! message id so operators can index runbooks by it.

use std::fmt;

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditSeverity {
    /// Informational lifecycle record.
    Info,
    /// An error the watchdog handled or reported.
    Error,
    /// An unexpected exception surfaced to the hosting runtime.
    Exception,
}

impl fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Exception => "EXCEPTION",
        };
        write!(f, "{text}")
    }
}

/// The watchdog's audit message definitions.
///
/// Message templates use positional inserts (`{0}`, `{1}`, ...) filled by
/// [`AuditCode::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditCode {
    /// The listener could not be registered with the event source.
    ListenerRegistrationFailed,
    /// A best-effort completion report failed; the primary error stands.
    CompletionStatusNotRecorded,
    /// A downstream remediation process could not be initiated.
    ProcessInitiationFailed,
}

impl AuditCode {
    /// Stable identifier of this message.
    #[must_use]
    pub const fn message_id(&self) -> &'static str {
        match self {
            Self::ListenerRegistrationFailed => "METAWATCH-WATCHDOG-0001",
            Self::CompletionStatusNotRecorded => "METAWATCH-WATCHDOG-0002",
            Self::ProcessInitiationFailed => "METAWATCH-WATCHDOG-0003",
        }
    }

    /// Severity recorded with this message.
    #[must_use]
    pub const fn severity(&self) -> AuditSeverity {
        match self {
            Self::ListenerRegistrationFailed => AuditSeverity::Exception,
            Self::CompletionStatusNotRecorded => AuditSeverity::Error,
            Self::ProcessInitiationFailed => AuditSeverity::Exception,
        }
    }

    const fn template(&self) -> &'static str {
        match self {
            Self::ListenerRegistrationFailed => {
                "The watchdog could not register its change listener with the event source; error was {0}"
            }
            Self::CompletionStatusNotRecorded => {
                "The watchdog could not record a {0} completion status; error was {1}"
            }
            Self::ProcessInitiationFailed => {
                "The watchdog could not initiate remediation process '{0}'; error was {1}"
            }
        }
    }

    const fn system_action(&self) -> &'static str {
        match self {
            Self::ListenerRegistrationFailed => {
                "Monitoring was not established and the execution reports a failed completion."
            }
            Self::CompletionStatusNotRecorded => {
                "The terminal status of this execution is unknown to the hosting runtime, which may restart the watchdog."
            }
            Self::ProcessInitiationFailed => {
                "The change that triggered the process is not remediated and the execution reports a failed completion."
            }
        }
    }

    const fn user_action(&self) -> &'static str {
        match self {
            Self::ListenerRegistrationFailed => {
                "Check the event source's availability and the watchdog's type and instance filters, then restart the execution."
            }
            Self::CompletionStatusNotRecorded => {
                "Check the completion reporter's availability; restart the execution if it was not restarted automatically."
            }
            Self::ProcessInitiationFailed => {
                "Check that the process is defined in the orchestrator and that the orchestrator is reachable."
            }
        }
    }

    /// Formats the message with positional inserts.
    #[must_use]
    pub fn message(&self, inserts: &[&str]) -> AuditMessage {
        let mut text = self.template().to_string();
        for (index, insert) in inserts.iter().enumerate() {
            text = text.replace(&format!("{{{index}}}"), insert);
        }

        AuditMessage {
            message_id: self.message_id(),
            severity: self.severity(),
            text,
            system_action: self.system_action(),
            user_action: self.user_action(),
        }
    }
}

/// A formatted audit record ready to be handed to an [`AuditLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditMessage {
    /// Stable message id.
    pub message_id: &'static str,
    /// Record severity.
    pub severity: AuditSeverity,
    /// Formatted message text.
    pub text: String,
    /// What the system did about the situation.
    pub system_action: &'static str,
    /// How an operator should respond.
    pub user_action: &'static str,
}

impl fmt::Display for AuditMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.message_id, self.severity, self.text)
    }
}

/// Audit collaborator consumed by the watchdog.
///
/// Implementations must not fail and must not block meaningfully; the
/// watchdog calls this on its error paths.
pub trait AuditLog: Send + Sync {
    /// Records an exception observed during `operation`.
    fn log_exception(
        &self,
        operation: &'static str,
        message: AuditMessage,
        cause: &(dyn std::error::Error + 'static),
    );
}

/// Audit log that forwards records to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn log_exception(
        &self,
        operation: &'static str,
        message: AuditMessage,
        cause: &(dyn std::error::Error + 'static),
    ) {
        tracing::error!(
            operation,
            message_id = message.message_id,
            severity = %message.severity,
            cause = %cause,
            "{}",
            message.text
        );
    }
}

/// Audit log that discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditLog;

impl AuditLog for NullAuditLog {
    fn log_exception(
        &self,
        _operation: &'static str,
        _message: AuditMessage,
        _cause: &(dyn std::error::Error + 'static),
    ) {
    }
}
