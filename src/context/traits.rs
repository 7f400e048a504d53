//! Collaborator seams consumed by the watchdog dispatcher.
//!
//! These traits define the contract between the dispatcher and the hosting
//! runtime's services. By using traits, we enable:
//! - In-process implementations for embedded use and testing
//! - Server-backed implementations layered over a transport
//!
//! None of the calls here may hang indefinitely from the dispatcher's
//! perspective; timeout handling belongs to the implementation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::completion::CompletionStatus;
use crate::error::{OrchestrationError, RegistrationError, ReportingError, WatchdogResult};
use crate::event::{ChangeEvent, EventKind};
use crate::guid::ElementGuid;
use crate::properties::FieldMap;

/// Receiver of change events.
///
/// Implementations must be safe to call from the event source's delivery
/// threads; invocations may overlap. An error return reports that the event
/// could not be processed; the event source logs it and keeps delivering
/// until the execution completes or is shut down.
pub trait ChangeListener: Send + Sync {
    /// Handles one change notification.
    fn process_event(&self, event: &ChangeEvent) -> WatchdogResult<()>;
}

/// The repository-side event source a watchdog registers with.
///
/// Capability limit: a registration carries AT MOST ONE instance filter.
/// A caller that needs to monitor several specific instances must subscribe
/// type-wide (`instance: None`) and filter subject GUIDs itself.
pub trait EventSource: Send + Sync {
    /// Registers a listener for the given event kinds and element types.
    ///
    /// When `instance` is set, the event source delivers only events whose
    /// subject GUID matches it (filter push-down).
    ///
    /// # Errors
    /// `RegistrationError` when the subscription could not be established.
    fn register_listener(
        &self,
        listener: Arc<dyn ChangeListener>,
        kinds: &[EventKind],
        type_names: &[String],
        instance: Option<ElementGuid>,
    ) -> Result<(), RegistrationError>;
}

/// Orchestrator that runs named remediation processes.
pub trait ProcessOrchestrator: Send + Sync {
    /// Initiates the named process against the given action targets.
    ///
    /// # Errors
    /// `OrchestrationError` when the process could not be started.
    fn initiate_process(
        &self,
        name: &str,
        request_parameters: &HashMap<String, String>,
        action_targets: &[ElementGuid],
    ) -> Result<(), OrchestrationError>;
}

/// Sink for the execution's one-shot completion report.
pub trait CompletionReporter: Send + Sync {
    /// Records the terminal status of the execution.
    ///
    /// Only the first call per execution is meaningful to the hosting
    /// runtime.
    ///
    /// # Errors
    /// `ReportingError` when the status could not be recorded.
    fn record_completion_status(
        &self,
        status: CompletionStatus,
        guards: &[String],
        output_properties: Option<&FieldMap>,
    ) -> Result<(), ReportingError>;
}

/// Source of the watchdog's configuration values.
///
/// Request parameters are supplied per invocation; configuration properties
/// come from the stored connection. Lookup precedence is request parameter,
/// then configuration property, then the caller-supplied default.
pub trait ConfigurationSource: Send + Sync {
    /// Value of a request parameter, when supplied.
    fn request_parameter(&self, name: &str) -> Option<String>;

    /// Value of a stored configuration property, when present.
    fn configuration_property(&self, name: &str) -> Option<String>;

    /// Applies the request-parameter-over-property precedence.
    fn lookup(&self, name: &str) -> Option<String> {
        self.request_parameter(name)
            .or_else(|| self.configuration_property(name))
    }
}
