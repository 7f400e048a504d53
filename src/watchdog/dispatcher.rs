//! Watchdog dispatcher.
//!
//! One dispatcher exists per governance-action execution. `start` resolves
//! the interest set and registers the dispatcher as a change listener;
//! `process_event` turns accepted events into process initiations; the
//! completion latch guarantees the hosting runtime sees at most one
//! terminal report, whatever the interleaving of deliveries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::audit::{AuditCode, AuditLog};
use crate::completion::{CompletionStatus, MONITORING_COMPLETE, MONITORING_FAILED};
use crate::context::traits::{
    ChangeListener, CompletionReporter, ConfigurationSource, EventSource, ProcessOrchestrator,
};
use crate::error::{ConfigurationError, WatchdogError, WatchdogResult};
use crate::event::ChangeEvent;
use crate::guid::ElementGuid;
use crate::properties::{changed_field_names, PropertyValue};

use super::config::{self, MonitoringMode};
use super::registration::{InstanceFilter, ProcessTable, WatchdogRegistration};

/// Observable lifecycle state of a dispatcher.
///
/// `Registered` is normally transient inside `start`: the interest set is
/// resolved but the event source has not yet accepted the listener.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Uninitialized,
    Registered,
    Listening,
    Completed,
    Failed,
}

/// One-shot latch for the terminal completion report.
///
/// `try_latch` is an atomic test-and-set: exactly one caller wins, however
/// many event deliveries race on it. Monotonic false to true; never reset.
#[derive(Debug, Default)]
pub struct CompletionLatch {
    latched: AtomicBool,
}

impl CompletionLatch {
    /// Creates an unlatched latch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latched: AtomicBool::new(false),
        }
    }

    /// Attempts to latch; returns true for the single winning caller.
    pub fn try_latch(&self) -> bool {
        self.latched
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// True once any caller has latched.
    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.latched.load(Ordering::Acquire)
    }
}

/// Event-driven governance dispatcher.
///
/// Listens for metadata-change notifications, filters them against the
/// configured interest set, computes which properties changed and triggers
/// the remediation process configured for the event's kind.
pub struct WatchdogDispatcher {
    event_source: Arc<dyn EventSource>,
    orchestrator: Arc<dyn ProcessOrchestrator>,
    reporter: Arc<dyn CompletionReporter>,
    configuration: Arc<dyn ConfigurationSource>,
    audit: Arc<dyn AuditLog>,

    // Written once during start, read lock-free during event processing.
    registration: OnceLock<WatchdogRegistration>,
    listening: AtomicBool,
    completed: CompletionLatch,
    terminal_status: OnceLock<CompletionStatus>,
    disconnected: AtomicBool,
}

impl WatchdogDispatcher {
    /// Creates a dispatcher wired to its collaborators.
    #[must_use]
    pub fn new(
        event_source: Arc<dyn EventSource>,
        orchestrator: Arc<dyn ProcessOrchestrator>,
        reporter: Arc<dyn CompletionReporter>,
        configuration: Arc<dyn ConfigurationSource>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            event_source,
            orchestrator,
            reporter,
            configuration,
            audit,
            registration: OnceLock::new(),
            listening: AtomicBool::new(false),
            completed: CompletionLatch::new(),
            terminal_status: OnceLock::new(),
            disconnected: AtomicBool::new(false),
        }
    }

    /// Resolves the interest set and registers with the event source.
    ///
    /// The monitored type name comes from configuration (request parameter
    /// over stored property) falling back to `default_type_name`; the
    /// instance filter merges the optional configured GUID with the
    /// caller-supplied action targets.
    ///
    /// # Errors
    /// - `ConfigurationError` when a filter value is missing or malformed.
    /// - `RegistrationError` when the event source rejects the
    ///   subscription; a Failed completion with the `monitoring-failed`
    ///   guard is attempted first, best-effort.
    pub fn start(
        self: Arc<Self>,
        default_type_name: &str,
        action_targets: &[ElementGuid],
    ) -> WatchdogResult<()> {
        let type_name = self
            .configuration
            .lookup(config::INTERESTING_TYPE_NAME)
            .unwrap_or_else(|| default_type_name.to_string());
        if type_name.is_empty() {
            return Err(ConfigurationError::MissingProperty {
                name: config::INTERESTING_TYPE_NAME.to_string(),
            }
            .into());
        }

        let mut targets: Vec<ElementGuid> = Vec::new();
        if let Some(text) = self.configuration.lookup(config::INSTANCE_TO_MONITOR) {
            let guid =
                ElementGuid::parse(&text).map_err(|err| ConfigurationError::InvalidValue {
                    name: config::INSTANCE_TO_MONITOR.to_string(),
                    value: text.clone(),
                    reason: err.to_string(),
                })?;
            targets.push(guid);
        }
        targets.extend_from_slice(action_targets);

        let registration = WatchdogRegistration {
            type_name: type_name.clone(),
            processes: ProcessTable::from_configuration(self.configuration.as_ref()),
            instances: InstanceFilter::from_targets(targets),
            mode: MonitoringMode::from_configuration(self.configuration.as_ref())?,
        };

        let kinds = registration.processes.subscribed_kinds();
        let push_down = registration.instances.push_down();

        self.registration
            .set(registration)
            .map_err(|_| WatchdogError::internal("watchdog dispatcher was already started"))?;

        if let Err(err) = self.event_source.register_listener(
            Arc::clone(&self) as Arc<dyn ChangeListener>,
            &kinds,
            std::slice::from_ref(&type_name),
            push_down,
        ) {
            self.record_completion_best_effort(CompletionStatus::Failed, &[MONITORING_FAILED]);

            let wrapped = WatchdogError::from(err.clone());
            self.audit.log_exception(
                "start",
                AuditCode::ListenerRegistrationFailed.message(&[&err.to_string()]),
                &wrapped,
            );
            return Err(wrapped);
        }

        self.listening.store(true, Ordering::Release);
        Ok(())
    }

    /// Handles one change notification.
    ///
    /// Events are ignored silently before `start`, after a terminal status
    /// has latched, after `disconnect`, when the kind is not subscribed or
    /// when the subject falls outside the retained instance targets.
    ///
    /// # Errors
    /// `OrchestrationError` when the configured process could not be
    /// initiated; a Failed completion is attempted first, best-effort.
    pub fn process_event(&self, event: &ChangeEvent) -> WatchdogResult<()> {
        if self.disconnected.load(Ordering::Acquire) || self.completed.is_latched() {
            return Ok(());
        }
        let Some(registration) = self.registration.get() else {
            return Ok(());
        };
        if !registration.accepts(event) {
            return Ok(());
        }

        let changed = changed_field_names(
            event
                .old_properties
                .as_ref()
                .and_then(PropertyValue::as_struct_fields),
            event
                .new_properties
                .as_ref()
                .and_then(PropertyValue::as_struct_fields),
        );

        let mut request_parameters = HashMap::new();
        if !changed.is_empty() {
            request_parameters.insert(
                config::CHANGED_PROPERTIES_PARAMETER.to_string(),
                changed.join(", "),
            );
        }

        let process_name = registration
            .processes
            .process_for(event.kind)
            .map(str::to_string);
        self.initiate_process(
            process_name.as_deref(),
            &request_parameters,
            &[event.subject_guid],
        )?;

        if registration.mode == MonitoringMode::SingleEvent {
            self.record_completion_best_effort(
                CompletionStatus::Succeeded,
                &[MONITORING_COMPLETE],
            );
        }

        Ok(())
    }

    /// Initiates the named remediation process, if one is set.
    ///
    /// An unset name is a no-op: no orchestrator call, no state change.
    ///
    /// # Errors
    /// `OrchestrationError` surfaced from the orchestrator after the
    /// best-effort Failed completion attempt.
    pub fn initiate_process(
        &self,
        name: Option<&str>,
        request_parameters: &HashMap<String, String>,
        action_targets: &[ElementGuid],
    ) -> WatchdogResult<()> {
        let Some(name) = name else {
            return Ok(());
        };

        if let Err(err) = self
            .orchestrator
            .initiate_process(name, request_parameters, action_targets)
        {
            self.record_completion_best_effort(CompletionStatus::Failed, &[MONITORING_FAILED]);

            let wrapped = WatchdogError::from(err.clone());
            self.audit.log_exception(
                "initiate_process",
                AuditCode::ProcessInitiationFailed.message(&[name, &err.to_string()]),
                &wrapped,
            );
            return Err(wrapped);
        }

        Ok(())
    }

    /// Ends this execution's participation in event delivery.
    ///
    /// May happen before or after a terminal status has latched. No status
    /// is ever reported from here: a hosting runtime that observes a
    /// disconnect without a prior terminal report restarts the dispatcher
    /// from scratch.
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::Release);
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DispatcherState {
        if let Some(status) = self.terminal_status.get() {
            return if *status == CompletionStatus::Failed {
                DispatcherState::Failed
            } else {
                DispatcherState::Completed
            };
        }
        if self.registration.get().is_none() {
            return DispatcherState::Uninitialized;
        }
        if self.listening.load(Ordering::Acquire) {
            DispatcherState::Listening
        } else {
            DispatcherState::Registered
        }
    }

    /// True once a terminal status has latched.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed.is_latched()
    }

    /// Records a terminal status at most once, swallowing reporter failure.
    ///
    /// This is the best-effort path: the latch is taken first so only one
    /// report is ever attempted, and a failure to record is audit-logged
    /// and otherwise ignored so it can never mask the primary error the
    /// caller is about to surface.
    fn record_completion_best_effort(&self, status: CompletionStatus, guards: &[&str]) {
        if !self.completed.try_latch() {
            return;
        }
        let _ = self.terminal_status.set(status);

        let guards: Vec<String> = guards.iter().map(|g| (*g).to_string()).collect();
        if let Err(err) = self
            .reporter
            .record_completion_status(status, &guards, None)
        {
            let wrapped = WatchdogError::from(err);
            self.audit.log_exception(
                "record_completion_status",
                AuditCode::CompletionStatusNotRecorded
                    .message(&[&status.to_string(), &wrapped.to_string()]),
                &wrapped,
            );
        }
    }
}

impl ChangeListener for WatchdogDispatcher {
    fn process_event(&self, event: &ChangeEvent) -> WatchdogResult<()> {
        Self::process_event(self, event)
    }
}
