//! # metawatch - event-driven governance for metadata repositories
//!
//! metawatch turns metadata-change notifications into triggered remediation
//! processes. A watchdog dispatcher registers a filtered listener with the
//! repository's event source; each accepted event is diffed field by field
//! and handed to the process configured for that kind of change. The
//! dispatcher owes the hosting runtime exactly one terminal completion
//! report, which drives the runtime's restart semantics.
//!
//! ## Core Concepts
//!
//! - **PropertyValue**: self-describing typed node in a property tree
//!   (primitive, enum, struct, array or map)
//! - **ChangeEvent**: one metadata-change notification with old/new
//!   property trees
//! - **WatchdogDispatcher**: filters events, diffs properties, triggers
//!   processes and latches the one-shot completion report
//! - **Guard**: named outcome label attached to a completion status,
//!   consumed by downstream orchestration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use metawatch::{
//!     BusConfig, InProcessEventBus, StaticConfiguration, WatchdogDispatcher,
//! };
//!
//! let bus = Arc::new(InProcessEventBus::new(BusConfig::default()));
//! let configuration = Arc::new(
//!     StaticConfiguration::new()
//!         .with_property("updatedElementProcessName", "revalidate-asset"),
//! );
//!
//! let dispatcher = Arc::new(WatchdogDispatcher::new(
//!     bus.clone(),
//!     orchestrator,
//!     reporter,
//!     configuration,
//!     audit,
//! ));
//! dispatcher.clone().start("Asset", &[])?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod audit;
pub mod completion;
pub mod error;
pub mod event;
pub mod guid;
pub mod properties;

// Collaborators and the dispatcher
pub mod context;
pub mod watchdog;

// Re-export primary types at crate root for convenience
pub use audit::{AuditCode, AuditLog, AuditMessage, AuditSeverity, NullAuditLog, TracingAuditLog};
pub use completion::{CompletionStatus, MONITORING_COMPLETE, MONITORING_FAILED};
pub use error::{
    ConfigurationError, OrchestrationError, PropertyError, RegistrationError, ReportingError,
    WatchdogError, WatchdogResult,
};
pub use event::{ChangeEvent, EventKind};
pub use guid::{ElementGuid, TypeGuid};
pub use properties::{
    changed_field_names, FieldMap, PrimitiveValue, PropertyCategory, PropertyValue, TypeIdentifier,
};

pub use context::{
    BusConfig, ChangeListener, CompletionReporter, ConfigurationSource, EventSource,
    InProcessEventBus, ProcessOrchestrator, StaticConfiguration,
};
pub use watchdog::{
    CompletionLatch, DispatcherState, InstanceFilter, MonitoringMode, ProcessTable,
    WatchdogDispatcher, WatchdogRegistration,
};
