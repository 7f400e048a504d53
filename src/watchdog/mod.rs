//! The watchdog dispatcher and its registration state.
//!
//! The dispatcher is created once per governance-action execution, resolves
//! its interest set from configuration during `start`, and reports at most
//! one terminal completion status however events and failures interleave.

/// Configuration property names and monitoring mode.
pub mod config;
/// Dispatcher state machine and completion latch.
pub mod dispatcher;
/// Interest set: process table and instance filter.
pub mod registration;

pub use config::MonitoringMode;
pub use dispatcher::{CompletionLatch, DispatcherState, WatchdogDispatcher};
pub use registration::{InstanceFilter, ProcessTable, WatchdogRegistration};
