//! Collaborator interfaces and the embedded implementations shipped with
//! the crate.
//!
//! The watchdog core only ever talks to the traits in [`traits`]; the
//! in-process event bus and static configuration are the embedded-first
//! implementations a hosting runtime can replace with transport-backed
//! ones.

/// In-process event bus (embedded `EventSource`).
pub mod bus;
/// In-memory configuration source.
pub mod config;
/// Collaborator trait definitions.
pub mod traits;

pub use bus::{BusConfig, InProcessEventBus};
pub use config::StaticConfiguration;
pub use traits::{
    ChangeListener, CompletionReporter, ConfigurationSource, EventSource, ProcessOrchestrator,
};
