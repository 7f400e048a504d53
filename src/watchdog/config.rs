//! Configuration property names and monitoring mode.
//!
//! All values are resolved through a [`ConfigurationSource`] with the
//! request-parameter-over-stored-property precedence; the names here are
//! the keys both layers share.

use crate::context::ConfigurationSource;
use crate::error::ConfigurationError;

/// Type name of the elements to monitor.
pub const INTERESTING_TYPE_NAME: &str = "interestingTypeName";

/// Optional GUID of a single instance to monitor.
pub const INSTANCE_TO_MONITOR: &str = "instanceToMonitor";

/// Monitoring mode: `single-event` or `multiple-events`.
pub const MONITORING_MODE: &str = "monitoringMode";

/// Process to run for a new (or refreshed) element.
pub const NEW_ELEMENT_PROCESS_NAME: &str = "newElementProcessName";

/// Process to run when element properties change.
pub const UPDATED_ELEMENT_PROCESS_NAME: &str = "updatedElementProcessName";

/// Process to run when an element is deleted.
pub const DELETED_ELEMENT_PROCESS_NAME: &str = "deletedElementProcessName";

/// Process to run when a classification is attached.
pub const NEW_CLASSIFICATION_PROCESS_NAME: &str = "newClassificationProcessName";

/// Process to run when classification properties change.
pub const UPDATED_CLASSIFICATION_PROCESS_NAME: &str = "updatedClassificationProcessName";

/// Process to run when a classification is removed.
pub const DELETED_CLASSIFICATION_PROCESS_NAME: &str = "deletedClassificationProcessName";

/// Process to run for a new relationship.
pub const NEW_RELATIONSHIP_PROCESS_NAME: &str = "newRelationshipProcessName";

/// Process to run when relationship properties change.
pub const UPDATED_RELATIONSHIP_PROCESS_NAME: &str = "updatedRelationshipProcessName";

/// Process to run when a relationship is deleted.
pub const DELETED_RELATIONSHIP_PROCESS_NAME: &str = "deletedRelationshipProcessName";

/// Request parameter carrying the comma-separated changed-property list to a
/// triggered process.
pub const CHANGED_PROPERTIES_PARAMETER: &str = "changedProperties";

/// How long a watchdog execution keeps listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MonitoringMode {
    /// Record a succeeded completion after the first processed event.
    SingleEvent,
    /// Keep listening until the hosting runtime disconnects the execution.
    #[default]
    MultipleEvents,
}

impl MonitoringMode {
    /// Resolves the mode from configuration; absent means multiple events.
    ///
    /// # Errors
    /// `ConfigurationError::InvalidValue` for an unrecognized mode string.
    pub fn from_configuration(
        config: &dyn ConfigurationSource,
    ) -> Result<Self, ConfigurationError> {
        match config.lookup(MONITORING_MODE).as_deref() {
            None => Ok(Self::MultipleEvents),
            Some("single-event") => Ok(Self::SingleEvent),
            Some("multiple-events") => Ok(Self::MultipleEvents),
            Some(other) => Err(ConfigurationError::InvalidValue {
                name: MONITORING_MODE.to_string(),
                value: other.to_string(),
                reason: "expected 'single-event' or 'multiple-events'".to_string(),
            }),
        }
    }
}
