//! The watchdog's interest set: which kinds, which type, which instances.
//!
//! Built once during `start` and immutable afterwards, so event processing
//! reads it without synchronization.

use std::collections::HashMap;

use crate::context::ConfigurationSource;
use crate::event::{ChangeEvent, EventKind};
use crate::guid::ElementGuid;

use super::config;
use super::config::MonitoringMode;

/// Mapping from event kind to the configured remediation process.
///
/// Populated from the per-category process-name configuration slots. A kind
/// with no configured process is not subscribed; absence of configuration is
/// the only exclusion mechanism. NewElement and RefreshedElement share the
/// `newElementProcessName` slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessTable {
    entries: HashMap<EventKind, String>,
}

/// The configuration slots and the kinds each one subscribes.
const PROCESS_SLOTS: [(&str, &[EventKind]); 9] = [
    (
        config::NEW_ELEMENT_PROCESS_NAME,
        &[EventKind::NewElement, EventKind::RefreshedElement],
    ),
    (
        config::UPDATED_ELEMENT_PROCESS_NAME,
        &[EventKind::UpdatedElementProperties],
    ),
    (
        config::DELETED_ELEMENT_PROCESS_NAME,
        &[EventKind::DeletedElement],
    ),
    (
        config::NEW_CLASSIFICATION_PROCESS_NAME,
        &[EventKind::NewClassification],
    ),
    (
        config::UPDATED_CLASSIFICATION_PROCESS_NAME,
        &[EventKind::UpdatedClassificationProperties],
    ),
    (
        config::DELETED_CLASSIFICATION_PROCESS_NAME,
        &[EventKind::DeletedClassification],
    ),
    (
        config::NEW_RELATIONSHIP_PROCESS_NAME,
        &[EventKind::NewRelationship],
    ),
    (
        config::UPDATED_RELATIONSHIP_PROCESS_NAME,
        &[EventKind::UpdatedRelationshipProperties],
    ),
    (
        config::DELETED_RELATIONSHIP_PROCESS_NAME,
        &[EventKind::DeletedRelationship],
    ),
];

impl ProcessTable {
    /// Reads the process-name slots from configuration.
    #[must_use]
    pub fn from_configuration(config: &dyn ConfigurationSource) -> Self {
        let mut entries = HashMap::new();
        for (slot, kinds) in PROCESS_SLOTS {
            if let Some(process_name) = config.lookup(slot) {
                for kind in kinds {
                    entries.insert(*kind, process_name.clone());
                }
            }
        }
        Self { entries }
    }

    /// The process configured for an event kind, if any.
    #[must_use]
    pub fn process_for(&self, kind: EventKind) -> Option<&str> {
        self.entries.get(&kind).map(String::as_str)
    }

    /// Kinds with a configured process, in canonical declaration order.
    #[must_use]
    pub fn subscribed_kinds(&self) -> Vec<EventKind> {
        EventKind::ALL
            .into_iter()
            .filter(|kind| self.entries.contains_key(kind))
            .collect()
    }

    /// True when no kind has a configured process.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Instance filtering policy for a registration.
///
/// The event source accepts at most one instance filter per registration.
/// A single target is pushed down to the source; with two or more targets
/// the subscription is type-wide and the dispatcher tests subject GUIDs
/// against the retained set itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceFilter {
    /// No instance filtering; the whole type is monitored.
    None,
    /// One target, filtered repository-side.
    PushedDown(ElementGuid),
    /// Two or more targets, filtered dispatcher-side.
    Local(Vec<ElementGuid>),
}

impl InstanceFilter {
    /// Builds the filter from the merged target set, dropping duplicates
    /// while keeping first-seen order.
    #[must_use]
    pub fn from_targets(targets: Vec<ElementGuid>) -> Self {
        let mut unique: Vec<ElementGuid> = Vec::with_capacity(targets.len());
        for target in targets {
            if !unique.contains(&target) {
                unique.push(target);
            }
        }

        match unique.len() {
            0 => Self::None,
            1 => Self::PushedDown(unique[0]),
            _ => Self::Local(unique),
        }
    }

    /// The single filter to hand to the event source, when one applies.
    #[must_use]
    pub const fn push_down(&self) -> Option<ElementGuid> {
        match self {
            Self::PushedDown(guid) => Some(*guid),
            Self::None | Self::Local(_) => None,
        }
    }

    /// Tests a subject GUID against the dispatcher-side filter.
    ///
    /// `None` and `PushedDown` accept everything here: in the former there
    /// is nothing to filter, in the latter the event source has already
    /// filtered.
    #[must_use]
    pub fn accepts(&self, subject: ElementGuid) -> bool {
        match self {
            Self::None | Self::PushedDown(_) => true,
            Self::Local(targets) => targets.contains(&subject),
        }
    }
}

/// The complete interest set of one watchdog execution.
#[derive(Debug, Clone)]
pub struct WatchdogRegistration {
    /// Type name being monitored.
    pub type_name: String,
    /// Kind-to-process dispatch table.
    pub processes: ProcessTable,
    /// Instance filtering policy.
    pub instances: InstanceFilter,
    /// Single- or multiple-event monitoring.
    pub mode: MonitoringMode,
}

impl WatchdogRegistration {
    /// True when the event passes the kind and instance filters.
    #[must_use]
    pub fn accepts(&self, event: &ChangeEvent) -> bool {
        self.processes.process_for(event.kind).is_some() && self.instances.accepts(event.subject_guid)
    }
}
