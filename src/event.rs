//! Change-event types delivered by the metadata repository's event source.
//!
//! These types are intentionally serializable so events can be logged,
//! replayed and carried over a transport layered on top of the embedded
//! event bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::guid::ElementGuid;
use crate::properties::PropertyValue;

/// The kinds of metadata change a watchdog can subscribe to.
///
/// Element kinds describe the lifecycle of a metadata element itself;
/// classification kinds describe labels attached to an element; relationship
/// kinds describe links between elements.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewElement,
    RefreshedElement,
    UpdatedElementProperties,
    DeletedElement,
    NewClassification,
    UpdatedClassificationProperties,
    DeletedClassification,
    NewRelationship,
    UpdatedRelationshipProperties,
    DeletedRelationship,
}

impl EventKind {
    /// All kinds in their canonical declaration order.
    pub const ALL: [Self; 10] = [
        Self::NewElement,
        Self::RefreshedElement,
        Self::UpdatedElementProperties,
        Self::DeletedElement,
        Self::NewClassification,
        Self::UpdatedClassificationProperties,
        Self::DeletedClassification,
        Self::NewRelationship,
        Self::UpdatedRelationshipProperties,
        Self::DeletedRelationship,
    ];
}

/// A single metadata-change notification.
///
/// `old_properties`/`new_properties` are Struct-typed property trees when
/// the repository supplies them; deletion events typically carry only the
/// old tree and creation events only the new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Unique identifier of this notification.
    pub event_id: Uuid,
    /// The kind of change.
    pub kind: EventKind,
    /// Type name of the subject element.
    pub subject_type_name: String,
    /// GUID of the subject element.
    pub subject_guid: ElementGuid,
    /// When the repository observed the change.
    pub timestamp: DateTime<Utc>,
    /// Subject properties before the change, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_properties: Option<PropertyValue>,
    /// Subject properties after the change, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_properties: Option<PropertyValue>,
}

impl ChangeEvent {
    /// Creates an event with no property payloads.
    #[must_use]
    pub fn new(kind: EventKind, subject_type_name: impl Into<String>, subject_guid: ElementGuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
            subject_type_name: subject_type_name.into(),
            subject_guid,
            timestamp: Utc::now(),
            old_properties: None,
            new_properties: None,
        }
    }

    /// Attaches the pre-change property tree.
    #[must_use]
    pub fn with_old_properties(mut self, properties: PropertyValue) -> Self {
        self.old_properties = Some(properties);
        self
    }

    /// Attaches the post-change property tree.
    #[must_use]
    pub fn with_new_properties(mut self, properties: PropertyValue) -> Self {
        self.new_properties = Some(properties);
        self
    }
}
