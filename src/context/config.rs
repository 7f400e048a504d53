//! In-memory configuration source.

use std::collections::HashMap;

use super::traits::ConfigurationSource;

/// Configuration source backed by two plain maps.
///
/// Suitable for embedded use and tests; a hosting runtime wires its own
/// request parameters and stored connection properties through this or a
/// bespoke implementation.
#[derive(Debug, Default, Clone)]
pub struct StaticConfiguration {
    request_parameters: HashMap<String, String>,
    configuration_properties: HashMap<String, String>,
}

impl StaticConfiguration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request parameter.
    #[must_use]
    pub fn with_request_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.request_parameters.insert(name.into(), value.into());
        self
    }

    /// Adds a stored configuration property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration_properties
            .insert(name.into(), value.into());
        self
    }
}

impl ConfigurationSource for StaticConfiguration {
    fn request_parameter(&self, name: &str) -> Option<String> {
        self.request_parameters.get(name).cloned()
    }

    fn configuration_property(&self, name: &str) -> Option<String> {
        self.configuration_properties.get(name).cloned()
    }
}
