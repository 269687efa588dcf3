//! Configuration types for the collector

use crate::cache::NAME_ATTRIBUTE;
use crate::hub::DEVICE_STATE_CHANGED;

/// Collector configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Event type the collector subscribes to
    pub event_type: String,

    /// Hub status attribute holding the hub name
    pub hub_name_attribute: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            event_type: DEVICE_STATE_CHANGED.to_string(),
            hub_name_attribute: NAME_ATTRIBUTE.to_string(),
        }
    }
}

impl CollectorConfig {
    /// Create a configuration subscribing to another event type
    pub fn with_event_type(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Default::default()
        }
    }

    /// Create a configuration reading the hub name from another attribute
    pub fn with_hub_name_attribute(attribute: impl Into<String>) -> Self {
        Self {
            hub_name_attribute: attribute.into(),
            ..Default::default()
        }
    }
}
