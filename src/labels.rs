//! Label dimensions attached to every device sample
//!
//! The exposition model rejects a metric name whose label dimensions change
//! over the process lifetime, so every sample of every category carries the
//! same seven labels, in the same order.

use serde::Serialize;

use crate::cache::DeviceMetadata;

/// Label names, in the order of [`LabelSet::values`]
pub const LABEL_NAMES: [&str; 7] = [
    "hub_id",
    "hub_name",
    "room_id",
    "room_name",
    "device_id",
    "device_name",
    "device_type",
];

/// Identity of the hub, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubIdentity {
    pub id: String,
    pub name: String,
}

impl HubIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Fixed-dimension label tuple for one device sample
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LabelSet {
    pub hub_id: String,
    pub hub_name: String,
    pub room_id: String,
    pub room_name: String,
    pub device_id: String,
    pub device_name: String,
    pub device_category: String,
}

impl LabelSet {
    /// Build the label set for a resolved device.
    pub fn new(
        hub: &HubIdentity,
        device_id: &str,
        metadata: &DeviceMetadata,
        device_category: &str,
    ) -> Self {
        Self {
            hub_id: hub.id.clone(),
            hub_name: hub.name.clone(),
            room_id: metadata.room_id.clone(),
            room_name: metadata.room_name.clone(),
            device_id: device_id.to_string(),
            device_name: metadata.name.clone(),
            device_category: device_category.to_string(),
        }
    }

    /// Label values, ordered like [`LABEL_NAMES`]
    pub fn values(&self) -> [&str; 7] {
        [
            &self.hub_id,
            &self.hub_name,
            &self.room_id,
            &self.room_name,
            &self.device_id,
            &self.device_name,
            &self.device_category,
        ]
    }

    /// `(name, value)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        LABEL_NAMES.into_iter().zip(self.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_follow_label_names() {
        let hub = HubIdentity::new("hub-1", "Home");
        let metadata = DeviceMetadata {
            name: "Socket 1".to_string(),
            room_name: "Office".to_string(),
            room_id: "room-1".to_string(),
            category: "outlet".to_string(),
            subcategory: "outlet".to_string(),
        };
        let labels = LabelSet::new(&hub, "abc", &metadata, "outlet");
        let pairs: Vec<_> = labels.pairs().collect();

        assert_eq!(pairs.len(), LABEL_NAMES.len());
        assert_eq!(pairs[0], ("hub_id", "hub-1"));
        assert_eq!(pairs[3], ("room_name", "Office"));
        assert_eq!(pairs[4], ("device_id", "abc"));
        assert_eq!(pairs[6], ("device_type", "outlet"));
    }
}
