//! Device snapshots as delivered by the hub
//!
//! Snapshots arrive either in bulk (device listing at startup) or embedded
//! in state-change events. Events are partial: any field except `id` may be
//! missing, and the attribute map only carries what changed.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dynamically typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
    /// Nested shapes (lists, objects) no gauge consumes
    Other(serde_json::Value),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Attribute mapping of a snapshot.
///
/// Every accessor checks presence and type; a key holding a value of another
/// type reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(HashMap<String, AttributeValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Boolean attribute, if present with that type
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(AttributeValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Numeric attribute, if present with that type
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key) {
            Some(AttributeValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// Non-empty string attribute
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(AttributeValue::Text(value)) if !value.is_empty() => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Room reference attached to a device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Room {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// State of one device endpoint as reported by the hub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    /// Raw (possibly composite) device id
    pub id: String,
    /// Hub device class, e.g. `sensor`, `outlet`, `gateway`
    #[serde(rename = "type", default)]
    pub category: String,
    /// Hub device subclass, e.g. `environmentSensor`
    #[serde(rename = "deviceType", default)]
    pub subcategory: String,
    #[serde(default)]
    pub is_reachable: Option<bool>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub room: Option<Room>,
}

impl DeviceSnapshot {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            subcategory: subcategory.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    pub fn with_room(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.room = Some(Room::new(id, name));
        self
    }

    pub fn with_reachable(mut self, reachable: bool) -> Self {
        self.is_reachable = Some(reachable);
        self
    }

    pub fn with_last_seen(mut self, last_seen: DateTime<Utc>) -> Self {
        self.last_seen = Some(last_seen);
        self
    }

    /// Whether this snapshot describes the hub itself
    pub fn is_gateway(&self) -> bool {
        self.category == GATEWAY_CATEGORY || self.subcategory == GATEWAY_CATEGORY
    }

    /// Non-empty room name
    pub fn room_name(&self) -> Option<&str> {
        self.room
            .as_ref()
            .map(|r| r.name.as_str())
            .filter(|n| !n.is_empty())
    }

    /// Non-empty room id
    pub fn room_id(&self) -> Option<&str> {
        self.room
            .as_ref()
            .map(|r| r.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Category the hub reports for itself
pub const GATEWAY_CATEGORY: &str = "gateway";

/// Event pushed by the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    pub data: DeviceSnapshot,
}

impl HubEvent {
    pub fn new(event_type: impl Into<String>, data: DeviceSnapshot) -> Self {
        Self {
            id: String::new(),
            event_type: event_type.into(),
            time: None,
            data,
        }
    }
}

impl fmt::Display for HubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {}", self.event_type, self.data.id)?;
        if !self.id.is_empty() {
            write!(f, " (event {})", self.id)?;
        }
        if let Some(time) = self.time {
            write!(f, " at {}", time.to_rfc3339())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_device() {
        let json = r#"{
            "id": "abc_1",
            "type": "outlet",
            "deviceType": "outlet",
            "isReachable": true,
            "lastSeen": "2025-03-01T10:00:00.000Z",
            "attributes": {
                "customName": "Socket 1",
                "isOn": true,
                "currentActivePower": 42,
                "circadianPresets": []
            },
            "room": {"id": "room-1", "name": "Office", "color": "ikea_green_no_65"}
        }"#;
        let device: DeviceSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(device.category, "outlet");
        assert_eq!(device.is_reachable, Some(true));
        assert!(device.last_seen.is_some());
        assert_eq!(device.attributes.text("customName"), Some("Socket 1"));
        assert_eq!(device.attributes.bool("isOn"), Some(true));
        assert_eq!(device.attributes.number("currentActivePower"), Some(42.0));
        assert!(matches!(
            device.attributes.get("circadianPresets"),
            Some(AttributeValue::Other(_))
        ));
        assert_eq!(device.room_name(), Some("Office"));
    }

    #[test]
    fn test_deserialize_partial_event() {
        let json = r#"{
            "id": "e1",
            "type": "deviceStateChanged",
            "time": "2025-03-01T10:00:05Z",
            "data": {"id": "abc_1", "attributes": {"isOn": false}}
        }"#;
        let event: HubEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.data.category, "");
        assert_eq!(event.data.is_reachable, None);
        assert!(event.data.room.is_none());
        assert_eq!(event.data.attributes.bool("isOn"), Some(false));
        assert!(event.to_string().contains("abc_1"));
    }

    #[test]
    fn test_typed_accessors_reject_wrong_type() {
        let attrs: Attributes = [("isOn", AttributeValue::Number(1.0))].into_iter().collect();
        assert_eq!(attrs.bool("isOn"), None);
        assert_eq!(attrs.number("isOn"), Some(1.0));
        assert_eq!(attrs.number("missing"), None);

        let mut attrs = Attributes::new();
        attrs.insert("customName", "");
        assert_eq!(attrs.text("customName"), None);
    }

    #[test]
    fn test_gateway_detection() {
        assert!(DeviceSnapshot::new("hub", "gateway", "gateway").is_gateway());
        assert!(!DeviceSnapshot::new("x_1", "outlet", "outlet").is_gateway());
    }

    #[test]
    fn test_empty_room_reads_as_absent() {
        let device = DeviceSnapshot::new("x", "light", "light").with_room("", "");
        assert_eq!(device.room_name(), None);
        assert_eq!(device.room_id(), None);
    }
}
