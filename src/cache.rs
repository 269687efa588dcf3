//! Device metadata cache
//!
//! Maps a logical device identity to the descriptive metadata used for
//! labels. Entries are created on the first successful resolution and then
//! patched in place by later snapshots; nothing is ever evicted.
//!
//! Only the primary endpoint is authoritative for name and room: sibling
//! endpoints of a composite device may carry their own names, so they never
//! overwrite the cached entry. On a cold cache a sibling triggers one
//! read-through of the primary endpoint from the hub.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::device::DeviceSnapshot;
use crate::error::{MetricsError, MissingField, Result};
use crate::hub::Hub;
use crate::identity::{normalize, primary_id};

/// Attribute holding a device's user-visible name
pub const NAME_ATTRIBUTE: &str = "customName";

/// Descriptive metadata cached per logical device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMetadata {
    pub name: String,
    pub room_name: String,
    pub room_id: String,
    /// Hub device class
    pub category: String,
    /// Hub device subclass, used as the `device_type` label
    pub subcategory: String,
}

impl DeviceMetadata {
    /// Fail unless the fields used as labels are known.
    fn check(&self, logical_id: &str) -> Result<()> {
        let missing = if self.name.is_empty() {
            MissingField::Name
        } else if self.room_name.is_empty() {
            MissingField::RoomName
        } else {
            return Ok(());
        };
        Err(MetricsError::IncompleteMetadata {
            device_id: logical_id.to_string(),
            missing,
        })
    }

    /// Apply present, non-empty fields of `snapshot`. Returns whether anything changed.
    fn merge(&mut self, snapshot: &DeviceSnapshot) -> bool {
        let mut changed = false;

        if let Some(name) = snapshot.attributes.text(NAME_ATTRIBUTE) {
            changed |= replace(&mut self.name, name);
        }
        if let Some(room_name) = snapshot.room_name() {
            changed |= replace(&mut self.room_name, room_name);
        }
        if let Some(room_id) = snapshot.room_id() {
            changed |= replace(&mut self.room_id, &normalize_room_id(room_id));
        }
        if !snapshot.category.is_empty() {
            changed |= replace(&mut self.category, &snapshot.category);
        }
        if !snapshot.subcategory.is_empty() {
            changed |= replace(&mut self.subcategory, &snapshot.subcategory);
        }

        changed
    }
}

fn replace(field: &mut String, value: &str) -> bool {
    if field == value {
        return false;
    }
    field.clear();
    field.push_str(value);
    true
}

fn normalize_room_id(raw: &str) -> String {
    normalize(raw).0.to_string()
}

/// Process-scoped cache of device metadata with hub read-through
pub struct MetadataCache {
    entries: HashMap<String, DeviceMetadata>,
    hub: Arc<dyn Hub>,
}

impl MetadataCache {
    /// Create an empty cache resolving misses against `hub`
    pub fn new(hub: Arc<dyn Hub>) -> Self {
        Self {
            entries: HashMap::new(),
            hub,
        }
    }

    /// Resolve the metadata for the device `snapshot` belongs to.
    ///
    /// A hit never touches the hub. A miss on the primary endpoint reads the
    /// snapshot itself and only fetches the device when the snapshot lacks
    /// its name or room; a miss on a sibling fetches the primary endpoint.
    /// Incomplete sources are not cached so the next report retries.
    pub fn resolve(&mut self, snapshot: &DeviceSnapshot) -> Result<&DeviceMetadata> {
        let (logical_id, is_primary) = normalize(&snapshot.id);

        match self.entries.entry(logical_id.to_string()) {
            Entry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                if is_primary && entry.merge(snapshot) {
                    debug!("Updated cached metadata for {}", logical_id);
                }
                Ok(entry)
            }
            Entry::Vacant(vacant) => {
                let metadata = Self::load(self.hub.as_ref(), logical_id, is_primary, snapshot)?;
                debug!(
                    "Cached metadata for {}: {} in {}",
                    logical_id, metadata.name, metadata.room_name
                );
                Ok(vacant.insert(metadata))
            }
        }
    }

    fn load(
        hub: &dyn Hub,
        logical_id: &str,
        is_primary: bool,
        snapshot: &DeviceSnapshot,
    ) -> Result<DeviceMetadata> {
        let mut metadata = DeviceMetadata::default();

        if is_primary {
            metadata.merge(snapshot);
            if metadata.check(logical_id).is_ok() {
                return Ok(metadata);
            }
            // Partial event from a device missed at startup
            debug!("Incomplete snapshot for {}, fetching it", snapshot.id);
            let fetched = Self::fetch(hub, &snapshot.id)?;
            metadata = DeviceMetadata::default();
            metadata.merge(&fetched);
            metadata.merge(snapshot);
        } else {
            let primary = primary_id(logical_id);
            debug!("Cache miss for {}, fetching {}", snapshot.id, primary);
            let fetched = Self::fetch(hub, &primary)?;
            metadata.merge(&fetched);
            if metadata.category.is_empty() {
                metadata.category = snapshot.category.clone();
            }
            if metadata.subcategory.is_empty() {
                metadata.subcategory = snapshot.subcategory.clone();
            }
        }

        metadata.check(logical_id)?;
        Ok(metadata)
    }

    fn fetch(hub: &dyn Hub, device_id: &str) -> Result<DeviceSnapshot> {
        hub.get_device(device_id)
            .map_err(|source| MetricsError::HubUnavailable {
                device_id: device_id.to_string(),
                source,
            })
    }

    /// Cached metadata for a logical id
    pub fn get(&self, logical_id: &str) -> Option<&DeviceMetadata> {
        self.entries.get(logical_id)
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.entries.contains_key(logical_id)
    }

    /// Number of cached devices
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}
