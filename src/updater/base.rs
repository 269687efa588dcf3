//! Metrics shared by every non-gateway device

use crate::device::DeviceSnapshot;
use crate::labels::LabelSet;
use crate::sink::{GaugeSpec, MetricSink};

use super::{bool_value, MetricUpdater};

pub const REACHABLE: GaugeSpec = GaugeSpec::new(
    "device",
    "reachable",
    "Reachability of a device (0 = unreachable, 1 = reachable)",
);

pub const LAST_SEEN: GaugeSpec = GaugeSpec::new(
    "device",
    "last_seen_timestamp",
    "Last time the device was seen (Unix timestamp in seconds)",
);

pub const BATTERY_LEVEL: GaugeSpec = GaugeSpec::new(
    "device",
    "current_battery_level",
    "Current battery level of a device (percent)",
);

/// Attribute carrying the battery level of battery-powered devices
pub const BATTERY_ATTRIBUTE: &str = "batteryPercentage";

/// Reachability, last-seen and battery level
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseMetrics;

impl MetricUpdater for BaseMetrics {
    fn name(&self) -> &'static str {
        "base"
    }

    fn gauges(&self) -> Vec<GaugeSpec> {
        vec![REACHABLE, LAST_SEEN, BATTERY_LEVEL]
    }

    fn update(&self, device: &DeviceSnapshot, labels: &LabelSet, sink: &dyn MetricSink) {
        if let Some(reachable) = device.is_reachable {
            sink.set(&REACHABLE, labels, bool_value(reachable));
        }
        if let Some(last_seen) = device.last_seen {
            sink.set(&LAST_SEEN, labels, last_seen.timestamp() as f64);
        }
        if let Some(battery) = device.attributes.number(BATTERY_ATTRIBUTE) {
            sink.set(&BATTERY_LEVEL, labels, battery);
        }
    }
}
