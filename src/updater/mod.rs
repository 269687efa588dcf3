//! Per-category metric updaters
//!
//! Each device category owns a fixed set of gauges fed from its attribute
//! map. A gauge is only written when its attribute is present with the
//! expected type: partial events leave every other reading standing.

pub mod base;
pub mod lighting;
pub mod outlet;
pub mod sensor;

pub use base::BaseMetrics;

use crate::device::{Attributes, DeviceSnapshot};
use crate::labels::LabelSet;
use crate::sink::{GaugeSpec, MetricSink};

/// Updates the gauges of one device category
pub trait MetricUpdater: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Every gauge this updater may write
    fn gauges(&self) -> Vec<GaugeSpec>;

    /// Write the gauges whose source attributes are present on `device`
    fn update(&self, device: &DeviceSnapshot, labels: &LabelSet, sink: &dyn MetricSink);
}

/// Expected scalar type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Exposed as 0 / 1
    Bool,
    Number,
}

/// Binding of a gauge to the attribute feeding it
#[derive(Debug, Clone, Copy)]
pub struct AttributeGauge {
    pub attribute: &'static str,
    pub kind: ValueKind,
    pub gauge: GaugeSpec,
}

impl AttributeGauge {
    pub const fn flag(attribute: &'static str, gauge: GaugeSpec) -> Self {
        Self {
            attribute,
            kind: ValueKind::Bool,
            gauge,
        }
    }

    pub const fn number(attribute: &'static str, gauge: GaugeSpec) -> Self {
        Self {
            attribute,
            kind: ValueKind::Number,
            gauge,
        }
    }

    /// Gauge value, if the attribute is present with the expected type
    pub fn read(&self, attributes: &Attributes) -> Option<f64> {
        match self.kind {
            ValueKind::Bool => attributes.bool(self.attribute).map(bool_value),
            ValueKind::Number => attributes.number(self.attribute),
        }
    }
}

/// 1.0 for `true`, 0.0 for `false`
pub fn bool_value(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Table-driven updater for one category
#[derive(Debug, Clone, Copy)]
pub struct CategoryMetrics {
    name: &'static str,
    gauges: &'static [AttributeGauge],
}

impl CategoryMetrics {
    pub const fn new(name: &'static str, gauges: &'static [AttributeGauge]) -> Self {
        Self { name, gauges }
    }
}

impl MetricUpdater for CategoryMetrics {
    fn name(&self) -> &'static str {
        self.name
    }

    fn gauges(&self) -> Vec<GaugeSpec> {
        self.gauges.iter().map(|g| g.gauge).collect()
    }

    fn update(&self, device: &DeviceSnapshot, labels: &LabelSet, sink: &dyn MetricSink) {
        for binding in self.gauges {
            if let Some(value) = binding.read(&device.attributes) {
                sink.set(&binding.gauge, labels, value);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Sink remembering the last value per (metric, labels)
    #[derive(Default)]
    pub struct RecordingSink {
        pub values: Mutex<HashMap<(String, LabelSet), f64>>,
    }

    impl RecordingSink {
        pub fn get(&self, metric: &str, labels: &LabelSet) -> Option<f64> {
            self.values
                .lock()
                .unwrap()
                .get(&(metric.to_string(), labels.clone()))
                .copied()
        }

        pub fn len(&self) -> usize {
            self.values.lock().unwrap().len()
        }
    }

    impl MetricSink for RecordingSink {
        fn set(&self, gauge: &GaugeSpec, labels: &LabelSet, value: f64) {
            self.values
                .lock()
                .unwrap()
                .insert((gauge.full_name(""), labels.clone()), value);
        }
    }

    pub fn labels() -> LabelSet {
        LabelSet {
            hub_id: "hub".to_string(),
            hub_name: "Home".to_string(),
            room_id: "room-1".to_string(),
            room_name: "Office".to_string(),
            device_id: "abc".to_string(),
            device_name: "Device".to_string(),
            device_category: "test".to_string(),
        }
    }
}
