//! Metric sink capability
//!
//! The exposition side (registry, text format, pull endpoint) lives behind
//! [`MetricSink`]. Updaters describe their gauges with [`GaugeSpec`] so a
//! sink can register every series before the first sample arrives.

use serde::Serialize;

use crate::labels::LabelSet;

/// Static description of one gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GaugeSpec {
    /// Middle part of the metric name, e.g. `outlet`
    pub subsystem: &'static str,
    /// Last part of the metric name, e.g. `current_voltage`
    pub name: &'static str,
    pub help: &'static str,
}

impl GaugeSpec {
    pub const fn new(subsystem: &'static str, name: &'static str, help: &'static str) -> Self {
        Self {
            subsystem,
            name,
            help,
        }
    }

    /// `<namespace>_<subsystem>_<name>`
    pub fn full_name(&self, namespace: &str) -> String {
        if namespace.is_empty() {
            format!("{}_{}", self.subsystem, self.name)
        } else {
            format!("{}_{}_{}", namespace, self.subsystem, self.name)
        }
    }
}

/// Destination of gauge samples.
///
/// Set semantics: the last write per label combination wins. Implementations
/// must be safe to call from any thread.
pub trait MetricSink: Send + Sync {
    fn set(&self, gauge: &GaugeSpec, labels: &LabelSet, value: f64);
}
