// DIRIGERA Exporter - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for DIRIGERA devices.
//!
//! Device gauges live in a dedicated registry owned by [`PrometheusSink`],
//! one `GaugeVec` per gauge of the category catalogue. Exporter self-metrics
//! live in the default registry and are refreshed on scrape.

use std::collections::HashMap;

use dirigera_metrics::{GaugeSpec, LabelSet, MetricSink, StatsSnapshot, LABEL_NAMES};
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_gauge, Encoder, GaugeVec, IntCounter, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::warn;

lazy_static! {
    /// Snapshots handled since startup, bulk load included.
    pub static ref SNAPSHOTS_TOTAL: IntCounter = register_int_counter!(
        "dirigera_exporter_snapshots_total",
        "Device snapshots handled by the dispatch engine"
    ).unwrap();

    /// Snapshots that produced metric updates.
    pub static ref UPDATES_TOTAL: IntCounter = register_int_counter!(
        "dirigera_exporter_updates_total",
        "Device snapshots that updated metrics"
    ).unwrap();

    /// Snapshots skipped because metadata could not be resolved.
    pub static ref UNRESOLVED_TOTAL: IntCounter = register_int_counter!(
        "dirigera_exporter_unresolved_total",
        "Device snapshots skipped for unresolved metadata"
    ).unwrap();

    /// Snapshots skipped because no updater matches their category.
    pub static ref UNKNOWN_CATEGORY_TOTAL: IntCounter = register_int_counter!(
        "dirigera_exporter_unknown_category_total",
        "Device snapshots skipped for an unregistered category"
    ).unwrap();

    /// Hub requests that failed during metadata read-through.
    pub static ref HUB_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "dirigera_exporter_hub_errors_total",
        "Failed hub requests during metadata resolution"
    ).unwrap();

    /// Entries in the metadata cache.
    pub static ref CACHE_ENTRIES: IntGauge = register_int_gauge!(
        "dirigera_exporter_cache_entries",
        "Devices held in the metadata cache"
    ).unwrap();

    /// 1 while the hub event loop delivers events.
    pub static ref EVENT_LOOP_UP: IntGauge = register_int_gauge!(
        "dirigera_exporter_event_loop_up",
        "Hub event loop state (1=running, 0=stopped)"
    ).unwrap();
}

/// Refresh self-metrics from dispatch counters.
pub fn update_dispatch_metrics(stats: &StatsSnapshot, event_loop_up: bool) {
    advance(&SNAPSHOTS_TOTAL, stats.snapshots);
    advance(&UPDATES_TOTAL, stats.updated);
    advance(&UNRESOLVED_TOTAL, stats.unresolved);
    advance(&UNKNOWN_CATEGORY_TOTAL, stats.unknown_category);
    advance(&HUB_ERRORS_TOTAL, stats.hub_errors);
    CACHE_ENTRIES.set(stats.cache_entries as i64);
    EVENT_LOOP_UP.set(i64::from(event_loop_up));
}

/// Move a counter up to `total`; it never goes down.
fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

/// Metric sink backed by a Prometheus registry.
pub struct PrometheusSink {
    registry: Registry,
    gauges: HashMap<GaugeSpec, GaugeVec>,
}

impl PrometheusSink {
    /// Register one gauge vector per `GaugeSpec`, named `<namespace>_<subsystem>_<name>`.
    pub fn new(namespace: &str, specs: &[GaugeSpec]) -> prometheus::Result<Self> {
        let registry = Registry::new();
        let mut gauges = HashMap::with_capacity(specs.len());

        for spec in specs {
            let gauge = GaugeVec::new(Opts::new(spec.full_name(namespace), spec.help), &LABEL_NAMES)?;
            registry.register(Box::new(gauge.clone()))?;
            gauges.insert(*spec, gauge);
        }

        Ok(Self { registry, gauges })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of registered gauge vectors
    pub fn gauge_count(&self) -> usize {
        self.gauges.len()
    }
}

impl MetricSink for PrometheusSink {
    fn set(&self, gauge: &GaugeSpec, labels: &LabelSet, value: f64) {
        match self.gauges.get(gauge) {
            Some(vec) => vec.with_label_values(&labels.values()).set(value),
            None => warn!(
                "Dropping sample for unregistered gauge {}_{}",
                gauge.subsystem, gauge.name
            ),
        }
    }
}

/// Encode device gauges and self-metrics to Prometheus text format.
pub fn encode_metrics(sink: &PrometheusSink) -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let mut metric_families = sink.registry().gather();
    metric_families.extend(prometheus::gather());

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
