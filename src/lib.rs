//! # dirigera-metrics
//!
//! Device identity cache and metric dispatch engine for IKEA DIRIGERA hubs.
//!
//! Every device snapshot the hub reports, from the startup listing or from a
//! state-change event, is resolved to a stable label set and routed to the
//! updater registered for its category. Updaters turn attributes into gauge
//! values written to a [`MetricSink`].
//!
//! ## Key Features
//!
//! - **Identity normalization**: `abc_1`, `abc_2` and `abc` are one device
//! - **Read-through metadata cache**: sibling endpoints borrow the names of
//!   their primary endpoint, fetched from the hub at most once
//! - **Fixed label dimensions**: every sample carries the same seven labels
//! - **Table-driven updaters**: one attribute-to-gauge table per category
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dirigera_metrics::{
//!     CategoryRegistry, DeviceSnapshot, DispatchEngine, DispatchOutcome, GaugeSpec, Hub,
//!     HubError, HubIdentity, LabelSet, MetricSink,
//! };
//! use dirigera_metrics::hub::EventHandler;
//!
//! struct NoHub;
//!
//! impl Hub for NoHub {
//!     fn get_status(&self) -> Result<DeviceSnapshot, HubError> { Err(HubError::EventLoopStopped) }
//!     fn list_devices(&self) -> Result<Vec<DeviceSnapshot>, HubError> { Ok(Vec::new()) }
//!     fn get_device(&self, id: &str) -> Result<DeviceSnapshot, HubError> {
//!         Err(HubError::NotFound(id.to_string()))
//!     }
//!     fn register_event_handler(&self, _handler: EventHandler, _event_type: &str) {}
//!     fn start_event_loop(&self) -> Result<(), HubError> { Ok(()) }
//!     fn stop_event_loop(&self) -> Result<(), HubError> { Ok(()) }
//!     fn event_loop_health(&self) -> Result<(), HubError> { Ok(()) }
//! }
//!
//! struct PrintSink;
//!
//! impl MetricSink for PrintSink {
//!     fn set(&self, gauge: &GaugeSpec, labels: &LabelSet, value: f64) {
//!         println!("{}{{device_name={:?}}} {}", gauge.full_name("ikea"), labels.device_name, value);
//!     }
//! }
//!
//! let mut engine = DispatchEngine::new(
//!     HubIdentity::new("hub", "Home"),
//!     Arc::new(NoHub),
//!     CategoryRegistry::with_defaults(),
//!     Arc::new(PrintSink),
//! );
//!
//! let lamp = DeviceSnapshot::new("lamp_1", "light", "light")
//!     .with_attribute("customName", "Desk lamp")
//!     .with_room("room-1", "Office")
//!     .with_attribute("isOn", true);
//!
//! assert_eq!(engine.handle(&lamp, None), DispatchOutcome::Updated);
//! ```
//!
//! ## Modules
//!
//! - [`identity`]: Raw id to logical id normalization
//! - [`device`]: Device snapshots and hub events
//! - [`cache`]: Per-device metadata cache
//! - [`updater`]: Base and per-category metric updaters
//! - [`registry`]: Category to updater lookup
//! - [`dispatch`]: Snapshot routing
//! - [`collector`]: Startup sequence and event pipeline

// Modules
pub mod cache;
pub mod collector;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod hub;
pub mod identity;
pub mod labels;
pub mod registry;
pub mod sink;
pub mod updater;

// Re-exports for convenient access
pub use cache::{DeviceMetadata, MetadataCache};
pub use collector::{Collector, CollectorHandle, EVENT_LOOP_COMPONENT};
pub use config::CollectorConfig;
pub use device::{AttributeValue, Attributes, DeviceSnapshot, HubEvent, Room};
pub use dispatch::{DispatchEngine, DispatchOutcome, DispatchStats, LoadSummary, StatsSnapshot};
pub use error::{HubError, MetricsError, MissingField, Result};
pub use health::{HealthCheck, HealthReport, HealthStatus};
pub use hub::{Hub, DEVICE_STATE_CHANGED};
pub use identity::normalize;
pub use labels::{HubIdentity, LabelSet, LABEL_NAMES};
pub use registry::CategoryRegistry;
pub use sink::{GaugeSpec, MetricSink};
pub use updater::{AttributeGauge, BaseMetrics, CategoryMetrics, MetricUpdater, ValueKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_label_names_match_values() {
        assert_eq!(LABEL_NAMES.len(), 7);
        assert!(LABEL_NAMES.contains(&"device_type"));
    }
}
