//! Dispatch engine
//!
//! Routes every device snapshot, from the startup listing or from an event,
//! to the base updater and to its category updater with a complete label set.
//! Failures are per device: they are logged and counted, never propagated.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::cache::MetadataCache;
use crate::device::{DeviceSnapshot, HubEvent};
use crate::error::MetricsError;
use crate::hub::Hub;
use crate::identity::normalize;
use crate::labels::{HubIdentity, LabelSet};
use crate::registry::CategoryRegistry;
use crate::sink::MetricSink;
use crate::updater::{BaseMetrics, MetricUpdater};

/// What happened to one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Base and category gauges were updated
    Updated,
    /// The hub itself; never exported per device
    SkippedGateway,
    /// Metadata could not be resolved; nothing was written
    Unresolved(MetricsError),
    /// No updater registered for the category pair
    UnknownCategory,
}

/// Running counters, shared with the exposition side
#[derive(Debug, Default)]
pub struct DispatchStats {
    snapshots: AtomicU64,
    updated: AtomicU64,
    gateway_skipped: AtomicU64,
    unresolved: AtomicU64,
    unknown_category: AtomicU64,
    hub_errors: AtomicU64,
    cache_entries: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, outcome: &DispatchOutcome) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            DispatchOutcome::Updated => &self.updated,
            DispatchOutcome::SkippedGateway => &self.gateway_skipped,
            DispatchOutcome::UnknownCategory => &self.unknown_category,
            DispatchOutcome::Unresolved(err) => {
                if matches!(err, MetricsError::HubUnavailable { .. }) {
                    self.hub_errors.fetch_add(1, Ordering::Relaxed);
                }
                &self.unresolved
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn set_cache_entries(&self, entries: usize) {
        self.cache_entries.store(entries as u64, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            snapshots: self.snapshots.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            gateway_skipped: self.gateway_skipped.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
            unknown_category: self.unknown_category.load(Ordering::Relaxed),
            hub_errors: self.hub_errors.load(Ordering::Relaxed),
            cache_entries: self.cache_entries.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`DispatchStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub snapshots: u64,
    pub updated: u64,
    pub gateway_skipped: u64,
    pub unresolved: u64,
    pub unknown_category: u64,
    pub hub_errors: u64,
    pub cache_entries: u64,
}

/// Summary of a bulk load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub devices: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Owns the metadata cache and the category registry
pub struct DispatchEngine {
    hub_identity: HubIdentity,
    cache: MetadataCache,
    registry: CategoryRegistry,
    base: BaseMetrics,
    sink: Arc<dyn MetricSink>,
    stats: Arc<DispatchStats>,
}

impl DispatchEngine {
    pub fn new(
        hub_identity: HubIdentity,
        hub: Arc<dyn Hub>,
        registry: CategoryRegistry,
        sink: Arc<dyn MetricSink>,
    ) -> Self {
        Self {
            hub_identity,
            cache: MetadataCache::new(hub),
            registry,
            base: BaseMetrics,
            sink,
            stats: Arc::new(DispatchStats::new()),
        }
    }

    /// Process one snapshot. `event` is only used as log context.
    pub fn handle(&mut self, snapshot: &DeviceSnapshot, event: Option<&HubEvent>) -> DispatchOutcome {
        let outcome = self.dispatch(snapshot, event);
        self.stats.record(&outcome);
        self.stats.set_cache_entries(self.cache.len());
        outcome
    }

    /// Process the device carried by an event
    pub fn handle_event(&mut self, event: &HubEvent) -> DispatchOutcome {
        self.handle(&event.data, Some(event))
    }

    /// Process a full device listing, one device at a time.
    pub fn load(&mut self, devices: &[DeviceSnapshot]) -> LoadSummary {
        let mut summary = LoadSummary {
            devices: devices.len(),
            ..Default::default()
        };
        for device in devices {
            match self.handle(device, None) {
                DispatchOutcome::Updated => summary.updated += 1,
                _ => summary.skipped += 1,
            }
        }
        info!(
            "Loaded {} devices: {} exported, {} skipped, {} cached",
            summary.devices,
            summary.updated,
            summary.skipped,
            self.cache.len()
        );
        summary
    }

    fn dispatch(&mut self, snapshot: &DeviceSnapshot, event: Option<&HubEvent>) -> DispatchOutcome {
        if snapshot.is_gateway() {
            return DispatchOutcome::SkippedGateway;
        }

        let metadata = match self.cache.resolve(snapshot) {
            Ok(metadata) => metadata,
            Err(err) => {
                match event {
                    Some(event) => warn!(
                        "Could not resolve labels - skipping metric update: {} (event: {})",
                        err, event
                    ),
                    None => warn!(
                        "Could not resolve labels - skipping metric update: {}",
                        err
                    ),
                }
                return DispatchOutcome::Unresolved(err);
            }
        };

        let (device_id, primary) = normalize(&snapshot.id);

        // The cached class belongs to the primary endpoint; siblings must carry their own.
        let (category, subcategory) = if primary {
            (
                non_empty(&snapshot.category).unwrap_or(&metadata.category),
                non_empty(&snapshot.subcategory).unwrap_or(&metadata.subcategory),
            )
        } else {
            (snapshot.category.as_str(), snapshot.subcategory.as_str())
        };

        let Some(updater) = self.registry.lookup(category, subcategory) else {
            let err = MetricsError::UnknownCategory {
                category: category.to_string(),
                subcategory: subcategory.to_string(),
            };
            match event {
                Some(event) => warn!("{} (event: {})", err, event),
                None => warn!("{}", err),
            }
            return DispatchOutcome::UnknownCategory;
        };

        let labels = LabelSet::new(&self.hub_identity, device_id, metadata, subcategory);

        self.base.update(snapshot, &labels, self.sink.as_ref());
        updater.update(snapshot, &labels, self.sink.as_ref());
        DispatchOutcome::Updated
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn hub_identity(&self) -> &HubIdentity {
        &self.hub_identity
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("hub_identity", &self.hub_identity)
            .field("cache", &self.cache)
            .field("registry", &self.registry)
            .finish()
    }
}
