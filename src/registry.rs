//! Category registry
//!
//! Two-level map from hub device class (`type`) and subclass (`deviceType`)
//! to the updater owning that category's gauges. Several subclasses may share
//! one updater. Built once at startup and read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use crate::sink::GaugeSpec;
use crate::updater::{lighting, outlet, sensor, BaseMetrics, MetricUpdater};

/// Lookup table from (category, subcategory) to metric updater
#[derive(Default)]
pub struct CategoryRegistry {
    updaters: HashMap<String, HashMap<String, Arc<dyn MetricUpdater>>>,
}

impl CategoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry covering every device category the hub is known to report
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let motion: Arc<dyn MetricUpdater> = Arc::new(sensor::MOTION_SENSOR);
        let controller: Arc<dyn MetricUpdater> = Arc::new(lighting::LIGHT_CONTROLLER);

        registry.register("sensor", "openCloseSensor", Arc::new(sensor::OPEN_CLOSE_SENSOR));
        registry.register("sensor", "environmentSensor", Arc::new(sensor::ENVIRONMENT_SENSOR));
        registry.register("sensor", "motionSensor", Arc::clone(&motion));
        registry.register("sensor", "occupancySensor", motion);
        registry.register("sensor", "waterSensor", Arc::new(sensor::WATER_SENSOR));
        registry.register("outlet", "outlet", Arc::new(outlet::OUTLET));
        registry.register("controller", "lightController", Arc::clone(&controller));
        registry.register("controller", "shortcutController", controller);
        registry.register("light", "light", Arc::new(lighting::LIGHT));
        registry.register("blinds", "blinds", Arc::new(lighting::BLINDS));

        registry
    }

    /// Register (or replace) the updater for a category pair
    pub fn register(
        &mut self,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        updater: Arc<dyn MetricUpdater>,
    ) {
        self.updaters
            .entry(category.into())
            .or_default()
            .insert(subcategory.into(), updater);
    }

    /// Updater for a category pair, if registered
    pub fn lookup(&self, category: &str, subcategory: &str) -> Option<&Arc<dyn MetricUpdater>> {
        self.updaters.get(category)?.get(subcategory)
    }

    /// Number of registered category pairs
    pub fn len(&self) -> usize {
        self.updaters.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every gauge that dispatch may write: base gauges first, then each
    /// registered updater's, without duplicates.
    pub fn gauge_specs(&self) -> Vec<GaugeSpec> {
        let mut specs = BaseMetrics.gauges();

        let mut categories: Vec<_> = self.updaters.iter().collect();
        categories.sort_by(|a, b| a.0.cmp(b.0));
        for (_, subcategories) in categories {
            let mut entries: Vec<_> = subcategories.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (_, updater) in entries {
                for spec in updater.gauges() {
                    if !specs.contains(&spec) {
                        specs.push(spec);
                    }
                }
            }
        }

        specs
    }
}

impl std::fmt::Debug for CategoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryRegistry")
            .field("categories", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_lookups() {
        let registry = CategoryRegistry::with_defaults();

        assert_eq!(
            registry.lookup("outlet", "outlet").map(|u| u.name()),
            Some("outlet")
        );
        assert_eq!(
            registry
                .lookup("sensor", "environmentSensor")
                .map(|u| u.name()),
            Some("environmentSensor")
        );
        assert!(registry.lookup("sensor", "airPurifier").is_none());
        assert!(registry.lookup("speaker", "speaker").is_none());
        assert!(registry.lookup("gateway", "gateway").is_none());
    }

    #[test]
    fn test_subcategories_share_updater() {
        let registry = CategoryRegistry::with_defaults();
        let motion = registry.lookup("sensor", "motionSensor").unwrap();
        let occupancy = registry.lookup("sensor", "occupancySensor").unwrap();
        assert!(Arc::ptr_eq(motion, occupancy));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = CategoryRegistry::new();
        assert!(registry.is_empty());

        registry.register("light", "light", Arc::new(lighting::LIGHT));
        registry.register("light", "light", Arc::new(lighting::BLINDS));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("light", "light").unwrap().name(), "blinds");
    }

    #[test]
    fn test_gauge_specs_are_unique() {
        let registry = CategoryRegistry::with_defaults();
        let specs = registry.gauge_specs();
        let names: HashSet<_> = specs.iter().map(|s| s.full_name("ikea")).collect();

        assert_eq!(names.len(), specs.len());
        assert_eq!(specs[0].full_name("ikea"), "ikea_device_reachable");
        assert!(names.contains("ikea_outlet_current_active_power"));
        assert!(names.contains("ikea_motion_sensor_current_state"));
    }
}
