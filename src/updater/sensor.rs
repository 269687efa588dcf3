//! Sensor categories

use crate::sink::GaugeSpec;

use super::{AttributeGauge, CategoryMetrics};

const OPEN_CLOSE_GAUGES: &[AttributeGauge] = &[AttributeGauge::flag(
    "isOpen",
    GaugeSpec::new(
        "open_close_sensor",
        "current_state",
        "Current status of an open-close sensor (0 = closed, 1 = open)",
    ),
)];

const ENVIRONMENT_GAUGES: &[AttributeGauge] = &[
    AttributeGauge::number(
        "currentTemperature",
        GaugeSpec::new(
            "environment_sensor",
            "current_temperature",
            "Current temperature measured by an environment sensor (degree celsius)",
        ),
    ),
    AttributeGauge::number(
        "currentRH",
        GaugeSpec::new(
            "environment_sensor",
            "current_humidity",
            "Current relative humidity measured by an environment sensor (percent)",
        ),
    ),
    AttributeGauge::number(
        "currentPM25",
        GaugeSpec::new(
            "environment_sensor",
            "current_pm25",
            "Current PM2.5 concentration measured by an environment sensor (micrograms per cubic meter)",
        ),
    ),
    AttributeGauge::number(
        "vocIndex",
        GaugeSpec::new(
            "environment_sensor",
            "current_voc_index",
            "Current volatile organic compound index measured by an environment sensor",
        ),
    ),
];

const MOTION_GAUGES: &[AttributeGauge] = &[
    AttributeGauge::flag(
        "isDetected",
        GaugeSpec::new(
            "motion_sensor",
            "current_state",
            "Current detection state of a motion sensor (0 = clear, 1 = detected)",
        ),
    ),
    AttributeGauge::number(
        "illuminance",
        GaugeSpec::new(
            "motion_sensor",
            "current_illuminance",
            "Current illuminance measured by a motion sensor (lux)",
        ),
    ),
];

const WATER_GAUGES: &[AttributeGauge] = &[AttributeGauge::flag(
    "waterLeakDetected",
    GaugeSpec::new(
        "water_sensor",
        "current_state",
        "Current status of a water leakage sensor (0 = dry, 1 = leak detected)",
    ),
)];

pub const OPEN_CLOSE_SENSOR: CategoryMetrics =
    CategoryMetrics::new("openCloseSensor", OPEN_CLOSE_GAUGES);

pub const ENVIRONMENT_SENSOR: CategoryMetrics =
    CategoryMetrics::new("environmentSensor", ENVIRONMENT_GAUGES);

/// Shared by motion and occupancy sensors
pub const MOTION_SENSOR: CategoryMetrics = CategoryMetrics::new("motionSensor", MOTION_GAUGES);

pub const WATER_SENSOR: CategoryMetrics = CategoryMetrics::new("waterSensor", WATER_GAUGES);
