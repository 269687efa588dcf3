//! Lights, light controllers and blinds

use crate::sink::GaugeSpec;

use super::{AttributeGauge, CategoryMetrics};

const LIGHT_GAUGES: &[AttributeGauge] = &[
    AttributeGauge::flag(
        "isOn",
        GaugeSpec::new(
            "light",
            "current_state",
            "Current switch state of a light (0 = off, 1 = on)",
        ),
    ),
    AttributeGauge::number(
        "lightLevel",
        GaugeSpec::new("light", "current_level", "Current brightness of a light (percent)"),
    ),
    AttributeGauge::number(
        "colorHue",
        GaugeSpec::new(
            "light",
            "current_color_hue",
            "Current color hue of a light (degrees 0 - 360)",
        ),
    ),
    AttributeGauge::number(
        "colorSaturation",
        GaugeSpec::new(
            "light",
            "current_color_saturation",
            "Current color saturation of a light (0 - 1, 0 = white mode, >0 = color mode)",
        ),
    ),
    AttributeGauge::number(
        "colorTemperature",
        GaugeSpec::new(
            "light",
            "current_color_temperature_kelvin",
            "Current color temperature of a light in kelvin (used only when in white mode)",
        ),
    ),
];

const BLINDS_GAUGES: &[AttributeGauge] = &[
    AttributeGauge::number(
        "blindsCurrentLevel",
        GaugeSpec::new(
            "blinds",
            "current_level",
            "Current level of a blind (percent, 100 = fully closed)",
        ),
    ),
    AttributeGauge::number(
        "blindsTargetLevel",
        GaugeSpec::new(
            "blinds",
            "target_level",
            "Level a blind is moving to (percent, 100 = fully closed)",
        ),
    ),
];

pub const LIGHT: CategoryMetrics = CategoryMetrics::new("light", LIGHT_GAUGES);

/// Remotes and shortcut buttons: base metrics (battery) only
pub const LIGHT_CONTROLLER: CategoryMetrics = CategoryMetrics::new("lightController", &[]);

pub const BLINDS: CategoryMetrics = CategoryMetrics::new("blinds", BLINDS_GAUGES);
