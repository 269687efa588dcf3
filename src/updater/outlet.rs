//! Smart plugs

use crate::sink::GaugeSpec;

use super::{AttributeGauge, CategoryMetrics};

const OUTLET_GAUGES: &[AttributeGauge] = &[
    AttributeGauge::flag(
        "isOn",
        GaugeSpec::new(
            "outlet",
            "current_state",
            "Current switch state of an outlet (0 = off, 1 = on)",
        ),
    ),
    AttributeGauge::number(
        "currentVoltage",
        GaugeSpec::new(
            "outlet",
            "current_voltage",
            "Voltage currently applied to an outlet (volts)",
        ),
    ),
    AttributeGauge::number(
        "currentAmps",
        GaugeSpec::new(
            "outlet",
            "current_amps",
            "Amps currently consumed by an outlet - consumers and outlet itself (amps)",
        ),
    ),
    AttributeGauge::number(
        "currentActivePower",
        GaugeSpec::new(
            "outlet",
            "current_active_power",
            "Power currently consumed at an outlet - consumers only (watts)",
        ),
    ),
    AttributeGauge::number(
        "totalEnergyConsumed",
        GaugeSpec::new(
            "outlet",
            "total_energy_consumed",
            "Energy consumed at an outlet since it was last reset (kilowatt hours)",
        ),
    ),
];

pub const OUTLET: CategoryMetrics = CategoryMetrics::new("outlet", OUTLET_GAUGES);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceSnapshot;
    use crate::updater::testing::{labels, RecordingSink};
    use crate::updater::MetricUpdater;

    #[test]
    fn test_outlet_full_reading() {
        let sink = RecordingSink::default();
        let device = DeviceSnapshot::new("o_1", "outlet", "outlet")
            .with_attribute("isOn", true)
            .with_attribute("currentVoltage", 230.1)
            .with_attribute("currentAmps", 0.2)
            .with_attribute("currentActivePower", 42.0)
            .with_attribute("totalEnergyConsumed", 12.5);

        OUTLET.update(&device, &labels(), &sink);

        assert_eq!(sink.len(), 5);
        assert_eq!(sink.get("outlet_current_state", &labels()), Some(1.0));
        assert_eq!(sink.get("outlet_current_active_power", &labels()), Some(42.0));
    }

    #[test]
    fn test_outlet_switch_event_leaves_power_alone() {
        let sink = RecordingSink::default();
        let full = DeviceSnapshot::new("o_1", "outlet", "outlet")
            .with_attribute("isOn", true)
            .with_attribute("currentActivePower", 42.0);
        OUTLET.update(&full, &labels(), &sink);

        let event = DeviceSnapshot::new("o_1", "outlet", "outlet").with_attribute("isOn", false);
        OUTLET.update(&event, &labels(), &sink);

        assert_eq!(sink.get("outlet_current_state", &labels()), Some(0.0));
        assert_eq!(sink.get("outlet_current_active_power", &labels()), Some(42.0));
    }
}
