//! Mutable per-device simulation state, owned exclusively by one
//! [`crate::device::DeviceActor`].

use std::collections::HashMap;

use crate::behavior::DeviceType;
use crate::characteristics::characteristics_for;

/// Mutable state for a single simulated device.
///
/// Every `f64` field documented as `∈ [0,1]` in spec.md is clamped to
/// that range by its setter; callers constructing a `DeviceState`
/// directly (e.g. in tests) are responsible for starting within range.
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub device_id: String,
    pub port: u16,
    pub device_type: DeviceType,
    pub uptime_seconds: u64,
    pub interface_utilization: f64,
    pub cpu_utilization: f64,
    pub signal_quality: f64,
    pub temperature_celsius: f64,
    pub health_score: f64,
    pub error_rate: f64,
    pub utilization_bias: f64,
    pub last_activity_monotonic_ns: u64,
    pub counter_accumulators: HashMap<String, u64>,
}

impl DeviceState {
    /// A freshly-created device, just past boot. Seeded from the
    /// device type's [`crate::characteristics::DeviceCharacteristics`]
    /// (C2) rather than one fixed baseline for every type: a device
    /// with many interfaces starts with lower per-interface
    /// utilization, and signal quality only means anything for types
    /// that monitor it.
    pub fn new(device_id: impl Into<String>, port: u16, device_type: DeviceType) -> Self {
        let characteristics = characteristics_for(device_type);
        let interface_utilization =
            (4.0 / characteristics.typical_interfaces.max(1) as f64 * 0.3).clamp(0.05, 0.3);
        let signal_quality = if characteristics.signal_monitoring {
            0.9
        } else {
            1.0
        };

        Self {
            device_id: device_id.into(),
            port,
            device_type,
            uptime_seconds: 0,
            interface_utilization,
            cpu_utilization: 0.2,
            signal_quality,
            temperature_celsius: 35.0,
            health_score: 0.95,
            error_rate: 0.0,
            utilization_bias: 1.0,
            last_activity_monotonic_ns: 0,
            counter_accumulators: HashMap::new(),
        }
    }

    /// Get (and lazily initialize) the 64-bit accumulator backing the
    /// Counter32 wrap for `oid`. Keeping cumulative growth here, rather
    /// than re-deriving a counter from uptime on every call, prevents
    /// backward jumps under clock skew (design notes).
    pub fn accumulator(&mut self, oid: &str, base: u64) -> &mut u64 {
        self.counter_accumulators
            .entry(oid.to_string())
            .or_insert(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_sane_defaults() {
        let state = DeviceState::new("dev-1", 30000, DeviceType::CableModem);
        assert_eq!(state.uptime_seconds, 0);
        assert!(state.interface_utilization >= 0.0 && state.interface_utilization <= 1.0);
        assert!(state.counter_accumulators.is_empty());
    }

    #[test]
    fn accumulator_initializes_once() {
        let mut state = DeviceState::new("dev-1", 30000, DeviceType::CableModem);
        *state.accumulator("1.3.6.1", 100) += 50;
        assert_eq!(*state.accumulator("1.3.6.1", 999), 150);
    }

    #[test]
    fn seeding_differs_by_device_type_characteristics() {
        let modem = DeviceState::new("dev-1", 30000, DeviceType::CableModem);
        let switch = DeviceState::new("dev-2", 30001, DeviceType::Switch);

        // Switch has far more interfaces than a cable modem, so its
        // starting per-interface utilization should be lower.
        assert!(switch.interface_utilization < modem.interface_utilization);

        // Only signal-monitoring device types get a sub-1.0 starting
        // signal quality; a switch doesn't monitor signal at all.
        assert_eq!(switch.signal_quality, 1.0);
        assert!(modem.signal_quality < 1.0);
    }
}
