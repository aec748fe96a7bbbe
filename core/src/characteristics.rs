//! C2: Device Characteristics — immutable per-type metadata.

use crate::behavior::DeviceType;

/// Immutable per-type metadata used to seed newly-materialized devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCharacteristics {
    pub typical_interfaces: u32,
    pub signal_monitoring: bool,
    pub expected_uptime_days: u32,
}

/// Pure lookup of a device type's static characteristics.
pub fn characteristics_for(device_type: DeviceType) -> DeviceCharacteristics {
    match device_type {
        DeviceType::CableModem => DeviceCharacteristics {
            typical_interfaces: 2,
            signal_monitoring: true,
            expected_uptime_days: 45,
        },
        DeviceType::Mta => DeviceCharacteristics {
            typical_interfaces: 2,
            signal_monitoring: false,
            expected_uptime_days: 30,
        },
        DeviceType::Cmts => DeviceCharacteristics {
            typical_interfaces: 64,
            signal_monitoring: true,
            expected_uptime_days: 365,
        },
        DeviceType::Switch => DeviceCharacteristics {
            typical_interfaces: 48,
            signal_monitoring: false,
            expected_uptime_days: 180,
        },
        DeviceType::Router => DeviceCharacteristics {
            typical_interfaces: 16,
            signal_monitoring: false,
            expected_uptime_days: 200,
        },
        DeviceType::Server => DeviceCharacteristics {
            typical_interfaces: 4,
            signal_monitoring: false,
            expected_uptime_days: 90,
        },
    }
}
