//! Data model: device types, profile data, behavior descriptors, and the
//! typed SNMP value the simulator produces.

use serde::{Deserialize, Serialize};

/// Closed set of simulated device kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    CableModem,
    Mta,
    Cmts,
    Switch,
    Router,
    Server,
}

impl DeviceType {
    /// All device types, in the fixed ordering used by port assignment.
    pub const ALL: [DeviceType; 6] = [
        DeviceType::CableModem,
        DeviceType::Mta,
        DeviceType::Cmts,
        DeviceType::Switch,
        DeviceType::Router,
        DeviceType::Server,
    ];
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeviceType::CableModem => "cable_modem",
            DeviceType::Mta => "mta",
            DeviceType::Cmts => "cmts",
            DeviceType::Switch => "switch",
            DeviceType::Router => "router",
            DeviceType::Server => "server",
        };
        write!(f, "{s}")
    }
}

/// SNMP base type carried by a [`ProfileDatum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnmpType {
    Integer,
    String,
    Counter32,
    Gauge32,
    Timeticks,
}

/// The static value a profile declares for an OID, before simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Integer(i64),
    Bytes(Vec<u8>),
}

impl ProfileValue {
    pub fn as_integer(&self) -> i64 {
        match self {
            ProfileValue::Integer(v) => *v,
            ProfileValue::Bytes(b) => b.len() as i64,
        }
    }
}

/// A static profile value for one OID: its declared SNMP type and raw
/// baseline value, loaded from a device profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDatum {
    #[serde(rename = "type")]
    pub snmp_type: SnmpType,
    pub value: ProfileValue,
}

impl ProfileDatum {
    pub fn new(snmp_type: SnmpType, value: ProfileValue) -> Self {
        Self { snmp_type, value }
    }

    pub fn integer(snmp_type: SnmpType, value: i64) -> Self {
        Self::new(snmp_type, ProfileValue::Integer(value))
    }
}

/// Variation pattern for [`BehaviorDescriptor::UtilizationGauge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationPattern {
    /// Sinusoidal daily variation peaking during `peak_hours`.
    Daily,
    /// No time-of-day component, just bias and noise.
    Flat,
}

/// Tagged variant describing how one OID's value evolves over time.
///
/// The set is closed and small, per design notes; modeled as a sum type
/// with dedicated parameter records rather than a dynamic map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorDescriptor {
    TrafficCounter {
        rate_range: (f64, f64),
        #[serde(default)]
        time_of_day_variation: bool,
        #[serde(default)]
        burst_probability: f64,
    },
    UtilizationGauge {
        range: (i32, i32),
        #[serde(default)]
        pattern: UtilizationPattern,
        #[serde(default = "default_peak_hours")]
        peak_hours: (u8, u8),
    },
    SnrGauge {
        range: (i32, i32),
        degradation_factor: f64,
    },
    PowerGauge {
        range: (i32, i32),
        #[serde(default)]
        weather_correlation: bool,
    },
    ErrorCounter {
        rate_range: (f64, f64),
        #[serde(default)]
        error_burst_probability: f64,
        #[serde(default)]
        correlation_with_utilization: bool,
    },
    UptimeCounter {
        increment_rate: f64,
        #[serde(default)]
        reset_probability: f64,
    },
    StatusEnum,
    TemperatureGauge {
        range: (f64, f64),
        #[serde(default)]
        load_correlation: bool,
    },
    StaticValue,
}

impl Default for UtilizationPattern {
    fn default() -> Self {
        UtilizationPattern::Daily
    }
}

fn default_peak_hours() -> (u8, u8) {
    (9, 17)
}

/// The typed SNMP value a simulated device answers a query with.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Counter32(u32),
    Gauge32(i32),
    Timeticks(u32),
    Integer(i64),
    String(Vec<u8>),
    Opaque(Vec<u8>),
}

impl TypedValue {
    /// Convert a [`ProfileDatum`] to its typed form with no simulation
    /// applied — the identity mapping used by
    /// [`BehaviorDescriptor::StaticValue`].
    pub fn from_profile(profile: &ProfileDatum) -> Self {
        match profile.snmp_type {
            SnmpType::Integer => TypedValue::Integer(profile.value.as_integer()),
            SnmpType::String => match &profile.value {
                ProfileValue::Bytes(b) => TypedValue::String(b.clone()),
                ProfileValue::Integer(i) => TypedValue::String(i.to_string().into_bytes()),
            },
            SnmpType::Counter32 => TypedValue::Counter32(profile.value.as_integer() as u32),
            SnmpType::Gauge32 => TypedValue::Gauge32(profile.value.as_integer() as i32),
            SnmpType::Timeticks => TypedValue::Timeticks(profile.value.as_integer() as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_display() {
        assert_eq!(DeviceType::CableModem.to_string(), "cable_modem");
        assert_eq!(DeviceType::Cmts.to_string(), "cmts");
    }

    #[test]
    fn static_value_round_trip_integer() {
        let profile = ProfileDatum::integer(SnmpType::Counter32, 42);
        assert_eq!(TypedValue::from_profile(&profile), TypedValue::Counter32(42));
    }

    #[test]
    fn static_value_round_trip_string() {
        let profile = ProfileDatum::new(SnmpType::String, ProfileValue::Bytes(b"hi".to_vec()));
        assert_eq!(
            TypedValue::from_profile(&profile),
            TypedValue::String(b"hi".to_vec())
        );
    }

    #[test]
    fn behavior_descriptor_deserializes() {
        let json = r#"{
            "kind": "traffic_counter",
            "rate_range": [1000.0, 125000000.0],
            "time_of_day_variation": true,
            "burst_probability": 0.1
        }"#;
        let behavior: BehaviorDescriptor = serde_json::from_str(json).unwrap();
        assert!(matches!(behavior, BehaviorDescriptor::TrafficCounter { .. }));
    }
}
