//! Profile loading: reads a JSON5 file mapping each device type to its
//! per-OID `(ProfileDatum, BehaviorDescriptor)` pairs, the input a
//! device actor needs at creation (spec.md §6's "profile loader →
//! actor" collaborator). Shaped after `zenoh-bridge-snmp::mib`'s
//! "deserialize a JSON file into a lookup table" pattern.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use devsim_common::{Error, Result};
use devsim_core::{BehaviorDescriptor, DeviceProfile, DeviceType, ProfileDatum};

/// One OID entry in a profile file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileOid {
    oid: String,
    #[serde(flatten)]
    profile: ProfileDatum,
    behavior: BehaviorDescriptor,
}

/// A profile file: device type -> list of OID entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: HashMap<DeviceType, Vec<ProfileOid>>,
}

/// Load a JSON5 profile file into the per-device-type map each actor is
/// handed a slice of at creation.
pub fn load_profiles(path: impl AsRef<Path>) -> Result<HashMap<DeviceType, DeviceProfile>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "failed to read profile file '{}': {}",
            path.display(),
            e
        ))
    })?;
    parse_profiles(&content)
}

/// Parse a JSON5 profile document from a string.
pub fn parse_profiles(content: &str) -> Result<HashMap<DeviceType, DeviceProfile>> {
    let file: ProfileFile = json5::from_str(content)
        .map_err(|e| Error::Config(format!("failed to parse profile file: {}", e)))?;

    let mut result = HashMap::new();
    for (device_type, entries) in file.profiles {
        let mut oids = HashMap::new();
        for entry in entries {
            oids.insert(entry.oid, (entry.profile, entry.behavior));
        }
        result.insert(device_type, Arc::new(oids));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_small_profile_document() {
        let json5 = r#"
        {
            profiles: {
                cable_modem: [
                    {
                        oid: "1.3.6.1.2.1.1.3.0",
                        type: "TIMETICKS",
                        value: 0,
                        behavior: { kind: "uptime_counter", increment_rate: 100.0 },
                    },
                    {
                        oid: "1.3.6.1.2.1.2.2.1.10.1",
                        type: "COUNTER32",
                        value: 1000000,
                        behavior: {
                            kind: "traffic_counter",
                            rate_range: [1000.0, 125000000.0],
                            time_of_day_variation: true,
                            burst_probability: 0.05,
                        },
                    },
                ],
            },
        }
        "#;

        let profiles = parse_profiles(json5).unwrap();
        let cable_modem = profiles.get(&DeviceType::CableModem).unwrap();
        assert_eq!(cable_modem.len(), 2);
        assert!(cable_modem.contains_key("1.3.6.1.2.1.1.3.0"));
    }

    #[test]
    fn missing_profiles_key_yields_empty_map() {
        let profiles = parse_profiles("{}").unwrap();
        assert!(profiles.is_empty());
    }
}
