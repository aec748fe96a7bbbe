//! C1: Device Distribution.
//!
//! Derives per-type port assignments from named population mixes, and
//! classifies a port into its device type.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::behavior::DeviceType;
use crate::error::CoreError;

/// A mapping from device type to how many devices of that type to create.
pub type DeviceMix = HashMap<DeviceType, u32>;

/// A disjoint mapping from device type to the set of ports assigned to
/// it, stored as sorted, non-overlapping `(start, end, DeviceType)`
/// intervals for O(log n) classification.
#[derive(Debug, Clone, Default)]
pub struct PortAssignments {
    /// Sorted by `start`; invariant maintained by [`build_port_assignments`].
    intervals: Vec<(u16, u16, DeviceType)>,
}

impl PortAssignments {
    /// The inclusive port range assigned to `device_type`, if any.
    pub fn range_for(&self, device_type: DeviceType) -> Option<RangeInclusive<u16>> {
        self.intervals
            .iter()
            .find(|(_, _, t)| *t == device_type)
            .map(|(s, e, _)| *s..=*e)
    }

    /// All intervals, in port order.
    pub fn intervals(&self) -> &[(u16, u16, DeviceType)] {
        &self.intervals
    }

    /// Total number of ports assigned across all types.
    pub fn total_ports(&self) -> usize {
        self.intervals
            .iter()
            .map(|(s, e, _)| (*e - *s) as usize + 1)
            .sum()
    }
}

/// Look up a named device mix preset.
///
/// Returns `None` for unrecognized names; callers that need a hard error
/// should treat that as a configuration error at their own layer (the
/// core has no opinion on unknown preset names beyond "there is no such
/// mix").
pub fn get_device_mix(name: &str) -> Option<DeviceMix> {
    let mix: &[(DeviceType, u32)] = match name {
        "small_test" => &[
            (DeviceType::CableModem, 10),
            (DeviceType::Switch, 2),
            (DeviceType::Router, 1),
        ],
        "medium_test" => &[
            (DeviceType::CableModem, 500),
            (DeviceType::Mta, 100),
            (DeviceType::Switch, 20),
            (DeviceType::Router, 5),
            (DeviceType::Cmts, 2),
        ],
        "cable_network" => &[
            (DeviceType::CableModem, 8_000),
            (DeviceType::Mta, 2_000),
            (DeviceType::Cmts, 10),
            (DeviceType::Switch, 50),
            (DeviceType::Router, 10),
        ],
        "enterprise_network" => &[
            (DeviceType::Switch, 200),
            (DeviceType::Router, 30),
            (DeviceType::Server, 500),
            (DeviceType::CableModem, 0),
        ],
        _ => return None,
    };
    Some(mix.iter().copied().collect())
}

/// Assign, in the fixed type ordering [`DeviceType::ALL`], the first N
/// ports from `port_range` to each type where N is `mix[type]`.
///
/// Fails with [`CoreError::InsufficientPorts`] if the range is smaller
/// than the sum of the mix's counts.
pub fn build_port_assignments(
    mix: &DeviceMix,
    port_range: RangeInclusive<u16>,
) -> Result<PortAssignments, CoreError> {
    let needed: u32 = mix.values().sum();
    let available = (*port_range.end() as u32)
        .saturating_sub(*port_range.start() as u32)
        .saturating_add(1);

    if needed > available {
        return Err(CoreError::InsufficientPorts {
            available: available as usize,
            needed: needed as usize,
        });
    }

    let mut intervals = Vec::new();
    let mut cursor = *port_range.start();

    for device_type in DeviceType::ALL {
        let count = mix.get(&device_type).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        let start = cursor;
        // count - 1 additions, each known to stay within port_range by the
        // capacity check above.
        let end = start + (count as u16 - 1);
        intervals.push((start, end, device_type));
        cursor = end + 1;
    }

    Ok(PortAssignments { intervals })
}

/// Confirm pairwise disjointness of `pa`'s intervals and that all ports
/// lie within `universe`.
pub fn validate_port_assignments(pa: &PortAssignments, universe: RangeInclusive<u16>) -> bool {
    for (start, end, _) in &pa.intervals {
        if *start < *universe.start() || *end > *universe.end() || start > end {
            return false;
        }
    }

    for (i, (s1, e1, _)) in pa.intervals.iter().enumerate() {
        for (s2, e2, _) in pa.intervals.iter().skip(i + 1) {
            if s1 <= e2 && s2 <= e1 {
                return false;
            }
        }
    }

    true
}

/// Classify `port` into its device type via a binary search over the
/// sorted interval list. Returns `None` ("Unassigned") if the port
/// falls in no configured interval.
pub fn determine_device_type(port: u16, pa: &PortAssignments) -> Option<DeviceType> {
    let intervals = &pa.intervals;
    let mut lo = 0usize;
    let mut hi = intervals.len();

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let (start, end, device_type) = intervals[mid];
        if port < start {
            hi = mid;
        } else if port > end {
            lo = mid + 1;
        } else {
            return Some(device_type);
        }
    }

    None
}

/// Summary statistics over a [`PortAssignments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityStats {
    pub total_devices: usize,
    pub largest_group: Option<(DeviceType, usize)>,
    pub per_type_counts: HashMap<DeviceType, usize>,
}

/// Compute density statistics over a [`PortAssignments`].
pub fn calculate_density_stats(pa: &PortAssignments) -> DensityStats {
    let mut per_type_counts = HashMap::new();
    for (start, end, device_type) in &pa.intervals {
        let count = (*end - *start) as usize + 1;
        *per_type_counts.entry(*device_type).or_insert(0) += count;
    }

    let largest_group = per_type_counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(t, c)| (*t, *c));

    let total_devices = per_type_counts.values().sum();

    DensityStats {
        total_devices,
        largest_group,
        per_type_counts,
    }
}
