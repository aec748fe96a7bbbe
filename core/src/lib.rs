//! Lazy device pool and value-simulation engine for simulated SNMP
//! device fleets.
//!
//! This crate is the core named by the system it belongs to: the UDP
//! listener, SNMP PDU codec, profile loading, CLI, and telemetry sink
//! all live one layer up, in `devsim-agent`. Nothing here binds a
//! socket or initializes a `tracing` subscriber.

pub mod behavior;
pub mod characteristics;
pub mod clock;
pub mod device;
pub mod distribution;
pub mod error;
pub mod pdu;
pub mod pool;
pub mod simulator;
pub mod startup;
pub mod state;

pub use behavior::{
    BehaviorDescriptor, DeviceType, ProfileDatum, ProfileValue, SnmpType, TypedValue,
    UtilizationPattern,
};
pub use characteristics::{DeviceCharacteristics, characteristics_for};
pub use clock::{Clock, SystemClock, TestClock};
pub use device::{DeviceHandle, DeviceInfo, DeviceProfile, spawn_device};
pub use distribution::{
    DensityStats, DeviceMix, PortAssignments, build_port_assignments, calculate_density_stats,
    determine_device_type, get_device_mix, validate_port_assignments,
};
pub use error::{CoreError, Result};
pub use pdu::{PduOperation, SnmpRequest, SnmpResponse};
pub use pool::{LazyDevicePool, PoolConfig, PoolStats};
pub use simulator::simulate_value;
pub use startup::{DeviceFarmStartup, PopulationSpec, StartupOptions, StartupResult, StartupStatus};
pub use state::DeviceState;
