//! Agent configuration, ported from `zenoh-bridge-snmp::config`'s shape
//! (root config + nested domain config + per-entity list) onto the
//! device farm's domain instead of a remote-device poll list.

use std::path::Path;

use serde::{Deserialize, Serialize};

use devsim_common::LoggingConfig;
use devsim_core::DeviceType;

/// Root configuration for the device farm agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Device-farm-specific settings.
    pub devsim: DevsimConfig,
}

/// Device-farm-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevsimConfig {
    /// Host to bind simulated device UDP sockets on.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Named device mix preset to start (mutually exclusive with
    /// `population`; `population` takes precedence if both are set).
    #[serde(default)]
    pub device_mix: Option<String>,

    /// Explicit `(device_type, count)` population, overriding
    /// `device_mix` when non-empty.
    #[serde(default)]
    pub population: Vec<PopulationEntry>,

    /// Lowest UDP port devices may be assigned.
    #[serde(default = "default_port_range_start")]
    pub port_range_start: u16,

    /// Highest UDP port devices may be assigned (inclusive).
    #[serde(default = "default_port_range_end")]
    pub port_range_end: u16,

    /// Path to the JSON5 profile file (per-device-type OID behaviors).
    pub profile_path: String,

    /// Pool tuning.
    #[serde(default)]
    pub pool: PoolSettings,

    /// Startup tuning.
    #[serde(default)]
    pub startup: StartupSettings,

    /// How often to log a `PoolStats` snapshot, in milliseconds.
    #[serde(default = "default_telemetry_interval_ms")]
    pub telemetry_interval_ms: u64,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port_range_start() -> u16 {
    30_000
}

fn default_port_range_end() -> u16 {
    39_999
}

fn default_telemetry_interval_ms() -> u64 {
    10_000
}

/// One entry of an explicit population spec.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub device_type: DeviceType,
    pub count: u32,
}

/// Pool-level tuning, mirroring `devsim_core::pool::PoolConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,
    #[serde(default)]
    pub reaper_interval_ms: Option<u64>,
}

fn default_idle_timeout_ms() -> u64 {
    30 * 60 * 1000
}

fn default_max_devices() -> usize {
    10_000
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            max_devices: default_max_devices(),
            reaper_interval_ms: None,
        }
    }
}

impl PoolSettings {
    pub fn to_core(&self) -> devsim_core::PoolConfig {
        devsim_core::PoolConfig {
            idle_timeout_ms: self.idle_timeout_ms,
            max_devices: self.max_devices,
            reaper_interval_ms: self.reaper_interval_ms.unwrap_or(self.idle_timeout_ms / 2),
        }
    }
}

/// Startup-level tuning, mirroring `devsim_core::startup::StartupOptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupSettings {
    #[serde(default = "default_parallel_workers")]
    pub parallel_workers: usize,
    #[serde(default = "default_per_task_timeout_ms")]
    pub per_task_timeout_ms: u64,
}

fn default_parallel_workers() -> usize {
    10
}

fn default_per_task_timeout_ms() -> u64 {
    10_000
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self {
            parallel_workers: default_parallel_workers(),
            per_task_timeout_ms: default_per_task_timeout_ms(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a JSON5 file.
    pub fn load(path: impl AsRef<Path>) -> devsim_common::Result<Self> {
        devsim_common::load_config(path)
    }

    /// Parse configuration from a JSON5 string.
    #[cfg(test)]
    pub fn parse(content: &str) -> devsim_common::Result<Self> {
        devsim_common::parse_config(content)
    }
}
