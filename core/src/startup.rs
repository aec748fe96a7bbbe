//! C6: Multi-Device Startup.
//!
//! Bulk population builder: fans creation out across a bounded worker
//! pool, aggregates per-type results, and tracks a startup-scoped
//! status the way `BridgeRunner` tracks its spawned `tasks`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::time::timeout;

use crate::behavior::DeviceType;
use crate::distribution::{DeviceMix, build_port_assignments, get_device_mix};
use crate::error::{CoreError, Result};
use crate::pool::LazyDevicePool;

/// One `(device_type, count)` entry of a population to start.
pub type PopulationSpec = (DeviceType, u32);

/// Recognized startup options (spec.md §4.6/§6).
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub port_range: std::ops::RangeInclusive<u16>,
    pub parallel_workers: usize,
    pub per_task_timeout_ms: u64,
}

impl StartupOptions {
    pub fn new(port_range: std::ops::RangeInclusive<u16>) -> Self {
        Self {
            port_range,
            parallel_workers: 10,
            per_task_timeout_ms: 10_000,
        }
    }
}

/// Aggregate result of a bulk startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupResult {
    pub total_devices: usize,
    pub per_type_created: HashMap<DeviceType, usize>,
    pub failures: Vec<String>,
}

/// Snapshot returned by [`DeviceFarmStartup::get_startup_status`].
#[derive(Debug, Clone, PartialEq)]
pub struct StartupStatus {
    pub active_devices: usize,
    pub started_at_monotonic_ns: Option<u64>,
    pub last_error: Option<String>,
}

/// Orchestrates bulk start/stop of a device population against a
/// [`LazyDevicePool`].
pub struct DeviceFarmStartup {
    pool: LazyDevicePool,
    started_at_monotonic_ns: Mutex<Option<u64>>,
    last_error: Mutex<Option<String>>,
}

impl DeviceFarmStartup {
    pub fn new(pool: LazyDevicePool) -> Self {
        Self {
            pool,
            started_at_monotonic_ns: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    /// Start a named device mix preset.
    pub async fn start_device_mix(
        &self,
        name: &str,
        opts: StartupOptions,
    ) -> Result<StartupResult> {
        let mix = get_device_mix(name)
            .ok_or_else(|| CoreError::InvalidBehavior(format!("unknown device mix: {name}")))?;
        let specs: Vec<PopulationSpec> = mix.into_iter().collect();
        self.start_device_population(&specs, opts).await
    }

    /// Start an explicit `(device_type, count)` population.
    pub async fn start_device_population(
        &self,
        specs: &[PopulationSpec],
        opts: StartupOptions,
    ) -> Result<StartupResult> {
        let mix: DeviceMix = specs.iter().copied().collect();
        let requested: u32 = mix.values().sum();

        let assignments = build_port_assignments(&mix, opts.port_range.clone())?;
        self.pool.configure_port_assignments(assignments.clone()).await;

        *self.started_at_monotonic_ns.lock().await = Some(started_at_marker());

        let mut ports = Vec::new();
        for (start, end, _) in assignments.intervals() {
            ports.extend(*start..=*end);
        }

        let (work_tx, work_rx) = mpsc::channel::<u16>(ports.len().max(1));
        for port in ports {
            let _ = work_tx.send(port).await;
        }
        drop(work_tx);

        let work_rx = Arc::new(Mutex::new(work_rx));
        let per_task_timeout = Duration::from_millis(opts.per_task_timeout_ms);
        let worker_count = opts.parallel_workers.max(1);

        let mut workers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let pool = self.pool.clone();
            let work_rx = work_rx.clone();
            workers.push(tokio::spawn(async move {
                let mut created = Vec::new();
                let mut failures = Vec::new();
                loop {
                    let port = {
                        let mut rx = work_rx.lock().await;
                        rx.recv().await
                    };
                    let Some(port) = port else { break };
                    match timeout(per_task_timeout, pool.get_or_create_device(port)).await {
                        Ok(Ok(handle)) => match handle.get_info().await {
                            Ok(info) => created.push(info.device_type),
                            Err(e) => failures.push(format!("port {port}: {e}")),
                        },
                        Ok(Err(e)) => failures.push(format!("port {port}: {e}")),
                        Err(_) => failures.push(format!("port {port}: timed out")),
                    }
                }
                (created, failures)
            }));
        }

        let mut per_type_created: HashMap<DeviceType, usize> = HashMap::new();
        let mut failures = Vec::new();
        for worker in workers {
            let (created, worker_failures) = worker
                .await
                .map_err(|e| CoreError::ActorStartFailed {
                    port: 0,
                    reason: e.to_string(),
                })?;
            for device_type in created {
                *per_type_created.entry(device_type).or_insert(0) += 1;
            }
            failures.extend(worker_failures);
        }

        let total_devices: usize = per_type_created.values().sum();
        let result = StartupResult {
            total_devices,
            per_type_created,
            failures,
        };

        if (total_devices as f64) < 0.8 * (requested as f64) {
            let reason = format!(
                "startup incomplete: {total_devices}/{requested} devices created"
            );
            *self.last_error.lock().await = Some(reason);
            return Err(CoreError::PopulationIncomplete {
                created: total_devices,
                requested: requested as usize,
            });
        }

        Ok(result)
    }

    /// Stop every device and reset startup-scoped bookkeeping.
    pub async fn shutdown_device_population(&self) -> Result<()> {
        self.pool.shutdown_all_devices().await?;
        *self.started_at_monotonic_ns.lock().await = None;
        *self.last_error.lock().await = None;
        Ok(())
    }

    /// Current startup status.
    pub async fn get_startup_status(&self) -> StartupStatus {
        StartupStatus {
            active_devices: self.pool.get_stats().await.active_count,
            started_at_monotonic_ns: *self.started_at_monotonic_ns.lock().await,
            last_error: self.last_error.lock().await.clone(),
        }
    }
}

/// Placeholder monotonic marker; callers needing a real wall-clock
/// timestamp should read it from their own [`crate::clock::Clock`]
/// instance, not from here (`DeviceFarmStartup` only needs "was a
/// start attempted", not calendar time).
fn started_at_marker() -> u64 {
    1
}
