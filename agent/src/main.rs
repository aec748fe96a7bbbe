//! SNMP device farm agent.
//!
//! Loads a device population and OID profile, starts the population
//! against a lazy device pool, binds one UDP listener per device port,
//! and runs until Ctrl+C, modeled on `BridgeRunner::run_with_metadata`'s
//! lifecycle (spawn, track tasks, wait for the shutdown signal, abort).

mod args;
mod codec;
mod config;
mod listener;
mod profile;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio::task::JoinHandle;

use devsim_core::{
    Clock, DeviceFarmStartup, LazyDevicePool, PopulationSpec, StartupOptions,
    SystemClock,
};

use crate::args::AgentArgs;
use crate::config::AgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let args = AgentArgs::parse_with_default("devsim.json5");

    let config = AgentConfig::load(&args.config)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    let log_config = if let Some(ref level) = args.log_level {
        devsim_common::LoggingConfig {
            level: level.clone(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    devsim_common::init_tracing(&log_config).map_err(|e| anyhow!("{e}"))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting SNMP device farm agent"
    );

    let profiles = profile::load_profiles(&config.devsim.profile_path)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("loading profile file {}", config.devsim.profile_path))?;

    // Each device type gets its actors built from its own profile slice;
    // devices whose type has no profile entry answer every OID with
    // None, which is valid (spec.md: "unknown OID" is not an error).
    let merged_profile: devsim_core::DeviceProfile = Arc::new(
        profiles
            .values()
            .flat_map(|p| p.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect(),
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let pool = LazyDevicePool::new(config.devsim.pool.to_core(), clock, merged_profile);
    let startup = DeviceFarmStartup::new(pool.clone());

    let port_range = config.devsim.port_range_start..=config.devsim.port_range_end;
    let mut opts = StartupOptions::new(port_range.clone());
    opts.parallel_workers = config.devsim.startup.parallel_workers;
    opts.per_task_timeout_ms = config.devsim.startup.per_task_timeout_ms;

    let result = if !config.devsim.population.is_empty() {
        let specs: Vec<PopulationSpec> = config
            .devsim
            .population
            .iter()
            .map(|entry| (entry.device_type, entry.count))
            .collect();
        startup.start_device_population(&specs, opts).await
    } else if let Some(ref mix_name) = config.devsim.device_mix {
        startup.start_device_mix(mix_name, opts).await
    } else {
        return Err(anyhow!(
            "config.devsim must set either `population` or `device_mix`"
        ));
    }
    .map_err(|e| anyhow!("{e}"))?;

    tracing::info!(
        total_devices = result.total_devices,
        failures = result.failures.len(),
        "device population started"
    );
    for failure in &result.failures {
        tracing::warn!(%failure, "device failed to start");
    }

    let mut tasks: Vec<JoinHandle<()>> = Vec::new();
    let ports: Vec<u16> = port_range.clone().collect();
    tasks.extend(
        listener::spawn_listeners(&config.devsim.bind_host, ports, pool.clone())
            .await
            .context("binding device UDP listeners")?,
    );
    tasks.push(pool.spawn_reaper());
    tasks.push(spawn_telemetry_loop(
        pool.clone(),
        config.devsim.telemetry_interval_ms,
    ));

    tracing::info!(tasks = tasks.len(), "agent running. Press Ctrl+C to stop.");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
    tracing::info!("received shutdown signal");

    for task in &tasks {
        task.abort();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    startup.shutdown_device_population().await.ok();
    tracing::info!("goodbye");

    Ok(())
}

fn spawn_telemetry_loop(pool: LazyDevicePool, interval_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(100)));
        loop {
            ticker.tick().await;
            let stats = pool.get_stats().await;
            tracing::info!(
                active = stats.active_count,
                created_total = stats.devices_created_total,
                cleaned_up_total = stats.devices_cleaned_up_total,
                peak = stats.peak_count,
                "pool telemetry"
            );
        }
    })
}
