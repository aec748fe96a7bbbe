//! C5: Lazy Device Pool.
//!
//! Registry, factory, and reaper for device actors. Generalized from
//! `BridgeRunner`'s "own a `Vec<JoinHandle>` and abort them on
//! shutdown" into a keyed registry with on-demand materialization,
//! single-flight creation, idle eviction, and crash recovery.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::interval;

use crate::clock::Clock;
use crate::device::{DeviceHandle, DeviceProfile, spawn_device};
use crate::distribution::{PortAssignments, determine_device_type};
use crate::error::{CoreError, Result};

/// Recognized pool configuration (spec.md §4.5/§6).
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub idle_timeout_ms: u64,
    pub max_devices: usize,
    pub reaper_interval_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let idle_timeout_ms = 30 * 60 * 1000;
        Self {
            idle_timeout_ms,
            max_devices: 10_000,
            reaper_interval_ms: idle_timeout_ms / 2,
        }
    }
}

/// Snapshot of pool-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub active_count: usize,
    pub devices_created_total: u64,
    pub devices_cleaned_up_total: u64,
    pub peak_count: usize,
}

#[derive(Default)]
struct Counters {
    devices_created_total: AtomicU64,
    devices_cleaned_up_total: AtomicU64,
    active_count: AtomicUsize,
    peak_count: AtomicUsize,
}

impl Counters {
    fn record_create(&self) {
        self.devices_created_total.fetch_add(1, Ordering::Relaxed);
        let active = self.active_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_count.fetch_max(active, Ordering::Relaxed);
    }

    fn record_removal(&self, was_eviction: bool) {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        if was_eviction {
            self.devices_cleaned_up_total
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> PoolStats {
        PoolStats {
            active_count: self.active_count.load(Ordering::Relaxed),
            devices_created_total: self.devices_created_total.load(Ordering::Relaxed),
            devices_cleaned_up_total: self.devices_cleaned_up_total.load(Ordering::Relaxed),
            peak_count: self.peak_count.load(Ordering::Relaxed),
        }
    }
}

struct Inner {
    registry: Mutex<HashMap<u16, DeviceHandle>>,
    pending: Mutex<HashMap<u16, Arc<Notify>>>,
    assignments: Mutex<PortAssignments>,
    counters: Counters,
    config: PoolConfig,
    clock: Arc<dyn Clock>,
    profile: DeviceProfile,
}

/// Lazy, concurrent device registry with crash recovery and idle
/// eviction. Cloning a `LazyDevicePool` is cheap; all clones share the
/// same registry.
#[derive(Clone)]
pub struct LazyDevicePool {
    inner: Arc<Inner>,
}

impl LazyDevicePool {
    pub fn new(config: PoolConfig, clock: Arc<dyn Clock>, profile: DeviceProfile) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
                assignments: Mutex::new(PortAssignments::default()),
                counters: Counters::default(),
                config,
                clock,
                profile,
            }),
        }
    }

    /// Replace the active port assignments. Existing devices are
    /// unaffected.
    pub async fn configure_port_assignments(&self, assignments: PortAssignments) {
        *self.inner.assignments.lock().await = assignments;
    }

    /// Return the existing actor for `port`, or materialize one.
    /// Concurrent callers for the same port are guaranteed to observe
    /// exactly one actor (single-flight).
    pub async fn get_or_create_device(&self, port: u16) -> Result<DeviceHandle> {
        if let Some(handle) = self.inner.registry.lock().await.get(&port).cloned() {
            return Ok(handle);
        }

        // Either we become the creator (and insert a Notify others can
        // wait on), or someone already is and we wait on theirs. The
        // waiter branch registers itself with `Notified::enable()` while
        // still holding `pending`, so a winner that also needs `pending`
        // (to remove the entry before calling notify_waiters) cannot
        // reach that call until after we've registered, closing the
        // lost-wakeup window.
        let mut pending = self.inner.pending.lock().await;
        if let Some(existing) = pending.get(&port) {
            let notify = existing.clone();
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            drop(pending);

            if let Some(handle) = self.inner.registry.lock().await.get(&port).cloned() {
                return Ok(handle);
            }

            notified.await;
            return self
                .inner
                .registry
                .lock()
                .await
                .get(&port)
                .cloned()
                .ok_or(CoreError::ActorCrashed(port));
        }

        pending.insert(port, Arc::new(Notify::new()));
        drop(pending);

        let result = self.create_device(port).await;

        let notify = self.inner.pending.lock().await.remove(&port);
        if let Some(notify) = notify {
            notify.notify_waiters();
        }

        result
    }

    async fn create_device(&self, port: u16) -> Result<DeviceHandle> {
        let device_type = {
            let assignments = self.inner.assignments.lock().await;
            determine_device_type(port, &assignments)
                .ok_or(CoreError::UnknownPortRange(port))?
        };

        let active = self.inner.counters.snapshot().active_count;
        if active >= self.inner.config.max_devices {
            return Err(CoreError::PoolExhausted {
                active,
                max: self.inner.config.max_devices,
            });
        }

        let device_id = format!("{device_type}-{port}");
        let (handle, join) = spawn_device(
            device_id,
            port,
            device_type,
            self.inner.profile.clone(),
            self.inner.clock.clone(),
            port as u64,
        );

        self.inner
            .registry
            .lock()
            .await
            .insert(port, handle.clone());
        self.inner.counters.record_create();

        // Crash-recovery supervisor: holds only a Weak ref to avoid a
        // cycle (design note: "monitoring/observer relationship").
        let weak_inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let _ = join.await;
            if let Some(inner) = weak_inner.upgrade() {
                let removed = inner.registry.lock().await.remove(&port).is_some();
                if removed {
                    inner.counters.record_removal(false);
                    tracing::warn!(port, "device actor crashed, registry entry removed");
                }
            }
        });

        Ok(handle)
    }

    /// Stop the actor for `port`. Idempotent.
    pub async fn shutdown_device(&self, port: u16) -> Result<()> {
        let handle = self.inner.registry.lock().await.remove(&port);
        if let Some(handle) = handle {
            handle.shutdown();
            self.inner.counters.record_removal(false);
        }
        Ok(())
    }

    /// Stop every actor and clear the registry. Lifetime counters are
    /// not reset.
    pub async fn shutdown_all_devices(&self) -> Result<()> {
        let mut registry = self.inner.registry.lock().await;
        for (_, handle) in registry.drain() {
            handle.shutdown();
            self.inner.counters.record_removal(false);
        }
        Ok(())
    }

    /// Evict every actor idle for at least `idle_timeout_ms`.
    pub async fn cleanup_idle_devices(&self) -> usize {
        let now = self.inner.clock.now_monotonic_ns();
        let timeout_ns = self.inner.config.idle_timeout_ms * 1_000_000;

        let candidates: Vec<(u16, DeviceHandle)> = {
            let registry = self.inner.registry.lock().await;
            registry
                .iter()
                .map(|(port, handle)| (*port, handle.clone()))
                .collect()
        };

        let mut idle_ports = Vec::new();
        for (port, handle) in candidates {
            match handle.last_activity_monotonic_ns().await {
                Ok(last_activity) if now.saturating_sub(last_activity) >= timeout_ns => {
                    idle_ports.push(port);
                }
                Ok(_) => {}
                Err(_) => idle_ports.push(port), // already-crashed actor, reap its entry too
            }
        }

        let mut removed = 0;
        let mut registry = self.inner.registry.lock().await;
        for port in idle_ports {
            if let Some(handle) = registry.remove(&port) {
                handle.shutdown();
                self.inner.counters.record_removal(true);
                removed += 1;
            }
        }
        removed
    }

    /// Snapshot of pool-wide counters.
    pub async fn get_stats(&self) -> PoolStats {
        self.inner.counters.snapshot()
    }

    /// Spawn the periodic reaper task. Returns its `JoinHandle`; abort
    /// it to stop the reaper.
    pub fn spawn_reaper(&self) -> tokio::task::JoinHandle<()> {
        let pool = self.clone();
        let period = Duration::from_millis(self.inner.config.reaper_interval_ms.max(1));
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let removed = pool.cleanup_idle_devices().await;
                if removed > 0 {
                    tracing::debug!(removed, "reaper evicted idle devices");
                }
            }
        })
    }
}
