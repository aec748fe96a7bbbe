//! Integration tests for the lazy device pool and bulk startup,
//! exercising the end-to-end scenarios against the real `tokio`
//! scheduler rather than an in-module unit test.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use devsim_core::{
    Clock, DeviceFarmStartup, DeviceType, LazyDevicePool, PoolConfig, StartupOptions, TestClock,
};

fn empty_pool(config: PoolConfig, clock: Arc<dyn Clock>) -> LazyDevicePool {
    LazyDevicePool::new(config, clock, Arc::new(HashMap::new()))
}

#[tokio::test]
async fn lifecycle_same_handle_and_single_creation() {
    let clock: Arc<dyn Clock> = TestClock::new();
    let pool = empty_pool(PoolConfig::default(), clock);

    let mut mix = devsim_core::DeviceMix::new();
    mix.insert(DeviceType::CableModem, 100);
    let pa = devsim_core::build_port_assignments(&mix, 30000..=30099).unwrap();
    pool.configure_port_assignments(pa).await;

    let a = pool.get_or_create_device(30050).await.unwrap();
    let b = pool.get_or_create_device(30050).await.unwrap();

    assert_eq!(
        a.get_info().await.unwrap().device_id,
        b.get_info().await.unwrap().device_id
    );

    let stats = pool.get_stats().await;
    assert_eq!(stats.active_count, 1);
    assert_eq!(stats.devices_created_total, 1);
}

#[tokio::test]
async fn idle_eviction_then_fresh_handle() {
    let test_clock = TestClock::new();
    let clock: Arc<dyn Clock> = test_clock.clone();
    let mut config = PoolConfig::default();
    config.idle_timeout_ms = 500;
    let pool = empty_pool(config, clock);

    let mut mix = devsim_core::DeviceMix::new();
    mix.insert(DeviceType::CableModem, 10);
    let pa = devsim_core::build_port_assignments(&mix, 30000..=30009).unwrap();
    pool.configure_port_assignments(pa).await;

    pool.get_or_create_device(30000).await.unwrap();
    pool.get_or_create_device(30001).await.unwrap();
    pool.get_or_create_device(30002).await.unwrap();

    test_clock.advance(600_000_000);
    pool.cleanup_idle_devices().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let stats = pool.get_stats().await;
    assert_eq!(stats.active_count, 0);
    assert!(stats.devices_cleaned_up_total >= 3);

    let fresh = pool.get_or_create_device(30000).await.unwrap();
    assert_eq!(fresh.get_info().await.unwrap().port, 30000);
}

#[tokio::test]
async fn crash_then_recreate_yields_new_actor() {
    let clock: Arc<dyn Clock> = TestClock::new();
    let pool = empty_pool(PoolConfig::default(), clock);

    let mut mix = devsim_core::DeviceMix::new();
    mix.insert(DeviceType::CableModem, 1);
    let pa = devsim_core::build_port_assignments(&mix, 30000..=30000).unwrap();
    pool.configure_port_assignments(pa).await;

    let d1 = pool.get_or_create_device(30000).await.unwrap();
    d1.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let d2 = pool.get_or_create_device(30000).await.unwrap();
    assert!(d2.get_info().await.is_ok());
}

#[tokio::test]
async fn concurrent_stampede_has_high_success_rate() {
    let clock: Arc<dyn Clock> = TestClock::new();
    let pool = empty_pool(PoolConfig::default(), clock);

    let mut mix = devsim_core::DeviceMix::new();
    mix.insert(DeviceType::CableModem, 1000);
    let pa = devsim_core::build_port_assignments(&mix, 30000..=30999).unwrap();
    pool.configure_port_assignments(pa).await;

    let mut tasks = Vec::new();
    for port in 30000..30100u16 {
        let pool = pool.clone();
        tasks.push(tokio::spawn(
            async move { pool.get_or_create_device(port).await },
        ));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert!(successes as f64 / 100.0 > 0.9);
    let stats = pool.get_stats().await;
    assert!(stats.devices_created_total >= successes as u64);
}

#[tokio::test]
async fn startup_reports_incomplete_when_undersized_range() {
    let clock: Arc<dyn Clock> = TestClock::new();
    let pool = empty_pool(PoolConfig::default(), clock);
    let startup = DeviceFarmStartup::new(pool);

    let specs = vec![(DeviceType::CableModem, 5000)];
    let opts = StartupOptions::new(30000..=30009);

    let err = startup
        .start_device_population(&specs, opts)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        devsim_core::CoreError::InsufficientPorts { .. }
    ));
}

#[tokio::test]
async fn startup_then_shutdown_population_round_trips() {
    let clock: Arc<dyn Clock> = TestClock::new();
    let pool = empty_pool(PoolConfig::default(), clock);
    let startup = DeviceFarmStartup::new(pool);

    let specs = vec![(DeviceType::CableModem, 50), (DeviceType::Switch, 5)];
    let opts = StartupOptions::new(30000..=30099);
    let result = startup.start_device_population(&specs, opts).await.unwrap();
    assert_eq!(result.total_devices, 55);

    startup.shutdown_device_population().await.unwrap();
    let status = startup.get_startup_status().await;
    assert_eq!(status.active_devices, 0);
}
