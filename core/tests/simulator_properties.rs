//! Integration tests for the value-simulation engine's invariants,
//! using the public crate API rather than reaching into `simulator`.

use devsim_core::{
    BehaviorDescriptor, DeviceState, DeviceType, ProfileDatum, ProfileValue, SnmpType, TypedValue,
    UtilizationPattern, build_port_assignments, determine_device_type, simulate_value,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn state_with(uptime_seconds: u64, interface_utilization: f64) -> DeviceState {
    let mut state = DeviceState::new("dev-1", 30000, DeviceType::CableModem);
    state.uptime_seconds = uptime_seconds;
    state.interface_utilization = interface_utilization;
    state
}

#[test]
fn counter32_output_never_exceeds_modulus() {
    let mut rng = StdRng::seed_from_u64(7);
    let profile = ProfileDatum::integer(SnmpType::Counter32, 4_294_967_290);
    let behavior = BehaviorDescriptor::TrafficCounter {
        rate_range: (1000.0, 10_000.0),
        time_of_day_variation: false,
        burst_probability: 0.0,
    };
    let mut state = state_with(3600, 0.8);

    for _ in 0..200 {
        let value = simulate_value("ifInOctets", &profile, &behavior, &mut state, &mut rng);
        match value {
            TypedValue::Counter32(v) => assert!((v as u64) < (1u64 << 32)),
            other => panic!("expected Counter32, got {other:?}"),
        }
    }
}

#[test]
fn gauge32_output_stays_within_declared_range() {
    let mut rng = StdRng::seed_from_u64(11);
    let profile = ProfileDatum::integer(SnmpType::Gauge32, 50);
    let behavior = BehaviorDescriptor::UtilizationGauge {
        range: (0, 100),
        pattern: UtilizationPattern::Daily,
        peak_hours: (9, 17),
    };

    for hour in 0..24u64 {
        let mut state = state_with(hour * 3600, 0.5);
        let value = simulate_value("ifUtil", &profile, &behavior, &mut state, &mut rng);
        match value {
            TypedValue::Gauge32(v) => assert!((0..=100).contains(&v)),
            other => panic!("expected Gauge32, got {other:?}"),
        }
    }
}

#[test]
fn static_value_is_identity_regardless_of_simulation_state() {
    let mut rng = StdRng::seed_from_u64(3);
    let profile = ProfileDatum::new(
        SnmpType::String,
        ProfileValue::Bytes(b"DOCSIS 3.1 Cable Modem".to_vec()),
    );
    let behavior = BehaviorDescriptor::StaticValue;

    let mut healthy = state_with(0, 0.1);
    let mut degraded = state_with(90_000, 0.99);
    degraded.health_score = 0.1;

    let v1 = simulate_value("sysDescr", &profile, &behavior, &mut healthy, &mut rng);
    let v2 = simulate_value("sysDescr", &profile, &behavior, &mut degraded, &mut rng);

    assert_eq!(v1, TypedValue::from_profile(&profile));
    assert_eq!(v2, TypedValue::from_profile(&profile));
}

#[test]
fn device_type_classification_matches_assigned_slice() {
    let mut mix = devsim_core::DeviceMix::new();
    mix.insert(DeviceType::CableModem, 200);
    mix.insert(DeviceType::Cmts, 5);
    mix.insert(DeviceType::Switch, 10);

    let pa = build_port_assignments(&mix, 30000..=30299).unwrap();

    for (start, end, expected_type) in pa.intervals() {
        for port in *start..=*end {
            assert_eq!(determine_device_type(port, &pa), Some(*expected_type));
        }
    }
}

#[test]
fn status_enum_degrades_with_errors() {
    let mut rng = StdRng::seed_from_u64(1);
    let profile = ProfileDatum::integer(SnmpType::Integer, 0);
    let behavior = BehaviorDescriptor::StatusEnum;

    let mut healthy = state_with(0, 0.1);
    healthy.health_score = 0.9;
    healthy.error_rate = 0.01;
    let up = simulate_value("status", &profile, &behavior, &mut healthy, &mut rng);
    assert_eq!(up, TypedValue::String(b"up".to_vec()));

    let mut unhealthy = state_with(0, 0.1);
    unhealthy.health_score = 0.3;
    unhealthy.error_rate = 0.3;
    let down = simulate_value("status", &profile, &behavior, &mut unhealthy, &mut rng);
    assert_eq!(down, TypedValue::String(b"down".to_vec()));
}
