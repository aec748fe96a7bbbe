//! C3: Value Simulator — a pure function over `(profile, behavior, state)`
//! plus an injected RNG that produces a [`TypedValue`] with realistic
//! temporal dynamics.
//!
//! "Pure" here means no hidden global state: all randomness flows through
//! the caller-supplied `rng`, and the only state mutated is the
//! per-device [`DeviceState`] accumulator for the OID being sampled
//! (design notes: "keep per-OID 64-bit accumulators inside DeviceState").
//!
//! Open design decision (spec.md §9 leaves this unspecified): the
//! traffic-counter increment is computed in bytes, treating each call as
//! sampling the instantaneous rate over a one-second window
//! (`Δt = 1.0s`). This keeps counters monotonically growing call over
//! call without requiring the simulator to know the wall-clock gap
//! between polls.

use std::f64::consts::PI;

use rand::Rng;

use crate::behavior::{BehaviorDescriptor, ProfileDatum, TypedValue, UtilizationPattern};
use crate::state::DeviceState;

const U32_MODULUS: u64 = 1u64 << 32;

/// Evaluate `behavior` for `oid` against `profile` and the device's
/// current `state`, returning the typed value a query should answer
/// with. Never fails: an OID with no matching device-state field simply
/// uses a conservative default, and [`BehaviorDescriptor::StaticValue`]
/// is the built-in fallback for anything else.
pub fn simulate_value<R: Rng + ?Sized>(
    oid: &str,
    profile: &ProfileDatum,
    behavior: &BehaviorDescriptor,
    state: &mut DeviceState,
    rng: &mut R,
) -> TypedValue {
    match behavior {
        BehaviorDescriptor::TrafficCounter {
            rate_range,
            time_of_day_variation,
            burst_probability,
        } => simulate_traffic_counter(
            oid,
            profile,
            *rate_range,
            *time_of_day_variation,
            *burst_probability,
            state,
            rng,
        ),
        BehaviorDescriptor::UtilizationGauge {
            range,
            pattern,
            peak_hours,
        } => simulate_utilization_gauge(*range, *pattern, *peak_hours, state, rng),
        BehaviorDescriptor::SnrGauge {
            range,
            degradation_factor,
        } => simulate_snr_gauge(*range, *degradation_factor, state, rng),
        BehaviorDescriptor::PowerGauge {
            range,
            weather_correlation,
        } => simulate_power_gauge(*range, *weather_correlation, state, rng),
        BehaviorDescriptor::ErrorCounter {
            rate_range,
            error_burst_probability,
            correlation_with_utilization,
        } => simulate_error_counter(
            oid,
            profile,
            *rate_range,
            *error_burst_probability,
            *correlation_with_utilization,
            state,
            rng,
        ),
        BehaviorDescriptor::UptimeCounter {
            increment_rate,
            reset_probability,
        } => simulate_uptime_counter(*increment_rate, *reset_probability, state, rng),
        BehaviorDescriptor::StatusEnum => simulate_status_enum(state),
        BehaviorDescriptor::TemperatureGauge {
            range,
            load_correlation,
        } => simulate_temperature_gauge(*range, *load_correlation, state, rng),
        // Unknown/static behavior falls back gracefully; the simulator
        // never fails (spec.md §4.3, §7).
        BehaviorDescriptor::StaticValue => TypedValue::from_profile(profile),
    }
}

/// Bell-shaped time-of-day factor, peaking near 14:00, bottoming near
/// 04:00, amplitude capped at 0.6 around a baseline of 1.0.
fn time_of_day_factor(uptime_seconds: u64) -> f64 {
    let seconds_in_day = 86_400.0;
    let t = (uptime_seconds as f64) % seconds_in_day;
    let hours = t / 3_600.0;
    // Cosine peaking at 14:00: cos(0) at hour 14, trough at hour 2 (14±12).
    let phase = 2.0 * PI * (hours - 14.0) / 24.0;
    1.0 + 0.6 * phase.cos()
}

/// Standard-normal sample via Box-Muller, built locally rather than
/// pulling in `rand_distr` for a single use site.
fn gaussian_noise<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random_range(0.0..1.0);
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}

#[allow(clippy::too_many_arguments)]
fn simulate_traffic_counter<R: Rng + ?Sized>(
    oid: &str,
    profile: &ProfileDatum,
    rate_range: (f64, f64),
    time_of_day_variation: bool,
    burst_probability: f64,
    state: &mut DeviceState,
    rng: &mut R,
) -> TypedValue {
    let base = profile.value.as_integer().max(0) as u64;
    let interface_utilization = state.interface_utilization;

    let mut rate = rng.random_range(rate_range.0..=rate_range.1.max(rate_range.0 + 1.0));
    if time_of_day_variation {
        rate *= time_of_day_factor(state.uptime_seconds);
    }
    rate *= interface_utilization.max(0.05);

    if rng.random_bool(burst_probability.clamp(0.0, 1.0)) {
        let burst_factor = rng.random_range(2.0..5.0);
        rate *= burst_factor;
    }

    let delta_t = 1.0_f64;
    let increment = ((rate * delta_t) / 8.0).floor().max(0.0) as u64;

    let accumulator = state.accumulator(oid, base);
    *accumulator = accumulator.wrapping_add(increment);
    let wrapped = (*accumulator) % U32_MODULUS;

    TypedValue::Counter32(wrapped as u32)
}

fn simulate_utilization_gauge<R: Rng + ?Sized>(
    range: (i32, i32),
    pattern: UtilizationPattern,
    peak_hours: (u8, u8),
    state: &DeviceState,
    rng: &mut R,
) -> TypedValue {
    let (lo, hi) = range;
    let center = (lo as f64 + hi as f64) / 2.0;
    let span = (hi - lo) as f64;

    let mut value = center;

    if pattern == UtilizationPattern::Daily {
        let seconds_in_day = 86_400.0;
        let t = (state.uptime_seconds as f64) % seconds_in_day;
        let hours = t / 3_600.0;
        let peak_mid = (peak_hours.0 as f64 + peak_hours.1 as f64) / 2.0;
        let phase = 2.0 * PI * (hours - peak_mid) / 24.0;
        value += 0.25 * span * phase.cos();
    }

    value *= state.utilization_bias.max(0.0);
    value += gaussian_noise(rng, span * 0.02);

    TypedValue::Gauge32(value.round().clamp(lo as f64, hi as f64) as i32)
}

fn simulate_snr_gauge<R: Rng + ?Sized>(
    range: (i32, i32),
    degradation_factor: f64,
    state: &DeviceState,
    rng: &mut R,
) -> TypedValue {
    let (lo, hi) = range;
    let span = (hi - lo) as f64;
    let mid = (lo as f64 + hi as f64) / 2.0;

    let mut value = mid - degradation_factor * state.interface_utilization * span;
    value += gaussian_noise(rng, span * 0.01);

    TypedValue::Gauge32(value.round().clamp(lo as f64, hi as f64) as i32)
}

fn simulate_power_gauge<R: Rng + ?Sized>(
    range: (i32, i32),
    weather_correlation: bool,
    state: &DeviceState,
    rng: &mut R,
) -> TypedValue {
    let (lo, hi) = range;
    let span = (hi - lo) as f64;
    let center = (lo as f64 + hi as f64) / 2.0;

    let mut value = center + (state.signal_quality - 0.5) * span;

    if weather_correlation {
        value -= (state.temperature_celsius - 25.0).max(0.0) * 0.05 * span;
    }

    value += gaussian_noise(rng, span * 0.01);

    TypedValue::Gauge32(value.round().clamp(lo as f64, hi as f64) as i32)
}

#[allow(clippy::too_many_arguments)]
fn simulate_error_counter<R: Rng + ?Sized>(
    oid: &str,
    profile: &ProfileDatum,
    rate_range: (f64, f64),
    error_burst_probability: f64,
    correlation_with_utilization: bool,
    state: &mut DeviceState,
    rng: &mut R,
) -> TypedValue {
    let base = profile.value.as_integer().max(0) as u64;

    let mut rate = rng.random_range(rate_range.0..=rate_range.1.max(rate_range.0 + 1.0));
    if correlation_with_utilization {
        let correlation = (1.0 - state.signal_quality) + state.interface_utilization;
        rate *= correlation.max(0.01);
    }

    if rng.random_bool(error_burst_probability.clamp(0.0, 1.0)) {
        let burst_factor = rng.random_range(10.0..50.0);
        rate *= burst_factor;
    }

    let increment = rate.floor().max(0.0) as u64;

    let accumulator = state.accumulator(oid, base);
    *accumulator = accumulator.wrapping_add(increment);
    let wrapped = (*accumulator) % U32_MODULUS;

    TypedValue::Counter32(wrapped as u32)
}

fn simulate_uptime_counter<R: Rng + ?Sized>(
    increment_rate: f64,
    reset_probability: f64,
    state: &DeviceState,
    rng: &mut R,
) -> TypedValue {
    if rng.random_bool(reset_probability.clamp(0.0, 1.0)) {
        return TypedValue::Timeticks(0);
    }

    let ticks = ((state.uptime_seconds as f64) * increment_rate) as u64 % U32_MODULUS;
    TypedValue::Timeticks(ticks as u32)
}

fn simulate_status_enum(state: &DeviceState) -> TypedValue {
    let score = state.health_score - 2.0 * state.error_rate;
    let status = if score > 0.7 {
        "up"
    } else if score > 0.4 {
        "degraded"
    } else {
        "down"
    };
    TypedValue::String(status.as_bytes().to_vec())
}

fn simulate_temperature_gauge<R: Rng + ?Sized>(
    range: (f64, f64),
    load_correlation: bool,
    state: &DeviceState,
    rng: &mut R,
) -> TypedValue {
    let (lo, hi) = range;
    let mut value = state.temperature_celsius;
    if load_correlation {
        value += state.cpu_utilization * 30.0;
    }
    value += gaussian_noise(rng, (hi - lo) * 0.01);

    TypedValue::Gauge32(value.round().clamp(lo, hi) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{DeviceType, ProfileValue, SnmpType};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn state_with(uptime: u64, interface_utilization: f64) -> DeviceState {
        let mut s = DeviceState::new("dev", 30000, DeviceType::CableModem);
        s.uptime_seconds = uptime;
        s.interface_utilization = interface_utilization;
        s
    }

    #[test]
    fn traffic_counter_grows() {
        let profile = ProfileDatum::integer(SnmpType::Counter32, 1_000_000);
        let behavior = BehaviorDescriptor::TrafficCounter {
            rate_range: (1_000.0, 125_000_000.0),
            time_of_day_variation: true,
            burst_probability: 0.1,
        };
        let mut state = state_with(3600, 0.5);
        let mut r = rng();

        let value = simulate_value("traffic", &profile, &behavior, &mut state, &mut r);
        match value {
            TypedValue::Counter32(v) => assert!(v as u64 > 1_000_000),
            other => panic!("expected Counter32, got {other:?}"),
        }
    }

    #[test]
    fn traffic_counter_wraps() {
        let profile = ProfileDatum::integer(SnmpType::Counter32, 4_294_967_290);
        let behavior = BehaviorDescriptor::TrafficCounter {
            rate_range: (1_000.0, 10_000.0),
            time_of_day_variation: false,
            burst_probability: 0.0,
        };
        let mut state = state_with(3600, 0.8);
        let mut r = rng();

        // Drive several samples to guarantee the accumulator crosses 2^32.
        let mut last = TypedValue::Counter32(0);
        for _ in 0..50 {
            last = simulate_value("traffic", &profile, &behavior, &mut state, &mut r);
        }
        match last {
            TypedValue::Counter32(v) => assert!((v as u64) < (1u64 << 32)),
            other => panic!("expected Counter32, got {other:?}"),
        }
    }

    #[test]
    fn uptime_ticks_in_expected_band() {
        let profile = ProfileDatum::integer(SnmpType::Timeticks, 0);
        let behavior = BehaviorDescriptor::UptimeCounter {
            increment_rate: 100.0,
            reset_probability: 0.0,
        };
        let mut state = state_with(3600, 0.5);
        let mut r = rng();

        let value = simulate_value("uptime", &profile, &behavior, &mut state, &mut r);
        match value {
            TypedValue::Timeticks(v) => assert!((350_000..=370_000).contains(&v)),
            other => panic!("expected Timeticks, got {other:?}"),
        }
    }

    #[test]
    fn status_enum_reports_up_when_healthy() {
        let profile = ProfileDatum::integer(SnmpType::Integer, 0);
        let behavior = BehaviorDescriptor::StatusEnum;
        let mut state = state_with(10, 0.1);
        state.health_score = 0.9;
        state.error_rate = 0.01;
        let mut r = rng();

        let value = simulate_value("status", &profile, &behavior, &mut state, &mut r);
        assert_eq!(value, TypedValue::String(b"up".to_vec()));
    }

    #[test]
    fn status_enum_reports_down_when_unhealthy() {
        let profile = ProfileDatum::integer(SnmpType::Integer, 0);
        let behavior = BehaviorDescriptor::StatusEnum;
        let mut state = state_with(10, 0.1);
        state.health_score = 0.1;
        state.error_rate = 0.4;
        let mut r = rng();

        let value = simulate_value("status", &profile, &behavior, &mut state, &mut r);
        assert_eq!(value, TypedValue::String(b"down".to_vec()));
    }

    #[test]
    fn gauge_outputs_stay_within_declared_range() {
        let behavior = BehaviorDescriptor::UtilizationGauge {
            range: (0, 100),
            pattern: UtilizationPattern::Daily,
            peak_hours: (9, 17),
        };
        let profile = ProfileDatum::integer(SnmpType::Gauge32, 0);
        let mut r = rng();

        for uptime in (0..90_000).step_by(3600) {
            let mut state = state_with(uptime, 0.5);
            state.utilization_bias = 1.0;
            let value = simulate_value("util", &profile, &behavior, &mut state, &mut r);
            match value {
                TypedValue::Gauge32(v) => assert!((0..=100).contains(&v)),
                other => panic!("expected Gauge32, got {other:?}"),
            }
        }
    }

    #[test]
    fn static_value_is_identity_regardless_of_state() {
        let profile = ProfileDatum::integer(SnmpType::Gauge32, 77);
        let behavior = BehaviorDescriptor::StaticValue;
        let mut r = rng();

        for uptime in [0, 1000, 999_999] {
            let mut state = state_with(uptime, 0.9);
            state.health_score = 0.0;
            let value = simulate_value("static", &profile, &behavior, &mut state, &mut r);
            assert_eq!(value, TypedValue::Gauge32(77));
        }
    }

    #[test]
    fn unknown_behavior_falls_back_to_static() {
        // Using StaticValue directly stands in for "any behavior this
        // simulator doesn't recognize" since BehaviorDescriptor is a
        // closed enum; deserializing an unrecognized `kind` string would
        // fail at the config layer, and simulate_value's StaticValue arm
        // is exactly that fallback path (spec.md §4.3 "unknown behavior").
        let profile = ProfileDatum::new(SnmpType::String, ProfileValue::Bytes(b"fallback".to_vec()));
        let mut state = state_with(0, 0.5);
        let mut r = rng();
        let value = simulate_value(
            "oid",
            &profile,
            &BehaviorDescriptor::StaticValue,
            &mut state,
            &mut r,
        );
        assert_eq!(value, TypedValue::String(b"fallback".to_vec()));
    }
}
