//! Integration tests for schedule decoding, repair and re-encoding.

mod common;

use approx::assert_relative_eq;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rstest::rstest;
use setpoint_eval::error::EvalError;
use setpoint_eval::eval::{
    CodecConfig, Encoding, ScheduleCodec, expand_to_timesteps, repair_rate_limit,
};

const TOL: f64 = 1e-9;

fn codec(encoding: Encoding) -> ScheduleCodec {
    ScheduleCodec::new(CodecConfig {
        encoding,
        ..CodecConfig::default()
    })
    .expect("default layout is valid")
}

fn random_vector(rng: &mut StdRng, len: usize, lo: f64, hi: f64) -> Vec<f64> {
    (0..len).map(|_| rng.random_range(lo..hi)).collect()
}

fn assert_bounded(schedule: &[f64]) {
    for &t in schedule {
        assert!((18.0 - TOL..=30.0 + TOL).contains(&t), "setpoint {t} out of bounds");
    }
}

fn assert_rate_limited(schedule: &[f64]) {
    for pair in schedule.windows(2) {
        assert!(
            (pair[1] - pair[0]).abs() <= 2.0 + TOL,
            "adjacent change {} -> {} exceeds 2 °C",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn midpoint_vector_decodes_to_flat_schedule() {
    let schedule = codec(Encoding::Difference).decode(&[0.5; 19]).unwrap();
    assert_eq!(schedule.len(), 25);
    assert!(schedule[..6].iter().all(|&t| t == 25.0));
    for &t in &schedule[6..] {
        assert_relative_eq!(t, 24.0, epsilon = TOL);
    }
}

#[test]
fn difference_decoding_respects_bounds_and_rate_limit() {
    let codec = codec(Encoding::Difference);
    let offset = codec.config().offset;
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let vars = random_vector(&mut rng, 19, 0.0, 1.0);
        let schedule = codec.decode(&vars).unwrap();
        assert_eq!(schedule.len(), 25);
        assert_bounded(&schedule);
        // the step into the first driven slot is unconstrained
        assert_rate_limited(&schedule[offset..]);
    }
}

#[test]
fn direct_decoding_repairs_whole_day() {
    let codec = codec(Encoding::Direct);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let vars = random_vector(&mut rng, 19, 0.0, 1.0);
        let schedule = codec.decode(&vars).unwrap();
        assert_bounded(&schedule);
        assert_rate_limited(&schedule);
    }
}

#[test]
fn repair_keeps_values_in_bounds() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..100 {
        let raw = random_vector(&mut rng, 25, 18.0, 30.0);
        let repaired = repair_rate_limit(&raw, 2.0);
        assert_eq!(repaired.len(), raw.len());
        assert_eq!(repaired[0], raw[0]);
        assert_bounded(&repaired);
        assert_rate_limited(&repaired);
    }
}

#[test]
fn difference_round_trip_recovers_variables() {
    let codec = codec(Encoding::Difference);
    let mut rng = StdRng::seed_from_u64(2024);
    let mut checked = 0;
    for _ in 0..50 {
        let vars = random_vector(&mut rng, 19, 0.35, 0.65);
        let schedule = codec.decode(&vars).unwrap();
        if schedule.iter().any(|&t| t <= 18.0 + TOL || t >= 30.0 - TOL) {
            continue;
        }
        let recovered = codec.encode(&schedule).unwrap();
        assert_eq!(recovered.len(), vars.len());
        // first variable spans 12 °C, the rest 4 °C, at 0.1 °C resolution
        assert!((recovered[0] - vars[0]).abs() <= 0.05 / 12.0 + TOL);
        for (r, v) in recovered[1..].iter().zip(&vars[1..]) {
            assert!((r - v).abs() <= 0.05 / 4.0 + TOL, "recovered {r}, original {v}");
        }
        checked += 1;
    }
    assert!(checked >= 25, "only {checked} round trips stayed inside the bounds");
}

#[test]
fn out_of_range_variables_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(7);
    for encoding in [Encoding::Difference, Encoding::Direct] {
        let codec = codec(encoding);
        let offset = codec.config().offset;
        for _ in 0..100 {
            let vars = random_vector(&mut rng, 19, -1.0, 2.0);
            let schedule = codec.decode(&vars).unwrap();
            assert_bounded(&schedule);
            assert_rate_limited(&schedule[offset..]);
        }
    }
}

#[test]
fn nan_variable_is_fatal() {
    let mut vars = vec![0.5; 19];
    vars[10] = f64::NAN;
    for encoding in [Encoding::Difference, Encoding::Direct] {
        assert!(matches!(
            codec(encoding).decode(&vars),
            Err(EvalError::NonFiniteVariable { index: 10, .. })
        ));
    }
}

#[test]
fn direct_round_trip_recovers_variables() {
    let codec = codec(Encoding::Direct);
    // 23.4 to 25.6 °C: within 2 °C of the 25 °C prefix and 0.12 °C apart, so nothing is repaired
    let vars: Vec<f64> = (0..19).map(|i| 0.45 + 0.01 * i as f64).collect();
    let recovered = codec.encode(&codec.decode(&vars).unwrap()).unwrap();
    for (r, v) in recovered.iter().zip(&vars) {
        assert!((r - v).abs() <= 0.05 / 12.0 + TOL);
    }
}

#[rstest]
#[case(Encoding::Difference, 18)]
#[case(Encoding::Difference, 20)]
#[case(Encoding::Direct, 0)]
fn wrong_vector_length_is_fatal(#[case] encoding: Encoding, #[case] len: usize) {
    assert!(codec(encoding).decode(&vec![0.5; len]).is_err());
}

#[rstest]
#[case(6, 144)]
#[case(4, 96)]
#[case(1, 24)]
fn trace_expansion_covers_the_day(#[case] tph: usize, #[case] rows: usize) {
    let schedule = codec(Encoding::Difference).decode(&[0.5; 19]).unwrap();
    let trace = expand_to_timesteps(&schedule, tph);
    assert_eq!(trace.len(), rows);
    // hour-6 slot takes effect at the row ending 6:00
    assert_relative_eq!(trace[6 * tph - 1], 24.0, epsilon = TOL);
    if tph > 1 {
        assert_eq!(trace[6 * tph - 2], 25.0);
    }
}
