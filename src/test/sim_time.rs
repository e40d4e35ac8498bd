use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
}

#[test]
fn sim_time_from_float_seconds_rounds_to_nanos() {
    assert_eq!(SimTime::from_secs_f64(1.0), SimTime(1_000_000_000));
    assert_eq!(SimTime::from_secs_f64(0.001), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs_f64(2.6e-9), SimTime(3));
    assert_eq!(SimTime::from_secs_f64(1.5).as_secs_f64(), 1.5);
}

#[test]
fn sim_time_from_float_clamps_negative_nan_and_huge() {
    assert_eq!(SimTime::from_secs_f64(-1.0), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(f64::NAN), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(f64::INFINITY), SimTime::MAX);
    assert_eq!(SimTime::from_secs_f64(1e300), SimTime::MAX);
}

#[test]
fn sim_time_saturating_arithmetic() {
    assert_eq!(SimTime(5).saturating_sub(SimTime(7)), SimTime::ZERO);
    assert_eq!(SimTime::MAX.saturating_add(SimTime(1)), SimTime::MAX);
    assert_eq!(SimTime(3).saturating_add(SimTime(4)), SimTime(7));
}
