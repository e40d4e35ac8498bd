use crate::sim::{Rng, SimTime};

#[test]
fn same_seed_same_draws() {
    let mut a = Rng::from_seed(42);
    let mut b = Rng::from_seed(42);
    for _ in 0..100 {
        assert_eq!(a.exp_time(3.0), b.exp_time(3.0));
        assert_eq!(a.index(7), b.index(7));
        assert_eq!(a.trials(0.3), b.trials(0.3));
    }
}

#[test]
fn exp_time_mean_is_roughly_inverse_rate() {
    let mut rng = Rng::from_seed(9);
    let n = 20_000;
    let total: f64 = (0..n).map(|_| rng.exp_time(4.0).as_secs_f64()).sum();
    let mean = total / n as f64;
    assert!((mean - 0.25).abs() < 0.02, "mean = {mean}");
}

#[test]
fn exp_time_with_invalid_rate_is_zero() {
    let mut rng = Rng::from_seed(0);
    assert_eq!(rng.exp_time(-1.0), SimTime::ZERO);
}

#[test]
fn trials_counts_at_least_one() {
    let mut rng = Rng::from_seed(1);
    assert_eq!(rng.trials(1.0), 1);
    assert!((0..500).all(|_| rng.trials(0.2) >= 1));
}

#[test]
fn between_stays_in_range() {
    let mut rng = Rng::from_seed(2);
    assert_eq!(rng.between(1, 1), 1);
    let draws: Vec<u8> = (0..500).map(|_| rng.between(1, 5)).collect();
    assert!(draws.iter().all(|p| (1..=5).contains(p)));
    assert!(draws.contains(&1));
    assert!(draws.contains(&5));
}
