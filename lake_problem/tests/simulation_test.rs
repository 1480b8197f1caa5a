use lake_problem::{
    critical_threshold, simulate, simulate_with_seed, LakeError, LakeParameters, LakeSimulator,
    NaturalInflow,
};
use rand::Rng;

fn reference() -> LakeParameters {
    LakeParameters::default()
}

#[test]
fn reference_policy_returns_four_metrics() {
    let outcomes = simulate(&reference(), &[0.0; 100]).unwrap();
    assert_eq!(outcomes.average_daily_p.len(), 100);
    assert_eq!(outcomes.utility, 0.0);
    assert_eq!(outcomes.inertia, 0.0);
    assert_eq!(outcomes.reliability, 1.0);
}

#[test]
fn seeded_runs_are_reproducible() {
    let decisions: Vec<f64> = (0..100).map(|t| if t % 10 < 5 { 0.01 } else { 0.04 }).collect();
    let a = simulate_with_seed(&reference(), &decisions, 2024).unwrap();
    let b = simulate_with_seed(&reference(), &decisions, 2024).unwrap();
    assert_eq!(a, b);

    let c = simulate_with_seed(&reference(), &decisions, 2025).unwrap();
    assert_ne!(a.average_daily_p, c.average_daily_p);
    assert_eq!(a.utility, c.utility);
    assert_eq!(a.inertia, c.inertia);
}

#[test]
fn thread_count_does_not_change_results() {
    let params = LakeParameters { nsamples: 300, ..reference() };
    let decisions = vec![0.02; 100];
    let run_on = |threads: usize| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| simulate_with_seed(&params, &decisions, 77).unwrap())
    };
    assert_eq!(run_on(1), run_on(4));
}

#[test]
fn deterministic_inflow_gives_deterministic_trajectory() {
    let params = LakeParameters { stdev: 0.0, nsamples: 5, ..reference() };
    let a = simulate_with_seed(&params, &[0.0; 100], 1).unwrap();
    let b = simulate_with_seed(&params, &[0.0; 100], 99).unwrap();
    for (x, y) in a.average_daily_p.iter().zip(&b.average_daily_p) {
        assert!((x - y).abs() < 1e-12);
    }
    // step 1 is exactly the mean inflow
    assert!((a.average_daily_p[1] - 0.02).abs() < 1e-12);
    assert_eq!(a.reliability, 1.0);
}

#[test]
fn heavy_releases_tip_the_lake() {
    let outcomes = simulate_with_seed(&reference(), &[0.1; 100], 5).unwrap();
    // 0.1 per step crosses Pcrit after about seven steps and never returns
    assert!(outcomes.reliability > 0.0);
    assert!(outcomes.reliability < 0.2, "reliability = {}", outcomes.reliability);
    assert!(outcomes.max_p() > 1.0);
    let pcrit = critical_threshold(0.42, 2.0).unwrap();
    assert!(outcomes.average_daily_p[99] > pcrit);
}

#[test]
fn sample_count_does_not_move_utility_or_inertia() {
    let decisions: Vec<f64> = (0..100).map(|t| 0.001 * (t % 7) as f64 * 5.0).collect();
    let small = simulate_with_seed(&reference(), &decisions, 3).unwrap();
    let large = simulate_with_seed(
        &LakeParameters { nsamples: 10_000, ..reference() },
        &decisions,
        3,
    )
    .unwrap();
    assert_eq!(small.utility, large.utility);
    assert_eq!(small.inertia, large.inertia);
    for (s, l) in small.average_daily_p.iter().zip(&large.average_daily_p) {
        assert!((s - l).abs() < 0.01, "{s} vs {l}");
    }
    assert!((small.reliability - large.reliability).abs() < 0.05);
}

#[test]
fn mismatched_steps_is_invalid_argument() {
    let err = simulate(&reference(), &[0.0; 99]).unwrap_err();
    assert!(matches!(err, LakeError::InvalidArgument(_)));
}

#[test]
fn invalid_parameters_fail_before_simulating() {
    let params = LakeParameters { b: 1.5, ..reference() };
    assert!(matches!(
        simulate(&params, &[0.0; 100]),
        Err(LakeError::InvalidArgument(_))
    ));
    let params = LakeParameters { mean: -0.02, ..reference() };
    assert!(matches!(
        simulate(&params, &[0.0; 100]),
        Err(LakeError::InvalidArgument(_))
    ));
}

#[test]
fn unbracketed_threshold_surfaces_as_error() {
    let params = LakeParameters { b: 0.9, ..reference() };
    assert!(matches!(
        simulate(&params, &[0.0; 100]),
        Err(LakeError::RootNotBracketed { .. })
    ));
}

#[test]
fn overflowing_stock_is_a_non_finite_error() {
    let params = LakeParameters {
        steps: 4,
        nsamples: 2,
        ..reference()
    };
    // s^q overflows on the second step and inf / (1 + inf) is NaN
    assert!(matches!(
        simulate_with_seed(&params, &[1e308; 4], 1),
        Err(LakeError::NonFinite("pollution stock"))
    ));
}

struct ConstantInflow(f64);

impl NaturalInflow for ConstantInflow {
    fn draw<R: Rng + ?Sized>(&self, _rng: &mut R) -> f64 {
        self.0
    }
}

#[test]
fn custom_inflow_model_plugs_in() {
    let params = LakeParameters { nsamples: 3, steps: 3, ..reference() };
    let sim = LakeSimulator::with_inflow(params, ConstantInflow(0.5)).unwrap();
    let outcomes = sim.run(&[0.0, 0.0, 0.0]).unwrap();
    // 0 -> 0.5 -> 0.58*0.5 + 0.25/1.25 + 0.5 = 0.99
    assert!((outcomes.average_daily_p[1] - 0.5).abs() < 1e-12);
    assert!((outcomes.average_daily_p[2] - 0.99).abs() < 1e-12);
    // 0 and 0.5 are below Pcrit, 0.99 is not
    assert!((outcomes.reliability - 2.0 / 3.0).abs() < 1e-12);
}
