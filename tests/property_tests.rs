//! Property-based tests for flock-analytics
//!
//! - Metric invariants (symmetry, identity, bound)
//! - Neighbor ranking invariants (exclusion, monotonicity)
//! - Correlation matrix invariants (diagonal, symmetry, range)
//! - Run with ProptestConfig::with_cases(100)

use flock_analytics::{
    CorrelationEngine, DistanceEngine, DistanceMetric, PeriodicMetric, Position, TimeStep,
    Trajectory,
};
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Position anywhere in a domain of side `period`, plus some overshoot
fn arb_position(period: f64) -> impl Strategy<Value = Position> {
    prop::array::uniform3(-0.5 * period..1.5 * period).prop_map(Position::from)
}

fn arb_period() -> impl Strategy<Value = f64> {
    1.0f64..5000.0
}

/// Trajectory with 2..8 agents and 3..12 steps
fn arb_trajectory() -> impl Strategy<Value = Trajectory> {
    (2usize..8, 3usize..12).prop_flat_map(|(agents, steps)| {
        prop::collection::vec(
            prop::collection::vec(arb_position(1000.0), agents),
            steps,
        )
        .prop_map(|steps| {
            Trajectory::new(steps.into_iter().map(TimeStep::new).collect()).unwrap()
        })
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: d(a, b) == d(b, a)
    #[test]
    fn prop_metric_symmetric(period in arb_period(), a in arb_position(1000.0), b in arb_position(1000.0)) {
        let m = PeriodicMetric::new(period).unwrap();
        prop_assert_eq!(m.distance(&a, &b), m.distance(&b, &a));
    }

    /// Property: d(a, a) == 0 and 0 <= d(a, b) <= L/2 * sqrt(3)
    #[test]
    fn prop_metric_identity_and_bound(period in arb_period(), a in arb_position(1000.0), b in arb_position(1000.0)) {
        let m = PeriodicMetric::new(period).unwrap();
        prop_assert_eq!(m.distance(&a, &a), 0.0);
        let d = m.distance(&a, &b);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= m.max_distance() * (1.0 + 1e-12));
    }

    /// Property: the reference never ranks against itself; N - 1 series remain
    #[test]
    fn prop_ranking_excludes_reference(traj in arb_trajectory(), pick in any::<prop::sample::Index>()) {
        let reference = pick.index(traj.num_agents());
        let ranking = DistanceEngine::periodic(1000.0).unwrap().rank(&traj, reference).unwrap();

        prop_assert_eq!(ranking.len(), traj.num_agents() - 1);
        prop_assert!(ranking.ranked().iter().all(|s| s.agent() != reference));
        prop_assert!(ranking.ranked().iter().all(|s| s.len() == traj.num_steps()));
    }

    /// Property: ranking means are non-decreasing, ties in agent id order
    #[test]
    fn prop_ranking_monotone(traj in arb_trajectory(), pick in any::<prop::sample::Index>()) {
        let reference = pick.index(traj.num_agents());
        let ranking = DistanceEngine::periodic(1000.0).unwrap().rank(&traj, reference).unwrap();

        for pair in ranking.ranked().windows(2) {
            prop_assert!(pair[0].mean() <= pair[1].mean());
            if pair[0].mean() == pair[1].mean() {
                prop_assert!(pair[0].agent() < pair[1].agent());
            }
        }
    }

    /// Property: corr[i][i] == 1, corr[i][j] == corr[j][i], values in [-1, 1]
    #[test]
    fn prop_correlation_diagonal_and_symmetry(traj in arb_trajectory()) {
        let matrix = CorrelationEngine::new().compute(&traj);
        prop_assume!(matrix.is_ok());
        let matrix = matrix.unwrap();

        let n = matrix.size();
        for i in 0..n {
            prop_assert!((matrix.get(i, i).unwrap() - 1.0).abs() < 1e-9);
            for j in 0..n {
                let v = matrix.get(i, j).unwrap();
                prop_assert_eq!(v, matrix.get(j, i).unwrap());
                prop_assert!((-1.0..=1.0).contains(&v));
            }
        }
    }
}
