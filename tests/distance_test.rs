//! Integration tests for periodic distances and neighbor ranking

use flock_analytics::{
    DistanceEngine, DistanceMetric, Error, EuclideanMetric, PeriodicMetric, Position, TimeStep,
    Trajectory,
};

fn trajectory(steps: &[&[[f64; 3]]]) -> Trajectory {
    Trajectory::new(
        steps
            .iter()
            .map(|s| TimeStep::new(s.iter().copied().map(Position::from).collect()))
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_wraparound_example() {
    let metric = PeriodicMetric::new(1000.0).unwrap();
    let d = metric.distance(&Position::new(0.0, 0.0, 0.0), &Position::new(999.0, 0.0, 0.0));
    assert!((d - 1.0).abs() < 1e-12);
}

#[test]
fn test_reference_excluded_by_id() {
    // Agent 2 sits exactly on the reference at step 0
    let traj = trajectory(&[
        &[[5.0, 5.0, 5.0], [10.0, 5.0, 5.0], [5.0, 5.0, 5.0]],
        &[[5.0, 5.0, 5.0], [10.0, 5.0, 5.0], [8.0, 5.0, 5.0]],
    ]);
    let engine = DistanceEngine::periodic(1000.0).unwrap();
    let series = engine.series_for(&traj, 0).unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].agent(), 1);
    assert_eq!(series[1].agent(), 2);
    assert_eq!(series[1].distances(), &[0.0, 3.0]);
    assert_eq!(series[1].min(), Some(0.0));
    assert_eq!(series[1].max(), Some(3.0));
}

#[test]
fn test_ranking_is_monotone_and_complete() {
    let traj = trajectory(&[
        &[[0.0, 0.0, 0.0], [300.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 40.0, 0.0], [0.0, 0.0, 7.0]],
        &[[0.0, 0.0, 0.0], [310.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 45.0, 0.0], [0.0, 0.0, 6.0]],
    ]);
    let ranking = DistanceEngine::periodic(1000.0).unwrap().rank(&traj, 0).unwrap();

    assert_eq!(ranking.len(), 4);
    assert!(ranking.get(0).is_none());
    let order: Vec<usize> = ranking.ranked().iter().map(|s| s.agent()).collect();
    assert_eq!(order, vec![2, 4, 3, 1]);
    for pair in ranking.ranked().windows(2) {
        assert!(pair[0].mean() <= pair[1].mean());
    }

    let nearest: Vec<usize> = ranking.nearest(2).iter().map(|s| s.agent()).collect();
    let furthest: Vec<usize> = ranking.furthest(2).iter().map(|s| s.agent()).collect();
    assert_eq!(nearest, vec![2, 4]);
    assert_eq!(furthest, vec![3, 1]);
    assert_eq!(ranking.position_of(1), Some(3));
}

#[test]
fn test_equal_means_ranked_by_agent_id() {
    let traj = trajectory(&[&[
        [0.0, 0.0, 0.0],
        [0.0, 5.0, 0.0],
        [5.0, 0.0, 0.0],
        [0.0, 0.0, 5.0],
    ]]);
    let ranking = DistanceEngine::periodic(1000.0).unwrap().rank(&traj, 0).unwrap();
    let order: Vec<usize> = ranking.ranked().iter().map(|s| s.agent()).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[test]
fn test_group_size_larger_than_population() {
    let traj = trajectory(&[&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]]);
    let ranking = DistanceEngine::periodic(1000.0).unwrap().rank(&traj, 1).unwrap();
    assert_eq!(ranking.nearest(4).len(), 2);
    assert_eq!(ranking.furthest(4).len(), 2);
}

#[test]
fn test_reference_out_of_range() {
    let traj = trajectory(&[&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]]);
    let err = DistanceEngine::periodic(1000.0).unwrap().rank(&traj, 2).unwrap_err();
    assert!(matches!(err, Error::AgentOutOfRange { agent: 2, agents: 2 }));
    assert!(err.to_string().contains("[0, 2)"));
}

#[test]
fn test_single_agent_ranks_nothing() {
    let traj = trajectory(&[&[[0.0, 0.0, 0.0]]]);
    let ranking = DistanceEngine::periodic(1000.0).unwrap().rank(&traj, 0).unwrap();
    assert!(ranking.is_empty());
}

#[test]
fn test_euclidean_engine_does_not_wrap() {
    let traj = trajectory(&[&[[0.0, 0.0, 0.0], [999.0, 0.0, 0.0]]]);
    let series = DistanceEngine::new(EuclideanMetric).series_for(&traj, 0).unwrap();
    assert!((series[0].mean() - 999.0).abs() < 1e-12);
}

#[test]
fn test_invalid_period() {
    assert!(matches!(DistanceEngine::periodic(0.0), Err(Error::Config(_))));
}
