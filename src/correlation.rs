//! Pairwise motion correlation between agents
//!
//! Each agent's trajectory is split into three coordinate series (x, y, z).
//! For agents `i` and `j` the Pearson coefficient is computed per axis and
//! the three coefficients are averaged into `corr[i][j]`.
//!
//! Per-agent axis statistics (centered series and norm) are computed once,
//! so every cell costs three dot products. Each series is rescaled by its
//! largest magnitude before centering, so coordinates near the limits of
//! `f64` neither overflow nor underflow the norm. Only the upper triangle is
//! computed and the lower one is mirrored, which makes the matrix exactly
//! symmetric. Cells are independent reads of shared immutable data and
//! run on the rayon pool when the `parallel` feature is enabled.

use crate::ranking::{select_top_k, SortOrder};
use crate::trajectory::{Axis, Trajectory};
use crate::{Error, Result};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

/// Pearson correlation of two equally long series
///
/// Returns `None` if the lengths differ, fewer than two samples are
/// given, either series is constant, or the coefficient is not finite.
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let sx = AxisStats::new(x)?;
    let sy = AxisStats::new(y)?;
    sx.correlate(&sy)
}

/// Centered samples and their Euclidean norm for one coordinate series
#[derive(Debug, Clone)]
struct AxisStats {
    centered: Vec<f64>,
    norm: f64,
}

impl AxisStats {
    /// `None` for a series without usable variance: constant, or with a
    /// spread that vanishes once rescaled
    #[allow(clippy::cast_precision_loss)]
    fn new(series: &[f64]) -> Option<Self> {
        let first = *series.first()?;
        if series.iter().all(|&v| v == first) {
            return None;
        }

        // Pearson is scale invariant; keep every sample in [-1, 1]
        let scale = max_abs(series);
        if !(scale > 0.0 && scale.is_finite()) {
            return None;
        }
        let scaled: Vec<f64> = series.iter().map(|v| v / scale).collect();

        let mean = scaled.iter().sum::<f64>() / scaled.len() as f64;
        let mut centered: Vec<f64> = scaled.iter().map(|v| v - mean).collect();

        let spread = max_abs(&centered);
        if !(spread > 0.0 && spread.is_finite()) {
            return None;
        }
        centered.iter_mut().for_each(|c| *c /= spread);

        let norm = centered.iter().map(|c| c * c).sum::<f64>().sqrt();
        if !(norm > 0.0 && norm.is_finite()) {
            return None;
        }
        Some(Self { centered, norm })
    }

    /// `None` if the coefficient is not finite
    fn correlate(&self, other: &Self) -> Option<f64> {
        let dot: f64 = self
            .centered
            .iter()
            .zip(&other.centered)
            .map(|(a, b)| a * b)
            .sum();
        let r = dot / (self.norm * other.norm);
        r.is_finite().then(|| r.clamp(-1.0, 1.0))
    }
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// N x N matrix of averaged per-axis Pearson coefficients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    size: usize,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Number of agents N
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// `corr[i][j]`, or `None` if either index is out of range
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        (i < self.size && j < self.size).then(|| self.values[i * self.size + j])
    }

    /// Row `i`, or `None` if out of range
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        (i < self.size).then(|| &self.values[i * self.size..(i + 1) * self.size])
    }

    /// All rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks() panics on 0; an empty matrix has no rows either way
        self.values.chunks(self.size.max(1))
    }

    /// Nested `Vec` copy, as handed to plotting code
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    /// The `k` agents most correlated with `agent` (excluding itself), strongest first
    ///
    /// # Errors
    ///
    /// Returns [`Error::AgentOutOfRange`] for an unknown agent and
    /// [`Error::InvalidInput`] if `k` is zero
    pub fn top_partners(&self, agent: usize, k: usize) -> Result<Vec<(usize, f64)>> {
        let row = self.row(agent).ok_or(Error::AgentOutOfRange {
            agent,
            agents: self.size,
        })?;

        let mut scores = row.to_vec();
        scores[agent] = f64::NAN;

        Ok(select_top_k(&scores, k, SortOrder::Descending)?
            .into_iter()
            .map(|j| (j, row[j]))
            .collect())
    }

    /// Partner with the highest correlation to `agent`, if any
    #[must_use]
    pub fn most_correlated(&self, agent: usize) -> Option<(usize, f64)> {
        self.top_partners(agent, 1).ok()?.into_iter().next()
    }
}

/// Builds [`CorrelationMatrix`] values from a trajectory
#[derive(Debug, Clone, Copy)]
pub struct CorrelationEngine {
    parallel: bool,
}

impl Default for CorrelationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationEngine {
    /// Engine that uses the rayon pool when the `parallel` feature is enabled
    #[must_use]
    pub const fn new() -> Self {
        Self { parallel: true }
    }

    /// Turn parallel evaluation on or off
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Averaged per-axis correlation of agents `i` and `j`
    ///
    /// # Errors
    ///
    /// - [`Error::AgentOutOfRange`] if either id is out of range
    /// - [`Error::InvalidInput`] for fewer than two time steps
    /// - [`Error::ZeroVariance`] if either agent is constant on some axis
    pub fn pair(&self, trajectory: &Trajectory, i: usize, j: usize) -> Result<f64> {
        trajectory.check_agent(i)?;
        trajectory.check_agent(j)?;
        check_steps(trajectory)?;

        let a = agent_stats(trajectory, i)?;
        let b = agent_stats(trajectory, j)?;
        correlate_agents(&a, &b, i, j)
    }

    /// Full N x N correlation matrix
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for a trajectory with fewer than two time
    ///   steps
    /// - [`Error::ZeroVariance`] naming the first degenerate cell in
    ///   row-major order
    pub fn compute(&self, trajectory: &Trajectory) -> Result<CorrelationMatrix> {
        check_steps(trajectory)?;
        let start = Instant::now();
        let n = trajectory.num_agents();

        let stats = (0..n)
            .map(|agent| agent_stats(trajectory, agent))
            .collect::<Result<Vec<_>>>()?;

        let upper = self.upper_triangle(&stats);

        let mut values = vec![0.0; n * n];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, cell) in row.into_iter().enumerate() {
                let j = i + offset;
                let value = cell?;
                values[i * n + j] = value;
                values[j * n + i] = value;
            }
        }

        tracing::info!(
            agents = n,
            steps = trajectory.num_steps(),
            parallel = self.parallel && cfg!(feature = "parallel"),
            elapsed = ?start.elapsed(),
            "computed correlation matrix"
        );
        Ok(CorrelationMatrix { size: n, values })
    }

    /// Cells `(i, j)` with `j >= i`, row by row
    fn upper_triangle(&self, stats: &[AgentStats]) -> Vec<Vec<Result<f64>>> {
        let n = stats.len();
        let row = |i: usize| -> Vec<Result<f64>> { (i..n).map(|j| cell(stats, i, j)).collect() };

        #[cfg(feature = "parallel")]
        if self.parallel {
            return (0..n).into_par_iter().map(row).collect();
        }

        (0..n).map(row).collect()
    }
}

type AgentStats = [Option<AxisStats>; 3];

fn agent_stats(trajectory: &Trajectory, agent: usize) -> Result<AgentStats> {
    let [x, y, z] = Axis::ALL;
    Ok([
        AxisStats::new(&trajectory.axis_series(agent, x)?),
        AxisStats::new(&trajectory.axis_series(agent, y)?),
        AxisStats::new(&trajectory.axis_series(agent, z)?),
    ])
}

fn cell(stats: &[AgentStats], i: usize, j: usize) -> Result<f64> {
    correlate_agents(&stats[i], &stats[j], i, j)
}

/// Mean of the per-axis coefficients of agents `i` and `j`
fn correlate_agents(a: &AgentStats, b: &AgentStats, i: usize, j: usize) -> Result<f64> {
    let mut total = 0.0;
    for axis in Axis::ALL {
        let (Some(sa), Some(sb)) = (&a[axis.index()], &b[axis.index()]) else {
            return Err(zero_variance(i, j, axis));
        };
        total += sa.correlate(sb).ok_or_else(|| {
            Error::InvalidInput(format!(
                "correlation of agents ({i}, {j}) on the {} axis is not finite",
                axis.name()
            ))
        })?;
    }
    Ok(total / 3.0)
}

const fn zero_variance(agent_a: usize, agent_b: usize, axis: Axis) -> Error {
    Error::ZeroVariance {
        agent_a,
        agent_b,
        axis: axis.name(),
    }
}

fn check_steps(trajectory: &Trajectory) -> Result<()> {
    if trajectory.num_steps() < 2 {
        return Err(Error::InvalidInput(format!(
            "correlation needs at least 2 time steps, got {}",
            trajectory.num_steps()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::{Position, TimeStep};

    fn trajectory(steps: &[&[[f64; 3]]]) -> Trajectory {
        Trajectory::new(
            steps
                .iter()
                .map(|s| TimeStep::new(s.iter().copied().map(Position::from).collect()))
                .collect(),
        )
        .unwrap()
    }

    fn moving_trajectory() -> Trajectory {
        trajectory(&[
            &[[0.0, 0.0, 0.0], [10.0, 10.0, 10.0], [5.0, 9.0, 1.0]],
            &[[1.0, 2.0, 3.0], [11.0, 12.0, 13.0], [4.0, 2.0, 8.0]],
            &[[2.0, 5.0, 4.0], [12.0, 15.0, 14.0], [9.0, 7.0, 2.0]],
            &[[4.0, 4.0, 9.0], [14.0, 14.0, 19.0], [1.0, 3.0, 6.0]],
        ])
    }

    #[test]
    fn test_pearson_perfect() {
        let x = [1.0, 2.0, 3.0];
        assert!((pearson(&x, &[1.0, 2.0, 3.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[3.0, 2.0, 1.0]).unwrap() + 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[10.0, 20.0, 30.0]).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_pearson_constant_with_inexact_mean() {
        // 0.1 * 3 / 3 != 0.1 in floating point; still zero variance
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[0.1, 0.1, 0.1]), None);
    }

    #[test]
    fn test_matrix_diagonal_and_symmetry() {
        let matrix = CorrelationEngine::new().compute(&moving_trajectory()).unwrap();
        assert_eq!(matrix.size(), 3);
        for i in 0..3 {
            assert!((matrix.get(i, i).unwrap() - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
    }

    #[test]
    fn test_translated_agent_correlates_perfectly() {
        let matrix = CorrelationEngine::new().compute(&moving_trajectory()).unwrap();
        assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
        assert!(matrix.get(0, 2).unwrap() < 1.0);
    }

    #[test]
    fn test_matrix_matches_pair() {
        let traj = moving_trajectory();
        let engine = CorrelationEngine::new();
        let matrix = engine.compute(&traj).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let pair = engine.pair(&traj, i, j).unwrap();
                assert!((matrix.get(i, j).unwrap() - pair).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let traj = moving_trajectory();
        let parallel = CorrelationEngine::new().compute(&traj).unwrap();
        let sequential = CorrelationEngine::new()
            .with_parallel(false)
            .compute(&traj)
            .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_zero_variance_reports_first_cell() {
        // Agent 1 never moves along y
        let traj = trajectory(&[
            &[[0.0, 0.0, 0.0], [1.0, 5.0, 1.0], [3.0, 1.0, 2.0]],
            &[[1.0, 2.0, 3.0], [2.0, 5.0, 2.0], [1.0, 2.0, 4.0]],
            &[[2.0, 1.0, 1.0], [4.0, 5.0, 0.0], [0.0, 0.0, 1.0]],
        ]);
        let err = CorrelationEngine::new().compute(&traj).unwrap_err();
        match err {
            Error::ZeroVariance {
                agent_a,
                agent_b,
                axis,
            } => {
                assert_eq!((agent_a, agent_b, axis), (0, 1, "y"));
            }
            other => panic!("expected zero variance, got {other:?}"),
        }

        assert!(CorrelationEngine::new().pair(&traj, 0, 2).is_ok());
        assert!(matches!(
            CorrelationEngine::new().pair(&traj, 2, 1),
            Err(Error::ZeroVariance { axis: "y", .. })
        ));
    }

    #[test]
    fn test_tiny_spread_is_not_lost() {
        // x of agent 0 spans 3e-170; squaring that underflows without rescaling
        let traj = trajectory(&[
            &[[0.0, 1.0, 4.0], [0.0, 1.0, 4.0]],
            &[[1e-170, 3.0, 2.0], [1.0, 3.0, 2.0]],
            &[[3e-170, 2.0, 7.0], [3.0, 2.0, 7.0]],
        ]);
        let matrix = CorrelationEngine::new().compute(&traj).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let v = matrix.get(i, j).unwrap();
                assert!((v - 1.0).abs() < 1e-12, "corr[{i}][{j}] = {v}");
            }
        }
        let x = pearson(&[0.0, 1e-170, 3e-170], &[0.0, 1.0, 3.0]).unwrap();
        assert!((x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_huge_coordinates_do_not_overflow() {
        // x of agent 0 squares past f64::MAX without rescaling
        let traj = trajectory(&[
            &[[-1e200, 1.0, 4.0], [-2.0, 1.0, 4.0]],
            &[[1e200, 3.0, 2.0], [2.0, 3.0, 2.0]],
            &[[5e199, 2.0, 7.0], [1.0, 2.0, 7.0]],
        ]);
        let matrix = CorrelationEngine::new().compute(&traj).unwrap();
        assert!((matrix.get(0, 0).unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix.get(0, 1), matrix.get(1, 0));

        let engine = CorrelationEngine::new();
        assert!((engine.pair(&traj, 0, 1).unwrap() - 1.0).abs() < 1e-12);
        assert!(matrix.rows().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_pair_and_matrix_share_error_order() {
        // Agent 1 is constant on y and z; both paths report y first
        let traj = trajectory(&[
            &[[0.0, 0.0, 0.0], [1.0, 5.0, 5.0]],
            &[[1.0, 2.0, 3.0], [2.0, 5.0, 5.0]],
            &[[2.0, 1.0, 1.0], [4.0, 5.0, 5.0]],
        ]);
        let engine = CorrelationEngine::new();
        for err in [engine.compute(&traj).unwrap_err(), engine.pair(&traj, 0, 1).unwrap_err()] {
            assert!(matches!(
                err,
                Error::ZeroVariance {
                    agent_a: 0,
                    agent_b: 1,
                    axis: "y"
                }
            ));
        }
    }

    #[test]
    fn test_single_step_rejected() {
        let traj = trajectory(&[&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]]);
        assert!(matches!(
            CorrelationEngine::new().compute(&traj),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_pair_out_of_range() {
        let err = CorrelationEngine::new()
            .pair(&moving_trajectory(), 0, 9)
            .unwrap_err();
        assert!(matches!(err, Error::AgentOutOfRange { agent: 9, agents: 3 }));
    }

    #[test]
    fn test_top_partners() {
        let matrix = CorrelationEngine::new().compute(&moving_trajectory()).unwrap();
        let partners = matrix.top_partners(0, 5).unwrap();
        assert_eq!(partners.len(), 2);
        assert_eq!(partners[0].0, 1);
        assert!(partners.iter().all(|&(j, _)| j != 0));
        assert_eq!(matrix.most_correlated(0).map(|(j, _)| j), Some(1));
        assert!(matrix.top_partners(7, 1).is_err());
    }

    #[test]
    fn test_rows_layout() {
        let matrix = CorrelationEngine::new().compute(&moving_trajectory()).unwrap();
        let rows = matrix.to_rows();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 3));
        assert_eq!(matrix.row(2).unwrap(), rows[2].as_slice());
        assert_eq!(matrix.row(3), None);
        assert_eq!(matrix.get(0, 3), None);
    }
}
