//! Distance series from a reference agent and nearest/furthest ranking
//!
//! For a reference agent `r`, every other agent `a` gets one
//! [`DistanceSeries`]: its distance to `r` at each time step. The series
//! are then ranked by mean distance into a [`NeighborRanking`], whose
//! head holds the agents that stayed closest and whose tail holds the
//! ones that stayed furthest away.
//!
//! The reference is excluded by agent id. Another agent that happens to
//! share the reference's position at some step is still included, with
//! distance 0 for that step.

use crate::metric::{DistanceMetric, PeriodicMetric};
use crate::ranking::{select_top_k, SortOrder};
use crate::trajectory::Trajectory;
use crate::{Error, Result};
use serde::Serialize;
use std::time::Instant;

/// Distances between one agent and the reference agent, in time order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceSeries {
    agent: usize,
    distances: Vec<f64>,
    mean: f64,
}

impl DistanceSeries {
    /// Build a series, caching its arithmetic mean (0 for an empty series)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(agent: usize, distances: Vec<f64>) -> Self {
        let mean = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        Self {
            agent,
            distances,
            mean,
        }
    }

    /// Agent this series belongs to
    #[must_use]
    pub const fn agent(&self) -> usize {
        self.agent
    }

    /// Distance at each time step
    #[must_use]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Mean distance over all time steps
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Smallest distance reached
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.distances.iter().copied().reduce(f64::min)
    }

    /// Largest distance reached
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.distances.iter().copied().reduce(f64::max)
    }

    /// Number of time steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// True if the series has no time steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// All non-reference series, ordered by ascending mean distance
///
/// Equal means keep ascending agent id order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborRanking {
    reference: usize,
    ranked: Vec<DistanceSeries>,
}

impl NeighborRanking {
    /// Rank series by mean distance
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a series belongs to the reference
    /// agent itself or has a non-finite mean
    pub fn new(reference: usize, series: Vec<DistanceSeries>) -> Result<Self> {
        if series.iter().any(|s| s.agent == reference) {
            return Err(Error::InvalidInput(format!(
                "reference agent {reference} cannot rank against itself"
            )));
        }
        if let Some(bad) = series.iter().find(|s| !s.mean.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "mean distance of agent {} to reference {reference} is not finite",
                bad.agent
            )));
        }
        if series.is_empty() {
            return Ok(Self {
                reference,
                ranked: series,
            });
        }

        // Stable tie-breaking needs the input in agent id order
        let mut series = series;
        series.sort_by_key(DistanceSeries::agent);

        let means: Vec<f64> = series.iter().map(DistanceSeries::mean).collect();
        let order = select_top_k(&means, series.len(), SortOrder::Ascending)?;

        let mut slots: Vec<Option<DistanceSeries>> = series.into_iter().map(Some).collect();
        let ranked = order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();

        Ok(Self { reference, ranked })
    }

    /// Reference agent id
    #[must_use]
    pub const fn reference(&self) -> usize {
        self.reference
    }

    /// All series, nearest first
    #[must_use]
    pub fn ranked(&self) -> &[DistanceSeries] {
        &self.ranked
    }

    /// Number of ranked agents (N - 1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// True if there is nothing to rank (single-agent trajectory)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// The first `k` entries (the agents that stayed closest)
    #[must_use]
    pub fn nearest(&self, k: usize) -> &[DistanceSeries] {
        &self.ranked[..k.min(self.ranked.len())]
    }

    /// The last `k` entries (the agents that stayed furthest), in ranking order
    #[must_use]
    pub fn furthest(&self, k: usize) -> &[DistanceSeries] {
        &self.ranked[self.ranked.len().saturating_sub(k)..]
    }

    /// Series of one agent, if ranked
    #[must_use]
    pub fn get(&self, agent: usize) -> Option<&DistanceSeries> {
        self.ranked.iter().find(|s| s.agent == agent)
    }

    /// 0-based rank of an agent, if ranked
    #[must_use]
    pub fn position_of(&self, agent: usize) -> Option<usize> {
        self.ranked.iter().position(|s| s.agent == agent)
    }
}

/// Computes reference-agent distance series under a [`DistanceMetric`]
#[derive(Debug, Clone, Default)]
pub struct DistanceEngine<M = PeriodicMetric> {
    metric: M,
}

impl DistanceEngine<PeriodicMetric> {
    /// Engine for a periodic domain of side `period`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] unless `period` is positive and finite
    pub fn periodic(period: f64) -> Result<Self> {
        Ok(Self::new(PeriodicMetric::new(period)?))
    }
}

impl<M: DistanceMetric> DistanceEngine<M> {
    /// Engine using `metric`
    #[must_use]
    pub const fn new(metric: M) -> Self {
        Self { metric }
    }

    /// Metric in use
    #[must_use]
    pub const fn metric(&self) -> &M {
        &self.metric
    }

    /// Distance series of every agent except `reference`, in agent id order
    ///
    /// # Errors
    ///
    /// Returns [`Error::AgentOutOfRange`] if `reference` is not in `[0, N)`
    pub fn series_for(&self, trajectory: &Trajectory, reference: usize) -> Result<Vec<DistanceSeries>> {
        trajectory.check_agent(reference)?;

        let agents = trajectory.num_agents();
        let mut columns: Vec<Vec<f64>> = (0..agents)
            .map(|_| Vec::with_capacity(trajectory.num_steps()))
            .collect();

        for step in trajectory.steps() {
            let positions = step.positions();
            let origin = &positions[reference];
            for (agent, position) in positions.iter().enumerate() {
                if agent != reference {
                    columns[agent].push(self.metric.distance(origin, position));
                }
            }
        }

        Ok(columns
            .into_iter()
            .enumerate()
            .filter(|(agent, _)| *agent != reference)
            .map(|(agent, distances)| DistanceSeries::new(agent, distances))
            .collect())
    }

    /// Rank every other agent by mean distance to `reference`
    ///
    /// # Errors
    ///
    /// Returns [`Error::AgentOutOfRange`] if `reference` is not in `[0, N)`
    pub fn rank(&self, trajectory: &Trajectory, reference: usize) -> Result<NeighborRanking> {
        let start = Instant::now();
        let series = self.series_for(trajectory, reference)?;
        let ranking = NeighborRanking::new(reference, series)?;

        tracing::info!(
            reference,
            ranked = ranking.len(),
            steps = trajectory.num_steps(),
            elapsed = ?start.elapsed(),
            "ranked neighbors"
        );
        Ok(ranking)
    }
}
