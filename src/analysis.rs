//! Analysis session: one trajectory, one configuration, derived reports
//!
//! ```rust,no_run
//! use flock_analytics::{AnalysisConfig, AnalysisSession};
//!
//! let config = AnalysisConfig::builder().reference_agent(3).group_size(2).build()?;
//! let session = AnalysisSession::from_file("test.txt", config)?;
//! let report = session.run()?;
//! println!("{}", serde_json::to_string(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::config::AnalysisConfig;
use crate::correlation::{CorrelationEngine, CorrelationMatrix};
use crate::distance::{DistanceEngine, DistanceSeries, NeighborRanking};
use crate::trajectory::{SimulationHeader, Trajectory, TrajectoryParser};
use crate::Result;
use serde::Serialize;
use std::path::Path;

/// Owns a trajectory and runs the configured analyses over it
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    trajectory: Trajectory,
    config: AnalysisConfig,
    header: Option<SimulationHeader>,
}

impl AnalysisSession {
    /// Session over an already built trajectory
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if `config` is invalid
    pub fn new(trajectory: Trajectory, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            trajectory,
            config,
            header: None,
        })
    }

    /// Parse `path` with `config.parser` and keep the header metadata
    ///
    /// # Errors
    ///
    /// Any configuration, IO or parse error
    pub fn from_file<P: AsRef<Path>>(path: P, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let parsed = TrajectoryParser::new(config.parser.clone())?.open(path)?;
        let header = parsed.header();
        Ok(Self {
            trajectory: parsed.into_trajectory(),
            config,
            header: Some(header),
        })
    }

    /// Attach header metadata to the report
    #[must_use]
    pub fn with_header(mut self, header: SimulationHeader) -> Self {
        self.header = Some(header);
        self
    }

    /// The analysed trajectory
    #[must_use]
    pub const fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Header metadata, when the session was built from a log file
    #[must_use]
    pub const fn header(&self) -> Option<&SimulationHeader> {
        self.header.as_ref()
    }

    /// Correlation matrix of every agent pair
    ///
    /// # Errors
    ///
    /// See [`CorrelationEngine::compute`]
    pub fn correlation(&self) -> Result<CorrelationMatrix> {
        CorrelationEngine::new()
            .with_parallel(self.config.parallel)
            .compute(&self.trajectory)
    }

    /// Neighbor ranking around the configured reference agent
    ///
    /// # Errors
    ///
    /// See [`DistanceEngine::rank`]
    pub fn neighbors(&self) -> Result<NeighborRanking> {
        DistanceEngine::periodic(self.config.period)?
            .rank(&self.trajectory, self.config.reference_agent)
    }

    /// Run every analysis selected by `config.analysis`
    ///
    /// # Errors
    ///
    /// The first error of any selected analysis
    pub fn run(&self) -> Result<AnalysisReport> {
        let correlation = if self.config.analysis.includes_correlation() {
            Some(self.correlation()?.to_rows())
        } else {
            None
        };

        let neighbors = if self.config.analysis.includes_neighbors() {
            let ranking = self.neighbors()?;
            let k = self.config.group_size;
            Some(NeighborReport {
                reference: ranking.reference(),
                group_size: k,
                period: self.config.period,
                nearest: ranking.nearest(k).to_vec(),
                furthest: ranking.furthest(k).to_vec(),
            })
        } else {
            None
        };

        Ok(AnalysisReport {
            steps: self.trajectory.num_steps(),
            agents: self.trajectory.num_agents(),
            time_axis: self.trajectory.time_axis(),
            header: self.header.clone(),
            correlation,
            neighbors,
        })
    }
}

/// Everything a plotting front end needs from one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Number of time steps T
    pub steps: usize,
    /// Number of agents N
    pub agents: usize,
    /// 1-based step numbers, `1..=T`
    pub time_axis: Vec<usize>,
    /// Header metadata, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<SimulationHeader>,
    /// N x N correlation rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<Vec<Vec<f64>>>,
    /// Nearest and furthest groups around the reference agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<NeighborReport>,
}

/// Nearest/furthest neighbor groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborReport {
    /// Reference agent id
    pub reference: usize,
    /// Requested group size k
    pub group_size: usize,
    /// Domain period used for the metric
    pub period: f64,
    /// First k entries of the ranking, nearest first
    pub nearest: Vec<DistanceSeries>,
    /// Last k entries of the ranking, in ranking order
    pub furthest: Vec<DistanceSeries>,
}
