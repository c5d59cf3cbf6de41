//! Trajectory data model
//!
//! A [`Trajectory`] is a dense `T x N x 3` block of agent positions:
//! T time steps, each holding the position of every one of N agents.
//!
//! The shape is validated once, when the trajectory is built. After that
//! the value is immutable and every engine indexes it by agent id without
//! re-checking lengths.
//!
//! ```text
//! Trajectory
//!   ├── TimeStep t=0   [Position(agent 0), Position(agent 1), ...]
//!   ├── TimeStep t=1   [Position(agent 0), Position(agent 1), ...]
//!   └── ...
//! ```

pub mod header;
pub mod join;
pub mod parser;

pub use header::SimulationHeader;
pub use parser::{ParsedTrajectory, TrajectoryParser};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Coordinate axis of a [`Position`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// First coordinate
    X,
    /// Second coordinate
    Y,
    /// Third coordinate
    Z,
}

impl Axis {
    /// All three axes, in coordinate order
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Lowercase axis name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }

    /// Coordinate index (0, 1 or 2)
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Position of one agent in 3D space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// x coordinate
    pub x: f64,
    /// y coordinate
    pub y: f64,
    /// z coordinate
    pub z: f64,
}

impl Position {
    /// Create a position from its coordinates
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Coordinate on the given axis
    #[must_use]
    pub const fn coord(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Coordinates as an array `[x, y, z]`
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Position {
    fn from(coords: [f64; 3]) -> Self {
        Self::new(coords[0], coords[1], coords[2])
    }
}

/// Positions of all agents at one discrete time step, indexed by agent id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStep {
    positions: Vec<Position>,
}

impl TimeStep {
    /// Create a time step from per-agent positions
    #[must_use]
    pub const fn new(positions: Vec<Position>) -> Self {
        Self { positions }
    }

    /// Number of agents in this step
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True if the step holds no agents
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of an agent, if the id is in range
    #[must_use]
    pub fn get(&self, agent: usize) -> Option<&Position> {
        self.positions.get(agent)
    }

    /// All positions, in agent id order
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }
}

impl From<Vec<Position>> for TimeStep {
    fn from(positions: Vec<Position>) -> Self {
        Self::new(positions)
    }
}

/// Immutable `T x N x 3` trajectory dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    steps: Vec<TimeStep>,
    agents: usize,
}

impl Trajectory {
    /// Build a trajectory, checking that every time step has the same agent count
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] naming the first time step whose agent count
    /// differs from step 0.
    pub fn new(steps: Vec<TimeStep>) -> Result<Self> {
        let agents = steps.first().map_or(0, TimeStep::len);

        if let Some((step, bad)) = steps
            .iter()
            .enumerate()
            .find(|(_, s)| s.len() != agents)
        {
            return Err(Error::Shape {
                step,
                expected: agents,
                found: bad.len(),
            });
        }

        Ok(Self { steps, agents })
    }

    /// Number of time steps T
    #[must_use]
    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Number of agents N
    #[must_use]
    pub const fn num_agents(&self) -> usize {
        self.agents
    }

    /// True if there are no time steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All time steps, in time order
    #[must_use]
    pub fn steps(&self) -> &[TimeStep] {
        &self.steps
    }

    /// Time step `t`, if in range
    #[must_use]
    pub fn step(&self, t: usize) -> Option<&TimeStep> {
        self.steps.get(t)
    }

    /// 1-based time axis `1..=T` used when plotting series
    #[must_use]
    pub fn time_axis(&self) -> Vec<usize> {
        (1..=self.steps.len()).collect()
    }

    /// Fail with [`Error::AgentOutOfRange`] unless `agent` is in `[0, N)`
    ///
    /// # Errors
    ///
    /// Returns error if the id is out of range
    pub fn check_agent(&self, agent: usize) -> Result<()> {
        if agent < self.agents {
            Ok(())
        } else {
            Err(Error::AgentOutOfRange {
                agent,
                agents: self.agents,
            })
        }
    }

    /// Position of `agent` at every time step
    ///
    /// # Errors
    ///
    /// Returns error if the agent id is out of range
    pub fn track(&self, agent: usize) -> Result<Vec<Position>> {
        self.check_agent(agent)?;
        Ok(self.steps.iter().map(|s| s.positions[agent]).collect())
    }

    /// One coordinate of `agent` over time
    ///
    /// # Errors
    ///
    /// Returns error if the agent id is out of range
    pub fn axis_series(&self, agent: usize, axis: Axis) -> Result<Vec<f64>> {
        self.check_agent(agent)?;
        Ok(self
            .steps
            .iter()
            .map(|s| s.positions[agent].coord(axis))
            .collect())
    }
}
