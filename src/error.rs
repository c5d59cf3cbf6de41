//! Error types for flock-analytics
//!
//! Every failure is fatal for the analysis that raised it: no variant is
//! ever downgraded to a default value or a partial result.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// flock-analytics error types
#[derive(Error, Debug)]
pub enum Error {
    /// A coordinate token is not a valid number
    #[error("Parse error on line {line}: cannot read coordinates from tokens {tokens:?}")]
    Parse {
        /// 1-based line number in the source (header lines included)
        line: usize,
        /// Raw coordinate tokens of the offending field
        tokens: Vec<String>,
    },

    /// A time step does not hold the expected number of agents
    #[error("Shape error at time step {step}: expected {expected} entries, found {found}")]
    Shape {
        /// 0-based time step index
        step: usize,
        /// Entry count established by the first time step
        expected: usize,
        /// Entry count actually present
        found: usize,
    },

    /// Agent id outside `[0, N)`
    #[error("Agent {agent} out of range: valid ids are [0, {agents})")]
    AgentOutOfRange {
        /// Requested agent id
        agent: usize,
        /// Number of agents N in the trajectory
        agents: usize,
    },

    /// Pearson correlation is undefined for a constant coordinate series
    #[error("Correlation undefined for agents ({agent_a}, {agent_b}): zero variance on the {axis} axis")]
    ZeroVariance {
        /// Row of the offending cell
        agent_a: usize,
        /// Column of the offending cell
        agent_b: usize,
        /// Axis name (`x`, `y` or `z`)
        axis: &'static str,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid input (empty trajectory, k == 0, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
