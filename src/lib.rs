//! # flock-analytics: Boid Trajectory Post-Processing
//!
//! **Version**: 0.1.0
//!
//! Reads the delimited position log written by a boid simulation and
//! answers two questions about it:
//!
//! - how correlated is the motion of every pair of agents
//!   ([`CorrelationEngine`])
//! - which agents stay nearest to and furthest from a reference agent on a
//!   periodic (toroidal) domain ([`DistanceEngine`])
//!
//! ## Pipeline
//!
//! ```text
//! log file ──► TrajectoryParser ──► Trajectory ──┬──► DistanceEngine ──► NeighborRanking
//!                                                └──► CorrelationEngine ──► CorrelationMatrix
//! ```
//!
//! The [`Trajectory`] is built once, validated for shape, and only read
//! afterwards. Both engines are independent consumers of it.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use flock_analytics::{CorrelationEngine, DistanceEngine, TrajectoryParser};
//!
//! let trajectory = TrajectoryParser::default().open("test.txt")?.into_trajectory();
//!
//! let ranking = DistanceEngine::periodic(1000.0)?.rank(&trajectory, 0)?;
//! for series in ranking.nearest(4) {
//!     println!("agent {} mean distance {:.2}", series.agent(), series.mean());
//! }
//!
//! let matrix = CorrelationEngine::new().compute(&trajectory)?;
//! println!("corr[0][1] = {:?}", matrix.get(0, 1));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod config;
pub mod correlation;
pub mod distance;
pub mod error;
pub mod metric;
pub mod ranking;
pub mod trajectory;

pub use analysis::{AnalysisReport, AnalysisSession, NeighborReport};
pub use config::{AnalysisConfig, AnalysisKind, ParserConfig};
pub use correlation::{pearson, CorrelationEngine, CorrelationMatrix};
pub use distance::{DistanceEngine, DistanceSeries, NeighborRanking};
pub use error::{Error, Result};
pub use metric::{DistanceMetric, EuclideanMetric, PeriodicMetric};
pub use ranking::{select_top_k, SortOrder};
pub use trajectory::{
    Axis, ParsedTrajectory, Position, SimulationHeader, TimeStep, Trajectory, TrajectoryParser,
};
