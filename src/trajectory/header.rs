//! Simulator metadata from the log header
//!
//! The parser treats the header as opaque. This view reads the
//! `Key: value` lines the simulator writes there, for cross-checks only;
//! lines it does not recognise are ignored rather than rejected.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// C `ctime` layout, e.g. `Mon Oct 19 16:48:00 2026`
const CTIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Metadata declared by the simulator; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationHeader {
    /// Wall-clock time the simulation ran
    pub created: Option<NaiveDateTime>,
    /// Declared number of agents
    pub agents: Option<usize>,
    /// Declared side length of the simulation area
    pub area_size: Option<f64>,
    /// Declared number of simulation steps
    pub steps: Option<usize>,
}

impl SimulationHeader {
    /// Read whatever metadata the header lines declare
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut header = Self::default();

        for line in lines {
            let Some((key, value)) = line.as_ref().split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "Time of Simulation" => header.created = parse_ctime(value),
                "Number of Boids" => header.agents = value.parse().ok(),
                "Size of Simulation Area" => {
                    header.area_size = value.parse().ok().filter(|v: &f64| v.is_finite());
                }
                "Number of Simulation Steps" => header.steps = value.parse().ok(),
                _ => {}
            }
        }

        header
    }

    /// Domain period implied by the area size, if declared and positive
    #[must_use]
    pub fn period(&self) -> Option<f64> {
        self.area_size.filter(|size| *size > 0.0)
    }

    /// Describe every declared count that disagrees with a parsed shape
    #[must_use]
    pub fn mismatches(&self, steps: usize, agents: usize) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(declared) = self.agents.filter(|&n| n != agents) {
            out.push(format!("header declares {declared} agents, log holds {agents}"));
        }
        if let Some(declared) = self.steps.filter(|&n| n != steps) {
            out.push(format!("header declares {declared} steps, log holds {steps}"));
        }
        out
    }
}

fn parse_ctime(value: &str) -> Option<NaiveDateTime> {
    // ctime pads single-digit days with a space
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, CTIME_FORMAT).ok()
}
