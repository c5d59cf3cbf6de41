//! Delimited trajectory log parser
//!
//! Input layout (one time step per line after a fixed-size header):
//!
//! ```text
//! <header line 1>
//! ...
//! <header line 7>
//! x0:y0:z0$x1:y1:z1$...$xN:yN:zN$
//! x0:y0:z0$x1:y1:z1$...$xN:yN:zN$
//! ```
//!
//! Parsing is all-or-nothing: the first malformed token aborts the whole
//! read and no partial [`Trajectory`] is ever returned.

use super::{Position, SimulationHeader, TimeStep, Trajectory};
use crate::config::ParserConfig;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

/// Parsed log: raw header lines plus the validated trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrajectory {
    header: Vec<String>,
    trajectory: Trajectory,
}

impl ParsedTrajectory {
    /// Raw header lines, untouched
    #[must_use]
    pub fn header_lines(&self) -> &[String] {
        &self.header
    }

    /// Best-effort view of the simulator metadata in the header
    #[must_use]
    pub fn header(&self) -> SimulationHeader {
        SimulationHeader::from_lines(&self.header)
    }

    /// The trajectory dataset
    #[must_use]
    pub const fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Drop the header and keep the dataset
    #[must_use]
    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }

    /// Split into header lines and dataset
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Trajectory) {
        (self.header, self.trajectory)
    }
}

/// Parser for the `$` / `:` delimited trajectory log
#[derive(Debug, Clone, Default)]
pub struct TrajectoryParser {
    config: ParserConfig,
}

impl TrajectoryParser {
    /// Create a parser for the given layout
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the layout is invalid
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Layout this parser reads
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Open and parse a trajectory log file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened or read, and any
    /// error of [`read`](Self::read).
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<ParsedTrajectory> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening trajectory log");
        let file = File::open(path)?;
        self.read(BufReader::new(file))
    }

    /// Parse a log held in memory, discarding the header
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read)
    pub fn parse_str(&self, text: &str) -> Result<Trajectory> {
        self.read(text.as_bytes()).map(ParsedTrajectory::into_trajectory)
    }

    /// Parse a complete log from a buffered reader
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the source ends inside the header
    /// - [`Error::Parse`] for a token that is not a finite number, a field
    ///   without exactly three coordinates, or a line missing its trailing
    ///   record terminator
    /// - [`Error::Shape`] when a line holds a different agent count than
    ///   the first line
    /// - [`Error::Io`] if reading fails
    pub fn read<R: BufRead>(&self, reader: R) -> Result<ParsedTrajectory> {
        let start = Instant::now();
        let mut lines = reader.lines();

        let mut header = Vec::with_capacity(self.config.header_lines);
        for _ in 0..self.config.header_lines {
            match lines.next() {
                Some(line) => header.push(line?),
                None => {
                    return Err(Error::InvalidInput(format!(
                        "source ended after {} of {} header lines",
                        header.len(),
                        self.config.header_lines
                    )))
                }
            }
        }
        tracing::debug!(lines = header.len(), "skipped header");

        let mut steps: Vec<TimeStep> = Vec::new();
        for (offset, line) in lines.enumerate() {
            let line = line?;
            let line_no = self.config.header_lines + offset + 1;
            let step = self.parse_line(&line, line_no)?;

            if let Some(first) = steps.first() {
                if step.len() != first.len() {
                    return Err(Error::Shape {
                        step: steps.len(),
                        expected: first.len(),
                        found: step.len(),
                    });
                }
            }
            steps.push(step);
        }

        let trajectory = Trajectory::new(steps)?;
        tracing::info!(
            steps = trajectory.num_steps(),
            agents = trajectory.num_agents(),
            elapsed = ?start.elapsed(),
            "parsed trajectory"
        );

        Ok(ParsedTrajectory { header, trajectory })
    }

    /// Parse one time step line
    fn parse_line(&self, line: &str, line_no: usize) -> Result<TimeStep> {
        let mut fields: Vec<&str> = line.split(self.config.record_terminator).collect();

        // The terminator after the last record leaves one empty trailing field.
        let trailing = fields.pop().unwrap_or_default();
        if !trailing.trim().is_empty() {
            return Err(Error::Parse {
                line: line_no,
                tokens: vec![trailing.to_string()],
            });
        }

        fields
            .into_iter()
            .map(|field| self.parse_field(field, line_no))
            .collect::<Result<Vec<_>>>()
            .map(TimeStep::new)
    }

    /// Parse one `x:y:z` record
    fn parse_field(&self, field: &str, line_no: usize) -> Result<Position> {
        let tokens: Vec<&str> = field.split(self.config.coordinate_separator).collect();
        let malformed = || Error::Parse {
            line: line_no,
            tokens: tokens.iter().map(ToString::to_string).collect(),
        };

        if tokens.len() != self.config.dimensions {
            return Err(malformed());
        }

        let mut coords = [0.0f64; 3];
        for (slot, token) in coords.iter_mut().zip(&tokens) {
            match token.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => *slot = value,
                _ => return Err(malformed()),
            }
        }

        Ok(Position::from(coords))
    }
}
