//! Analysis configuration
//!
//! Header length, separators, domain period, reference agent and group
//! size are all plain settings with documented defaults.
//! Configs can be built in code through [`AnalysisConfig::builder`] or
//! loaded from JSON; missing JSON fields fall back to the defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lines of opaque metadata written by the simulator before the first step
pub const DEFAULT_HEADER_LINES: usize = 7;

/// Side length of the cubic simulation domain
pub const DEFAULT_PERIOD: f64 = 1000.0;

/// Number of nearest / furthest neighbors reported
pub const DEFAULT_GROUP_SIZE: usize = 4;

/// Delimited text layout of the trajectory log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Leading lines skipped before the first time step
    pub header_lines: usize,
    /// Terminator written after every agent record (`$`)
    pub record_terminator: char,
    /// Separator between the coordinates of one record (`:`)
    pub coordinate_separator: char,
    /// Coordinates per record
    pub dimensions: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_lines: DEFAULT_HEADER_LINES,
            record_terminator: '$',
            coordinate_separator: ':',
            dimensions: 3,
        }
    }
}

impl ParserConfig {
    /// Check the layout is usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the separators collide or are line
    /// breaks, or if `dimensions` is not 3.
    pub fn validate(&self) -> Result<()> {
        if self.record_terminator == self.coordinate_separator {
            return Err(Error::Config(format!(
                "record terminator and coordinate separator must differ (both {:?})",
                self.record_terminator
            )));
        }
        if [self.record_terminator, self.coordinate_separator]
            .iter()
            .any(|c| matches!(c, '\n' | '\r'))
        {
            return Err(Error::Config(
                "separators cannot be line breaks".to_string(),
            ));
        }
        if self.dimensions != 3 {
            return Err(Error::Config(format!(
                "only 3D positions are supported, got dimensions = {}",
                self.dimensions
            )));
        }
        Ok(())
    }
}

/// Which analyses a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Pairwise correlation matrix only
    Correlation,
    /// Distance series and nearest/furthest ranking only
    Neighbors,
    /// Both analyses
    #[default]
    All,
}

impl AnalysisKind {
    /// True if the correlation matrix is requested
    #[must_use]
    pub const fn includes_correlation(self) -> bool {
        matches!(self, Self::Correlation | Self::All)
    }

    /// True if the neighbor ranking is requested
    #[must_use]
    pub const fn includes_neighbors(self) -> bool {
        matches!(self, Self::Neighbors | Self::All)
    }
}

/// Full configuration of one analysis session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input layout
    pub parser: ParserConfig,
    /// Domain period L, uniform across axes
    pub period: f64,
    /// Reference agent for the distance analysis
    pub reference_agent: usize,
    /// k nearest and k furthest neighbors to report
    pub group_size: usize,
    /// Analyses to run
    pub analysis: AnalysisKind,
    /// Compute correlation cells on the rayon pool
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            period: DEFAULT_PERIOD,
            reference_agent: 0,
            group_size: DEFAULT_GROUP_SIZE,
            analysis: AnalysisKind::default(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Create a builder starting from the defaults
    #[must_use]
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Parse a JSON document; absent fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the JSON is malformed or the result
    /// fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("malformed JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check every field
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a non-finite or non-positive period,
    /// a zero group size, or an invalid parser layout.
    pub fn validate(&self) -> Result<()> {
        if !self.period.is_finite() || self.period <= 0.0 {
            return Err(Error::Config(format!(
                "period must be a positive finite number, got {}",
                self.period
            )));
        }
        if self.group_size == 0 {
            return Err(Error::Config("group_size must be greater than 0".to_string()));
        }
        self.parser.validate()
    }
}

/// Builder for [`AnalysisConfig`]
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Set the input layout
    #[must_use]
    pub fn parser(mut self, parser: ParserConfig) -> Self {
        self.config.parser = parser;
        self
    }

    /// Set the number of header lines to skip
    #[must_use]
    pub fn header_lines(mut self, lines: usize) -> Self {
        self.config.parser.header_lines = lines;
        self
    }

    /// Set the domain period
    #[must_use]
    pub fn period(mut self, period: f64) -> Self {
        self.config.period = period;
        self
    }

    /// Set the reference agent
    #[must_use]
    pub fn reference_agent(mut self, agent: usize) -> Self {
        self.config.reference_agent = agent;
        self
    }

    /// Set the nearest/furthest group size
    #[must_use]
    pub fn group_size(mut self, k: usize) -> Self {
        self.config.group_size = k;
        self
    }

    /// Select the analyses to run
    #[must_use]
    pub fn analysis(mut self, kind: AnalysisKind) -> Self {
        self.config.analysis = kind;
        self
    }

    /// Enable or disable the parallel correlation matrix
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Validate and build
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any field is invalid
    pub fn build(self) -> Result<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
