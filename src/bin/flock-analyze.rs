//! Analyze one boid trajectory log and print the report as JSON
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only the
//! JSON report.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use flock_analytics::{AnalysisConfig, AnalysisKind, AnalysisSession, TrajectoryParser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// More user arguments than this and only the usage text is printed
const MAX_ARGS: usize = 9;

#[derive(Parser, Debug)]
#[command(name = "flock-analyze", version)]
#[command(about = "Correlation and neighbor analysis of boid simulation trajectories")]
struct Cli {
    /// Trajectory log to analyze
    #[arg(default_value = "test.txt")]
    input: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Domain period L (side of the periodic cube)
    #[arg(short, long)]
    period: Option<f64>,

    /// Take the period from the header's "Size of Simulation Area"
    #[arg(long, conflicts_with = "period")]
    period_from_header: bool,

    /// Reference agent for the neighbor analysis
    #[arg(short, long)]
    reference: Option<usize>,

    /// Size k of the nearest and furthest groups
    #[arg(short = 'k', long)]
    group_size: Option<usize>,

    /// Analyses to run
    #[arg(short, long, value_enum)]
    analysis: Option<AnalysisArg>,

    /// Compute the correlation matrix on a single thread
    #[arg(long)]
    no_parallel: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AnalysisArg {
    Correlation,
    Neighbors,
    All,
}

impl From<AnalysisArg> for AnalysisKind {
    fn from(arg: AnalysisArg) -> Self {
        match arg {
            AnalysisArg::Correlation => Self::Correlation,
            AnalysisArg::Neighbors => Self::Neighbors,
            AnalysisArg::All => Self::All,
        }
    }
}

impl Cli {
    fn config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        if let Some(period) = self.period {
            config.period = period;
        }
        if let Some(reference) = self.reference {
            config.reference_agent = reference;
        }
        if let Some(k) = self.group_size {
            config.group_size = k;
        }
        if let Some(analysis) = self.analysis {
            config.analysis = analysis.into();
        }
        if self.no_parallel {
            config.parallel = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    if std::env::args_os().len() > MAX_ARGS + 1 {
        println!("{}", Cli::command().render_help());
        return Ok(());
    }
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = cli.config()?;
    config.validate()?;

    let parsed = TrajectoryParser::new(config.parser.clone())?
        .open(&cli.input)
        .with_context(|| format!("reading trajectory {}", cli.input.display()))?;
    let header = parsed.header();
    let trajectory = parsed.into_trajectory();

    for mismatch in header.mismatches(trajectory.num_steps(), trajectory.num_agents()) {
        tracing::warn!("{mismatch}");
    }

    if cli.period_from_header {
        match header.period() {
            Some(period) => {
                tracing::info!(period, "using period from header");
                config.period = period;
            }
            None => tracing::warn!(
                period = config.period,
                "header declares no simulation area size, keeping configured period"
            ),
        }
    }

    let report = AnalysisSession::new(trajectory, config)?
        .with_header(header)
        .run()?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
