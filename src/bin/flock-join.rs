//! Join partial trajectory logs that cover disjoint agent ranges
//!
//! `flock-join PREFIX OUTPUT` reads every file whose name starts with
//! `PREFIX`, keeps the header of the first one, and writes `OUTPUT.txt`.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use flock_analytics::config::DEFAULT_HEADER_LINES;
use flock_analytics::trajectory::join;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flock-join", version)]
#[command(about = "Join every PREFIX* trajectory log into OUTPUT.txt")]
struct Cli {
    /// File name prefix of the partial logs (may include a directory)
    prefix: String,

    /// Output name; `.txt` is appended
    output: String,

    /// Header lines at the top of every partial log
    #[arg(long, default_value_t = DEFAULT_HEADER_LINES)]
    header_lines: usize,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            println!("{}", Cli::command().render_help());
            return Ok(());
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let output = format!("{}.txt", cli.output);
    let lines = join::join_files(&cli.prefix, &output, cli.header_lines)
        .with_context(|| format!("joining {}* into {output}", cli.prefix))?;
    println!("wrote {lines} time steps to {output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_positionals() {
        let cli = Cli::try_parse_from(["flock-join", "out/multi-node-", "joined"]).unwrap();
        assert_eq!(cli.prefix, "out/multi-node-");
        assert_eq!(cli.output, "joined");
        assert_eq!(cli.header_lines, 7);
    }

    #[test]
    fn test_wrong_argument_count_rejected() {
        assert!(Cli::try_parse_from(["flock-join"]).is_err());
        assert!(Cli::try_parse_from(["flock-join", "prefix"]).is_err());
        assert!(Cli::try_parse_from(["flock-join", "a", "b", "c"]).is_err());
    }

    #[test]
    fn test_command_is_consistent() {
        Cli::command().debug_assert();
    }
}
