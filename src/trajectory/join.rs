//! Join partial logs into one trajectory log
//!
//! A distributed run writes one log per node, each covering a disjoint
//! range of agents for the same time steps and each carrying the same
//! header. Joining keeps the first header and concatenates line `i` of
//! every file into line `i` of the output, so the result is ordinary
//! parser input.

use crate::{Error, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Find the files whose name starts with `prefix`, sorted by name
///
/// The prefix may contain a directory part (`out/multi-node-`); only the
/// final component is matched against file names.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory cannot be listed, or with
/// `NotFound` if nothing matches.
pub fn discover(prefix: &str) -> Result<Vec<PathBuf>> {
    let prefix_path = Path::new(prefix);
    let (dir, stem) = if prefix.ends_with(std::path::MAIN_SEPARATOR) {
        (prefix_path.to_path_buf(), String::new())
    } else {
        let dir = prefix_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let stem = prefix_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        (dir, stem)
    };

    let mut matches = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(&stem) {
            matches.push(entry.path());
        }
    }
    matches.sort();

    if matches.is_empty() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no files match prefix {prefix:?}"),
        )));
    }
    Ok(matches)
}

/// Join already-open sources into `writer`
///
/// The header is copied from the first source; the other headers are
/// skipped. Joining stops when the shortest source runs out.
///
/// # Returns
///
/// Number of joined (non-header) lines written
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `sources` is empty, and
/// [`Error::Io`] if a source is shorter than the header or any read or
/// write fails.
pub fn join_sources<R: BufRead, W: Write>(
    sources: Vec<R>,
    header_lines: usize,
    mut writer: W,
) -> Result<usize> {
    if sources.is_empty() {
        return Err(Error::InvalidInput("no sources to join".to_string()));
    }

    let mut streams: Vec<_> = sources.into_iter().map(BufRead::lines).collect();

    for (index, stream) in streams.iter_mut().enumerate() {
        for _ in 0..header_lines {
            let line = stream.next().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("source {index} ended inside the {header_lines}-line header"),
                )
            })??;
            if index == 0 {
                writeln!(writer, "{line}")?;
            }
        }
    }

    let mut joined = 0;
    'rows: loop {
        let mut row = String::new();
        for stream in &mut streams {
            match stream.next() {
                Some(line) => row.push_str(&line?),
                None => break 'rows,
            }
        }
        writeln!(writer, "{row}")?;
        joined += 1;
    }

    writer.flush()?;
    Ok(joined)
}

/// Join every file matching `prefix` into `output`
///
/// `output` itself is never treated as an input, even if it matches.
///
/// # Returns
///
/// Number of joined (non-header) lines written
///
/// # Errors
///
/// Same as [`discover`] and [`join_sources`]
pub fn join_files<P: AsRef<Path>>(prefix: &str, output: P, header_lines: usize) -> Result<usize> {
    let output = output.as_ref();
    let inputs: Vec<PathBuf> = discover(prefix)?
        .into_iter()
        .filter(|path| !same_file(path, output))
        .collect();
    if inputs.is_empty() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no input files match prefix {prefix:?}"),
        )));
    }

    tracing::info!(files = inputs.len(), output = %output.display(), "joining partial logs");
    for path in &inputs {
        tracing::debug!(path = %path.display(), "join input");
    }

    let sources = inputs
        .iter()
        .map(|path| File::open(path).map(BufReader::new))
        .collect::<io::Result<Vec<_>>>()?;
    let writer = BufWriter::new(File::create(output)?);

    let joined = join_sources(sources, header_lines, writer)?;
    tracing::info!(lines = joined, "joined partial logs");
    Ok(joined)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
