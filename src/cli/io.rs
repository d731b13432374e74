//! Input and output plumbing shared by the subcommands.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::config::{CommandOptions, Resolved};
use crate::core::collection::Collection;
use crate::core::record::Record;
use crate::engine::Engine;
use crate::parsing::fastx::{read_collections, write_collection};
use crate::utils::validation::{is_gzipped, is_stdio};

/// A destination: stdout, a plain file, or a gzip file chosen by extension
pub enum Output {
    Stdout(BufWriter<Stdout>),
    File(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Output {
    /// Open `path` for writing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        if is_stdio(path) {
            return Ok(Self::Stdout(BufWriter::new(io::stdout())));
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let writer = BufWriter::new(file);
        if is_gzipped(path) {
            Ok(Self::Gzip(GzEncoder::new(writer, Compression::default())))
        } else {
            Ok(Self::File(writer))
        }
    }

    /// Flush everything, writing the gzip trailer if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the final write fails.
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Stdout(mut w) => w.flush(),
            Self::File(mut w) => w.flush(),
            Self::Gzip(w) => w.finish()?.flush(),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}

/// Inputs to read, `-` (stdin) when none are given
#[must_use]
pub fn input_paths(inputs: &[PathBuf]) -> Vec<PathBuf> {
    if inputs.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        inputs.to_vec()
    }
}

/// Read every input and union them into one collection, in input order
///
/// # Errors
///
/// Returns an error if any input cannot be read or decoded.
pub fn read_union<O: CommandOptions>(
    engine: &Engine,
    inputs: &[PathBuf],
    options: &Resolved<O>,
) -> anyhow::Result<Collection<Record>> {
    let paths = input_paths(inputs);
    let collections = read_collections(engine, &paths, options)?;
    debug!(inputs = paths.len(), "Read inputs");
    Ok(engine.union(collections))
}

/// Write records to `path` as FASTA/FASTQ
///
/// # Errors
///
/// Returns an error if the output cannot be created or written.
pub fn write_records(
    engine: &Engine,
    records: &Collection<Record>,
    line_width: usize,
    path: &Path,
) -> anyhow::Result<u64> {
    let mut output = Output::create(path)?;
    let written = write_collection(engine, records, line_width, &mut output)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    output.finish()?;
    Ok(written)
}

/// Write one line per item to `path`
///
/// # Errors
///
/// Returns an error if the output cannot be created or written.
pub fn write_lines<I, S>(path: &Path, lines: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut output = Output::create(path)?;
    for line in lines {
        writeln!(output, "{}", line.as_ref())?;
    }
    output.finish()?;
    Ok(())
}

/// Non-empty, trimmed lines of a text file
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}
