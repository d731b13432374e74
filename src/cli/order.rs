use std::path::PathBuf;

use clap::Args;
use tracing::{debug, warn};

use crate::cli::io::{read_lines, read_union, write_lines, write_records};
use crate::cli::{GlobalArgs, OutputFormat};
use crate::config::{
    resolve, FaidxOptions, HeadGenomeOptions, HeadOptions, RangeOptions, SortOptions,
};
use crate::engine::Engine;
use crate::parsing::fastx::read_spanned;
use crate::pipeline;
use crate::pipeline::FaiEntry;
use crate::utils::validation::is_gzipped;

#[derive(Args)]
pub struct RangeArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Range as start:end, 1-based and inclusive; negative positions count from the end
    /// (e.g. 1:12, -12:-1, 101:)
    #[arg(short = 'r', long, required = true, allow_hyphen_values = true)]
    pub range: String,
}

/// Execute range subcommand
///
/// # Errors
///
/// Returns an error if the range is invalid, an input cannot be read, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_range(args: RangeArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        RangeOptions {
            kit: global.kit(),
            range: args.range.clone(),
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let selected = pipeline::range(&engine, input, &options)?;
    write_records(&engine, &selected, options.kit.line_width, &global.out_file)?;
    Ok(())
}

#[derive(Args)]
pub struct HeadArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Number of records
    #[arg(short = 'n', long, default_value = "10")]
    pub number: u64,
}

/// Execute head subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_head(args: HeadArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        HeadOptions {
            kit: global.kit(),
            number: args.number,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let selected = pipeline::head(&engine, input, &options)?;
    write_records(&engine, &selected, options.kit.line_width, &global.out_file)?;
    Ok(())
}

#[derive(Args)]
pub struct HeadGenomeArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Minimum leading description words shared with the first record
    #[arg(short = 'm', long, default_value = "1")]
    pub mini_common_words: usize,
}

/// Execute head-genome subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, the first record
/// has no description, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_head_genome(args: HeadGenomeArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        HeadGenomeOptions {
            kit: global.kit(),
            mini_common_words: args.mini_common_words,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let genome = pipeline::head_genome(&engine, input, &options)?;
    write_records(&engine, &genome, options.kit.line_width, &global.out_file)?;
    Ok(())
}

#[allow(clippy::struct_excessive_bools)] // One flag per sort key, as on the command line
#[derive(Args)]
pub struct SortArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Sort by full header
    #[arg(short = 'n', long)]
    pub by_name: bool,

    /// Sort by sequence
    #[arg(short = 's', long)]
    pub by_seq: bool,

    /// Sort by sequence length
    #[arg(short = 'l', long)]
    pub by_length: bool,

    /// Sort by non-gap bases (implies --by-length)
    #[arg(short = 'b', long)]
    pub by_bases: bool,

    /// Letters not counted with --by-bases
    #[arg(short = 'G', long, default_value = "- \t.")]
    pub gap_letters: String,

    /// Sort in descending order
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Ignore case
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Compare identifiers in natural order (chr2 before chr10)
    #[arg(short = 'N', long)]
    pub natural_order: bool,

    /// Leading bases compared with --by-seq, 0 for the whole sequence
    #[arg(long, default_value = "10000")]
    pub seq_prefix_length: usize,
}

/// Execute sort subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_sort(args: SortArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        SortOptions {
            kit: global.kit(),
            by_name: args.by_name,
            by_seq: args.by_seq,
            by_length: args.by_length,
            by_bases: args.by_bases,
            gap_letters: args.gap_letters.clone(),
            reverse: args.reverse,
            ignore_case: args.ignore_case,
            natural_order: args.natural_order,
            seq_prefix_length: args.seq_prefix_length,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let sorted = pipeline::sort(&engine, input, &options)?;
    write_records(&engine, &sorted, options.kit.line_width, &global.out_file)?;
    Ok(())
}

#[derive(Args)]
pub struct FaidxArgs {
    /// Input file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Regions to extract: id, id:b-e, id:b, id:b- or id:-e
    #[arg(allow_hyphen_values = true)]
    pub regions: Vec<String>,

    /// File with one region per line, read before the regions given as arguments
    #[arg(short = 'l', long)]
    pub region_file: Option<PathBuf>,

    /// Regions are regular expressions matched against identifiers
    #[arg(short = 'r', long)]
    pub use_regexp: bool,

    /// Ignore case
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Name extracted records by full header instead of identifier
    #[arg(long)]
    pub full_head: bool,

    /// Where to write the index when regions are extracted
    #[arg(long)]
    pub index_file: Option<PathBuf>,
}

/// Execute faidx subcommand
///
/// Without regions the index is written to the output. With regions the extracted
/// records are written to the output and the index to `--index-file`, if given.
///
/// # Errors
///
/// Returns an error if options are invalid, the input cannot be read, or an output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_faidx(args: FaidxArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut regions = match &args.region_file {
        Some(path) => read_lines(path)?,
        None => Vec::new(),
    };
    regions.extend(args.regions.iter().cloned());

    let options = resolve(
        FaidxOptions {
            kit: global.kit(),
            use_regexp: args.use_regexp,
            ignore_case: args.ignore_case,
            full_head: args.full_head,
            regions,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    if is_gzipped(&args.input) {
        warn!(path = %args.input.display(), "Index offsets refer to the decompressed content");
    }
    let input = read_spanned(&engine, &args.input, &options, engine.default_partitions())?;
    let output = pipeline::faidx(&engine, &input, &options)?;

    match &output.regions {
        None => write_index(&output.index, global.format, &global.out_file)?,
        Some(extracted) => {
            write_records(&engine, extracted, options.kit.line_width, &global.out_file)?;
            if let Some(path) = &args.index_file {
                write_index(&output.index, global.format, path)?;
            }
        }
    }
    debug!(entries = output.index.len(), "Wrote index");
    Ok(())
}

fn write_index(index: &[FaiEntry], format: OutputFormat, path: &std::path::Path) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => write_lines(path, index.iter().map(ToString::to_string)),
        OutputFormat::Json => write_lines(path, [serde_json::to_string_pretty(index)?]),
    }
}
