use std::path::PathBuf;

use anyhow::bail;
use clap::Args;

use crate::cli::io::{read_union, write_lines, write_records};
use crate::cli::{GlobalArgs, OutputFormat};
use crate::config::{
    resolve, CommonOptions, ConcatOptions, DuplicateOptions, PairOptions, RenameOptions,
    RmDupOptions,
};
use crate::engine::Engine;
use crate::parsing::fastx::{read_collection, read_collections};
use crate::pipeline;

#[derive(Args)]
pub struct CommonArgs {
    /// Input files, at least two
    #[arg(required = true, num_args = 2..)]
    pub inputs: Vec<PathBuf>,

    /// Match by full header instead of identifier
    #[arg(short = 'n', long)]
    pub by_name: bool,

    /// Match by sequence
    #[arg(short = 's', long)]
    pub by_seq: bool,

    /// Ignore case
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Only consider the positive strand when matching by sequence
    #[arg(short = 'P', long)]
    pub only_positive_strand: bool,
}

/// Execute common subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_common(args: CommonArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        CommonOptions {
            kit: global.kit(),
            by_name: args.by_name,
            by_seq: args.by_seq,
            ignore_case: args.ignore_case,
            only_positive_strand: args.only_positive_strand,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let inputs = read_collections(&engine, &args.inputs, &options)?;
    let common = pipeline::common(&engine, inputs, &options)?;
    write_records(&engine, &common, options.kit.line_width, &global.out_file)?;
    Ok(())
}

#[derive(Args)]
pub struct ConcatArgs {
    /// Left input
    pub left: PathBuf,

    /// Right input
    pub right: PathBuf,

    /// Keep records present in only one input
    #[arg(short = 'F', long)]
    pub full: bool,

    /// Separator between the descriptions of joined records
    #[arg(short = 's', long, default_value = "|")]
    pub separator: String,
}

/// Execute concat subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_concat(args: ConcatArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        ConcatOptions {
            kit: global.kit(),
            full: args.full,
            separator: args.separator.clone(),
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let partitions = engine.default_partitions();
    let left = read_collection(&engine, &args.left, &options, partitions)?;
    let right = read_collection(&engine, &args.right, &options, partitions)?;

    let joined = pipeline::concat(&engine, left, right, &options)?;
    write_records(&engine, &joined, options.kit.line_width, &global.out_file)?;
    Ok(())
}

#[derive(Args)]
pub struct PairArgs {
    /// First input, e.g. read 1
    pub left: PathBuf,

    /// Second input, e.g. read 2
    pub right: PathBuf,

    /// Output for paired records of the first input
    #[arg(long, default_value = "paired_1.fq")]
    pub out1: PathBuf,

    /// Output for paired records of the second input
    #[arg(long, default_value = "paired_2.fq")]
    pub out2: PathBuf,

    /// Also write records without a mate
    #[arg(short = 'u', long)]
    pub save_unpaired: bool,

    /// Output for records without a mate
    #[arg(long, default_value = "unpaired.fq")]
    pub unpaired: PathBuf,
}

/// Execute pair subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, or an output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_pair(args: PairArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        PairOptions {
            kit: global.kit(),
            save_unpaired: args.save_unpaired,
        },
        &global.overrides(),
    )?;
    if args.out1 == args.out2 {
        bail!("--out1 and --out2 must be different files");
    }

    let engine = Engine::new(&global.engine_config())?;
    let partitions = engine.default_partitions();
    let left = read_collection(&engine, &args.left, &options, partitions)?;
    let right = read_collection(&engine, &args.right, &options, partitions)?;

    let paired = pipeline::pair(&engine, left, right, &options)?;
    let line_width = options.kit.line_width;
    write_records(&engine, &paired.left, line_width, &args.out1)?;
    write_records(&engine, &paired.right, line_width, &args.out2)?;
    if let Some(unpaired) = &paired.unpaired {
        write_records(&engine, unpaired, line_width, &args.unpaired)?;
    }
    Ok(())
}

#[derive(Args)]
pub struct RmDupArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Compare full headers instead of identifiers
    #[arg(short = 'n', long)]
    pub by_name: bool,

    /// Compare sequences
    #[arg(short = 's', long)]
    pub by_seq: bool,

    /// Ignore case
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Only consider the positive strand when comparing sequences
    #[arg(short = 'P', long)]
    pub only_positive_strand: bool,

    /// Write the removed duplicates to this file
    #[arg(short = 'd', long)]
    pub dup_seqs_file: Option<PathBuf>,

    /// Write the number and identifiers of duplicates per key to this file
    #[arg(short = 'D', long)]
    pub dup_num_file: Option<PathBuf>,
}

/// Execute rmdup subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, or an output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_rmdup(args: RmDupArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        RmDupOptions {
            kit: global.kit(),
            by_name: args.by_name,
            by_seq: args.by_seq,
            ignore_case: args.ignore_case,
            only_positive_strand: args.only_positive_strand,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let deduped = pipeline::rmdup(&engine, input, &options)?;

    let line_width = options.kit.line_width;
    write_records(&engine, &deduped.kept, line_width, &global.out_file)?;
    if let Some(path) = &args.dup_seqs_file {
        write_records(&engine, &deduped.removed, line_width, path)?;
    }
    if let Some(path) = &args.dup_num_file {
        match global.format {
            OutputFormat::Text => write_lines(
                path,
                deduped
                    .duplicates
                    .iter()
                    .map(|d| format!("{}\t{}", d.count, d.ids.join(", "))),
            )?,
            OutputFormat::Json => {
                write_lines(path, [serde_json::to_string_pretty(&deduped.duplicates)?])?;
            }
        }
    }
    Ok(())
}

#[derive(Args)]
pub struct RenameArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Check duplication by full header instead of identifier
    #[arg(short = 'n', long)]
    pub by_name: bool,
}

/// Execute rename subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_rename(args: RenameArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        RenameOptions {
            kit: global.kit(),
            by_name: args.by_name,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let renamed = pipeline::rename(&engine, input, &options)?;
    write_records(&engine, &renamed, options.kit.line_width, &global.out_file)?;
    Ok(())
}

#[derive(Args)]
pub struct DuplicateArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Number of copies of every record
    #[arg(short = 'n', long, default_value = "1")]
    pub times: usize,
}

/// Execute duplicate subcommand
///
/// # Errors
///
/// Returns an error if options are invalid, an input cannot be read, or the output
/// cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_duplicate(args: DuplicateArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        DuplicateOptions {
            kit: global.kit(),
            times: args.times,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let repeated = pipeline::duplicate(&engine, input, &options)?;
    write_records(&engine, &repeated, options.kit.line_width, &global.out_file)?;
    Ok(())
}
