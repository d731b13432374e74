use std::path::PathBuf;

use clap::Args;

use crate::cli::io::{read_union, write_records};
use crate::cli::GlobalArgs;
use crate::config::{resolve, SampleOptions, ShuffleOptions};
use crate::engine::Engine;
use crate::pipeline;

#[derive(Args)]
pub struct SampleArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Random seed
    #[arg(short = 's', long, default_value = "11")]
    pub seed: u64,

    /// Approximate number of records to keep; takes precedence over --proportion
    #[arg(short = 'n', long, default_value = "0", allow_hyphen_values = true)]
    pub number: i64,

    /// Proportion of records to keep, in [0, 1]
    #[arg(short = 'p', long, default_value = "0")]
    pub proportion: f64,
}

/// Execute sample subcommand
///
/// # Errors
///
/// Returns an error if neither a number nor a proportion is given, an input cannot be
/// read, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_sample(args: SampleArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        SampleOptions {
            kit: global.kit(),
            seed: args.seed,
            number: args.number,
            proportion: args.proportion,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let sampled = pipeline::sample(&engine, input, &options)?;
    write_records(&engine, &sampled, options.kit.line_width, &global.out_file)?;
    Ok(())
}

#[derive(Args)]
pub struct ShuffleArgs {
    /// Input files, unioned ("-" or none for stdin)
    pub inputs: Vec<PathBuf>,

    /// Random seed
    #[arg(short = 's', long, default_value = "23")]
    pub seed: u64,
}

/// Execute shuffle subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_shuffle(args: ShuffleArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let options = resolve(
        ShuffleOptions {
            kit: global.kit(),
            seed: args.seed,
        },
        &global.overrides(),
    )?;

    let engine = Engine::new(&global.engine_config())?;
    let input = read_union(&engine, &args.inputs, &options)?;
    let shuffled = pipeline::shuffle(&engine, input, &options);
    write_records(&engine, &shuffled, options.kit.line_width, &global.out_file)?;
    Ok(())
}
