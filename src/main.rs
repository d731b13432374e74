use bigseq::cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flags
    let filter = if cli.global.verbose {
        EnvFilter::new("bigseq=debug,info")
    } else if cli.global.is_quiet() {
        EnvFilter::new("bigseq=error")
    } else {
        EnvFilter::new("bigseq=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = &cli.global;
    match cli.command {
        cli::Commands::Common(args) => cli::join::run_common(args, global)?,
        cli::Commands::Concat(args) => cli::join::run_concat(args, global)?,
        cli::Commands::Pair(args) => cli::join::run_pair(args, global)?,
        cli::Commands::Rmdup(args) => cli::join::run_rmdup(args, global)?,
        cli::Commands::Rename(args) => cli::join::run_rename(args, global)?,
        cli::Commands::Duplicate(args) => cli::join::run_duplicate(args, global)?,
        cli::Commands::Range(args) => cli::order::run_range(args, global)?,
        cli::Commands::Head(args) => cli::order::run_head(args, global)?,
        cli::Commands::HeadGenome(args) => cli::order::run_head_genome(args, global)?,
        cli::Commands::Sort(args) => cli::order::run_sort(args, global)?,
        cli::Commands::Faidx(args) => cli::order::run_faidx(args, global)?,
        cli::Commands::Sample(args) => cli::random::run_sample(args, global)?,
        cli::Commands::Shuffle(args) => cli::random::run_shuffle(args, global)?,
    }

    Ok(())
}
