//! Command-line interface for bigseq.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **common**, **concat**, **pair**, **rmdup**, **rename**, **duplicate**: keyed joins
//! - **range**, **head**, **head-genome**, **sort**: positional selection and global ordering
//! - **faidx**: index an input file and extract regions
//! - **sample**, **shuffle**: seeded random selection and reordering
//!
//! ## Usage
//!
//! ```text
//! # Records present in every file, compared by sequence on both strands
//! bigseq common --by-seq a.fa b.fa c.fa
//!
//! # Remove duplicated reads and keep a report of what was dropped
//! bigseq rmdup --by-seq -D dups.txt reads.fq.gz -o dedup.fq.gz
//!
//! # Records 11 to the second last
//! bigseq range -r 11:-2 input.fa
//!
//! # Extract regions, the second one reverse complemented
//! bigseq faidx genome.fa chr1:1-100 chr2:200-101
//!
//! # Override any option by name
//! bigseq sort --set natural-order=true --set line-width=0 input.fa
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{parse_override, KitConfig, Overrides, DEFAULT_ID_REGEXP, DEFAULT_LINE_WIDTH};
use crate::core::types::SeqType;
use crate::engine::EngineConfig;

pub mod io;
pub mod join;
pub mod order;
pub mod random;

#[derive(Parser)]
#[command(name = "bigseq")]
#[command(version)]
#[command(about = "Partition-parallel set, order, index and sampling operations on FASTA/FASTQ")]
#[command(
    long_about = "bigseq splits FASTA/FASTQ input into partitions and runs every command as a data-parallel pipeline.\n\nSupported commands cover:\n- Set operations keyed by identifier, header or sequence (common, rmdup, rename, concat, pair)\n- Positional selection and global sorting (range, head, sort)\n- Indexing and region extraction (faidx)\n- Seeded sampling and shuffling (sample, shuffle)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only report errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Worker threads (0 for one per core)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    pub threads: usize,

    /// Partitions per input (0 for one per worker thread)
    #[arg(long, global = true, default_value = "0")]
    pub partitions: usize,

    /// FASTA line width, 0 disables wrapping
    #[arg(short = 'w', long, global = true, default_value_t = DEFAULT_LINE_WIDTH)]
    pub line_width: usize,

    /// Sequence type: dna, rna, protein, unlimit or auto
    #[arg(short = 't', long, global = true, default_value = "auto")]
    pub seq_type: SeqType,

    /// Regular expression whose first capture group is the record identifier
    #[arg(long, global = true, default_value = DEFAULT_ID_REGEXP)]
    pub id_regexp: String,

    /// Parse NCBI-style identifiers such as `gi|110645304|ref|NC_002516.2| desc`
    #[arg(long, global = true)]
    pub id_ncbi: bool,

    /// Output file ("-" for stdout, ".gz" suffix for gzip)
    #[arg(short = 'o', long, global = true, default_value = "-")]
    pub out_file: PathBuf,

    /// Override an option by name (repeatable), e.g. `--set by-seq=true`
    #[arg(long = "set", global = true, value_name = "KEY=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,

    /// Format of reports and indexes
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

impl GlobalArgs {
    /// Shared options as given on the command line, before overrides
    #[must_use]
    pub fn kit(&self) -> KitConfig {
        KitConfig {
            seq_type: self.seq_type,
            line_width: self.line_width,
            id_regexp: self.id_regexp.clone(),
            id_ncbi: self.id_ncbi,
            quiet: self.quiet,
        }
    }

    /// Whether logging is limited to errors, `--set quiet=...` included.
    ///
    /// An unparsable value is left for option resolution to report.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.overrides
            .iter()
            .filter(|(key, _)| key == "quiet")
            .fold(self.quiet, |quiet, (_, value)| value.trim().parse().unwrap_or(quiet))
    }

    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            threads: self.threads,
            partitions: self.partitions,
        }
    }

    #[must_use]
    pub fn overrides(&self) -> Overrides {
        self.overrides.iter().cloned().collect()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Output records common to all inputs
    Common(join::CommonArgs),

    /// Concatenate the sequences of records sharing an identifier in two inputs
    Concat(join::ConcatArgs),

    /// Pair the records of two inputs by identifier
    Pair(join::PairArgs),

    /// Remove duplicated records by identifier, header or sequence
    Rmdup(join::RmDupArgs),

    /// Rename duplicated identifiers
    Rename(join::RenameArgs),

    /// Repeat every record N times
    Duplicate(join::DuplicateArgs),

    /// Output records in a range of positions
    Range(order::RangeArgs),

    /// Output the first N records
    Head(order::HeadArgs),

    /// Output the records of the first genome, by shared description prefix
    HeadGenome(order::HeadGenomeArgs),

    /// Sort records by identifier, header, sequence or length
    Sort(order::SortArgs),

    /// Index records and extract subsequences by region
    Faidx(order::FaidxArgs),

    /// Sample records by number or proportion
    Sample(random::SampleArgs),

    /// Shuffle records
    Shuffle(random::ShuffleArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
