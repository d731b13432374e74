//! # bigseq
//!
//! Partition-parallel set, order, index and sampling operations over FASTA/FASTQ
//! collections.
//!
//! Input is split into partitions aligned to record boundaries and every command runs as
//! a pipeline of data-parallel primitives (map, group by key, sort by key, sample, random
//! repartition) on an in-process engine. Whole-collection facts that a partition cannot
//! know on its own, such as record counts and byte offsets, are computed by a coordinator
//! pass and broadcast back to the partitions.
//!
//! ## Features
//!
//! - **Keyed joins**: intersection, deduplication, renaming, concatenation and pairing
//!   keyed by identifier, full header or sequence (both strands for nucleotides)
//! - **Order**: positional ranges with negative positions, the first genome of a
//!   multi-genome file, stable global sort
//! - **Indexing**: `.fai`-style index of the input file and region extraction
//! - **Sampling**: seeded sampling by proportion or number, seeded shuffling
//!
//! ## Example
//!
//! ```rust,no_run
//! use bigseq::config::{resolve, Overrides, SortOptions};
//! use bigseq::engine::{Engine, EngineConfig};
//! use bigseq::parsing::fastx::{read_collection, write_collection};
//! use bigseq::pipeline;
//!
//! let engine = Engine::new(&EngineConfig::default()).unwrap();
//! let options = resolve(
//!     SortOptions { by_length: true, ..Default::default() },
//!     &Overrides::new().with("reverse", "true"),
//! )
//! .unwrap();
//!
//! let input = read_collection(
//!     &engine,
//!     "reads.fa".as_ref(),
//!     &options,
//!     engine.default_partitions(),
//! )
//! .unwrap();
//! let sorted = pipeline::sort(&engine, input, &options).unwrap();
//! write_collection(&engine, &sorted, options.kit.line_width, &mut std::io::stdout()).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Records, partitions and collections
//! - [`config`]: Per-command options and override resolution
//! - [`engine`]: Partition-parallel primitives and the coordinator
//! - [`parsing`]: FASTA/FASTQ codec, chunking and identifier parsing
//! - [`operators`]: Key extraction and group reducers
//! - [`pipeline`]: One entry point per command
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod operators;
pub mod parsing;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{resolve, ConfigError, KitConfig, Overrides, Resolved};
pub use core::collection::{Collection, Partition, Spanned, Tagged};
pub use core::record::{Record, SourceSpan};
pub use core::types::*;
pub use engine::{Engine, EngineConfig, EngineError};
pub use error::{Error, Result};
pub use parsing::fastx::DataError;
