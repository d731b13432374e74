//! Reading and writing sequence records.
//!
//! - [`fastx`]: noodles-backed FASTA/FASTQ codec, gzip input, partitioned ingestion
//! - [`chunk`]: alignment of raw byte chunks to record boundaries
//! - [`span`]: raw line geometry of each record, for indexing
//! - [`id`]: identifier extraction from header lines
//!
//! ## Example
//!
//! ```rust,no_run
//! use bigseq::config::{resolve, Overrides, ShuffleOptions};
//! use bigseq::engine::{Engine, EngineConfig};
//! use bigseq::parsing::fastx::read_collection;
//! use std::path::Path;
//!
//! let engine = Engine::new(&EngineConfig::default()).unwrap();
//! let options = resolve(ShuffleOptions::default(), &Overrides::new()).unwrap();
//! let reads = read_collection(&engine, Path::new("reads.fq.gz"), &options, 8).unwrap();
//! println!("{} partitions", reads.num_partitions());
//! ```

pub mod chunk;
pub mod fastx;
pub mod id;
pub mod span;
