//! Core data types for partitioned sequence collections.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Record`]: One FASTA/FASTQ entry with identifier, header, sequence and optional quality
//! - [`Partition`], [`Collection`]: The horizontally partitioned unit every command consumes
//! - [`Tagged`]: A record carrying the index of the input collection it came from
//! - [`SourceTag`], [`SeqType`], [`RecordFormat`], [`KeyMode`]: Small classification types
//!
//! ## Ordering
//!
//! Items keep their order inside a partition across partition-local transforms. Anything
//! that shuffles (grouping, sorting, sampling, random repartitioning) produces a new
//! collection whose partition count and membership are unrelated to the input's:
//!
//! | Operation kind | Order within partition | Partition membership |
//! |----------------|------------------------|----------------------|
//! | map / filter   | preserved              | preserved            |
//! | group by key   | arrival order          | by key hash          |
//! | sort by key    | global key order       | contiguous slices    |
//! | random shuffle | random                 | random               |

pub mod collection;
pub mod record;
pub mod types;
