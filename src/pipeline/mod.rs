//! Command pipelines over partitioned collections.
//!
//! Each command takes resolved options and one or more collections, and is written
//! only against the [`crate::engine`] primitives:
//!
//! | Command     | Module   | Primitives                                  |
//! |-------------|----------|---------------------------------------------|
//! | `common`    | `join`   | tag, union, `group_by_key`, reduce          |
//! | `concat`    | `join`   | tag, union, `group_by_key`, reduce          |
//! | `pair`      | `join`   | tag, union, `group_by_key`, reduce          |
//! | `rmdup`     | `join`   | `map`, `group_by_key`, reduce               |
//! | `rename`    | `join`   | `map`, `group_by_key`, reduce               |
//! | `duplicate` | `join`   | `flat_map`                                  |
//! | `range`     | `order`  | `count`, offsets, `map_partitions`          |
//! | `head`      | `order`  | offsets, `map_partitions`                   |
//! | `head-genome` | `order` | broadcast, `gather`, `map_partitions`     |
//! | `sort`      | `order`  | `sort_by_key`                               |
//! | `faidx`     | `index`  | raw spans, offsets, `map_partitions`        |
//! | `sample`    | `random` | `count`, `sample`                           |
//! | `shuffle`   | `random` | `partition_by_random`                       |

pub mod index;
pub mod join;
pub mod order;
pub mod random;

pub use index::{faidx, FaiEntry, FaidxOutput, RegionQuery};
pub use join::{common, concat, duplicate, pair, rename, rmdup, DedupOutput, PairOutput};
pub use order::{head, head_genome, range, sort};
pub use random::{sample, shuffle};
