//! Whole-collection aggregates.
//!
//! Each aggregate is one partition pass computing a local statistic, a blocking
//! [`gather`] of every statistic to the driver, and (for offsets) a [`Broadcast`] of the
//! derived value back to a second, offset-aware partition pass. A failure in the
//! statistic pass aborts the aggregate; nothing is published.

use std::ops::Deref;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use super::{Engine, EngineError};
use crate::core::collection::Collection;
use crate::parsing::fastx::DataError;

/// Read-only value shared with every partition task
#[derive(Debug)]
pub struct Broadcast<T>(Arc<T>);

impl<T> Broadcast<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for Broadcast<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Exclusive prefix sum of per-partition sizes.
///
/// `start(i)` is the sum of the sizes of partitions `0..i`. The item count of every
/// partition is kept so the table can be checked against the collection it is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    starts: Vec<u64>,
    sizes: Vec<u64>,
    counts: Vec<usize>,
}

impl OffsetTable {
    /// Build from per-partition `(size, item count)` statistics in partition order
    #[must_use]
    pub fn from_stats(stats: &[(u64, usize)]) -> Self {
        let mut starts = Vec::with_capacity(stats.len());
        let mut running = 0u64;
        for (size, _) in stats {
            starts.push(running);
            running += size;
        }

        Self {
            starts,
            sizes: stats.iter().map(|(size, _)| *size).collect(),
            counts: stats.iter().map(|(_, count)| *count).collect(),
        }
    }

    /// Offset of the first unit of `partition`
    #[must_use]
    pub fn start(&self, partition: usize) -> Option<u64> {
        self.starts.get(partition).copied()
    }

    #[must_use]
    pub fn size(&self, partition: usize) -> Option<u64> {
        self.sizes.get(partition).copied()
    }

    #[must_use]
    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    /// Sum of all partition sizes
    #[must_use]
    pub fn total(&self) -> u64 {
        self.sizes.iter().sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Check that the table was computed from a collection with this layout
    ///
    /// # Errors
    ///
    /// Returns `EngineError::StaleOffsets` if the partition count or any partition's item
    /// count differs.
    pub fn verify<T>(&self, collection: &Collection<T>) -> Result<(), EngineError> {
        if collection.num_partitions() != self.counts.len() {
            return Err(EngineError::StaleOffsets(format!(
                "table has {} partitions, collection has {}",
                self.counts.len(),
                collection.num_partitions()
            )));
        }

        for (partition, expected) in collection.partitions().iter().zip(&self.counts) {
            if partition.len() != *expected {
                return Err(EngineError::StaleOffsets(format!(
                    "partition {} has {} items, table expects {expected}",
                    partition.index(),
                    partition.len()
                )));
            }
        }
        Ok(())
    }
}

/// Barrier: compute `stat` on every partition and collect the results in partition order
///
/// # Errors
///
/// Returns `EngineError::PartitionFailed` if `stat` fails on any partition.
pub fn gather<T, S, F>(
    engine: &Engine,
    input: &Collection<T>,
    stage: &'static str,
    stat: F,
) -> Result<Vec<S>, EngineError>
where
    T: Sync,
    S: Send,
    F: Fn(usize, &[T]) -> Result<S, DataError> + Sync + Send,
{
    engine.install(|| {
        input
            .partitions()
            .par_iter()
            .map(|partition| {
                stat(partition.index(), partition.items()).map_err(|source| {
                    EngineError::PartitionFailed {
                        stage,
                        partition: partition.index(),
                        source,
                    }
                })
            })
            .collect()
    })
}

/// Total number of items in the collection
///
/// # Errors
///
/// Returns an `EngineError` if the count pass fails.
pub fn count<T: Sync>(engine: &Engine, input: &Collection<T>) -> Result<u64, EngineError> {
    let sizes = gather(engine, input, "count", |_, items| Ok(items.len() as u64))?;
    let total = sizes.iter().sum();
    debug!(total, partitions = sizes.len(), "Counted collection");
    Ok(total)
}

/// Per-partition start offsets of `size_of` summed over the items
///
/// # Errors
///
/// Returns an `EngineError` if the statistic pass fails.
pub fn offsets<T, F>(
    engine: &Engine,
    input: &Collection<T>,
    size_of: F,
) -> Result<Broadcast<OffsetTable>, EngineError>
where
    T: Sync,
    F: Fn(&T) -> u64 + Sync + Send,
{
    let stats = gather(engine, input, "offsets", |_, items| {
        Ok((items.iter().map(&size_of).sum::<u64>(), items.len()))
    })?;

    let table = OffsetTable::from_stats(&stats);
    debug!(partitions = table.len(), total = table.total(), "Computed offsets");
    Ok(Broadcast::new(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;

    fn engine() -> Engine {
        Engine::new(&EngineConfig {
            threads: 2,
            partitions: 3,
        })
        .unwrap()
    }

    #[test]
    fn test_exclusive_prefix_sum() {
        let table = OffsetTable::from_stats(&[(5, 5), (3, 3), (7, 7)]);
        assert_eq!(table.starts(), &[0, 5, 8]);
        assert_eq!(table.total(), 15);
        assert_eq!(table.start(2), Some(8));
        assert_eq!(table.start(3), None);
    }

    #[test]
    fn test_offsets_over_collection() {
        let engine = engine();
        let collection =
            Collection::from_partitions(vec![vec![1u64; 5], vec![1u64; 3], vec![1u64; 7]]);
        let table = offsets(&engine, &collection, |x| *x).unwrap();
        assert_eq!(table.starts(), &[0, 5, 8]);
        assert!(table.verify(&collection).is_ok());

        let shared = table.clone();
        assert_eq!(shared.total(), 15);
    }

    #[test]
    fn test_stale_offsets_detected() {
        let engine = engine();
        let collection = Collection::from_partitions(vec![vec![1u64, 2], vec![3]]);
        let table = offsets(&engine, &collection, |_| 1).unwrap();

        let changed = Collection::from_partitions(vec![vec![1u64], vec![2, 3]]);
        assert!(matches!(
            table.verify(&changed),
            Err(EngineError::StaleOffsets(_))
        ));
        let fewer = Collection::from_partitions(vec![vec![1u64, 2, 3]]);
        assert!(table.verify(&fewer).is_err());
    }

    #[test]
    fn test_count_and_failed_gather() {
        let engine = engine();
        let collection = engine.parallelize((0..17).collect::<Vec<i32>>(), 4);
        assert_eq!(count(&engine, &collection).unwrap(), 17);

        let result: Result<Vec<usize>, _> = gather(&engine, &collection, "stat", |index, items| {
            if index == 2 {
                Err(DataError::UnknownFormat("broken".to_string()))
            } else {
                Ok(items.len())
            }
        });
        assert!(matches!(
            result,
            Err(EngineError::PartitionFailed { partition: 2, .. })
        ));
    }
}
