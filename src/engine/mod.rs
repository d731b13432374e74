//! In-process partition-parallel execution engine.
//!
//! The engine owns a dedicated rayon thread pool and exposes the primitive set every
//! pipeline is written against. Pipelines never spawn threads or touch the pool directly.
//!
//! ## Primitives
//!
//! | Primitive             | Shuffle | Output partitions        |
//! |-----------------------|---------|--------------------------|
//! | `parallelize`         | -       | requested count          |
//! | `map_partitions`      | no      | same as input            |
//! | `map` / `flat_map`    | no      | same as input            |
//! | `union`               | no      | sum of inputs            |
//! | `group_by_key`        | yes     | requested count          |
//! | `sort_by_key`         | yes     | same count as input      |
//! | `sample`              | no      | same as input            |
//! | `partition_by_random` | yes     | same count as input      |
//!
//! Whole-collection scalars (`count`, offsets) live in [`coordinator`].
//!
//! ## Failure
//!
//! A fallible primitive fails as a whole as soon as any partition fails; the error names
//! the stage and the partition. Nothing is retried and no partial collection is returned.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::collection::{Collection, Partition};
use crate::parsing::fastx::DataError;
use crate::utils::validation::check_partition_limit;

pub mod coordinator;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("stage '{stage}' failed on partition {partition}: {source}")]
    PartitionFailed {
        stage: &'static str,
        partition: usize,
        source: DataError,
    },

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{0}")]
    TooManyPartitions(String),

    #[error("Stale offset table: {0}")]
    StaleOffsets(String),
}

/// Engine sizing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Worker threads, 0 for one per core
    pub threads: usize,
    /// Partitions per input, 0 for one per worker thread
    pub partitions: usize,
}

pub struct Engine {
    pool: ThreadPool,
    partitions: usize,
}

impl Engine {
    /// Build an engine with its own thread pool
    ///
    /// # Errors
    ///
    /// Returns `EngineError::TooManyPartitions` if the partition count exceeds the limit,
    /// or `EngineError::ThreadPool` if the pool cannot be created.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        if let Some(message) = check_partition_limit(config.partitions) {
            return Err(EngineError::TooManyPartitions(message));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("bigseq-worker-{i}"))
            .build()?;

        let partitions = if config.partitions == 0 {
            pool.current_num_threads()
        } else {
            config.partitions
        };

        debug!(
            threads = pool.current_num_threads(),
            partitions, "Engine started"
        );
        Ok(Self { pool, partitions })
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Partition count used when ingesting input
    #[must_use]
    pub fn default_partitions(&self) -> usize {
        self.partitions
    }

    /// Split `items` into `partitions` contiguous, evenly sized partitions
    pub fn parallelize<T>(&self, items: Vec<T>, partitions: usize) -> Collection<T> {
        split_evenly(items, partitions)
    }

    /// Run `f` on every partition with its index
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PartitionFailed` for the first partition whose call fails.
    pub fn map_partitions<T, U, F>(
        &self,
        input: &Collection<T>,
        stage: &'static str,
        f: F,
    ) -> Result<Collection<U>, EngineError>
    where
        T: Sync,
        U: Send,
        F: Fn(usize, &[T]) -> Result<Vec<U>, DataError> + Sync + Send,
    {
        let outputs = self.pool.install(|| {
            input
                .partitions()
                .par_iter()
                .map(|partition| {
                    f(partition.index(), partition.items()).map_err(|source| {
                        EngineError::PartitionFailed {
                            stage,
                            partition: partition.index(),
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(Collection::from_partitions(outputs))
    }

    /// Partition-local, infallible transform of every item
    pub fn map<T, U, F>(&self, input: Collection<T>, f: F) -> Collection<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Sync + Send,
    {
        let outputs = self.pool.install(|| {
            input
                .into_partitions()
                .into_par_iter()
                .map(|partition| partition.into_items().into_iter().map(&f).collect())
                .collect::<Vec<Vec<U>>>()
        });

        Collection::from_partitions(outputs)
    }

    /// Partition-local transform producing zero or more items per input item
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PartitionFailed` if `f` fails on any item.
    pub fn flat_map<T, U, I, F>(
        &self,
        input: Collection<T>,
        stage: &'static str,
        f: F,
    ) -> Result<Collection<U>, EngineError>
    where
        T: Send,
        U: Send,
        I: IntoIterator<Item = U>,
        F: Fn(T) -> Result<I, DataError> + Sync + Send,
    {
        let outputs = self.pool.install(|| {
            input
                .into_partitions()
                .into_par_iter()
                .map(|partition| -> Result<Vec<U>, EngineError> {
                    let index = partition.index();
                    let mut out = Vec::with_capacity(partition.len());
                    for item in partition.into_items() {
                        let produced = f(item).map_err(|source| EngineError::PartitionFailed {
                            stage,
                            partition: index,
                            source,
                        })?;
                        out.extend(produced);
                    }
                    Ok(out)
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(Collection::from_partitions(outputs))
    }

    /// Concatenate the partitions of every input, in input order
    pub fn union<T>(&self, inputs: Vec<Collection<T>>) -> Collection<T> {
        Collection::from_partitions(
            inputs
                .into_iter()
                .flat_map(|c| c.into_partitions().into_iter().map(Partition::into_items))
                .collect(),
        )
    }

    /// Shuffle by key hash into `partitions` partitions and group equal keys.
    ///
    /// Within a group, values keep their arrival order: source partitions are merged in
    /// index order, so the result is deterministic for a given input layout.
    pub fn group_by_key<K, V>(
        &self,
        input: Collection<(K, V)>,
        partitions: usize,
    ) -> Collection<(K, Vec<V>)>
    where
        K: Hash + Eq + Clone + Send,
        V: Send,
    {
        let buckets = partitions.max(1);

        let scattered: Vec<Vec<Vec<(K, V)>>> = self.pool.install(|| {
            input
                .into_partitions()
                .into_par_iter()
                .map(|partition| {
                    let mut local: Vec<Vec<(K, V)>> = (0..buckets).map(|_| Vec::new()).collect();
                    for (key, value) in partition.into_items() {
                        let bucket = bucket_of(&key, buckets);
                        local[bucket].push((key, value));
                    }
                    local
                })
                .collect()
        });

        let grouped = self.pool.install(|| {
            transpose(scattered, buckets)
                .into_par_iter()
                .map(|sources| {
                    let mut positions: HashMap<K, usize> = HashMap::new();
                    let mut groups: Vec<(K, Vec<V>)> = Vec::new();
                    for (key, value) in sources.into_iter().flatten() {
                        if let Some(&position) = positions.get(&key) {
                            groups[position].1.push(value);
                        } else {
                            positions.insert(key.clone(), groups.len());
                            groups.push((key, vec![value]));
                        }
                    }
                    groups
                })
                .collect::<Vec<_>>()
        });

        Collection::from_partitions(grouped)
    }

    /// Global stable sort by a derived key.
    ///
    /// The result has the same number of partitions as the input, each holding a
    /// contiguous slice of the sorted order.
    pub fn sort_by_key<T, K, KF, C>(
        &self,
        input: Collection<T>,
        key_of: KF,
        compare: C,
        descending: bool,
    ) -> Collection<T>
    where
        T: Send,
        K: Send,
        KF: Fn(&T) -> K + Sync + Send,
        C: Fn(&K, &K) -> Ordering + Sync + Send,
    {
        let partitions = input.num_partitions().max(1);
        let items = input.into_vec();

        let sorted = self.pool.install(|| {
            let mut keyed: Vec<(K, T)> = items
                .into_par_iter()
                .map(|item| (key_of(&item), item))
                .collect();
            if descending {
                keyed.par_sort_by(|a, b| compare(&b.0, &a.0));
            } else {
                keyed.par_sort_by(|a, b| compare(&a.0, &b.0));
            }
            keyed.into_iter().map(|(_, item)| item).collect::<Vec<T>>()
        });

        split_evenly(sorted, partitions)
    }

    /// Seeded Bernoulli sample without replacement; each item is kept with probability
    /// `fraction`. Partition-local, no shuffle.
    pub fn sample<T: Send>(&self, input: Collection<T>, fraction: f64, seed: u64) -> Collection<T> {
        let outputs = self.pool.install(|| {
            input
                .into_partitions()
                .into_par_iter()
                .map(|partition| {
                    let mut rng = partition_rng(seed, partition.index());
                    partition
                        .into_items()
                        .into_iter()
                        .filter(|_| rng.gen::<f64>() < fraction)
                        .collect()
                })
                .collect::<Vec<Vec<T>>>()
        });

        Collection::from_partitions(outputs)
    }

    /// Repartition into the same number of partitions by seeded random assignment
    pub fn partition_by_random<T: Send>(&self, input: Collection<T>, seed: u64) -> Collection<T> {
        let partitions = input.num_partitions().max(1);

        let scattered: Vec<Vec<Vec<T>>> = self.pool.install(|| {
            input
                .into_partitions()
                .into_par_iter()
                .map(|partition| {
                    let mut rng = partition_rng(seed, partition.index());
                    let mut local: Vec<Vec<T>> = (0..partitions).map(|_| Vec::new()).collect();
                    for item in partition.into_items() {
                        local[rng.gen_range(0..partitions)].push(item);
                    }
                    local
                })
                .collect()
        });

        let shuffled = self.pool.install(|| {
            transpose(scattered, partitions)
                .into_par_iter()
                .enumerate()
                .map(|(index, sources)| {
                    let mut items: Vec<T> = sources.into_iter().flatten().collect();
                    // Second stream, so the order is independent of the assignment draws
                    let mut rng = partition_rng(seed.rotate_left(32), index);
                    items.shuffle(&mut rng);
                    items
                })
                .collect::<Vec<_>>()
        });

        Collection::from_partitions(shuffled)
    }

    /// Bring every item back to the caller in global order
    pub fn collect<T>(&self, input: Collection<T>) -> Vec<T> {
        input.into_vec()
    }

    pub(crate) fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.pool.install(f)
    }
}

fn split_evenly<T>(items: Vec<T>, partitions: usize) -> Collection<T> {
    let partitions = partitions.max(1);
    let total = items.len();
    let mut iter = items.into_iter();

    Collection::from_partitions(
        (0..partitions)
            .map(|i| {
                let size = (i + 1) * total / partitions - i * total / partitions;
                iter.by_ref().take(size).collect()
            })
            .collect(),
    )
}

/// `[source][bucket]` to `[bucket][source]`
fn transpose<T>(scattered: Vec<Vec<Vec<T>>>, buckets: usize) -> Vec<Vec<Vec<T>>> {
    let mut by_bucket: Vec<Vec<Vec<T>>> = (0..buckets)
        .map(|_| Vec::with_capacity(scattered.len()))
        .collect();
    for source in scattered {
        for (bucket, items) in source.into_iter().enumerate() {
            by_bucket[bucket].push(items);
        }
    }
    by_bucket
}

#[allow(clippy::cast_possible_truncation)] // Result is below `buckets`
fn bucket_of<K: Hash>(key: &K, buckets: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % buckets as u64) as usize
}

fn partition_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(&EngineConfig {
            threads: 2,
            partitions: 3,
        })
        .unwrap()
    }

    #[test]
    fn test_parallelize_splits_evenly() {
        let engine = engine();
        let collection = engine.parallelize((0..10).collect(), 3);
        let sizes: Vec<usize> = collection.partitions().iter().map(Partition::len).collect();
        assert_eq!(sizes, vec![3, 3, 4]);
        assert_eq!(engine.collect(collection), (0..10).collect::<Vec<_>>());
        assert_eq!(engine.default_partitions(), 3);
    }

    #[test]
    fn test_map_partitions_reports_failing_partition() {
        let engine = engine();
        let collection = engine.parallelize(vec![1, 2, 3, 4], 2);
        let err = engine
            .map_partitions(&collection, "check", |index, items| {
                if index == 1 {
                    Err(DataError::UnknownFormat("bad".to_string()))
                } else {
                    Ok(items.to_vec())
                }
            })
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::PartitionFailed {
                stage: "check",
                partition: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_flat_map_and_union() {
        let engine = engine();
        let a = engine.parallelize(vec![1, 2], 1);
        let b = engine.parallelize(vec![3], 1);
        let unioned = engine.union(vec![a, b]);
        assert_eq!(unioned.num_partitions(), 2);

        let repeated = engine
            .flat_map(unioned, "repeat", |x| Ok(vec![x; 2]))
            .unwrap();
        assert_eq!(engine.collect(repeated), vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_group_by_key_keeps_arrival_order() {
        let engine = engine();
        let pairs = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("a", 5)];
        let grouped = engine.group_by_key(engine.parallelize(pairs, 3), 2);
        assert_eq!(grouped.num_partitions(), 2);

        let mut groups = engine.collect(grouped);
        groups.sort_by(|x, y| x.0.cmp(y.0));
        assert_eq!(groups, vec![("a", vec![1, 3, 5]), ("b", vec![2]), ("c", vec![4])]);
    }

    #[test]
    fn test_sort_by_key_is_stable() {
        let engine = engine();
        let items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        let sorted = engine.sort_by_key(
            engine.parallelize(items.clone(), 2),
            |item| item.0,
            Ord::cmp,
            false,
        );
        assert_eq!(sorted.num_partitions(), 2);
        assert_eq!(
            engine.collect(sorted),
            vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]
        );

        let sorted = engine.sort_by_key(engine.parallelize(items, 2), |item| item.0, Ord::cmp, true);
        assert_eq!(
            engine.collect(sorted),
            vec![(2, 'a'), (2, 'c'), (1, 'b'), (1, 'd')]
        );
    }

    #[test]
    fn test_sample_is_seeded() {
        let engine = engine();
        let all = engine.sample(engine.parallelize((0..100).collect(), 3), 1.0, 11);
        assert_eq!(engine.collect(all).len(), 100);

        let first = engine.sample(engine.parallelize((0..1000).collect(), 3), 0.1, 11);
        let second = engine.sample(engine.parallelize((0..1000).collect(), 3), 0.1, 11);
        let first = engine.collect(first);
        assert_eq!(first, engine.collect(second));
        assert!(first.len() < 1000);
    }

    #[test]
    fn test_partition_by_random_keeps_items() {
        let engine = engine();
        let shuffled = engine.partition_by_random(engine.parallelize((0..50).collect(), 3), 23);
        assert_eq!(shuffled.num_partitions(), 3);

        let mut items = engine.collect(shuffled);
        assert_ne!(items, (0..50).collect::<Vec<_>>());
        items.sort_unstable();
        assert_eq!(items, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_limit() {
        let config = EngineConfig {
            threads: 1,
            partitions: crate::utils::validation::MAX_PARTITIONS + 1,
        };
        assert!(matches!(
            Engine::new(&config),
            Err(EngineError::TooManyPartitions(_))
        ));
    }
}
