//! Keyed multi-source pipelines: tag, shuffle by key, reduce within group.

use tracing::{debug, info};

use crate::config::{
    CommonOptions, ConcatOptions, ConfigError, DuplicateOptions, PairOptions, RenameOptions,
    Resolved, RmDupOptions,
};
use crate::core::collection::Collection;
use crate::core::record::Record;
use crate::core::types::KeyMode;
use crate::engine::Engine;
use crate::error::Result;
use crate::operators::keys::tag_sources;
use crate::operators::reducers::{
    ConcatReducer, Deduped, DedupReducer, DuplicateSummary, IntersectReducer, PairReducer,
    Paired, RenameReducer,
};
use crate::operators::{reduce_groups, KeyExtractor};

/// Partitions for a shuffle over `inputs`
fn shuffle_partitions(engine: &Engine, inputs: &[Collection<Record>]) -> usize {
    inputs
        .iter()
        .map(Collection::num_partitions)
        .max()
        .unwrap_or_else(|| engine.default_partitions())
        .max(1)
}

/// Records of the first input whose key occurs in every input.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for fewer than two inputs, or an `EngineError` if
/// a stage fails.
pub fn common(
    engine: &Engine,
    inputs: Vec<Collection<Record>>,
    options: &Resolved<CommonOptions>,
) -> Result<Collection<Record>> {
    if inputs.len() < 2 {
        return Err(ConfigError::invalid(
            "common",
            "inputs",
            format!("at least 2 inputs are required, got {}", inputs.len()),
        )
        .into());
    }

    let extractor = KeyExtractor::from_flags(
        options.by_name,
        options.by_seq,
        options.ignore_case,
        options.only_positive_strand,
        options.kit.seq_type,
    );
    let sources = inputs.len();
    let partitions = shuffle_partitions(engine, &inputs);

    let tagged = tag_sources(engine, inputs, extractor);
    let grouped = engine.group_by_key(tagged, partitions);
    let common = reduce_groups(engine, grouped, &IntersectReducer { sources })?;

    info!(sources, key = ?extractor.mode(), "Found records common to all inputs");
    Ok(common)
}

/// Join two inputs on identifier, concatenating sequences of every matching pair.
///
/// # Errors
///
/// Returns an `EngineError` if a stage fails.
pub fn concat(
    engine: &Engine,
    left: Collection<Record>,
    right: Collection<Record>,
    options: &Resolved<ConcatOptions>,
) -> Result<Collection<Record>> {
    let inputs = vec![left, right];
    let partitions = shuffle_partitions(engine, &inputs);
    let extractor = KeyExtractor::new(KeyMode::Id, false, false);

    let grouped = engine.group_by_key(tag_sources(engine, inputs, extractor), partitions);
    let reducer = ConcatReducer {
        separator: options.separator.clone(),
        full: options.full,
    };
    Ok(reduce_groups(engine, grouped, &reducer)?)
}

/// Records of two inputs paired by identifier
#[derive(Debug)]
pub struct PairOutput {
    pub left: Collection<Record>,
    pub right: Collection<Record>,
    /// Leftover records of either input; `None` unless `save_unpaired` is set
    pub unpaired: Option<Collection<Record>>,
}

/// Pair the records of two inputs by identifier, first with first.
///
/// `left` and `right` of the output are aligned: the n-th records form a pair.
///
/// # Errors
///
/// Returns an `EngineError` if a stage fails.
pub fn pair(
    engine: &Engine,
    left: Collection<Record>,
    right: Collection<Record>,
    options: &Resolved<PairOptions>,
) -> Result<PairOutput> {
    let inputs = vec![left, right];
    let partitions = shuffle_partitions(engine, &inputs);
    let extractor = KeyExtractor::new(KeyMode::Id, false, false);

    let grouped = engine.group_by_key(tag_sources(engine, inputs, extractor), partitions);
    let paired = reduce_groups(engine, grouped, &PairReducer)?;

    let mut lefts = Vec::with_capacity(paired.num_partitions());
    let mut rights = Vec::with_capacity(paired.num_partitions());
    let mut leftovers = Vec::with_capacity(paired.num_partitions());
    for partition in paired.into_partitions() {
        let (mut l, mut r, mut u) = (Vec::new(), Vec::new(), Vec::new());
        for item in partition.into_items() {
            match item {
                Paired::Pair(a, b) => {
                    l.push(a);
                    r.push(b);
                }
                Paired::Unpaired(tagged) => u.push(tagged.record),
            }
        }
        lefts.push(l);
        rights.push(r);
        leftovers.push(u);
    }

    let unpaired = options
        .save_unpaired
        .then(|| Collection::from_partitions(leftovers));
    Ok(PairOutput {
        left: Collection::from_partitions(lefts),
        right: Collection::from_partitions(rights),
        unpaired,
    })
}

/// Result of [`rmdup`]
#[derive(Debug)]
pub struct DedupOutput {
    /// One record per key
    pub kept: Collection<Record>,
    /// Every record that was dropped
    pub removed: Collection<Record>,
    /// One entry per key that had duplicates
    pub duplicates: Vec<DuplicateSummary>,
}

impl DedupOutput {
    /// Number of records dropped
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.duplicates.iter().map(|d| d.count - 1).sum()
    }
}

/// Remove duplicated records, keeping the first of each key.
///
/// # Errors
///
/// Returns an `EngineError` if a stage fails.
pub fn rmdup(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<RmDupOptions>,
) -> Result<DedupOutput> {
    let extractor = KeyExtractor::from_flags(
        options.by_name,
        options.by_seq,
        options.ignore_case,
        options.only_positive_strand,
        options.kit.seq_type,
    );
    let partitions = input.num_partitions().max(1);

    let keyed = engine.map(input, move |record| (extractor.key(&record), record));
    let grouped = engine.group_by_key(keyed, partitions);
    let deduped = reduce_groups(engine, grouped, &DedupReducer)?;

    let mut kept = Vec::with_capacity(deduped.num_partitions());
    let mut removed = Vec::with_capacity(deduped.num_partitions());
    let mut duplicates = Vec::new();
    for partition in deduped.into_partitions() {
        let (mut k, mut r) = (Vec::new(), Vec::new());
        for item in partition.into_items() {
            match item {
                Deduped::Kept(record) => k.push(record),
                Deduped::Removed(record) => r.push(record),
                Deduped::Summary(summary) => duplicates.push(summary),
            }
        }
        kept.push(k);
        removed.push(r);
    }

    let output = DedupOutput {
        kept: Collection::from_partitions(kept),
        removed: Collection::from_partitions(removed),
        duplicates,
    };
    info!(
        removed = output.removed_count(),
        key = ?extractor.mode(),
        "Removed duplicated records"
    );
    Ok(output)
}

/// Rename records with duplicated identifiers (or full headers with `by_name`).
///
/// # Errors
///
/// Returns an `EngineError` if a stage fails.
pub fn rename(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<RenameOptions>,
) -> Result<Collection<Record>> {
    let mode = if options.by_name {
        KeyMode::Name
    } else {
        KeyMode::Id
    };
    let extractor = KeyExtractor::new(mode, false, false);
    let partitions = input.num_partitions().max(1);

    let keyed = engine.map(input, move |record| (extractor.key(&record), record));
    let grouped = engine.group_by_key(keyed, partitions);
    Ok(reduce_groups(engine, grouped, &RenameReducer)?)
}

/// Repeat every record `times` times, in place.
///
/// # Errors
///
/// Returns an `EngineError` if a stage fails.
pub fn duplicate(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<DuplicateOptions>,
) -> Result<Collection<Record>> {
    let times = options.times;
    debug!(times, "Duplicating records");
    Ok(engine.flat_map(input, "duplicate", move |record| Ok(vec![record; times]))?)
}
