//! Seeded random pipelines.

use tracing::{info, warn};

use crate::config::{Resolved, SampleOptions, ShuffleOptions};
use crate::core::collection::Collection;
use crate::core::record::Record;
use crate::engine::coordinator::count;
use crate::engine::Engine;
use crate::error::Result;

/// Sample records without replacement by proportion, or approximately `number` records.
///
/// A non-zero `number` takes precedence over `proportion` and costs one counting pass.
/// The same seed over the same partitioned input always keeps the same records.
///
/// # Errors
///
/// Returns an `EngineError` if the counting pass fails.
pub fn sample(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<SampleOptions>,
) -> Result<Collection<Record>> {
    let fraction = if options.number > 0 {
        let total = count(engine, &input)?;
        if total == 0 {
            return Ok(input);
        }
        #[allow(clippy::cast_sign_loss)] // number > 0
        let wanted = options.number as u64;
        if wanted > total {
            warn!(number = wanted, total, "Requested more records than available, keeping all");
        }
        #[allow(clippy::cast_precision_loss)]
        {
            (wanted as f64 / total as f64).min(1.0)
        }
    } else {
        options.proportion
    };

    let sampled = engine.sample(input, fraction, options.seed);
    info!(fraction, seed = options.seed, "Sampled records");
    Ok(sampled)
}

/// Randomly reorder records; partition count is preserved.
#[must_use]
pub fn shuffle(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<ShuffleOptions>,
) -> Collection<Record> {
    let shuffled = engine.partition_by_random(input, options.seed);
    info!(seed = options.seed, partitions = shuffled.num_partitions(), "Shuffled records");
    shuffled
}
