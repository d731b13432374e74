//! Tag and reduce operators for keyed multi-source pipelines.
//!
//! A keyed pipeline runs in three phases:
//!
//! 1. **Tag**: every record gets its source index and a key from a [`keys::KeyExtractor`]
//!    (identifier, full header, or sequence; optionally case-folded and strand-canonical).
//! 2. **Shuffle**: tagged records of all sources are unioned and grouped by key.
//! 3. **Reduce**: a [`GroupReducer`] turns each group into output items.
//!
//! | Reducer            | Input    | Output    | Emits                                   |
//! |--------------------|----------|-----------|-----------------------------------------|
//! | `IntersectReducer` | `Tagged` | `Record`  | first source's records of full groups   |
//! | `ConcatReducer`    | `Tagged` | `Record`  | A×B joined records                      |
//! | `PairReducer`      | `Tagged` | `Paired`  | zipped pairs, then leftovers            |
//! | `DedupReducer`     | `Record` | `Deduped` | first record, removed ones, summary     |
//! | `RenameReducer`    | `Record` | `Record`  | every record, repeats renamed `id_<n>`  |

use crate::core::collection::Collection;
use crate::engine::{Engine, EngineError};

pub mod keys;
pub mod reducers;

pub use keys::{Key, KeyExtractor};

/// Reduce phase of a keyed operation
pub trait GroupReducer: Sync {
    type Input: Send;
    type Output: Send;

    /// Stage name reported on failure
    const NAME: &'static str;

    /// Turn the records sharing `key` (in arrival order) into output items
    fn reduce(&self, key: &[u8], group: Vec<Self::Input>) -> Vec<Self::Output>;
}

/// Apply `reducer` to every group
///
/// # Errors
///
/// Returns an `EngineError` if the reduce stage fails on any partition.
pub fn reduce_groups<R: GroupReducer>(
    engine: &Engine,
    grouped: Collection<(Key, Vec<R::Input>)>,
    reducer: &R,
) -> Result<Collection<R::Output>, EngineError> {
    engine.flat_map(grouped, R::NAME, |(key, group)| Ok(reducer.reduce(&key, group)))
}
