//! Reduce phases of the keyed operations.

use serde::{Deserialize, Serialize};

use super::GroupReducer;
use crate::core::collection::Tagged;
use crate::core::record::Record;
use crate::core::types::SourceTag;

/// Keeps groups present in every source; emits the first source's records
#[derive(Debug, Clone, Copy)]
pub struct IntersectReducer {
    pub sources: usize,
}

impl GroupReducer for IntersectReducer {
    type Input = Tagged;
    type Output = Record;
    const NAME: &'static str = "intersect";

    fn reduce(&self, _key: &[u8], group: Vec<Tagged>) -> Vec<Record> {
        let mut seen = vec![false; self.sources];
        for tagged in &group {
            if let Some(slot) = seen.get_mut(tagged.source.index()) {
                *slot = true;
            }
        }
        if !seen.iter().all(|&s| s) {
            return Vec::new();
        }

        group
            .into_iter()
            .filter(|tagged| tagged.source == SourceTag(0))
            .map(|tagged| tagged.record)
            .collect()
    }
}

/// Joins the records of two sources sharing a key
#[derive(Debug, Clone)]
pub struct ConcatReducer {
    pub separator: String,
    /// Emit one-sided groups unchanged instead of dropping them
    pub full: bool,
}

impl ConcatReducer {
    fn join(&self, a: &Record, b: &Record) -> Record {
        let (desc_a, desc_b) = (a.description(), b.description());
        let description = if desc_a.is_empty() && desc_b.is_empty() {
            String::new()
        } else {
            format!("{desc_a}{}{desc_b}", self.separator)
        };
        let name = if description.is_empty() {
            a.id.clone()
        } else {
            format!("{} {description}", a.id)
        };

        let mut sequence = Vec::with_capacity(a.len() + b.len());
        sequence.extend_from_slice(&a.sequence);
        sequence.extend_from_slice(&b.sequence);

        let quality = match (&a.quality, &b.quality) {
            (None, None) => None,
            (qa, qb) => {
                let mut quality = Vec::with_capacity(sequence.len());
                extend_quality(&mut quality, a, qa.as_deref());
                extend_quality(&mut quality, b, qb.as_deref());
                Some(quality)
            }
        };

        Record {
            id: a.id.clone(),
            name,
            sequence,
            quality,
        }
    }
}

/// Quality given to FASTA bases joined to a FASTQ record
pub const FILLER_QUALITY: u8 = b'I';

fn extend_quality(quality: &mut Vec<u8>, record: &Record, scores: Option<&[u8]>) {
    match scores {
        Some(scores) => quality.extend_from_slice(scores),
        None => quality.resize(quality.len() + record.len(), FILLER_QUALITY),
    }
}

impl GroupReducer for ConcatReducer {
    type Input = Tagged;
    type Output = Record;
    const NAME: &'static str = "concat";

    fn reduce(&self, _key: &[u8], group: Vec<Tagged>) -> Vec<Record> {
        let (left, right): (Vec<Tagged>, Vec<Tagged>) = group
            .into_iter()
            .partition(|tagged| tagged.source == SourceTag(0));

        if left.is_empty() || right.is_empty() {
            if !self.full {
                return Vec::new();
            }
            return left
                .into_iter()
                .chain(right)
                .map(|tagged| tagged.record)
                .collect();
        }

        let mut joined = Vec::with_capacity(left.len() * right.len());
        for a in &left {
            for b in &right {
                joined.push(self.join(&a.record, &b.record));
            }
        }
        joined
    }
}

/// Result of pairing one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paired {
    Pair(Record, Record),
    Unpaired(Tagged),
}

/// Zips the records of two sources sharing an identifier, first with first
#[derive(Debug, Clone, Copy, Default)]
pub struct PairReducer;

impl GroupReducer for PairReducer {
    type Input = Tagged;
    type Output = Paired;
    const NAME: &'static str = "pair";

    fn reduce(&self, _key: &[u8], group: Vec<Tagged>) -> Vec<Paired> {
        let (left, right): (Vec<Tagged>, Vec<Tagged>) = group
            .into_iter()
            .partition(|tagged| tagged.source == SourceTag(0));

        let pairs = left.len().min(right.len());
        let mut out = Vec::with_capacity(left.len().max(right.len()));
        let mut left = left.into_iter();
        let mut right = right.into_iter();

        for (a, b) in left.by_ref().zip(right.by_ref()).take(pairs) {
            out.push(Paired::Pair(a.record, b.record));
        }
        out.extend(left.chain(right).map(Paired::Unpaired));
        out
    }
}

/// Duplicates found for one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateSummary {
    /// Records sharing the key, the kept one included
    pub count: usize,
    /// Identifiers of those records, in arrival order
    pub ids: Vec<String>,
}

/// Result of deduplicating one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deduped {
    Kept(Record),
    Removed(Record),
    Summary(DuplicateSummary),
}

/// Keeps the first record of every group
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupReducer;

impl GroupReducer for DedupReducer {
    type Input = Record;
    type Output = Deduped;
    const NAME: &'static str = "dedup";

    fn reduce(&self, _key: &[u8], group: Vec<Record>) -> Vec<Deduped> {
        if group.len() == 1 {
            return group.into_iter().map(Deduped::Kept).collect();
        }

        let summary = DuplicateSummary {
            count: group.len(),
            ids: group.iter().map(|r| r.id.clone()).collect(),
        };

        let mut out = Vec::with_capacity(group.len() + 1);
        let mut records = group.into_iter();
        if let Some(first) = records.next() {
            out.push(Deduped::Kept(first));
        }
        out.extend(records.map(Deduped::Removed));
        out.push(Deduped::Summary(summary));
        out
    }
}

/// Appends `_<n>` to the identifier of the n-th repeat of a key
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameReducer;

impl GroupReducer for RenameReducer {
    type Input = Record;
    type Output = Record;
    const NAME: &'static str = "rename";

    fn reduce(&self, _key: &[u8], group: Vec<Record>) -> Vec<Record> {
        group
            .into_iter()
            .enumerate()
            .map(|(n, record)| {
                if n == 0 {
                    record
                } else {
                    let id = format!("{}_{n}", record.id);
                    record.renamed(id)
                }
            })
            .collect()
    }
}
