//! Order-sensitive pipelines: positional selection, the leading genome and global sort.

use tracing::{debug, info};

use crate::config::{
    CommandOptions, HeadGenomeOptions, HeadOptions, RangeBounds, RangeOptions, Resolved,
    SortKeyKind, SortOptions,
};
use crate::core::collection::{Collection, Partition};
use crate::core::record::Record;
use crate::engine::coordinator::{count, gather, offsets, Broadcast};
use crate::engine::Engine;
use crate::error::Result;
use crate::parsing::fastx::DataError;
use crate::utils::natural::natural_cmp;

/// Records at 1-based positions `start..=end` of the collection.
///
/// # Errors
///
/// Returns a `ConfigError` if the range is malformed or resolves to `start > end`, or an
/// `EngineError` if a stage fails.
pub fn range(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<RangeOptions>,
) -> Result<Collection<Record>> {
    let bounds = options.bounds()?;
    select(engine, &input, bounds, RangeOptions::COMMAND)
}

/// The first `number` records.
///
/// # Errors
///
/// Returns an `EngineError` if a stage fails.
pub fn head(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<HeadOptions>,
) -> Result<Collection<Record>> {
    select(engine, &input, options.bounds(), HeadOptions::COMMAND)
}

fn select(
    engine: &Engine,
    input: &Collection<Record>,
    bounds: RangeBounds,
    command: &'static str,
) -> Result<Collection<Record>> {
    // Only negative bounds need the size of the whole collection
    let total = if bounds.needs_count() {
        count(engine, input)?
    } else {
        0
    };
    let range = bounds.resolve(command, total)?;
    debug!(command, first = range.first, last = ?range.last, "Resolved range");

    let table = offsets(engine, input, |_| 1)?;
    table.verify(input)?;

    let selected = engine.map_partitions(input, command, |index, records| {
        let start = table.start(index).unwrap_or_default();
        // Ordinals of this partition are start+1 ..= start+len
        let len = records.len() as u64;
        let lo = range.first.saturating_sub(start + 1).min(len);
        let hi = range
            .last
            .map_or(len, |last| last.saturating_sub(start).min(len));
        if lo >= hi {
            return Ok(Vec::new());
        }
        #[allow(clippy::cast_possible_truncation)] // Bounded by records.len()
        Ok(records[lo as usize..hi as usize].to_vec())
    })?;

    Ok(selected)
}

/// Description words of the first record, and how many of them the genome shares
#[derive(Debug)]
struct GenomePrefix {
    words: Vec<String>,
    /// Shared word count of the second record, when it belongs to the genome
    shared: Option<usize>,
    /// Partition holding the first record
    origin: Option<usize>,
}

impl GenomePrefix {
    fn shared_words(&self, record: &Record) -> usize {
        record
            .description()
            .split_ascii_whitespace()
            .zip(&self.words)
            .take_while(|(word, prefix)| *word == prefix.as_str())
            .count()
    }

    fn matches(&self, record: &Record) -> bool {
        self.shared == Some(self.shared_words(record))
    }
}

/// Records of the first genome in a file of several concatenated genomes.
///
/// The first record is always kept. The following records belong to the same genome
/// while their descriptions share at least `mini_common_words` leading words with the
/// first record's description, and exactly as many as the second record does. The
/// genome ends at the first record that does not match.
///
/// Each partition measures its matching run from the start; partitions after the first
/// one whose run ends early keep nothing.
///
/// # Errors
///
/// Returns `DataError::NoDescription` if the first record has no description, or an
/// `EngineError` if a stage fails.
pub fn head_genome(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<HeadGenomeOptions>,
) -> Result<Collection<Record>> {
    let (first, second) = {
        let mut leading = input.iter();
        (leading.next().cloned(), leading.next().cloned())
    };
    let Some(first) = first else {
        return Ok(input);
    };
    if first.description().is_empty() {
        return Err(DataError::NoDescription(first.id.clone()).into());
    }

    let mut prefix = GenomePrefix {
        words: first
            .description()
            .split_ascii_whitespace()
            .map(String::from)
            .collect(),
        shared: None,
        origin: input
            .partitions()
            .iter()
            .find(|p| !p.is_empty())
            .map(Partition::index),
    };
    prefix.shared = second
        .map(|second| prefix.shared_words(&second))
        .filter(|&shared| shared >= options.mini_common_words);
    debug!(prefix = ?prefix.words, shared = ?prefix.shared, "Genome prefix");
    let prefix = Broadcast::new(prefix);

    let runs = gather(engine, &input, HeadGenomeOptions::COMMAND, |index, records| {
        let skip = usize::from(Some(index) == prefix.origin).min(records.len());
        Ok(skip + records[skip..].iter().take_while(|r| prefix.matches(r)).count())
    })?;

    let mut keep = Vec::with_capacity(runs.len());
    let mut open = true;
    for (partition, &run) in input.partitions().iter().zip(&runs) {
        keep.push(if open { run } else { 0 });
        open = open && run == partition.len();
    }
    let keep = Broadcast::new(keep);

    let genome = engine.map_partitions(&input, HeadGenomeOptions::COMMAND, |index, records| {
        let run = keep.get(index).copied().unwrap_or_default();
        Ok(records[..run].to_vec())
    })?;
    info!(records = keep.iter().sum::<usize>(), "Selected first genome");
    Ok(genome)
}

/// Globally sort records by the selected key; stable, so sorting twice changes nothing.
///
/// The default key is the identifier. `seq_prefix_length` limits how much of each
/// sequence is compared (0 compares the whole sequence).
#[allow(clippy::missing_errors_doc)]
pub fn sort(
    engine: &Engine,
    input: Collection<Record>,
    options: &Resolved<SortOptions>,
) -> Result<Collection<Record>> {
    let reverse = options.reverse;
    let ignore_case = options.ignore_case;
    let kind = options.key_kind();

    let sorted = match kind {
        SortKeyKind::Length { bases: false } => {
            engine.sort_by_key(input, Record::len, usize::cmp, reverse)
        }
        SortKeyKind::Length { bases: true } => {
            let gaps = options.gap_letters.as_bytes().to_vec();
            engine.sort_by_key(input, move |r| r.base_count(&gaps), usize::cmp, reverse)
        }
        SortKeyKind::Id | SortKeyKind::Name => {
            let by_name = kind == SortKeyKind::Name;
            let key_of = move |r: &Record| {
                let text = if by_name { &r.name } else { &r.id };
                if ignore_case {
                    text.to_lowercase()
                } else {
                    text.clone()
                }
            };
            if options.natural_order {
                engine.sort_by_key(input, key_of, |a, b| natural_cmp(a, b), reverse)
            } else {
                engine.sort_by_key(input, key_of, String::cmp, reverse)
            }
        }
        SortKeyKind::Sequence => {
            let prefix = options.seq_prefix_length;
            let key_of = move |r: &Record| {
                let end = if prefix == 0 {
                    r.sequence.len()
                } else {
                    prefix.min(r.sequence.len())
                };
                let sequence = &r.sequence[..end];
                if ignore_case {
                    sequence.to_ascii_lowercase()
                } else {
                    sequence.to_vec()
                }
            };
            engine.sort_by_key(input, key_of, Vec::cmp, reverse)
        }
    };

    info!(key = ?kind, reverse, "Sorted records");
    Ok(sorted)
}
