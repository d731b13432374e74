//! Grouping keys for the keyed multi-source operations.

use crate::core::collection::{Collection, Tagged};
use crate::core::record::{reverse_complement, Record};
use crate::core::types::{KeyMode, SeqType, SourceTag};
use crate::engine::Engine;

/// Grouping key; identifiers, headers and sequences are all compared as bytes
pub type Key = Vec<u8>;

/// Derives the grouping key of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyExtractor {
    mode: KeyMode,
    ignore_case: bool,
    /// Sequence keys are strand-canonical (the smaller of forward and reverse complement)
    both_strands: bool,
    /// Alphabet deciding whether a sequence has a reverse strand
    seq_type: SeqType,
}

impl KeyExtractor {
    #[must_use]
    pub fn new(mode: KeyMode, ignore_case: bool, both_strands: bool) -> Self {
        Self {
            mode,
            ignore_case,
            both_strands: both_strands && mode == KeyMode::Sequence,
            seq_type: SeqType::Unlimit,
        }
    }

    /// Only sequences of a stranded alphabet get strand-canonical keys; `Auto` guesses
    /// per record
    #[must_use]
    pub fn with_seq_type(mut self, seq_type: SeqType) -> Self {
        self.seq_type = seq_type;
        self
    }

    /// Key extractor from the usual command flags; protein sequences only have one strand
    #[must_use]
    pub fn from_flags(
        by_name: bool,
        by_seq: bool,
        ignore_case: bool,
        only_positive_strand: bool,
        seq_type: SeqType,
    ) -> Self {
        Self::new(
            KeyMode::from_flags(by_name, by_seq),
            ignore_case,
            !only_positive_strand,
        )
        .with_seq_type(seq_type)
    }

    #[must_use]
    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    #[must_use]
    pub fn key(&self, record: &Record) -> Key {
        let raw: &[u8] = match self.mode {
            KeyMode::Id => record.id.as_bytes(),
            KeyMode::Name => record.name.as_bytes(),
            KeyMode::Sequence => &record.sequence,
        };

        let key = if self.ignore_case {
            raw.to_ascii_lowercase()
        } else {
            raw.to_vec()
        };

        if self.both_strands && self.seq_type.has_strands_for(&record.sequence) {
            let reverse = reverse_complement(&key);
            key.min(reverse)
        } else {
            key
        }
    }
}

/// Tag every record of every source with its source index and key, then union
pub fn tag_sources(
    engine: &Engine,
    sources: Vec<Collection<Record>>,
    extractor: KeyExtractor,
) -> Collection<(Key, Tagged)> {
    let tagged = sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| {
            engine.map(source, move |record| {
                (extractor.key(&record), Tagged::new(SourceTag(index), record))
            })
        })
        .collect();

    engine.union(tagged)
}
