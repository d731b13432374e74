//! Index construction (`.fai`-style offset tables) and region extraction.
//!
//! The index describes the input file as it was read: each partition knows the raw spans
//! of its records (see [`crate::parsing::fastx::read_spanned`]) and the coordinator turns
//! per-partition byte counts into absolute starts. For gzip input the offsets refer to
//! the decompressed content.
//!
//! ## Region syntax
//!
//! | Region      | Meaning                                   | Header        |
//! |-------------|-------------------------------------------|---------------|
//! | `id`        | whole record                              | `id`          |
//! | `id:b-e`    | bases `b..=e` (1-based, negative from end) | `id:b-e`      |
//! | `id:b`      | single base `b`                           | `id:b-b`      |
//! | `id:b-`     | from `b` to the end                       | `id`          |
//! | `id:-e`     | from the start to `e`                     | `id:1-e`      |
//! | `id:e-b`    | `b < e`: reverse complement of `b..=e`     | `id:e-b`      |

use std::collections::HashMap;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigError, FaidxOptions, Resolved};
use crate::core::collection::{Collection, Spanned};
use crate::core::record::{reverse_complement, Record};
use crate::engine::coordinator::offsets;
use crate::engine::Engine;
use crate::error::Result;

/// One line of a FASTA/FASTQ index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaiEntry {
    pub name: String,
    /// Sequence length in bases
    pub length: u64,
    /// Byte offset of the first base
    pub offset: u64,
    /// Bases per sequence line
    pub line_bases: u64,
    /// Bytes per sequence line, newline included
    pub line_width: u64,
    /// Byte offset of the first quality character (FASTQ only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qual_offset: Option<u64>,
}

impl fmt::Display for FaiEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.length, self.offset, self.line_bases, self.line_width
        )?;
        if let Some(qual_offset) = self.qual_offset {
            write!(f, "\t{qual_offset}")?;
        }
        Ok(())
    }
}

/// A parsed region query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionQuery {
    pub id: String,
    pub begin: i64,
    pub end: i64,
}

impl RegionQuery {
    /// Parse a region; anything that is not `id:<range>` is a whole-record query
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some((id, range)) = text.rsplit_once(':') {
            if let Some((begin, end)) = parse_range(range).filter(|_| !id.is_empty()) {
                return Self {
                    id: id.to_string(),
                    begin,
                    end,
                };
            }
        }
        Self {
            id: text.to_string(),
            begin: 1,
            end: -1,
        }
    }

    /// Whole record, or a `b-` style open region; the header carries no coordinates
    #[must_use]
    pub fn is_open(&self) -> bool {
        (self.begin == 1 && self.end == -1) || (self.begin > 0 && self.end < 0)
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_range(range: &str) -> Option<(i64, i64)> {
    if !range.is_empty() && range.bytes().all(|b| b.is_ascii_digit()) {
        let base = range.parse().ok()?;
        return Some((base, base));
    }

    // `b-e` or `b-`, where either number may be negative
    for (i, _) in range.match_indices('-').filter(|(i, _)| *i > 0) {
        let (left, right) = (&range[..i], &range[i + 1..]);
        if let Some(begin) = parse_int(left) {
            if right.is_empty() {
                return Some((begin, -1));
            }
            if let Some(end) = parse_int(right) {
                return Some((begin, end));
            }
        }
    }

    // `-e`
    range
        .strip_prefix('-')
        .and_then(parse_int)
        .map(|end| (1, end))
}

/// Resolve 1-based, possibly negative, inclusive positions to a 0-based half-open range.
///
/// A 0 start means 1, a 0 end means the last base. Returns `None` when the region falls
/// outside the sequence or is empty.
#[must_use]
pub fn sub_location(length: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let length = i64::try_from(length).ok()?;
    if length == 0 {
        return None;
    }

    let start = match start {
        0 => 1,
        s if s < 0 => {
            if -s > length {
                return None;
            }
            length + s + 1
        }
        s => s,
    };
    if start > length {
        return None;
    }

    let end = match end {
        0 => length,
        e if e < 0 => length + e + 1,
        e => e.min(length),
    };
    if start - 1 >= end {
        return None;
    }

    Some((usize::try_from(start - 1).ok()?, usize::try_from(end).ok()?))
}

/// Selects records and regions to extract
#[derive(Debug, Clone)]
pub enum RegionMatcher {
    /// Region queries grouped by (possibly case-folded) identifier, in query order
    Ranges {
        queries: HashMap<String, Vec<RegionQuery>>,
        ignore_case: bool,
    },
    /// Whole records whose identifier matches any pattern
    Patterns(Vec<Regex>),
}

impl RegionMatcher {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a pattern does not compile.
    pub fn new(regions: &[String], use_regexp: bool, ignore_case: bool) -> Result<Self, ConfigError> {
        if use_regexp {
            let patterns = regions
                .iter()
                .map(|r| {
                    RegexBuilder::new(r)
                        .case_insensitive(ignore_case)
                        .build()
                        .map_err(|e| ConfigError::invalid("faidx", "regions", e))
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Patterns(patterns));
        }

        let mut queries: HashMap<String, Vec<RegionQuery>> = HashMap::new();
        for region in regions {
            let query = RegionQuery::parse(region);
            let key = if ignore_case {
                query.id.to_lowercase()
            } else {
                query.id.clone()
            };
            queries.entry(key).or_default().push(query);
        }
        Ok(Self::Ranges {
            queries,
            ignore_case,
        })
    }

    /// `(begin, end)` of every region requested for `id`
    #[must_use]
    pub fn regions_for(&self, id: &str) -> Vec<(i64, i64)> {
        match self {
            Self::Ranges {
                queries,
                ignore_case,
            } => {
                let found = if *ignore_case {
                    queries.get(&id.to_lowercase())
                } else {
                    queries.get(id)
                };
                found
                    .map(|qs| qs.iter().map(|q| (q.begin, q.end)).collect())
                    .unwrap_or_default()
            }
            Self::Patterns(patterns) => {
                if patterns.iter().any(|p| p.is_match(id)) {
                    vec![(1, -1)]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

/// Cut a region out of `record`; `None` if it lies outside the sequence
#[must_use]
pub fn extract_region(record: &Record, head: &str, begin: i64, end: i64) -> Option<Record> {
    let query = RegionQuery {
        id: head.to_string(),
        begin,
        end,
    };

    if query.is_open() || begin <= end {
        let (start, stop) = sub_location(record.len(), begin, end)?;
        let name = if query.is_open() {
            head.to_string()
        } else {
            format!("{head}:{begin}-{end}")
        };
        Some(Record::new(head, name, &record.sequence[start..stop]))
    } else {
        let (start, stop) = sub_location(record.len(), end, begin)?;
        let name = format!("{head}:{begin}-{end}");
        Some(Record::new(
            head,
            name,
            reverse_complement(&record.sequence[start..stop]),
        ))
    }
}

/// Output of [`faidx`]
#[derive(Debug)]
pub struct FaidxOutput {
    /// Index entries in collection order
    pub index: Vec<FaiEntry>,
    /// Extracted regions, when any were requested
    pub regions: Option<Collection<Record>>,
}

/// Build the index of the input and extract the requested regions.
///
/// With `full_head`, index names are whole headers and regions are matched against them.
///
/// # Errors
///
/// Returns a `ConfigError` if a region pattern does not compile, or an `EngineError` if
/// a stage fails or the offset table does not match the collection.
pub fn faidx(
    engine: &Engine,
    input: &Collection<Spanned>,
    options: &Resolved<FaidxOptions>,
) -> Result<FaidxOutput> {
    let full_head = options.full_head;
    let head_of = |record: &Record| -> String {
        if full_head {
            record.name.clone()
        } else {
            record.id.clone()
        }
    };

    let table = offsets(engine, input, |item| item.span.extent())?;
    table.verify(input)?;

    let entries = engine.map_partitions(input, "faidx", |index, items| {
        let mut position = table.start(index).unwrap_or_default();
        let mut entries = Vec::with_capacity(items.len());
        for Spanned { span, record } in items {
            let header = position + span.lead;
            entries.push(FaiEntry {
                name: head_of(record),
                length: record.len() as u64,
                offset: header + span.sequence_offset,
                line_bases: span.line_bases,
                line_width: span.line_bytes,
                qual_offset: span.quality_offset.map(|q| header + q),
            });
            position += span.extent();
        }
        Ok(entries)
    })?;
    let index = engine.collect(entries);
    info!(records = index.len(), bytes = table.total(), "Built index");

    if options.regions.is_empty() {
        return Ok(FaidxOutput {
            index,
            regions: None,
        });
    }

    let matcher = RegionMatcher::new(&options.regions, options.use_regexp, options.ignore_case)?;
    let extracted = engine.map_partitions(input, "regions", |_, items| {
        let mut out = Vec::new();
        for Spanned { record, .. } in items {
            let head = head_of(record);
            for (begin, end) in matcher.regions_for(&head) {
                if let Some(region) = extract_region(record, &head, begin, end) {
                    out.push(region);
                }
            }
        }
        Ok(out)
    })?;
    debug!(
        queries = options.regions.len(),
        extracted = extracted.iter().count(),
        "Extracted regions"
    );

    Ok(FaidxOutput {
        index,
        regions: Some(extracted),
    })
}
