//! Options structs, one per command.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use super::{parse_value, CommandOptions, ConfigError, KitConfig};

macro_rules! kit_accessors {
    () => {
        fn kit(&self) -> &KitConfig {
            &self.kit
        }

        fn kit_mut(&mut self) -> &mut KitConfig {
            &mut self.kit
        }
    };
}

/// Grouping flags shared by `common` and `rmdup`
fn check_key_flags(
    command: &'static str,
    by_name: bool,
    by_seq: bool,
    only_positive_strand: bool,
) -> Result<(), ConfigError> {
    if by_name && by_seq {
        return Err(ConfigError::MutuallyExclusive {
            command,
            fields: vec!["by_name", "by_seq"],
        });
    }
    if only_positive_strand && !by_seq {
        return Err(ConfigError::Requires {
            command,
            field: "only_positive_strand",
            required: "by_seq",
        });
    }
    Ok(())
}

// ============================================================================
// Keyed multi-source operations
// ============================================================================

/// Records present in every input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonOptions {
    pub kit: KitConfig,
    pub by_name: bool,
    pub by_seq: bool,
    pub ignore_case: bool,
    pub only_positive_strand: bool,
}

impl CommandOptions for CommonOptions {
    const COMMAND: &'static str = "common";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "by_name" => self.by_name = parse_value(Self::COMMAND, key, value)?,
            "by_seq" => self.by_seq = parse_value(Self::COMMAND, key, value)?,
            "ignore_case" => self.ignore_case = parse_value(Self::COMMAND, key, value)?,
            "only_positive_strand" => {
                self.only_positive_strand = parse_value(Self::COMMAND, key, value)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_key_flags(
            Self::COMMAND,
            self.by_name,
            self.by_seq,
            self.only_positive_strand,
        )
    }
}

/// Join two inputs on identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcatOptions {
    pub kit: KitConfig,
    /// Keep records whose identifier appears in one input only
    pub full: bool,
    /// Joins the descriptions of the two records
    pub separator: String,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            kit: KitConfig::default(),
            full: false,
            separator: "|".to_string(),
        }
    }
}

impl CommandOptions for ConcatOptions {
    const COMMAND: &'static str = "concat";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "full" => self.full = parse_value(Self::COMMAND, key, value)?,
            "separator" => self.separator = value.to_string(),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Pair the records of two inputs by identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairOptions {
    pub kit: KitConfig,
    pub save_unpaired: bool,
}

impl CommandOptions for PairOptions {
    const COMMAND: &'static str = "pair";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "save_unpaired" => self.save_unpaired = parse_value(Self::COMMAND, key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Remove duplicated records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RmDupOptions {
    pub kit: KitConfig,
    pub by_name: bool,
    pub by_seq: bool,
    pub ignore_case: bool,
    pub only_positive_strand: bool,
}

impl CommandOptions for RmDupOptions {
    const COMMAND: &'static str = "rmdup";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "by_name" => self.by_name = parse_value(Self::COMMAND, key, value)?,
            "by_seq" => self.by_seq = parse_value(Self::COMMAND, key, value)?,
            "ignore_case" => self.ignore_case = parse_value(Self::COMMAND, key, value)?,
            "only_positive_strand" => {
                self.only_positive_strand = parse_value(Self::COMMAND, key, value)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_key_flags(
            Self::COMMAND,
            self.by_name,
            self.by_seq,
            self.only_positive_strand,
        )
    }
}

/// Rename duplicated identifiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenameOptions {
    pub kit: KitConfig,
    /// Group by full header instead of identifier
    pub by_name: bool,
}

impl CommandOptions for RenameOptions {
    const COMMAND: &'static str = "rename";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "by_name" => self.by_name = parse_value(Self::COMMAND, key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Repeat every record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateOptions {
    pub kit: KitConfig,
    pub times: usize,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            kit: KitConfig::default(),
            times: 1,
        }
    }
}

impl CommandOptions for DuplicateOptions {
    const COMMAND: &'static str = "duplicate";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "times" => self.times = parse_value(Self::COMMAND, key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.times == 0 {
            return Err(ConfigError::invalid(Self::COMMAND, "times", "must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Order-sensitive operations
// ============================================================================

/// Parsed `start:end` bounds; 1-based, inclusive, negative counts from the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    pub start: i64,
    /// `None` means up to the last record
    pub end: Option<i64>,
}

/// Range bounds resolved against the collection size (1-based, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub first: u64,
    pub last: Option<u64>,
}

impl ResolvedRange {
    /// Whether the 1-based `ordinal` falls inside the range
    #[must_use]
    pub fn contains(&self, ordinal: u64) -> bool {
        ordinal >= self.first && self.last.map_or(true, |last| ordinal <= last)
    }
}

impl RangeBounds {
    /// Parse `start:end` or `start:`.
    ///
    /// `-1` as the end is the last record and is stored as an open end.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming `field` for bad syntax, a 0 bound, or
    /// bounds of the same sign with `start > end`.
    pub fn parse(command: &'static str, field: &str, text: &str) -> Result<Self, ConfigError> {
        let (start, end) = text.trim().split_once(':').ok_or_else(|| {
            ConfigError::invalid(command, field, format!("'{text}' is not start:end"))
        })?;

        let start: i64 = parse_value(command, field, start)?;
        let end: Option<i64> = if end.trim().is_empty() {
            None
        } else {
            Some(parse_value(command, field, end)?)
        };

        if start == 0 || end == Some(0) {
            return Err(ConfigError::invalid(
                command,
                field,
                "positions are 1-based, 0 is not allowed",
            ));
        }
        if let Some(end) = end {
            if (start > 0) == (end > 0) && start > end {
                return Err(ConfigError::invalid(
                    command,
                    field,
                    format!("start {start} is after end {end}"),
                ));
            }
        }

        Ok(Self {
            start,
            end: end.filter(|&e| e != -1),
        })
    }

    /// Whether resolving these bounds needs the total record count
    #[must_use]
    pub fn needs_count(&self) -> bool {
        self.start < 0 || self.end.is_some_and(|e| e < 0)
    }

    /// Resolve negative positions against `total` and clamp to the collection.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvertedRange` if the resolved start is after the resolved end.
    pub fn resolve(&self, command: &'static str, total: u64) -> Result<ResolvedRange, ConfigError> {
        let total = i128::from(total);
        let position = |bound: i64| {
            let bound = i128::from(bound);
            if bound > 0 {
                bound
            } else {
                total + bound + 1
            }
        };

        let start = position(self.start);
        let end = self.end.map(position);

        if let Some(end) = end {
            if start > end {
                return Err(ConfigError::InvertedRange {
                    command,
                    start: i64::try_from(start).unwrap_or(i64::MAX),
                    end: i64::try_from(end).unwrap_or(i64::MIN),
                });
            }
        }

        Ok(ResolvedRange {
            first: u64::try_from(start.max(1)).unwrap_or(u64::MAX),
            last: end.map(|e| u64::try_from(e.max(0)).unwrap_or(u64::MAX)),
        })
    }
}

/// Select records by position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeOptions {
    pub kit: KitConfig,
    pub range: String,
}

impl RangeOptions {
    /// # Errors
    ///
    /// Returns a `ConfigError` if `range` is missing or malformed.
    pub fn bounds(&self) -> Result<RangeBounds, ConfigError> {
        if self.range.trim().is_empty() {
            return Err(ConfigError::Missing {
                command: Self::COMMAND,
                field: "range",
            });
        }
        RangeBounds::parse(Self::COMMAND, "range", &self.range)
    }
}

impl CommandOptions for RangeOptions {
    const COMMAND: &'static str = "range";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "range" => self.range = value.trim().to_string(),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.bounds().map(|_| ())
    }
}

/// First `number` records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadOptions {
    pub kit: KitConfig,
    pub number: u64,
}

impl Default for HeadOptions {
    fn default() -> Self {
        Self {
            kit: KitConfig::default(),
            number: 10,
        }
    }
}

impl HeadOptions {
    #[must_use]
    pub fn bounds(&self) -> RangeBounds {
        RangeBounds {
            start: 1,
            end: Some(i64::try_from(self.number).unwrap_or(i64::MAX)),
        }
    }
}

impl CommandOptions for HeadOptions {
    const COMMAND: &'static str = "head";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "number" => self.number = parse_value(Self::COMMAND, key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.number == 0 {
            return Err(ConfigError::invalid(Self::COMMAND, "number", "must be at least 1"));
        }
        Ok(())
    }
}

/// Records of the first genome, recognized by shared leading description words
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadGenomeOptions {
    pub kit: KitConfig,
    /// Minimum number of leading description words shared with the first record
    pub mini_common_words: usize,
}

impl Default for HeadGenomeOptions {
    fn default() -> Self {
        Self {
            kit: KitConfig::default(),
            mini_common_words: 1,
        }
    }
}

impl CommandOptions for HeadGenomeOptions {
    const COMMAND: &'static str = "head-genome";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "mini_common_words" => {
                self.mini_common_words = parse_value(Self::COMMAND, key, value)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mini_common_words == 0 {
            return Err(ConfigError::invalid(
                Self::COMMAND,
                "mini_common_words",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// What `sort` orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKeyKind {
    Id,
    Name,
    Sequence,
    /// Sequence length; with `bases`, gap letters are not counted
    Length { bases: bool },
}

/// Globally sort records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOptions {
    pub kit: KitConfig,
    pub by_name: bool,
    pub by_seq: bool,
    pub by_length: bool,
    pub by_bases: bool,
    pub gap_letters: String,
    pub reverse: bool,
    pub ignore_case: bool,
    pub natural_order: bool,
    /// Bases of the sequence compared with `by_seq`, 0 for all
    pub seq_prefix_length: usize,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            kit: KitConfig::default(),
            by_name: false,
            by_seq: false,
            by_length: false,
            by_bases: false,
            gap_letters: "- \t.".to_string(),
            reverse: false,
            ignore_case: false,
            natural_order: false,
            seq_prefix_length: 10_000,
        }
    }
}

impl SortOptions {
    #[must_use]
    pub fn key_kind(&self) -> SortKeyKind {
        if self.by_length {
            SortKeyKind::Length {
                bases: self.by_bases,
            }
        } else if self.by_seq {
            SortKeyKind::Sequence
        } else if self.by_name {
            SortKeyKind::Name
        } else {
            SortKeyKind::Id
        }
    }
}

impl CommandOptions for SortOptions {
    const COMMAND: &'static str = "sort";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "by_name" => self.by_name = parse_value(Self::COMMAND, key, value)?,
            "by_seq" => self.by_seq = parse_value(Self::COMMAND, key, value)?,
            "by_length" => self.by_length = parse_value(Self::COMMAND, key, value)?,
            "by_bases" => self.by_bases = parse_value(Self::COMMAND, key, value)?,
            "gap_letters" => self.gap_letters = value.to_string(),
            "reverse" => self.reverse = parse_value(Self::COMMAND, key, value)?,
            "ignore_case" => self.ignore_case = parse_value(Self::COMMAND, key, value)?,
            "natural_order" => self.natural_order = parse_value(Self::COMMAND, key, value)?,
            "seq_prefix_length" => {
                self.seq_prefix_length = parse_value(Self::COMMAND, key, value)?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn normalize(&mut self) {
        if self.by_bases {
            self.by_length = true;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let selected: Vec<&'static str> = [
            ("by_length", self.by_length),
            ("by_name", self.by_name),
            ("by_seq", self.by_seq),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect();

        if selected.len() > 1 {
            return Err(ConfigError::MutuallyExclusive {
                command: Self::COMMAND,
                fields: selected,
            });
        }
        Ok(())
    }
}

/// Build an index and optionally extract regions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaidxOptions {
    pub kit: KitConfig,
    /// Region names are regular expressions
    pub use_regexp: bool,
    pub ignore_case: bool,
    /// Print the full header of extracted records instead of the region
    pub full_head: bool,
    pub regions: Vec<String>,
}

impl CommandOptions for FaidxOptions {
    const COMMAND: &'static str = "faidx";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "use_regexp" => self.use_regexp = parse_value(Self::COMMAND, key, value)?,
            "ignore_case" => self.ignore_case = parse_value(Self::COMMAND, key, value)?,
            "full_head" => self.full_head = parse_value(Self::COMMAND, key, value)?,
            "regions" => self.regions.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from),
            ),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.use_regexp {
            for region in &self.regions {
                RegexBuilder::new(region)
                    .case_insensitive(self.ignore_case)
                    .build()
                    .map_err(|e| ConfigError::invalid(Self::COMMAND, "regions", e))?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Randomized operations
// ============================================================================

/// Keep a random subset of records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleOptions {
    pub kit: KitConfig,
    pub seed: u64,
    /// Approximate number of records to keep, 0 for unset
    pub number: i64,
    /// Fraction of records to keep, 0 for unset
    pub proportion: f64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            kit: KitConfig::default(),
            seed: 11,
            number: 0,
            proportion: 0.0,
        }
    }
}

impl CommandOptions for SampleOptions {
    const COMMAND: &'static str = "sample";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "seed" => self.seed = parse_value(Self::COMMAND, key, value)?,
            "number" => self.number = parse_value(Self::COMMAND, key, value)?,
            "proportion" => self.proportion = parse_value(Self::COMMAND, key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.number < 0 {
            return Err(ConfigError::invalid(Self::COMMAND, "number", "must be positive"));
        }
        if !self.proportion.is_finite() || !(0.0..=1.0).contains(&self.proportion) {
            return Err(ConfigError::invalid(
                Self::COMMAND,
                "proportion",
                "must be in range (0, 1]",
            ));
        }
        if self.number == 0 && self.proportion == 0.0 {
            return Err(ConfigError::invalid(
                Self::COMMAND,
                "proportion",
                "one of number or proportion is required",
            ));
        }
        Ok(())
    }
}

/// Randomly reorder records across partitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShuffleOptions {
    pub kit: KitConfig,
    pub seed: u64,
}

impl Default for ShuffleOptions {
    fn default() -> Self {
        Self {
            kit: KitConfig::default(),
            seed: 23,
        }
    }
}

impl CommandOptions for ShuffleOptions {
    const COMMAND: &'static str = "shuffle";

    kit_accessors!();

    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "seed" => self.seed = parse_value(Self::COMMAND, key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, Overrides};

    #[test]
    fn test_common_key_flags() {
        let options = CommonOptions {
            by_name: true,
            by_seq: true,
            ..Default::default()
        };
        let err = resolve(options, &Overrides::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MutuallyExclusive { .. }));

        let options = RmDupOptions {
            only_positive_strand: true,
            ..Default::default()
        };
        let err = resolve(options, &Overrides::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Requires {
                field: "only_positive_strand",
                ..
            }
        ));
    }

    #[test]
    fn test_sort_rejects_two_keys() {
        let options = SortOptions {
            by_name: true,
            by_seq: true,
            ..Default::default()
        };
        assert!(resolve(options, &Overrides::new()).is_err());

        // by_bases implies by_length, which then clashes with by_name
        let options = SortOptions {
            by_bases: true,
            by_name: true,
            ..Default::default()
        };
        assert!(resolve(options, &Overrides::new()).is_err());
    }

    #[test]
    fn test_sort_by_bases_implies_length() {
        let options = SortOptions {
            by_bases: true,
            ..Default::default()
        };
        let resolved = resolve(options, &Overrides::new()).unwrap();
        assert!(resolved.by_length);
        assert_eq!(resolved.key_kind(), SortKeyKind::Length { bases: true });
        assert_eq!(SortOptions::default().key_kind(), SortKeyKind::Id);
    }

    #[test]
    fn test_range_parse() {
        let bounds = RangeBounds::parse("range", "range", "2:5").unwrap();
        assert_eq!(bounds, RangeBounds { start: 2, end: Some(5) });
        assert!(!bounds.needs_count());

        let bounds = RangeBounds::parse("range", "range", "-3:").unwrap();
        assert_eq!(bounds, RangeBounds { start: -3, end: None });
        assert!(bounds.needs_count());

        let bounds = RangeBounds::parse("range", "range", "1:-1").unwrap();
        assert_eq!(bounds.end, None);
        assert!(!bounds.needs_count());
    }

    #[test]
    fn test_range_rejects_zero_and_inverted() {
        assert!(RangeBounds::parse("range", "range", "0:5").is_err());
        assert!(RangeBounds::parse("range", "range", "1:0").is_err());
        assert!(RangeBounds::parse("range", "range", "5:2").is_err());
        assert!(RangeBounds::parse("range", "range", "-2:-5").is_err());
        assert!(RangeBounds::parse("range", "range", "5").is_err());
        assert!(RangeBounds::parse("range", "range", "a:b").is_err());

        let err = resolve(RangeOptions::default(), &Overrides::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "range", .. }));
    }

    #[test]
    fn test_range_resolve() {
        let bounds = RangeBounds::parse("range", "range", "-3:-2").unwrap();
        let range = bounds.resolve("range", 10).unwrap();
        assert_eq!(range, ResolvedRange { first: 8, last: Some(9) });

        // Mixed signs are only checked once the total is known
        let bounds = RangeBounds::parse("range", "range", "8:-5").unwrap();
        let err = bounds.resolve("range", 10).unwrap_err();
        assert!(matches!(err, ConfigError::InvertedRange { start: 8, end: 6, .. }));

        // Clamped to the collection
        let bounds = RangeBounds::parse("range", "range", "-20:3").unwrap();
        let range = bounds.resolve("range", 10).unwrap();
        assert_eq!(range, ResolvedRange { first: 1, last: Some(3) });
        assert!(range.contains(1));
        assert!(!range.contains(4));
    }

    #[test]
    fn test_head_requires_positive_number() {
        let options = HeadOptions {
            number: 0,
            ..Default::default()
        };
        assert!(resolve(options, &Overrides::new()).is_err());
        assert_eq!(HeadOptions::default().bounds(), RangeBounds { start: 1, end: Some(10) });
    }

    #[test]
    fn test_head_genome_needs_a_shared_word() {
        let err = resolve(
            HeadGenomeOptions::default(),
            &Overrides::new().with("mini-common-words", "0"),
        )
        .unwrap_err();
        assert_eq!(err.field(), "mini_common_words");

        let resolved = resolve(
            HeadGenomeOptions::default(),
            &Overrides::new().with("mini_common_words", "3"),
        )
        .unwrap();
        assert_eq!(resolved.mini_common_words, 3);
    }

    #[test]
    fn test_sample_validation() {
        let err = resolve(SampleOptions::default(), &Overrides::new()).unwrap_err();
        assert_eq!(err.field(), "proportion");

        let options = SampleOptions {
            proportion: 1.5,
            ..Default::default()
        };
        assert!(resolve(options, &Overrides::new()).is_err());

        let options = SampleOptions {
            number: -4,
            ..Default::default()
        };
        assert!(resolve(options, &Overrides::new()).is_err());

        let options = SampleOptions {
            number: 100,
            ..Default::default()
        };
        let resolved = resolve(options, &Overrides::new()).unwrap();
        assert_eq!(resolved.seed, 11);
    }

    #[test]
    fn test_faidx_regions_must_compile() {
        let options = FaidxOptions {
            use_regexp: true,
            regions: vec!["chr[0-9".to_string()],
            ..Default::default()
        };
        let err = resolve(options, &Overrides::new()).unwrap_err();
        assert_eq!(err.field(), "regions");

        let overrides = Overrides::new().with("regions", "chr1, chr2:1-10");
        let resolved = resolve(FaidxOptions::default(), &overrides).unwrap();
        assert_eq!(resolved.regions, vec!["chr1", "chr2:1-10"]);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ConcatOptions::default().separator, "|");
        assert_eq!(ShuffleOptions::default().seed, 23);
        assert_eq!(SortOptions::default().seq_prefix_length, 10_000);
        assert_eq!(DuplicateOptions::default().times, 1);
    }
}
