use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Provenance of a record in a multi-source operation (0-based input index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceTag(pub usize);

impl SourceTag {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Displayed 1-based, the way inputs are numbered on the command line
        write!(f, "{}", self.0 + 1)
    }
}

/// Sequence alphabet declared for the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeqType {
    /// Guess from the sequence content when it matters
    #[default]
    Auto,
    Dna,
    Rna,
    Protein,
    /// No alphabet restrictions
    Unlimit,
}

/// IUPAC nucleotide codes and gap symbols
const NUCLEOTIDE_LETTERS: &[u8] = b"ACGTUNRYSWKMBDHV-.*";

/// Bases inspected when guessing an alphabet
pub const ALPHABET_GUESS_LENGTH: usize = 10_000;

impl SeqType {
    /// Whether a reverse complement is meaningful for this alphabet
    #[must_use]
    pub fn has_strands(self) -> bool {
        !matches!(self, Self::Protein)
    }

    /// Guess the alphabet from the leading bases of `sequence`.
    ///
    /// Anything outside the IUPAC nucleotide codes makes it protein; `U` without `T`
    /// makes it RNA.
    #[must_use]
    pub fn guess(sequence: &[u8]) -> Self {
        let head = &sequence[..sequence.len().min(ALPHABET_GUESS_LENGTH)];
        let mut has_t = false;
        let mut has_u = false;
        for base in head.iter().map(u8::to_ascii_uppercase) {
            if !NUCLEOTIDE_LETTERS.contains(&base) {
                return Self::Protein;
            }
            has_t |= base == b'T';
            has_u |= base == b'U';
        }
        if has_u && !has_t {
            Self::Rna
        } else {
            Self::Dna
        }
    }

    /// Whether `sequence` has two strands; `Auto` decides from the sequence itself
    #[must_use]
    pub fn has_strands_for(self, sequence: &[u8]) -> bool {
        match self {
            Self::Auto => Self::guess(sequence).has_strands(),
            declared => declared.has_strands(),
        }
    }
}

impl FromStr for SeqType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "dna" => Ok(Self::Dna),
            "rna" => Ok(Self::Rna),
            "protein" => Ok(Self::Protein),
            "unlimit" => Ok(Self::Unlimit),
            other => Err(format!(
                "invalid sequence type: {other}, available values: dna|rna|protein|unlimit|auto"
            )),
        }
    }
}

impl std::fmt::Display for SeqType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Dna => write!(f, "dna"),
            Self::Rna => write!(f, "rna"),
            Self::Protein => write!(f, "protein"),
            Self::Unlimit => write!(f, "unlimit"),
        }
    }
}

/// On-disk record format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    Fasta,
    Fastq,
}

impl RecordFormat {
    /// Byte that opens every record; used to align raw chunks to record boundaries
    #[must_use]
    pub fn delimiter(self) -> u8 {
        match self {
            Self::Fasta => b'>',
            Self::Fastq => b'@',
        }
    }

    #[must_use]
    pub fn from_delimiter(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(Self::Fasta),
            b'@' => Some(Self::Fastq),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fasta => write!(f, "FASTA"),
            Self::Fastq => write!(f, "FASTQ"),
        }
    }
}

/// Which part of a record a grouping key is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    /// Parsed identifier
    #[default]
    Id,
    /// Full header line
    Name,
    /// Sequence content
    Sequence,
}

impl KeyMode {
    /// Pick the key mode from the usual pair of mutually exclusive flags
    #[must_use]
    pub fn from_flags(by_name: bool, by_seq: bool) -> Self {
        if by_seq {
            Self::Sequence
        } else if by_name {
            Self::Name
        } else {
            Self::Id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_type_parse() {
        assert_eq!("DNA".parse::<SeqType>().unwrap(), SeqType::Dna);
        assert_eq!("auto".parse::<SeqType>().unwrap(), SeqType::Auto);
        assert!("bases".parse::<SeqType>().is_err());
        assert!(!SeqType::Protein.has_strands());
    }

    #[test]
    fn test_seq_type_guess() {
        assert_eq!(SeqType::guess(b"ACGTNacgtn-"), SeqType::Dna);
        assert_eq!(SeqType::guess(b"ACGUacgu"), SeqType::Rna);
        assert_eq!(SeqType::guess(b"MKLVEQF"), SeqType::Protein);
        assert!(SeqType::Auto.has_strands_for(b"ACGT"));
        assert!(!SeqType::Auto.has_strands_for(b"MKLVE"));
        assert!(SeqType::Unlimit.has_strands_for(b"MKLVE"));
    }

    #[test]
    fn test_record_format_delimiter() {
        assert_eq!(RecordFormat::Fasta.delimiter(), b'>');
        assert_eq!(RecordFormat::from_delimiter(b'@'), Some(RecordFormat::Fastq));
        assert_eq!(RecordFormat::from_delimiter(b'#'), None);
    }

    #[test]
    fn test_key_mode_from_flags() {
        assert_eq!(KeyMode::from_flags(false, false), KeyMode::Id);
        assert_eq!(KeyMode::from_flags(true, false), KeyMode::Name);
        assert_eq!(KeyMode::from_flags(false, true), KeyMode::Sequence);
    }

    #[test]
    fn test_source_tag_display_is_one_based() {
        assert_eq!(SourceTag(0).to_string(), "1");
        assert_eq!(SourceTag(2).index(), 2);
    }
}
