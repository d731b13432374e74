use serde::{Deserialize, Serialize};

use crate::core::types::RecordFormat;

/// A single FASTA/FASTQ record
///
/// Records are produced by the codec and never modified in place; transforms that change a
/// record (renaming, joining, sub-sequence extraction) build a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Identifier parsed from the header
    pub id: String,

    /// Full header line without the leading `>`/`@`
    pub name: String,

    /// Sequence payload
    pub sequence: Vec<u8>,

    /// Per-base quality string (FASTQ only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Vec<u8>>,
}

/// Where a record sits in the input it was read from.
///
/// Offsets are relative to the start of the record's header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Bytes before the header line that belong to no record
    pub lead: u64,
    /// Bytes from the header line up to the next record, blank lines included
    pub length: u64,
    /// Offset of the first sequence byte
    pub sequence_offset: u64,
    /// Bases on each full sequence line
    pub line_bases: u64,
    /// Bytes on each full sequence line, line ending included
    pub line_bytes: u64,
    /// Offset of the first quality byte (FASTQ only)
    pub quality_offset: Option<u64>,
}

impl SourceSpan {
    /// Bytes of input this record accounts for
    #[must_use]
    pub fn extent(&self) -> u64 {
        self.lead + self.length
    }
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sequence: sequence.into(),
            quality: None,
        }
    }

    /// Build a record whose identifier is the first word of the header
    pub fn from_header(header: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        let name = header.into();
        let id = name.split_whitespace().next().unwrap_or_default().to_string();
        Self::new(id, name, sequence)
    }

    #[must_use]
    pub fn with_quality(mut self, quality: impl Into<Vec<u8>>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    #[must_use]
    pub fn format(&self) -> RecordFormat {
        if self.quality.is_some() {
            RecordFormat::Fastq
        } else {
            RecordFormat::Fasta
        }
    }

    /// Sequence length in bases
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Header text after the first word
    #[must_use]
    pub fn description(&self) -> &str {
        match self.name.split_once(char::is_whitespace) {
            Some((_, rest)) => rest.trim_start(),
            None => "",
        }
    }

    /// Number of bases, not counting any of the given gap letters
    #[must_use]
    pub fn base_count(&self, gap_letters: &[u8]) -> usize {
        self.sequence
            .iter()
            .filter(|b| !gap_letters.contains(b))
            .count()
    }

    /// Copy of this record under a new identifier; the description is kept
    #[must_use]
    pub fn renamed(&self, new_id: impl Into<String>) -> Self {
        let id = new_id.into();
        let description = self.description();
        let name = if description.is_empty() {
            id.clone()
        } else {
            format!("{id} {description}")
        };

        Self {
            id,
            name,
            sequence: self.sequence.clone(),
            quality: self.quality.clone(),
        }
    }

    /// Append the serialized record, trailing newline included.
    ///
    /// FASTA sequences are wrapped at `line_width` bases (0 disables wrapping);
    /// FASTQ records are always written as four lines.
    pub fn write_fastx(&self, line_width: usize, out: &mut Vec<u8>) {
        match &self.quality {
            Some(quality) => {
                out.push(b'@');
                out.extend_from_slice(self.name.as_bytes());
                out.push(b'\n');
                out.extend_from_slice(&self.sequence);
                out.extend_from_slice(b"\n+\n");
                out.extend_from_slice(quality);
                out.push(b'\n');
            }
            None => {
                out.push(b'>');
                out.extend_from_slice(self.name.as_bytes());
                out.push(b'\n');
                if line_width == 0 {
                    if !self.sequence.is_empty() {
                        out.extend_from_slice(&self.sequence);
                        out.push(b'\n');
                    }
                } else {
                    for line in self.sequence.chunks(line_width) {
                        out.extend_from_slice(line);
                        out.push(b'\n');
                    }
                }
            }
        }
    }

    /// Serialized record as text
    #[must_use]
    pub fn to_fastx(&self, line_width: usize) -> String {
        let mut out = Vec::with_capacity(self.formatted_len(line_width));
        self.write_fastx(line_width, &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Size in bytes of [`Record::write_fastx`] output, without serializing
    #[must_use]
    pub fn formatted_len(&self, line_width: usize) -> usize {
        let header = 1 + self.name.len() + 1;
        match &self.quality {
            Some(quality) => header + self.sequence.len() + 3 + quality.len() + 1,
            None => header + self.sequence.len() + self.sequence_lines(line_width),
        }
    }

    fn sequence_lines(&self, line_width: usize) -> usize {
        if self.sequence.is_empty() {
            0
        } else if line_width == 0 {
            1
        } else {
            self.sequence.len().div_ceil(line_width)
        }
    }
}

/// Reverse complement of a nucleotide sequence, preserving case.
///
/// Sequences containing `U` but no `T` are treated as RNA. IUPAC ambiguity codes are
/// complemented; any other byte is kept as is.
#[must_use]
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    let rna = sequence.iter().any(|b| matches!(b, b'U' | b'u'))
        && !sequence.iter().any(|b| matches!(b, b'T' | b't'));

    sequence
        .iter()
        .rev()
        .map(|&b| complement(b, rna))
        .collect()
}

fn complement(base: u8, rna: bool) -> u8 {
    let upper = match base.to_ascii_uppercase() {
        b'A' if rna => b'U',
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        other => other,
    };

    if base.is_ascii_lowercase() {
        upper.to_ascii_lowercase()
    } else {
        upper
    }
}
