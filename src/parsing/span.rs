//! Line geometry of records as they sit in the raw input.
//!
//! A `.fai` index points into the file that was read, so the positions are taken from
//! the raw chunk lines rather than from a decoded record. Every byte of a chunk belongs
//! to exactly one span, which keeps per-partition sizes equal to the chunk lengths.

use crate::core::record::SourceSpan;
use crate::core::types::RecordFormat;
use crate::parsing::fastx::DataError;

/// Spans of every record in `chunk`, in order.
///
/// `lead` counts input bytes before the chunk that belong to no record; it is added to
/// the first span.
///
/// # Errors
///
/// Returns `DataError::Malformed` if a FASTA record is wrapped at more than one line
/// width, or a FASTQ record is truncated.
pub fn scan_chunk(
    chunk: &[u8],
    format: RecordFormat,
    lead: u64,
) -> Result<Vec<SourceSpan>, DataError> {
    let mut spans = match format {
        RecordFormat::Fasta => scan_fasta(chunk)?,
        RecordFormat::Fastq => scan_fastq(chunk)?,
    };
    if let Some(first) = spans.first_mut() {
        first.lead += lead;
    }
    Ok(spans)
}

fn lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split_inclusive(|&b| b == b'\n')
}

/// Length without the line ending
fn content_len(line: &[u8]) -> usize {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line).len()
}

/// Length with the line ending; an unterminated last line counts a newline
fn terminated_len(line: &[u8]) -> u64 {
    if line.ends_with(b"\n") {
        line.len() as u64
    } else {
        line.len() as u64 + 1
    }
}

fn record_id(header: &[u8]) -> String {
    let name = &header[1.min(header.len())..content_len(header)];
    let end = name
        .iter()
        .position(u8::is_ascii_whitespace)
        .unwrap_or(name.len());
    String::from_utf8_lossy(&name[..end]).into_owned()
}

struct FastaRecord<'a> {
    header: &'a [u8],
    lead: u64,
    /// (bases, bytes) of each line after the header
    lines: Vec<(u64, u64)>,
    length: u64,
}

impl<'a> FastaRecord<'a> {
    fn new(header: &'a [u8], lead: u64) -> Self {
        Self {
            header,
            lead,
            lines: Vec::new(),
            length: header.len() as u64,
        }
    }

    fn push(&mut self, line: &[u8]) {
        self.length += line.len() as u64;
        self.lines.push((content_len(line) as u64, terminated_len(line)));
    }

    fn finish(mut self) -> Result<SourceSpan, DataError> {
        while self.lines.last().is_some_and(|&(bases, _)| bases == 0) {
            self.lines.pop();
        }

        let (line_bases, line_bytes) = self.lines.first().copied().unwrap_or_default();
        if let Some((&(last_bases, _), body)) = self.lines.split_last() {
            let ragged = body.iter().any(|&line| line != (line_bases, line_bytes))
                || last_bases > line_bases;
            if ragged {
                return Err(DataError::Malformed {
                    format: RecordFormat::Fasta,
                    message: format!(
                        "different line length in sequence: {}",
                        record_id(self.header)
                    ),
                });
            }
        }

        Ok(SourceSpan {
            lead: self.lead,
            length: self.length,
            sequence_offset: self.header.len() as u64,
            line_bases,
            line_bytes,
            quality_offset: None,
        })
    }
}

fn scan_fasta(chunk: &[u8]) -> Result<Vec<SourceSpan>, DataError> {
    let mut spans = Vec::new();
    let mut current: Option<FastaRecord<'_>> = None;
    let mut lead = 0;

    for line in lines(chunk) {
        if line.first() == Some(&b'>') {
            if let Some(record) = current.take() {
                spans.push(record.finish()?);
            }
            current = Some(FastaRecord::new(line, std::mem::take(&mut lead)));
        } else if let Some(record) = current.as_mut() {
            record.push(line);
        } else {
            lead += line.len() as u64;
        }
    }
    if let Some(record) = current {
        spans.push(record.finish()?);
    }
    Ok(spans)
}

fn scan_fastq(chunk: &[u8]) -> Result<Vec<SourceSpan>, DataError> {
    let mut spans: Vec<SourceSpan> = Vec::new();
    let mut lead = 0;
    let mut lines = lines(chunk);

    while let Some(header) = lines.next() {
        if content_len(header) == 0 {
            match spans.last_mut() {
                Some(previous) => previous.length += header.len() as u64,
                None => lead += header.len() as u64,
            }
            continue;
        }

        let (Some(sequence), Some(plus), Some(quality)) = (lines.next(), lines.next(), lines.next())
        else {
            return Err(DataError::Malformed {
                format: RecordFormat::Fastq,
                message: format!("truncated record: {}", record_id(header)),
            });
        };

        let sequence_offset = header.len() as u64;
        let quality_offset = sequence_offset + sequence.len() as u64 + plus.len() as u64;
        spans.push(SourceSpan {
            lead: std::mem::take(&mut lead),
            length: quality_offset + quality.len() as u64,
            sequence_offset,
            line_bases: content_len(sequence) as u64,
            line_bytes: terminated_len(sequence),
            quality_offset: Some(quality_offset),
        });
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fasta_spans_follow_raw_lines() {
        let chunk = b">chr1 desc\nACGT\nACGT\nAC\n>chr2\nGGGG\nCC\n";
        let spans = scan_chunk(chunk, RecordFormat::Fasta, 0).unwrap();
        assert_eq!(spans.len(), 2);

        assert_eq!(spans[0].sequence_offset, 11);
        assert_eq!((spans[0].line_bases, spans[0].line_bytes), (4, 5));
        assert_eq!(spans[0].length, 24);

        assert_eq!(spans[1].sequence_offset, 6);
        assert_eq!((spans[1].line_bases, spans[1].line_bytes), (4, 5));
        let total: u64 = spans.iter().map(SourceSpan::extent).sum();
        assert_eq!(total, chunk.len() as u64);
    }

    #[test]
    fn test_fasta_crlf_and_trailing_blank_lines() {
        let chunk = b">a\r\nACG\r\nA\r\n\r\n\n>b\nTT";
        let spans = scan_chunk(chunk, RecordFormat::Fasta, 3).unwrap();
        assert_eq!(spans[0].lead, 3);
        assert_eq!(spans[0].sequence_offset, 4);
        assert_eq!((spans[0].line_bases, spans[0].line_bytes), (3, 5));
        assert_eq!(spans[0].length, 15);
        assert_eq!((spans[1].line_bases, spans[1].line_bytes), (2, 3));
    }

    #[test]
    fn test_fasta_ragged_lines_are_rejected() {
        for chunk in [
            &b">chr1\nACGT\nAC\nACGT\n"[..],
            &b">chr1\nACGT\nACGTA\n"[..],
            &b">chr1\nACGT\n\nACGT\n"[..],
        ] {
            let err = scan_chunk(chunk, RecordFormat::Fasta, 0).unwrap_err();
            assert!(err.to_string().contains("different line length in sequence: chr1"));
        }
    }

    #[test]
    fn test_empty_fasta_sequence() {
        let spans = scan_chunk(b">empty\n>b\nA\n", RecordFormat::Fasta, 0).unwrap();
        assert_eq!((spans[0].line_bases, spans[0].line_bytes), (0, 0));
        assert_eq!(spans[0].length, 7);
    }

    #[test]
    fn test_fastq_spans() {
        let chunk = b"@r1 x\nACGT\n+\n@@@@\n@r2\nGG\n+r2\n##\n";
        let spans = scan_chunk(chunk, RecordFormat::Fastq, 0).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].sequence_offset, 6);
        assert_eq!(spans[0].quality_offset, Some(13));
        assert_eq!((spans[0].line_bases, spans[0].line_bytes), (4, 5));
        assert_eq!(spans[1].quality_offset, Some(4 + 3 + 4));

        let err = scan_chunk(b"@r1\nACGT\n+\n", RecordFormat::Fastq, 0).unwrap_err();
        assert!(err.to_string().contains("truncated record: r1"));
    }
}
