//! Split raw input into chunks that start on record boundaries.

use std::ops::Range;

use crate::core::types::RecordFormat;

/// Split `data` into at most `n` byte ranges, each starting at a record header.
///
/// Cut points are placed at even byte offsets and then moved forward to the next line
/// that opens a record: the format delimiter at the start of a line and, for FASTQ, a
/// `+` line two lines below (a quality line may itself start with `@`). Bytes before
/// the first record are skipped. Empty ranges are dropped.
#[must_use]
pub fn align_chunks(data: &[u8], format: RecordFormat, n: usize) -> Vec<Range<usize>> {
    let Some(first) = next_record_start(data, 0, format) else {
        return Vec::new();
    };

    let n = n.max(1);
    let span = data.len() - first;
    let mut starts = vec![first];
    for i in 1..n {
        let target = first + i * span / n;
        let last = starts.last().copied().unwrap_or(first);
        if target <= last {
            continue;
        }
        match next_record_start(data, target, format) {
            Some(start) if start > last => starts.push(start),
            Some(_) => {}
            None => break,
        }
    }

    let mut chunks: Vec<Range<usize>> = starts
        .windows(2)
        .map(|pair| pair[0]..pair[1])
        .collect();
    if let Some(&last) = starts.last() {
        chunks.push(last..data.len());
    }
    chunks.retain(|range| !range.is_empty());
    chunks
}

/// First record start at or after `from`
fn next_record_start(data: &[u8], from: usize, format: RecordFormat) -> Option<usize> {
    let delimiter = format.delimiter();
    let mut pos = line_start_at_or_after(data, from)?;

    while pos < data.len() {
        if data[pos] == delimiter && is_record_start(data, pos, format) {
            return Some(pos);
        }
        pos = next_line(data, pos)?;
    }
    None
}

fn is_record_start(data: &[u8], pos: usize, format: RecordFormat) -> bool {
    match format {
        RecordFormat::Fasta => true,
        RecordFormat::Fastq => next_line(data, pos)
            .and_then(|seq| next_line(data, seq))
            .is_some_and(|plus| data.get(plus) == Some(&b'+')),
    }
}

fn line_start_at_or_after(data: &[u8], from: usize) -> Option<usize> {
    if from == 0 || data.get(from - 1) == Some(&b'\n') {
        return (from < data.len()).then_some(from);
    }
    next_line(data, from)
}

/// Start of the line after the one containing `pos`
fn next_line(data: &[u8], pos: usize) -> Option<usize> {
    let newline = data.get(pos..)?.iter().position(|&b| b == b'\n')?;
    let next = pos + newline + 1;
    (next < data.len()).then_some(next)
}
