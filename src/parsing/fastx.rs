//! FASTA/FASTQ codec using noodles.
//!
//! Input is read whole (decompressing gzip/bgzip transparently), split into chunks
//! aligned to record boundaries, and each chunk is decoded by noodles inside its own
//! partition. Output is serialized per partition in parallel and written in order.
//!
//! Supported inputs:
//! - `.fa`, `.fasta`, `.fna`, `.fq`, `.fastq` (format detected from the first byte)
//! - any of the above gzip or bgzip compressed
//! - `-` for stdin

use std::fs::File;
use std::io::{Read, Write};
use std::ops::Range;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::{fasta, fastq};
use tracing::debug;

use crate::config::{CommandOptions, Resolved};
use crate::core::collection::{Collection, Spanned};
use crate::core::record::Record;
use crate::core::types::RecordFormat;
use crate::engine::Engine;
use crate::error::Result;
use crate::parsing::chunk::align_chunks;
use crate::parsing::id::IdParser;
use crate::parsing::span::scan_chunk;
use crate::utils::validation::{has_gzip_magic, is_gzipped, is_stdio};

/// Malformed or unreadable record content
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed {format} record: {message}")]
    Malformed {
        format: RecordFormat,
        message: String,
    },

    #[error("Cannot detect sequence format: {0}")]
    UnknownFormat(String),

    #[error("Record {0} has no description")]
    NoDescription(String),
}

/// Read an input file (or stdin for `-`), decompressing gzip content
///
/// # Errors
///
/// Returns `DataError::Read` if the file cannot be read or decompressed.
pub fn read_input(path: &Path) -> std::result::Result<Vec<u8>, DataError> {
    let read_error = |source| DataError::Read {
        path: path.display().to_string(),
        source,
    };

    let mut raw = Vec::new();
    if is_stdio(path) {
        std::io::stdin().lock().read_to_end(&mut raw).map_err(read_error)?;
    } else {
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut raw))
            .map_err(read_error)?;
    }

    if has_gzip_magic(&raw) || (is_gzipped(path) && !raw.is_empty()) {
        let mut decoded = Vec::new();
        MultiGzDecoder::new(raw.as_slice())
            .read_to_end(&mut decoded)
            .map_err(read_error)?;
        return Ok(decoded);
    }
    Ok(raw)
}

/// Format of the first record in `data`, if any
#[must_use]
pub fn detect_format(data: &[u8]) -> Option<RecordFormat> {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .and_then(|&b| RecordFormat::from_delimiter(b))
}

/// Decode one chunk of raw input
///
/// # Errors
///
/// Returns `DataError::Malformed` if noodles rejects a record.
pub fn decode_chunk(
    chunk: &[u8],
    format: RecordFormat,
    ids: &IdParser,
) -> std::result::Result<Vec<Record>, DataError> {
    match format {
        RecordFormat::Fasta => decode_fasta(chunk, ids),
        RecordFormat::Fastq => decode_fastq(chunk, ids),
    }
}

fn decode_fasta(chunk: &[u8], ids: &IdParser) -> std::result::Result<Vec<Record>, DataError> {
    let mut reader = fasta::io::Reader::new(chunk);
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| DataError::Malformed {
            format: RecordFormat::Fasta,
            message: e.to_string(),
        })?;

        let name: &[u8] = record.name().as_ref();
        let description: Option<&[u8]> = record.description().map(|d| d.as_ref());
        let header = header_line(name, description);
        let sequence: &[u8] = record.sequence().as_ref();

        records.push(Record::new(ids.parse(&header), header.as_str(), sequence));
    }

    Ok(records)
}

fn decode_fastq(chunk: &[u8], ids: &IdParser) -> std::result::Result<Vec<Record>, DataError> {
    let mut reader = fastq::io::Reader::new(chunk);
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| DataError::Malformed {
            format: RecordFormat::Fastq,
            message: e.to_string(),
        })?;

        let name: &[u8] = record.name().as_ref();
        let description: &[u8] = record.description().as_ref();
        let header = header_line(name, Some(description));
        let sequence: &[u8] = record.sequence().as_ref();
        let quality: &[u8] = record.quality_scores().as_ref();

        if sequence.len() != quality.len() {
            return Err(DataError::Malformed {
                format: RecordFormat::Fastq,
                message: format!(
                    "{header}: sequence length {} does not match quality length {}",
                    sequence.len(),
                    quality.len()
                ),
            });
        }

        records.push(
            Record::new(ids.parse(&header), header.as_str(), sequence).with_quality(quality),
        );
    }

    Ok(records)
}

fn header_line(name: &[u8], description: Option<&[u8]>) -> String {
    let mut header = String::from_utf8_lossy(name).into_owned();
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        header.push(' ');
        header.push_str(&String::from_utf8_lossy(description));
    }
    header
}

/// Raw bytes of one input, its format and the record-aligned chunk ranges
struct Chunked {
    data: Vec<u8>,
    format: RecordFormat,
    chunks: Vec<Range<usize>>,
}

/// `None` for an input with no records
fn read_chunked(path: &Path, partitions: usize) -> Result<Option<Chunked>> {
    let data = read_input(path)?;

    let Some(format) = detect_format(&data) else {
        if data.iter().all(u8::is_ascii_whitespace) {
            debug!(path = %path.display(), "Empty input");
            return Ok(None);
        }
        return Err(DataError::UnknownFormat(path.display().to_string()).into());
    };

    let chunks = align_chunks(&data, format, partitions);
    debug!(
        path = %path.display(),
        %format,
        bytes = data.len(),
        chunks = chunks.len(),
        "Read input"
    );
    Ok(Some(Chunked {
        data,
        format,
        chunks,
    }))
}

/// One partition per chunk, each holding its byte range
fn chunk_ranges(chunks: Vec<Range<usize>>) -> Collection<Range<usize>> {
    Collection::from_partitions(chunks.into_iter().map(|r| vec![r]).collect())
}

/// Read one input into a collection of about `partitions` partitions
///
/// # Errors
///
/// Returns `DataError` if the input cannot be read or its format detected, or
/// `EngineError::PartitionFailed` if a chunk fails to decode.
pub fn read_collection<O: CommandOptions>(
    engine: &Engine,
    path: &Path,
    options: &Resolved<O>,
    partitions: usize,
) -> Result<Collection<Record>> {
    let ids = options.kit().id_parser(O::COMMAND)?;
    let Some(Chunked {
        data,
        format,
        chunks,
    }) = read_chunked(path, partitions)?
    else {
        return Ok(engine.parallelize(Vec::new(), partitions));
    };

    let records = engine.map_partitions(&chunk_ranges(chunks), "decode", |_, ranges| {
        let mut records = Vec::new();
        for range in ranges {
            records.extend(decode_chunk(&data[range.clone()], format, &ids)?);
        }
        Ok(records)
    })?;

    Ok(records)
}

/// Read one input, keeping where each record sits in the raw bytes.
///
/// Spans describe the decompressed content; partition `i` accounts for exactly the bytes
/// of chunk `i`, and partition 0 also for anything before the first record.
///
/// # Errors
///
/// As [`read_collection`], plus `DataError::Malformed` for irregular line widths.
pub fn read_spanned<O: CommandOptions>(
    engine: &Engine,
    path: &Path,
    options: &Resolved<O>,
    partitions: usize,
) -> Result<Collection<Spanned>> {
    let ids = options.kit().id_parser(O::COMMAND)?;
    let Some(Chunked {
        data,
        format,
        chunks,
    }) = read_chunked(path, partitions)?
    else {
        return Ok(engine.parallelize(Vec::new(), partitions));
    };

    let spanned = engine.map_partitions(&chunk_ranges(chunks), "scan", |index, ranges| {
        let mut spanned = Vec::new();
        for range in ranges {
            let chunk = &data[range.clone()];
            let lead = if index == 0 { range.start as u64 } else { 0 };
            let records = decode_chunk(chunk, format, &ids)?;
            let spans = scan_chunk(chunk, format, lead)?;
            if records.len() != spans.len() {
                return Err(DataError::Malformed {
                    format,
                    message: format!(
                        "found {} record headers but decoded {} records",
                        spans.len(),
                        records.len()
                    ),
                });
            }
            spanned.extend(
                spans
                    .into_iter()
                    .zip(records)
                    .map(|(span, record)| Spanned { span, record }),
            );
        }
        Ok(spanned)
    })?;

    Ok(spanned)
}

/// Read every input, in order
///
/// # Errors
///
/// Returns the first error from [`read_collection`].
pub fn read_collections<P: AsRef<Path>, O: CommandOptions>(
    engine: &Engine,
    paths: &[P],
    options: &Resolved<O>,
) -> Result<Vec<Collection<Record>>> {
    paths
        .iter()
        .map(|path| read_collection(engine, path.as_ref(), options, engine.default_partitions()))
        .collect()
}

/// Serialize every partition in parallel and write them in order
///
/// # Errors
///
/// Returns an `Error` if writing fails.
pub fn write_collection<W: Write>(
    engine: &Engine,
    collection: &Collection<Record>,
    line_width: usize,
    writer: &mut W,
) -> Result<u64> {
    let buffers = engine.map_partitions(collection, "format", |_, records| {
        let mut buffer = Vec::with_capacity(
            records.iter().map(|r| r.formatted_len(line_width)).sum(),
        );
        for record in records {
            record.write_fastx(line_width, &mut buffer);
        }
        Ok(vec![buffer])
    })?;

    let mut written = 0u64;
    for buffer in buffers.iter() {
        writer.write_all(buffer)?;
        written += buffer.len() as u64;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::{resolve, FaidxOptions, Overrides, ShuffleOptions};
    use crate::engine::EngineConfig;

    fn options() -> Resolved<ShuffleOptions> {
        resolve(ShuffleOptions::default(), &Overrides::new()).unwrap()
    }

    fn engine() -> Engine {
        Engine::new(&EngineConfig {
            threads: 2,
            partitions: 3,
        })
        .unwrap()
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(b"\n>chr1\nAC\n"), Some(RecordFormat::Fasta));
        assert_eq!(detect_format(b"@r1\nAC\n+\nII\n"), Some(RecordFormat::Fastq));
        assert_eq!(detect_format(b"chr1\t100\n"), None);
        assert_eq!(detect_format(b""), None);
    }

    #[test]
    fn test_decode_fasta_chunk() {
        let records = decode_chunk(
            b">chr1 first contig\nACGT\nAC\n>chr2\nGG\n",
            RecordFormat::Fasta,
            &IdParser::default(),
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "chr1");
        assert_eq!(records[0].name, "chr1 first contig");
        assert_eq!(records[0].sequence, b"ACGTAC");
        assert!(records[1].quality.is_none());
    }

    #[test]
    fn test_decode_fastq_chunk() {
        let records = decode_chunk(
            b"@r1 lane=1\nACGT\n+\nIIII\n@r2\nGG\n+\n##\n",
            RecordFormat::Fastq,
            &IdParser::default(),
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "r1 lane=1");
        assert_eq!(records[0].quality.as_deref(), Some(&b"IIII"[..]));
        assert_eq!(records[1].id, "r2");
    }

    #[test]
    fn test_read_collection_keeps_order() {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..20 {
            writeln!(file, ">seq{i}\nACGTACGT").unwrap();
        }
        file.flush().unwrap();

        let engine = engine();
        let collection =
            read_collection(&engine, file.path(), &options(), 4).unwrap();
        assert!(collection.num_partitions() <= 4);
        let ids: Vec<String> = collection.iter().map(|r| r.id.clone()).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("seq{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_read_gzipped_input() {
        let file = NamedTempFile::new().unwrap();
        let mut encoder = GzEncoder::new(file.as_file(), Compression::default());
        encoder.write_all(b"@r1\nACGT\n+\nIIII\n").unwrap();
        encoder.finish().unwrap();

        let engine = engine();
        let collection =
            read_collection(&engine, file.path(), &options(), 2).unwrap();
        let records = engine.collect(collection);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].format(), RecordFormat::Fastq);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chr1\t248956422").unwrap();
        file.flush().unwrap();

        let engine = engine();
        let err = read_collection(&engine, file.path(), &options(), 2).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Data(DataError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_read_spanned_points_into_the_file() {
        let content = b"\n>chr1 desc\nACGTA\nCGTAC\nGT\n>chr2\nGGG\n>chr3\nTTTTT\nAA\n>chr4\nC\n";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();

        let engine = engine();
        let options = resolve(FaidxOptions::default(), &Overrides::new()).unwrap();
        let spanned = read_spanned(&engine, file.path(), &options, 3).unwrap();
        assert!(spanned.num_partitions() > 1);

        let mut position = 0;
        for item in spanned.iter() {
            position += item.span.lead;
            let start = (position + item.span.sequence_offset) as usize;
            let first_line = item.record.len().min(item.span.line_bases as usize);
            assert_eq!(&content[start..start + first_line], &item.record.sequence[..first_line]);
            assert_eq!(content[position as usize], b'>');
            position += item.span.length;
        }
        assert_eq!(position, content.len() as u64);
    }

    #[test]
    fn test_read_spanned_rejects_ragged_lines() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b">chr1\nACGT\nAC\nACGT\n").unwrap();
        file.flush().unwrap();

        let engine = engine();
        let err = read_spanned(&engine, file.path(), &options(), 2).unwrap_err();
        assert!(err.to_string().contains("different line length in sequence: chr1"));
    }

    #[test]
    fn test_write_collection() {
        let engine = engine();
        let collection = engine.parallelize(
            vec![
                Record::from_header("a", b"ACGTAC".to_vec()),
                Record::from_header("b", b"GG".to_vec()),
            ],
            2,
        );
        let mut out = Vec::new();
        let written = write_collection(&engine, &collection, 4, &mut out).unwrap();
        assert_eq!(out, b">a\nACGT\nAC\n>b\nGG\n");
        assert_eq!(written, out.len() as u64);
    }
}
