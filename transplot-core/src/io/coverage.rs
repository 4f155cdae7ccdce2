//! Coverage table reader.
//!
//! The coverage file is a CSV with one row per sequenced base:
//! `name` (colon-separated, third field is the exon name), `chromStart`
//! (0-based BED start), `strand`, `position` (1-based offset into the
//! feature) and one depth column per sample. The genomic base pair of a row
//! is `chromStart + position`.

use crate::types::{BasePair, ExonBpRange, Strand};
use log::warn;
use std::path::Path;
use thiserror::Error;

use super::{for_each_chunked, open_table, HeaderIndex};

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("coverage file {path} is missing column {column}")]
    MissingColumn { path: String, column: String },
    #[error("coverage file {path} has no rows for transcript {transcript}")]
    NoRows { path: String, transcript: String },
}

/// One coverage row for the requested transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRow {
    pub exon: String,
    pub bp: BasePair,
    pub strand: Strand,
    /// Mean depth across the selected samples.
    pub depth: f64,
}

/// Read the coverage rows for one transcript, averaging the depth over the
/// given sample columns. Rows for other transcripts are filtered out and
/// malformed rows are skipped with a warning. The result is sorted by base
/// pair.
pub fn read_coverage(
    path: &Path,
    transcript: &str,
    samples: &[String],
) -> Result<Vec<CoverageRow>, CoverageError> {
    let io_err = |source| CoverageError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut reader = open_table(path).map_err(io_err)?;

    let mut header = String::new();
    reader.read_line(&mut header).map_err(io_err)?;
    let index = HeaderIndex::parse(&header, ',');
    let mut required: Vec<&str> = vec!["name", "chromStart", "strand", "position"];
    required.extend(samples.iter().map(|s| s.as_str()));
    for column in required {
        if index.get(column).is_none() {
            return Err(CoverageError::MissingColumn {
                path: path.display().to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut skipped = 0usize;
    let mut rows = for_each_chunked(reader, ',', |fields| {
        let name = index.field(fields, "name")?;
        if !name.contains(transcript) {
            return None;
        }
        match parse_row(&index, fields, samples) {
            Some(row) => Some(row),
            None => {
                skipped += 1;
                None
            }
        }
    })
    .map_err(io_err)?;

    if skipped > 0 {
        warn!(
            "skipped {} malformed coverage rows for {} in {}",
            skipped,
            transcript,
            path.display()
        );
    }
    if rows.is_empty() {
        return Err(CoverageError::NoRows {
            path: path.display().to_string(),
            transcript: transcript.to_string(),
        });
    }
    rows.sort_by_key(|row| row.bp);
    Ok(rows)
}

fn parse_row(index: &HeaderIndex, fields: &[&str], samples: &[String]) -> Option<CoverageRow> {
    let name = index.field(fields, "name")?;
    let exon = name.split(':').nth(2)?.to_string();
    let chrom_start: BasePair = index.field(fields, "chromStart")?.parse().ok()?;
    let position: BasePair = index.field(fields, "position")?.parse().ok()?;
    let strand_field = index.field(fields, "strand")?;
    let strand = Strand::try_from(strand_field.chars().next()?).ok()?;

    let mut depth = 0.0;
    for sample in samples {
        depth += index.field(fields, sample)?.parse::<f64>().ok()?;
    }
    if !samples.is_empty() {
        depth /= samples.len() as f64;
    }

    Some(CoverageRow {
        exon,
        bp: chrom_start + position,
        strand,
        depth,
    })
}

/// Derive the exon spans of a transcript from its coverage rows, in
/// transcription order with bp bounds in transcription orientation.
pub fn exon_ranges(rows: &[CoverageRow]) -> (Strand, Vec<ExonBpRange>) {
    let strand = rows.first().map(|r| r.strand).unwrap_or(Strand::Forward);

    let mut ranges: Vec<ExonBpRange> = Vec::new();
    for row in rows {
        if let Some(idx) = ranges.iter().position(|r| r.name == row.exon) {
            let range = &mut ranges[idx];
            let (lo, hi) = range.genomic_bounds();
            let lo = lo.min(row.bp);
            let hi = hi.max(row.bp);
            match strand {
                Strand::Forward => {
                    range.start_bp = lo;
                    range.end_bp = hi;
                }
                Strand::Reverse => {
                    range.start_bp = hi;
                    range.end_bp = lo;
                }
            }
        } else {
            ranges.push(ExonBpRange {
                name: row.exon.clone(),
                start_bp: row.bp,
                end_bp: row.bp,
            });
        }
    }

    // Transcription order: ascending genomic start for forward strands,
    // descending for reverse.
    match strand {
        Strand::Forward => ranges.sort_by_key(|r| r.genomic_bounds().0),
        Strand::Reverse => {
            ranges.sort_by_key(|r| std::cmp::Reverse(r.genomic_bounds().1))
        }
    }
    (strand, ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(exon: &str, bp: BasePair, strand: Strand) -> CoverageRow {
        CoverageRow {
            exon: exon.to_string(),
            bp,
            strand,
            depth: 1.0,
        }
    }

    #[test]
    fn forward_exon_ranges_ascend() {
        let rows: Vec<CoverageRow> = (100..=150)
            .map(|bp| row("1", bp, Strand::Forward))
            .chain((200..=260).map(|bp| row("2", bp, Strand::Forward)))
            .collect();
        let (strand, ranges) = exon_ranges(&rows);
        assert_eq!(strand, Strand::Forward);
        assert_eq!(ranges.len(), 2);
        assert_eq!((ranges[0].start_bp, ranges[0].end_bp), (100, 150));
        assert_eq!((ranges[1].start_bp, ranges[1].end_bp), (200, 260));
    }

    #[test]
    fn reverse_exon_ranges_descend() {
        let rows: Vec<CoverageRow> = (250..=300)
            .map(|bp| row("1", bp, Strand::Reverse))
            .chain((100..=150).map(|bp| row("2", bp, Strand::Reverse)))
            .collect();
        let (strand, ranges) = exon_ranges(&rows);
        assert_eq!(strand, Strand::Reverse);
        // Exon "1" (higher coordinates) is transcribed first.
        assert_eq!(ranges[0].name, "1");
        assert_eq!((ranges[0].start_bp, ranges[0].end_bp), (300, 250));
        assert_eq!((ranges[1].start_bp, ranges[1].end_bp), (150, 100));
    }
}
