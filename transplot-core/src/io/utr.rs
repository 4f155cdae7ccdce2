//! UTR annotation table reader.
//!
//! Comma-separated export with one row per transcript/UTR pair. Rows carry
//! either the 5' or the 3' columns; start coordinates are 0-based in the
//! file and are normalized to 1-based here. On the reverse strand the
//! start/end base pairs swap so `start_bp` is always the first transcribed
//! base of the region.

use crate::types::{Strand, UtrBpRange, UtrSide};
use log::warn;
use std::path::Path;
use thiserror::Error;

use super::{for_each_chunked, open_table, HeaderIndex};

const TRANSCRIPT_COLUMN: &str = "Ensembl Transcript ID";
const FIVE_START: &str = "5' UTR Start";
const FIVE_END: &str = "5' UTR End";
const THREE_START: &str = "3' UTR Start";
const THREE_END: &str = "3' UTR End";

#[derive(Debug, Error)]
pub enum UtrError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("UTR file {path} is missing column {column}")]
    MissingColumn { path: String, column: String },
}

/// Read the UTR bounds for one transcript. At most one region per side is
/// kept; duplicate rows for a side are skipped with a warning.
pub fn read_utrs(
    path: &Path,
    transcript: &str,
    strand: Strand,
) -> Result<Vec<UtrBpRange>, UtrError> {
    let io_err = |source| UtrError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut reader = open_table(path).map_err(io_err)?;

    let mut header = String::new();
    reader.read_line(&mut header).map_err(io_err)?;
    let index = HeaderIndex::parse(&header, ',');
    for column in [TRANSCRIPT_COLUMN, FIVE_START, FIVE_END, THREE_START, THREE_END] {
        if index.get(column).is_none() {
            return Err(UtrError::MissingColumn {
                path: path.display().to_string(),
                column: column.to_string(),
            });
        }
    }

    let rows = for_each_chunked(reader, ',', |fields| {
        if index.field(fields, TRANSCRIPT_COLUMN)? != transcript {
            return None;
        }
        parse_row(&index, fields, strand)
    })
    .map_err(io_err)?;

    let mut utrs: Vec<UtrBpRange> = Vec::with_capacity(2);
    for row in rows {
        if utrs.iter().any(|u| u.side == row.side) {
            warn!(
                "duplicate {} UTR row for {} in {}, keeping the first",
                row.side,
                transcript,
                path.display()
            );
            continue;
        }
        utrs.push(row);
    }
    Ok(utrs)
}

fn parse_row(index: &HeaderIndex, fields: &[&str], strand: Strand) -> Option<UtrBpRange> {
    let non_empty = |column: &str| -> Option<&str> {
        index
            .field(fields, column)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let (side, raw_start, raw_end) = if let Some(start) = non_empty(FIVE_START) {
        (UtrSide::FivePrime, start, non_empty(FIVE_END)?)
    } else if let Some(start) = non_empty(THREE_START) {
        (UtrSide::ThreePrime, start, non_empty(THREE_END)?)
    } else {
        return None;
    };

    // 0-based starts in the export, 1-based ends.
    let start_bp = raw_start.parse::<u64>().ok()? + 1;
    let end_bp = raw_end.parse::<u64>().ok()?;

    let (start_bp, end_bp) = match strand {
        Strand::Forward => (start_bp, end_bp),
        Strand::Reverse => (end_bp, start_bp),
    };
    Some(UtrBpRange {
        side,
        start_bp,
        end_bp,
    })
}
