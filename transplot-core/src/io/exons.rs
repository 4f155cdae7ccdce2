//! Exon coordinate table, cached between the derivation and layout stages.
//!
//! Plain CSV with header `exon,start_bp,end_bp,start_tp,end_tp`; base-pair
//! bounds are stored in transcription orientation, so `start_bp > end_bp`
//! on the reverse strand and the strand can be re-inferred on read.

use crate::types::{ExonBpRange, ExonCoord, Strand};
use log::warn;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use super::{for_each_chunked, open_table, HeaderIndex};

#[derive(Debug, Error)]
pub enum ExonTableError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("exon table {path} is missing column {column}")]
    MissingColumn { path: String, column: String },
    #[error("exon table {path} contains no exons")]
    Empty { path: String },
}

const COLUMNS: [&str; 5] = ["exon", "start_bp", "end_bp", "start_tp", "end_tp"];

pub fn write_exon_coords(path: &Path, coords: &[ExonCoord]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", COLUMNS.join(","))?;
    for coord in coords {
        writeln!(
            out,
            "{},{},{},{},{}",
            coord.name, coord.start_bp, coord.end_bp, coord.start_tp, coord.end_tp
        )?;
    }
    out.flush()
}

/// Read the cached exon table, returning the inferred strand and the exon
/// records sorted into transcription order.
pub fn read_exon_coords(path: &Path) -> Result<(Strand, Vec<ExonCoord>), ExonTableError> {
    let io_err = |source| ExonTableError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut reader = open_table(path).map_err(io_err)?;

    let mut header = String::new();
    reader.read_line(&mut header).map_err(io_err)?;
    let index = HeaderIndex::parse(&header, ',');
    for column in COLUMNS {
        if index.get(column).is_none() {
            return Err(ExonTableError::MissingColumn {
                path: path.display().to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut skipped = 0usize;
    let mut coords = for_each_chunked(reader, ',', |fields| {
        let parsed = (|| {
            Some(ExonCoord {
                name: index.field(fields, "exon")?.to_string(),
                start_bp: index.field(fields, "start_bp")?.parse().ok()?,
                end_bp: index.field(fields, "end_bp")?.parse().ok()?,
                start_tp: index.field(fields, "start_tp")?.parse().ok()?,
                end_tp: index.field(fields, "end_tp")?.parse().ok()?,
            })
        })();
        if parsed.is_none() {
            skipped += 1;
        }
        parsed
    })
    .map_err(io_err)?;

    if skipped > 0 {
        warn!(
            "skipped {} malformed exon rows in {}",
            skipped,
            path.display()
        );
    }
    if coords.is_empty() {
        return Err(ExonTableError::Empty {
            path: path.display().to_string(),
        });
    }

    coords.sort_by_key(|c| c.start_tp);
    let strand = if coords.iter().all(|c| c.end_bp > c.start_bp) {
        Strand::Forward
    } else {
        Strand::Reverse
    };
    Ok((strand, coords))
}

/// Strip the exon table down to the bp spans the coordinate mapper takes.
pub fn to_ranges(coords: &[ExonCoord]) -> Vec<ExonBpRange> {
    coords
        .iter()
        .map(|c| ExonBpRange {
            name: c.name.clone(),
            start_bp: c.start_bp,
            end_bp: c.end_bp,
        })
        .collect()
}
