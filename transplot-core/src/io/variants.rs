//! Variant table reader.
//!
//! Tab-separated annotation export with one row per observed variant:
//! `featureID` (transcript), `pos` (genomic base pair), `effect`
//! (consequence term), `dnachange` and `prot_change`. Effects outside the
//! supported vocabulary are skipped here so the core only sees the closed
//! `VariantEffect` set.

use crate::types::VariantRecord;
use log::warn;
use std::path::Path;
use thiserror::Error;

use super::{for_each_chunked, open_table, HeaderIndex};

#[derive(Debug, Error)]
pub enum VariantTableError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("variant file {path} is missing column {column}")]
    MissingColumn { path: String, column: String },
}

const COLUMNS: [&str; 5] = ["featureID", "pos", "effect", "dnachange", "prot_change"];

/// Read the variants annotated against one transcript, in file order.
pub fn read_variants(path: &Path, transcript: &str) -> Result<Vec<VariantRecord>, VariantTableError> {
    let io_err = |source| VariantTableError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut reader = open_table(path).map_err(io_err)?;

    let mut header = String::new();
    reader.read_line(&mut header).map_err(io_err)?;
    let index = HeaderIndex::parse(&header, '\t');
    for column in COLUMNS {
        if index.get(column).is_none() {
            return Err(VariantTableError::MissingColumn {
                path: path.display().to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut skipped = 0usize;
    let records = for_each_chunked(reader, '\t', |fields| {
        if index.field(fields, "featureID")? != transcript {
            return None;
        }
        let parsed = (|| {
            Some(VariantRecord {
                bp: index.field(fields, "pos")?.parse().ok()?,
                effect: index.field(fields, "effect")?.parse().ok()?,
                dna_change: non_null(index.field(fields, "dnachange")),
                protein_change: non_null(index.field(fields, "prot_change")),
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
            "skipped {} variant rows with malformed fields or unsupported effects for {} in {}",
            skipped,
            transcript,
            path.display()
        );
    }
    Ok(records)
}

fn non_null(field: Option<&str>) -> String {
    match field {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => "NULL".to_string(),
    }
}
