//! Protein-domain table reader.
//!
//! Tab-separated export with one row per domain instance:
//! `TranscriptID`, `Length` (protein length in amino acids), `DomainID`,
//! `Start`/`End` (amino-acid positions), `Domain_type` (source database)
//! and `name`. Rows are filtered to the requested transcripts and database
//! before accumulating.

use crate::types::DomainRecord;
use log::warn;
use std::path::Path;
use thiserror::Error;

use super::{for_each_chunked, open_table, HeaderIndex};

#[derive(Debug, Error)]
pub enum DomainTableError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("domain file {path} is missing column {column}")]
    MissingColumn { path: String, column: String },
}

const COLUMNS: [&str; 6] = [
    "TranscriptID",
    "Length",
    "DomainID",
    "Start",
    "End",
    "Domain_type",
];

/// Read the domain rows for the given transcripts from one database,
/// sorted by amino-acid bounds so color assignment and the downstream
/// sweep see a stable order.
pub fn read_domains(
    path: &Path,
    transcripts: &[String],
    database: &str,
) -> Result<Vec<DomainRecord>, DomainTableError> {
    let io_err = |source| DomainTableError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut reader = open_table(path).map_err(io_err)?;

    let mut header = String::new();
    reader.read_line(&mut header).map_err(io_err)?;
    let index = HeaderIndex::parse(&header, '\t');
    for column in COLUMNS {
        if index.get(column).is_none() {
            return Err(DomainTableError::MissingColumn {
                path: path.display().to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut skipped = 0usize;
    let mut records = for_each_chunked(reader, '\t', |fields| {
        let transcript_id = index.field(fields, "TranscriptID")?;
        if !transcripts.iter().any(|t| t == transcript_id) {
            return None;
        }
        if index.field(fields, "Domain_type")? != database {
            return None;
        }
        let parsed = (|| {
            let length_aa: f64 = index.field(fields, "Length")?.parse().ok()?;
            if length_aa <= 0.0 {
                return None;
            }
            Some(DomainRecord {
                transcript_id: transcript_id.to_string(),
                domain_id: index.field(fields, "DomainID")?.to_string(),
                name: index
                    .field(fields, "name")
                    .unwrap_or_default()
                    .to_string(),
                length_aa,
                start_aa: index.field(fields, "Start")?.parse().ok()?,
                end_aa: index.field(fields, "End")?.parse().ok()?,
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
            "skipped {} malformed domain rows in {}",
            skipped,
            path.display()
        );
    }

    records.sort_by(|a, b| {
        (a.start_aa, a.end_aa)
            .partial_cmp(&(b.start_aa, b.end_aa))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(records)
}
