//! Domain color assignment and the domain-color table cache.
//!
//! Each distinct domain id gets one color from a fixed qualitative cycle, in
//! first-seen order, so the same input table always produces the same
//! legend. The assignment round-trips through a small CSV used as a cache
//! between the color and layout pipeline stages.

use crate::types::{ColorSpec, DomainRecord};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Fill for regions covered by no domain.
pub const EMPTY_FILL: &str = "#D1D0CE";

/// Qualitative cycle assigned to domain ids, repeating when exhausted.
const DOMAIN_CYCLE: [&str; 9] = [
    "#E41A1C", "#377EB8", "#4DAF4A", "#984EA3", "#FF7F00", "#FFFF33", "#A65628", "#F781BF",
    "#999999",
];

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid color table line {line}: {detail}")]
    InvalidLine { line: usize, detail: String },
}

/// Colors keyed by domain id, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainPalette {
    entries: Vec<(String, ColorSpec)>,
}

impl DomainPalette {
    /// Assign colors to the distinct domain ids of `records`, in the order
    /// they appear. Callers sort the records first (the color stage sorts by
    /// amino-acid start) so assignment order is a property of the data, not
    /// of table chunking.
    pub fn assign(records: &[DomainRecord]) -> Self {
        let mut entries: Vec<(String, ColorSpec)> = Vec::new();
        for rec in records {
            if entries.iter().any(|(id, _)| id == &rec.domain_id) {
                continue;
            }
            let color = ColorSpec::named(DOMAIN_CYCLE[entries.len() % DOMAIN_CYCLE.len()]);
            entries.push((rec.domain_id.clone(), color));
        }
        DomainPalette { entries }
    }

    pub fn color(&self, domain_id: &str) -> Option<&ColorSpec> {
        self.entries
            .iter()
            .find(|(id, _)| id == domain_id)
            .map(|(_, color)| color)
    }

    /// Fill for a domain region; unknown ids fall back to the empty fill so
    /// a stale color table degrades visibly instead of aborting the render.
    pub fn fill_for(&self, domain_id: &str) -> ColorSpec {
        match self.color(domain_id) {
            Some(color) => color.clone(),
            None => {
                log::warn!("no color assigned for domain {}, using empty fill", domain_id);
                ColorSpec::named(EMPTY_FILL)
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColorSpec)> {
        self.entries.iter().map(|(id, color)| (id.as_str(), color))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the `domain_id,color` table. RGBA tuple colors are quoted since
    /// their serialized form contains commas.
    pub fn write_csv(&self, path: &Path) -> Result<(), PaletteError> {
        let mut out = BufWriter::new(File::create(path)?);
        for (id, color) in &self.entries {
            let rendered = color.to_string();
            if rendered.contains(',') {
                writeln!(out, "{},\"{}\"", id, rendered)?;
            } else {
                writeln!(out, "{},{}", id, rendered)?;
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self, PaletteError> {
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (id, raw_color) =
                line.split_once(',')
                    .ok_or_else(|| PaletteError::InvalidLine {
                        line: lineno + 1,
                        detail: "expected domain_id,color".to_string(),
                    })?;
            let raw_color = raw_color.trim().trim_matches('"');
            let color = raw_color
                .parse::<ColorSpec>()
                .map_err(|detail| PaletteError::InvalidLine {
                    line: lineno + 1,
                    detail,
                })?;
            entries.push((id.trim().to_string(), color));
        }
        Ok(DomainPalette { entries })
    }
}
