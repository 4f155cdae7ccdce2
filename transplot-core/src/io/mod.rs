//! Readers for the delimited source tables.
//!
//! Each table gets its own module with a typed error enum. Readers work in
//! fixed-size line chunks, filtering each chunk down to the requested
//! transcript before accumulating, so large multi-gene tables stay memory
//! bounded. Rows that fail to parse are logged and skipped here; the core
//! algorithms only ever see well-typed records.

pub mod coverage;
pub mod domains;
pub mod exons;
pub mod utr;
pub mod variants;

use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Rows accumulated per filtering pass.
pub(crate) const CHUNK_ROWS: usize = 1000;

/// Open a table, decompressing transparently when the path ends in `.gz`.
pub(crate) fn open_table(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Column name to index lookup built from a delimited header line.
#[derive(Debug, Clone)]
pub(crate) struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn parse(header: &str, delimiter: char) -> Self {
        let columns = header
            .trim_end_matches(['\r', '\n'])
            .split(delimiter)
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        HeaderIndex { columns }
    }

    pub(crate) fn get(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }

    /// Field of `row` under the named column, if the column exists and the
    /// row is wide enough.
    pub(crate) fn field<'a>(&self, row: &'a [&str], column: &str) -> Option<&'a str> {
        self.get(column).and_then(|i| row.get(i)).copied()
    }
}

/// Iterate data lines in chunks, applying `per_row` to each split row and
/// collecting the records it keeps.
pub(crate) fn for_each_chunked<R, F>(
    reader: Box<dyn BufRead>,
    delimiter: char,
    mut per_row: F,
) -> std::io::Result<Vec<R>>
where
    F: FnMut(&[&str]) -> Option<R>,
{
    let mut out = Vec::new();
    let mut chunk: Vec<String> = Vec::with_capacity(CHUNK_ROWS);
    for line in reader.lines() {
        chunk.push(line?);
        if chunk.len() == CHUNK_ROWS {
            drain_chunk(&mut chunk, delimiter, &mut per_row, &mut out);
        }
    }
    drain_chunk(&mut chunk, delimiter, &mut per_row, &mut out);
    Ok(out)
}

fn drain_chunk<R, F>(chunk: &mut Vec<String>, delimiter: char, per_row: &mut F, out: &mut Vec<R>)
where
    F: FnMut(&[&str]) -> Option<R>,
{
    for line in chunk.drain(..) {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        if let Some(record) = per_row(&fields) {
            out.push(record);
        }
    }
}
