//! `transplot exons` - derive the exon coordinate table from a coverage file.

use std::path::Path;

use crate::error::CliResult;
use transplot_core::io::coverage::{exon_ranges, read_coverage};
use transplot_core::io::exons::write_exon_coords;
use transplot_core::TranscriptMap;

pub fn execute(coverage_file: &Path, transcript: &str, out: &Path) -> CliResult<()> {
    log::info!(
        "Deriving exon coordinates for {} from {}",
        transcript,
        coverage_file.display()
    );

    // Depth is irrelevant here, so no sample columns are averaged.
    let rows = read_coverage(coverage_file, transcript, &[])?;
    let (strand, ranges) = exon_ranges(&rows);
    log::info!(
        "Transcription direction: {}",
        if strand.is_forward() { "forward" } else { "reverse" }
    );

    let map = TranscriptMap::build(transcript, &ranges, strand)?;
    write_exon_coords(out, &map.exon_coords())?;
    log::info!(
        "Wrote {} exons ({} bases) to {}",
        ranges.len(),
        map.len(),
        out.display()
    );
    Ok(())
}
