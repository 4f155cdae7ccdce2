//! `transplot layout` - compute the full multi-transcript renderer feed.

use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{CliError, CliResult};
use transplot_core::io::{coverage, domains as domain_io, exons, utr, variants as variant_io};
use transplot_core::layout::{build_layout, check_arity, TranscriptInputs};
use transplot_core::{DomainPalette, TrackSelection};

/// Per-transcript argument bundle after arity checking.
pub struct LayoutRequest {
    pub transcripts: Vec<String>,
    pub titles: Vec<String>,
    pub tracks: Vec<String>,
    pub samples: Vec<String>,
    pub utr_files: Vec<PathBuf>,
    pub exon_files: Vec<PathBuf>,
    pub coverage_files: Vec<PathBuf>,
    pub variant_files: Vec<PathBuf>,
    pub domain_files: Vec<PathBuf>,
    pub domain_colors: Option<PathBuf>,
    pub out: PathBuf,
}

pub fn execute(config: &Config, request: &LayoutRequest) -> CliResult<()> {
    check_arity(&[
        ("transcripts", request.transcripts.len()),
        ("titles", request.titles.len()),
        ("tracks", request.tracks.len()),
        ("samples", request.samples.len()),
        ("utr-files", request.utr_files.len()),
        ("exon-files", request.exon_files.len()),
        ("coverage-files", request.coverage_files.len()),
        ("variant-files", request.variant_files.len()),
        ("domain-files", request.domain_files.len()),
    ])?;

    let selections = request
        .tracks
        .iter()
        .map(|mask| mask.parse::<TrackSelection>().map_err(CliError::input))
        .collect::<CliResult<Vec<_>>>()?;

    // Transcripts are independent, so their tables load in parallel.
    let inputs = (0..request.transcripts.len())
        .into_par_iter()
        .map(|i| read_transcript_inputs(config, request, selections[i], i))
        .collect::<CliResult<Vec<_>>>()?;

    let palette = match &request.domain_colors {
        Some(path) => {
            log::info!("Loading domain colors from {}", path.display());
            DomainPalette::read_csv(path)?
        }
        None => {
            let all_domains: Vec<_> = inputs
                .iter()
                .flat_map(|input| input.domains.iter().cloned())
                .collect();
            DomainPalette::assign(&all_domains)
        }
    };

    let layout = build_layout(
        &inputs,
        &palette,
        &config.layout_params(),
        &config.pixel_scale(),
    )?;

    let writer = BufWriter::new(File::create(&request.out)?);
    serde_json::to_writer_pretty(writer, &layout)
        .map_err(|err| CliError::io(err.to_string()))?;
    log::info!(
        "Wrote layout for {} transcripts ({} of {} rows) to {}",
        layout.transcripts.len(),
        layout.rows_used,
        layout.fig_rows,
        request.out.display()
    );
    Ok(())
}

fn read_transcript_inputs(
    config: &Config,
    request: &LayoutRequest,
    selection: TrackSelection,
    i: usize,
) -> CliResult<TranscriptInputs> {
    let transcript = &request.transcripts[i];
    log::info!("Transcript: {}", transcript);

    let (strand, coords) = exons::read_exon_coords(&request.exon_files[i])?;
    log::info!(
        "Transcription direction: {}",
        if strand.is_forward() { "forward" } else { "reverse" }
    );
    let exon_ranges = exons::to_ranges(&coords);

    let utrs = utr::read_utrs(&request.utr_files[i], transcript, strand)?;

    let coverage = if selection.coverage {
        let samples = split_samples(&request.samples[i]);
        let rows = coverage::read_coverage(&request.coverage_files[i], transcript, &samples)?;
        rows.iter().map(|r| (r.bp, r.depth)).collect()
    } else {
        Vec::new()
    };

    let variants = if selection.variants {
        variant_io::read_variants(&request.variant_files[i], transcript)?
    } else {
        Vec::new()
    };

    let domains = if selection.domains {
        domain_io::read_domains(
            &request.domain_files[i],
            std::slice::from_ref(transcript),
            &config.domains.database,
        )?
    } else {
        Vec::new()
    };

    Ok(TranscriptInputs {
        transcript: transcript.clone(),
        title: request.titles[i].clone(),
        selection,
        strand,
        exons: exon_ranges,
        utrs,
        coverage,
        variants,
        domains,
    })
}

fn split_samples(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
