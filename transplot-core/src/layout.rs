//! Multi-transcript figure assembly.
//!
//! Validates the per-transcript parameter lists and the vertical row budget,
//! then runs the coordinate mapper and the partitioners for every requested
//! track, producing the complete renderer feed for one figure.

use crate::coords::TranscriptMap;
use crate::domains::{domain_bar, tick_fractions, StripeParams};
use crate::error::TrackError;
use crate::palette::DomainPalette;
use crate::regions::{exon_utr_bar, ExonBarStyle};
use crate::types::{
    BasePair, CoveragePoint, CoverageTrack, DomainLegendEntry, DomainRecord, DomainTrack,
    ExonBpRange, Strand, TrackLayout, TranscriptTracks, UtrBpRange, VariantRecord, VariantTrack,
};
use crate::variants::{place_variants, EffectPlacement, PixelScale, PlacementParams};

/// Which of the three tracks to draw for one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackSelection {
    pub coverage: bool,
    pub variants: bool,
    pub domains: bool,
}

impl TrackSelection {
    pub fn any(&self) -> bool {
        self.coverage || self.variants || self.domains
    }
}

impl std::str::FromStr for TrackSelection {
    type Err = String;

    /// Three-character mask, one flag per track in coverage/variants/domains
    /// order, e.g. `101` for coverage plus domains.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flags: Vec<char> = s.chars().collect();
        if flags.len() != 3 || flags.iter().any(|c| *c != '0' && *c != '1') {
            return Err(format!("invalid track mask (expected e.g. 101): {}", s));
        }
        Ok(TrackSelection {
            coverage: flags[0] == '1',
            variants: flags[1] == '1',
            domains: flags[2] == '1',
        })
    }
}

/// Vertical grid rows consumed by each track kind, and the gaps left after
/// each kind before the next track starts.
#[derive(Debug, Clone)]
pub struct TrackRows {
    pub fig_rows: u32,
    pub title_rows: u32,
    pub coverage_rows: u32,
    pub coverage_gap_rows: u32,
    pub variant_anns_top_rows: u32,
    pub variant_track_rows: u32,
    pub variant_anns_bottom_rows: u32,
    pub variant_key_rows: u32,
    pub variant_gap_rows: u32,
    pub domain_rows: u32,
    pub domain_gap_rows: u32,
}

impl Default for TrackRows {
    fn default() -> Self {
        TrackRows {
            fig_rows: 17,
            title_rows: 1,
            coverage_rows: 3,
            coverage_gap_rows: 2,
            variant_anns_top_rows: 2,
            variant_track_rows: 1,
            variant_anns_bottom_rows: 2,
            variant_key_rows: 2,
            variant_gap_rows: 1,
            domain_rows: 4,
            domain_gap_rows: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackKind {
    Coverage,
    Variants,
    Domains,
}

impl TrackRows {
    fn rows_for(&self, kind: TrackKind) -> u32 {
        match kind {
            TrackKind::Coverage => self.coverage_rows,
            TrackKind::Variants => {
                self.variant_anns_top_rows
                    + self.variant_track_rows
                    + self.variant_anns_bottom_rows
                    + self.variant_key_rows
            }
            TrackKind::Domains => self.domain_rows,
        }
    }

    fn gap_after(&self, kind: Option<TrackKind>) -> u32 {
        match kind {
            None => 0,
            Some(TrackKind::Coverage) => self.coverage_gap_rows,
            Some(TrackKind::Variants) => self.variant_gap_rows,
            Some(TrackKind::Domains) => self.domain_gap_rows,
        }
    }

    /// Rows the requested selections consume. Titles for the second and
    /// later transcripts count too; the first title sits in the figure
    /// margin above the grid.
    pub fn required(&self, selections: &[TrackSelection]) -> u32 {
        let mut rows = 0;
        let mut previous: Option<TrackKind> = None;
        for (i, selection) in selections.iter().enumerate() {
            if i > 0 {
                rows += self.title_rows;
            }
            for (flag, kind) in [
                (selection.coverage, TrackKind::Coverage),
                (selection.variants, TrackKind::Variants),
                (selection.domains, TrackKind::Domains),
            ] {
                if flag {
                    rows += self.gap_after(previous) + self.rows_for(kind);
                    previous = Some(kind);
                }
            }
        }
        rows
    }

    pub fn check_budget(&self, selections: &[TrackSelection]) -> Result<u32, TrackError> {
        let required = self.required(selections);
        if required > self.fig_rows {
            return Err(TrackError::CapacityExceeded {
                required,
                available: self.fig_rows,
            });
        }
        Ok(required)
    }
}

/// All source data for one transcript, already read from the input tables.
#[derive(Debug, Clone)]
pub struct TranscriptInputs {
    pub transcript: String,
    pub title: String,
    pub selection: TrackSelection,
    pub strand: Strand,
    /// Exon spans in transcription order.
    pub exons: Vec<ExonBpRange>,
    pub utrs: Vec<UtrBpRange>,
    /// Per-base mean depth, only used when the coverage track is requested.
    pub coverage: Vec<(BasePair, f64)>,
    pub variants: Vec<VariantRecord>,
    pub domains: Vec<DomainRecord>,
}

/// Knobs shared by every transcript of one figure.
#[derive(Debug, Clone, Default)]
pub struct LayoutParams {
    pub rows: TrackRows,
    pub style: ExonBarStyle,
    pub stripes: StripeParams,
    pub placement: PlacementParams,
    pub effects: EffectPlacement,
}

/// Verify that the per-transcript parameter lists agree in length.
pub fn check_arity(lists: &[(&str, usize)]) -> Result<(), TrackError> {
    let Some(&(_, expected)) = lists.first() else {
        return Ok(());
    };
    if lists.iter().any(|&(_, len)| len != expected) {
        let detail = lists
            .iter()
            .map(|(name, len)| format!("{}={}", name, len))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(TrackError::ParameterArityMismatch { detail });
    }
    Ok(())
}

/// Compute every requested track for every transcript.
pub fn build_layout(
    inputs: &[TranscriptInputs],
    palette: &DomainPalette,
    params: &LayoutParams,
    scale: &dyn PixelScale,
) -> Result<TrackLayout, TrackError> {
    let selections: Vec<TrackSelection> = inputs.iter().map(|t| t.selection).collect();
    let rows_used = params.rows.check_budget(&selections)?;

    let mut transcripts = Vec::with_capacity(inputs.len());
    for input in inputs {
        transcripts.push(build_transcript(input, palette, params, scale)?);
    }

    Ok(TrackLayout {
        fig_rows: params.rows.fig_rows,
        rows_used,
        transcripts,
    })
}

fn build_transcript(
    input: &TranscriptInputs,
    palette: &DomainPalette,
    params: &LayoutParams,
    scale: &dyn PixelScale,
) -> Result<TranscriptTracks, TrackError> {
    let map = TranscriptMap::build(&input.transcript, &input.exons, input.strand)?;
    let exon_coords = map.exon_coords();
    let utrs = input
        .utrs
        .iter()
        .map(|utr| map.map_utr(utr))
        .collect::<Result<Vec<_>, _>>()?;

    let coverage = if input.selection.coverage {
        let mut depth = input
            .coverage
            .iter()
            .map(|&(bp, d)| {
                map.tp(bp).map(|tp| CoveragePoint { tp, depth: d })
            })
            .collect::<Result<Vec<_>, _>>()?;
        depth.sort_by_key(|p| p.tp);
        Some(CoverageTrack {
            bar: exon_utr_bar(&exon_coords, &utrs, &params.style),
            depth,
        })
    } else {
        None
    };

    let domains = if input.selection.domains {
        let coding = map.coding_span(&utrs);
        let mapped = map.map_domains(&input.domains, coding)?;
        let partition = domain_bar(&mapped, &utrs, palette, &params.stripes);

        let mut legend: Vec<DomainLegendEntry> = Vec::new();
        for domain in &mapped {
            if legend.iter().any(|e| e.id == domain.id) {
                continue;
            }
            legend.push(DomainLegendEntry {
                id: domain.id.clone(),
                name: domain.name.clone(),
                color: palette.fill_for(&domain.id),
            });
        }

        Some(DomainTrack {
            bar: partition.bar,
            domain_bounds: partition.domain_bounds,
            legend,
        })
    } else {
        None
    };

    let variants = if input.selection.variants {
        let mut mapped = input
            .variants
            .iter()
            .map(|rec| map.map_variant(rec))
            .collect::<Result<Vec<_>, _>>()?;
        mapped.sort_by_key(|v| v.tp);
        let placement = place_variants(
            &mapped,
            map.len(),
            &params.effects,
            scale,
            &params.placement,
        );
        let ticks = domains
            .as_ref()
            .map(|track| tick_fractions(&track.domain_bounds, map.len()))
            .unwrap_or_default();
        Some(VariantTrack {
            bar: exon_utr_bar(&exon_coords, &utrs, &params.style),
            annotations: placement.annotations,
            key: placement.key,
            ticks,
        })
    } else {
        None
    };

    Ok(TranscriptTracks {
        transcript: input.transcript.clone(),
        title: input.title.clone(),
        strand: input.strand,
        length: map.len(),
        coverage,
        variants,
        domains,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{UtrSide, VariantEffect};
    use crate::variants::FixedScale;

    #[test]
    fn track_mask_parses() {
        let sel: TrackSelection = "101".parse().unwrap();
        assert!(sel.coverage && !sel.variants && sel.domains);
        assert!("11".parse::<TrackSelection>().is_err());
        assert!("abc".parse::<TrackSelection>().is_err());
    }

    #[test]
    fn budget_matches_grid_arithmetic() {
        let rows = TrackRows::default();
        // coverage (3) + gap (2) + variants (2+1+2+2) + gap (1) + domains (4)
        let all: TrackSelection = "111".parse().unwrap();
        assert_eq!(rows.required(&[all]), 17);
        assert_eq!(rows.check_budget(&[all]).unwrap(), 17);

        // Two full transcripts exceed 17 rows.
        let err = rows.check_budget(&[all, all]).unwrap_err();
        match err {
            TrackError::CapacityExceeded { required, available } => {
                assert_eq!(available, 17);
                assert!(required > available);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn stacked_coverage_only_transcripts_fit() {
        let rows = TrackRows::default();
        let cov: TrackSelection = "100".parse().unwrap();
        // 3 + (1 title + 2 gap + 3) + (1 title + 2 gap + 3) = 15
        assert_eq!(rows.required(&[cov, cov, cov]), 15);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        assert!(check_arity(&[("transcripts", 2), ("titles", 2)]).is_ok());
        let err = check_arity(&[("transcripts", 2), ("titles", 1)]).unwrap_err();
        assert!(matches!(err, TrackError::ParameterArityMismatch { .. }));
        assert!(err.to_string().contains("titles=1"));
    }

    fn example_inputs(selection: TrackSelection) -> TranscriptInputs {
        TranscriptInputs {
            transcript: "T1".into(),
            title: "T1".into(),
            selection,
            strand: Strand::Forward,
            exons: vec![
                ExonBpRange {
                    name: "1".into(),
                    start_bp: 100,
                    end_bp: 150,
                },
                ExonBpRange {
                    name: "2".into(),
                    start_bp: 200,
                    end_bp: 260,
                },
            ],
            utrs: vec![UtrBpRange {
                side: UtrSide::FivePrime,
                start_bp: 100,
                end_bp: 104,
            }],
            coverage: vec![(100, 12.0), (150, 30.0), (230, 25.5)],
            variants: vec![VariantRecord {
                bp: 230,
                effect: VariantEffect::Missense,
                dna_change: "c.82A>G".into(),
                protein_change: "p.T28A".into(),
            }],
            domains: vec![DomainRecord {
                transcript_id: "T1".into(),
                domain_id: "PF1".into(),
                name: "Domain one".into(),
                length_aa: 100.0,
                start_aa: 10.0,
                end_aa: 30.0,
            }],
        }
    }

    #[test]
    fn full_transcript_layout_is_assembled() {
        let inputs = vec![example_inputs("111".parse().unwrap())];
        let palette = DomainPalette::assign(&inputs[0].domains);
        let params = LayoutParams::default();
        let scale = FixedScale {
            axis_width_px: 1000.0,
        };
        let layout = build_layout(&inputs, &palette, &params, &scale).unwrap();

        assert_eq!(layout.transcripts.len(), 1);
        let tracks = &layout.transcripts[0];
        assert_eq!(tracks.length, 112);

        let coverage = tracks.coverage.as_ref().unwrap();
        assert_eq!(coverage.depth.len(), 3);
        assert_eq!(coverage.depth[2].tp, 82);

        let domains = tracks.domains.as_ref().unwrap();
        assert_eq!(domains.domain_bounds, vec![(17, 38)]);
        assert_eq!(domains.legend.len(), 1);

        let variants = tracks.variants.as_ref().unwrap();
        assert_eq!(variants.annotations.len(), 1);
        assert_eq!(variants.key[0].abbrev, "M");
        assert_eq!(variants.ticks.len(), 2);
    }

    #[test]
    fn domain_outside_span_aborts_the_layout() {
        let mut input = example_inputs("001".parse().unwrap());
        input.domains[0].end_aa = 130.0;
        let palette = DomainPalette::assign(&input.domains);
        let err = build_layout(
            &[input],
            &palette,
            &LayoutParams::default(),
            &FixedScale {
                axis_width_px: 1000.0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, TrackError::InvalidDomainRange { .. }));
    }
}
