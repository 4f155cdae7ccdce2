//! Exon/UTR partition of the transcript axis.
//!
//! Merges exon and UTR transcript-position intervals into a single gap-free
//! color bar covering `[1, L]`. Exon fills alternate through a two-color
//! cycle by exon order; UTRs render white with black edges and do not
//! consume a cycle slot.

use crate::types::{ColorBar, ColorSpec, ExonCoord, RegionKind, TranscriptPos, UtrRegion};

/// Colors used by the exon/UTR bar.
#[derive(Debug, Clone)]
pub struct ExonBarStyle {
    pub exon_cycle: [ColorSpec; 2],
    pub utr_fill: ColorSpec,
    pub utr_edge: ColorSpec,
}

impl Default for ExonBarStyle {
    fn default() -> Self {
        ExonBarStyle {
            exon_cycle: [ColorSpec::named("red"), ColorSpec::named("#6E6E6E")],
            utr_fill: ColorSpec::named("white"),
            utr_edge: ColorSpec::named("black"),
        }
    }
}

#[derive(Debug, Clone)]
struct MergedInterval {
    start_tp: TranscriptPos,
    end_tp: TranscriptPos,
    kind: RegionKind,
}

fn sort_rank(kind: &RegionKind) -> u8 {
    // Mirrors the tag collation of the merged table: UTR tags sort ahead of
    // the exon tag when bounds tie.
    match kind {
        RegionKind::Utr(_) => 0,
        _ => 1,
    }
}

/// Build the merged exon/UTR color bar.
///
/// Overlap resolution is arrival order after the stable
/// `(start, end, tag)` sort: a later interval starting inside an earlier one
/// has its start advanced to just past the earlier end, except when both
/// share an end bound, in which case the later interval takes over the tail
/// of the earlier one (the bar is drawn from consecutive start bounds, so no
/// explicit truncation is needed).
pub fn exon_utr_bar(exons: &[ExonCoord], utrs: &[UtrRegion], style: &ExonBarStyle) -> ColorBar {
    let mut merged: Vec<MergedInterval> = Vec::with_capacity(exons.len() + utrs.len());
    for (i, exon) in exons.iter().enumerate() {
        merged.push(MergedInterval {
            start_tp: exon.start_tp,
            end_tp: exon.end_tp,
            kind: RegionKind::Exon(i),
        });
    }
    for utr in utrs {
        merged.push(MergedInterval {
            start_tp: utr.start_tp,
            end_tp: utr.end_tp,
            kind: RegionKind::Utr(utr.side),
        });
    }
    merged.sort_by_key(|iv| (iv.start_tp, iv.end_tp, sort_rank(&iv.kind)));

    // Boundary correction pass, building a new sequence instead of mutating
    // earlier rows in place.
    let mut corrected: Vec<MergedInterval> = Vec::with_capacity(merged.len());
    for iv in merged {
        let mut iv = iv;
        if let Some(prev) = corrected.last() {
            if iv.end_tp != prev.end_tp && iv.start_tp < prev.end_tp {
                iv.start_tp = prev.end_tp + 1;
            }
            // Identical bound pairs collapse to the first arrival.
            if iv.start_tp == prev.start_tp && iv.end_tp == prev.end_tp {
                continue;
            }
        }
        corrected.push(iv);
    }

    let mut bounds: Vec<TranscriptPos> = Vec::with_capacity(corrected.len() + 1);
    let mut colors: Vec<ColorSpec> = Vec::with_capacity(corrected.len());
    for iv in &corrected {
        bounds.push(iv.start_tp);
        let color = match &iv.kind {
            RegionKind::Utr(_) => style.utr_fill.clone(),
            RegionKind::Exon(index) => style.exon_cycle[index % 2].clone(),
            RegionKind::Domain(_) | RegionKind::Empty => unreachable!("exon bar kinds"),
        };
        colors.push(color);
    }
    if let Some(last) = corrected.last() {
        bounds.push(last.end_tp);
    }

    let edge_colors = colors
        .iter()
        .map(|c| {
            if c.is_white() {
                style.utr_edge.clone()
            } else {
                c.clone()
            }
        })
        .collect();

    ColorBar {
        bounds,
        colors,
        edge_colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UtrSide;

    fn exon(i: usize, start_tp: TranscriptPos, end_tp: TranscriptPos) -> ExonCoord {
        ExonCoord {
            name: format!("{}", i),
            start_bp: 0,
            end_bp: 0,
            start_tp,
            end_tp,
        }
    }

    fn utr(side: UtrSide, start_tp: TranscriptPos, end_tp: TranscriptPos) -> UtrRegion {
        UtrRegion {
            side,
            start_bp: 0,
            end_bp: 0,
            start_tp,
            end_tp,
        }
    }

    #[test]
    fn partition_covers_transcript_without_gaps() {
        let exons = vec![exon(1, 1, 51), exon(2, 52, 112)];
        let utrs = vec![utr(UtrSide::FivePrime, 1, 5)];
        let bar = exon_utr_bar(&exons, &utrs, &ExonBarStyle::default());

        assert_eq!(bar.bounds, vec![1, 6, 52, 112]);
        assert_eq!(bar.colors.len(), 3);
        assert_eq!(bar.colors[0], ColorSpec::named("white"));
        assert_eq!(bar.colors[1], ColorSpec::named("red"));
        assert_eq!(bar.colors[2], ColorSpec::named("#6E6E6E"));
        assert_eq!(bar.edge_colors[0], ColorSpec::named("black"));
        assert_eq!(bar.edge_colors[1], ColorSpec::named("red"));
    }

    #[test]
    fn exon_colors_alternate_by_exon_order_across_utr_gaps() {
        // A 3' UTR interrupting the merged sequence must not shift the cycle.
        let exons = vec![exon(1, 1, 40), exon(2, 41, 80), exon(3, 81, 120)];
        let utrs = vec![utr(UtrSide::ThreePrime, 100, 120)];
        let bar = exon_utr_bar(&exons, &utrs, &ExonBarStyle::default());

        assert_eq!(bar.colors[0], ColorSpec::named("red"));
        assert_eq!(bar.colors[1], ColorSpec::named("#6E6E6E"));
        assert_eq!(bar.colors[2], ColorSpec::named("red"));
    }

    #[test]
    fn utr_sharing_exon_end_takes_over_the_tail() {
        let exons = vec![exon(1, 1, 100)];
        let utrs = vec![utr(UtrSide::ThreePrime, 90, 100)];
        let bar = exon_utr_bar(&exons, &utrs, &ExonBarStyle::default());

        // Bar regions are [1, 90) exon and [90, 100] UTR.
        assert_eq!(bar.bounds, vec![1, 90, 100]);
        assert_eq!(bar.colors[0], ColorSpec::named("red"));
        assert_eq!(bar.colors[1], ColorSpec::named("white"));
    }

    #[test]
    fn duplicate_bound_pairs_collapse() {
        let exons = vec![exon(1, 1, 50)];
        let utrs = vec![utr(UtrSide::FivePrime, 1, 50)];
        let bar = exon_utr_bar(&exons, &utrs, &ExonBarStyle::default());
        assert_eq!(bar.bounds, vec![1, 50]);
        assert_eq!(bar.colors.len(), 1);
        // The UTR tag sorts first on a full tie, so the region stays white.
        assert_eq!(bar.colors[0], ColorSpec::named("white"));
    }

    #[test]
    fn widths_sum_to_transcript_length() {
        let exons = vec![exon(1, 1, 51), exon(2, 52, 112)];
        let utrs = vec![
            utr(UtrSide::FivePrime, 1, 5),
            utr(UtrSide::ThreePrime, 100, 112),
        ];
        let bar = exon_utr_bar(&exons, &utrs, &ExonBarStyle::default());
        assert_eq!(*bar.bounds.first().unwrap(), 1);
        assert_eq!(*bar.bounds.last().unwrap(), 112);
        for pair in bar.bounds.windows(2) {
            assert!(pair[0] < pair[1], "bounds must strictly increase");
        }
        assert_eq!(bar.bounds.len(), bar.colors.len() + 1);
    }
}
