//! Protein-domain partition of the transcript axis.
//!
//! Domains may overlap each other freely, so the axis is first divided into
//! maximal sub-intervals whose covering set is constant (a sweep over every
//! interval start/end boundary), then each sub-interval becomes either a
//! single region or, where several domains stack, a run of interleaved
//! stripes narrow enough to read as a blend of the stacked colors.

use crate::palette::{DomainPalette, EMPTY_FILL};
use crate::types::{ColorBar, ColorSpec, ProteinDomain, TranscriptPos, UtrRegion, UtrSide};

/// Striping threshold: a striped sub-interval is split until the average
/// stripe width falls below this many bases.
#[derive(Debug, Clone, Copy)]
pub struct StripeParams {
    pub min_stripe_bases: u32,
}

impl Default for StripeParams {
    fn default() -> Self {
        StripeParams {
            min_stripe_bases: 30,
        }
    }
}

/// What covers one swept interval.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cover {
    Utr(UtrSide),
    Domain(String),
}

impl Cover {
    fn sort_label(&self) -> &str {
        match self {
            Cover::Utr(_) => "utr",
            Cover::Domain(id) => id,
        }
    }

    fn fill(&self, palette: &DomainPalette) -> ColorSpec {
        match self {
            Cover::Utr(_) => ColorSpec::named("white"),
            Cover::Domain(id) => palette.fill_for(id),
        }
    }
}

#[derive(Debug, Clone)]
struct SweptInterval {
    start: i64,
    end: i64,
}

/// Renderer feed computed from the domain and UTR intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainPartition {
    pub bar: ColorBar,
    /// Per-domain `[start, end]` transcript positions, stripes ignored; used
    /// for tick marks on the companion variant track.
    pub domain_bounds: Vec<(TranscriptPos, TranscriptPos)>,
}

/// Partition the transcript into domain/UTR/empty regions with stripes where
/// domains overlap.
pub fn domain_bar(
    domains: &[ProteinDomain],
    utrs: &[UtrRegion],
    palette: &DomainPalette,
    params: &StripeParams,
) -> DomainPartition {
    let mut intervals: Vec<(i64, i64, Cover)> = domains
        .iter()
        .map(|d| {
            (
                d.start_tp as i64,
                d.end_tp as i64,
                Cover::Domain(d.id.clone()),
            )
        })
        .chain(utrs.iter().map(|u| {
            (
                u.start_tp as i64,
                u.end_tp as i64,
                Cover::Utr(u.side),
            )
        }))
        .collect();
    intervals.sort_by(|a, b| {
        (a.0, a.1, a.2.sort_label()).cmp(&(b.0, b.1, b.2.sort_label()))
    });

    let domain_bounds: Vec<(TranscriptPos, TranscriptPos)> = intervals
        .iter()
        .filter(|(_, _, cover)| matches!(cover, Cover::Domain(_)))
        .map(|&(start, end, _)| (start as TranscriptPos, end as TranscriptPos))
        .collect();

    let swept = sweep_boundaries(&intervals);
    let covering: Vec<Vec<Cover>> = swept
        .iter()
        .map(|sub| {
            intervals
                .iter()
                .filter(|(start, end, _)| *start <= sub.end && sub.start <= *end)
                .map(|(_, _, cover)| cover.clone())
                .collect()
        })
        .collect();

    let mut bounds: Vec<TranscriptPos> = Vec::new();
    let mut colors: Vec<ColorSpec> = Vec::new();
    for (i, sub) in swept.iter().enumerate() {
        let covers = &covering[i];
        match covers.len() {
            0 => {
                bounds.push(sub.start as TranscriptPos);
                colors.push(ColorSpec::named(EMPTY_FILL));
            }
            1 => {
                bounds.push(sub.start as TranscriptPos);
                colors.push(covers[0].fill(palette));
            }
            _ => {
                let left = i.checked_sub(1).map(|j| &covering[j]);
                let right = covering.get(i + 1);
                let (stripe_bounds, stripe_covers) =
                    stripe_sub_interval(sub, covers, left, right, params);
                bounds.extend(stripe_bounds);
                colors.extend(stripe_covers.iter().map(|c| c.fill(palette)));
            }
        }
    }
    if let Some(last) = swept.last() {
        bounds.push(last.end as TranscriptPos);
    }

    let edge_colors = colors.clone();
    DomainPartition {
        bar: ColorBar {
            bounds,
            colors,
            edge_colors,
        },
        domain_bounds,
    }
}

/// Divide the spanned axis into maximal sub-intervals with a constant
/// covering set. Boundary events keep their arrival order at equal
/// positions (stable sort); a computed start overlapping the previous
/// sub-interval is pushed to just past its end, and inverted sub-intervals
/// are dropped.
fn sweep_boundaries(intervals: &[(i64, i64, Cover)]) -> Vec<SweptInterval> {
    let mut events: Vec<(i64, bool)> = Vec::with_capacity(intervals.len() * 2);
    for (start, end, _) in intervals {
        events.push((*start, true));
        events.push((*end, false));
    }
    events.sort_by_key(|&(pos, _)| pos);

    let mut swept: Vec<SweptInterval> = Vec::new();
    for pair in events.windows(2) {
        let (pos_a, is_start_a) = pair[0];
        let (pos_b, is_start_b) = pair[1];
        let mut start = if is_start_a { pos_a } else { pos_a + 1 };
        let end = if is_start_b { pos_b - 1 } else { pos_b };
        if let Some(prev) = swept.last() {
            if start <= prev.end {
                start = prev.end + 1;
            }
        }
        if end >= start {
            swept.push(SweptInterval { start, end });
        }
    }
    swept
}

/// Stripe one sub-interval covered by more than one entity.
///
/// The first stripe takes the domain absent from the left neighbor, the last
/// the domain absent from the right neighbor, with the remaining domains
/// cycling in between. The stripe count starts at the cycle seed size and
/// grows until the average width drops below the threshold; when the first
/// and last domain coincide the increment shrinks by one so the shared
/// domain never abuts itself across a sub-interval join.
fn stripe_sub_interval(
    sub: &SweptInterval,
    covers: &[Cover],
    left: Option<&Vec<Cover>>,
    right: Option<&Vec<Cover>>,
    params: &StripeParams,
) -> (Vec<TranscriptPos>, Vec<Cover>) {
    let dropped_versus = |neighbor: Option<&Vec<Cover>>| -> Option<Cover> {
        let neighbor = neighbor?;
        covers.iter().find(|c| !neighbor.contains(*c)).cloned()
    };
    let first = dropped_versus(left);
    let last = dropped_versus(right);

    let middle: Vec<Cover> = covers
        .iter()
        .filter(|c| first.as_ref() != Some(*c) && last.as_ref() != Some(*c))
        .cloned()
        .collect();

    let seed: Vec<&Cover> = first
        .iter()
        .chain(middle.iter())
        .chain(last.iter())
        .collect();
    let mut cycle: Vec<Cover> = Vec::new();
    for cover in &seed {
        if !cycle.contains(*cover) {
            cycle.push((*cover).clone());
        }
    }

    let seed_count = seed.len();
    let increment = if first.is_some() && first == last {
        seed_count - 1
    } else {
        seed_count
    };
    let width = (sub.end - sub.start) as f64;
    let mut num = seed_count.max(1);
    if increment > 0 {
        while width / num as f64 >= params.min_stripe_bases as f64 {
            num += increment;
        }
    }

    let step = width / num as f64;
    let mut stripe_bounds = Vec::with_capacity(num);
    let mut stripe_covers = Vec::with_capacity(num);
    for k in 0..num {
        let bound = sub.start as f64 + step * k as f64;
        stripe_bounds.push(bound.round() as TranscriptPos);
        stripe_covers.push(cycle[k % cycle.len()].clone());
    }
    (stripe_bounds, stripe_covers)
}

/// Domain tick positions as axis fractions for a `[1, transcript_len]` axis.
pub fn tick_fractions(
    domain_bounds: &[(TranscriptPos, TranscriptPos)],
    transcript_len: TranscriptPos,
) -> Vec<f64> {
    if transcript_len <= 1 {
        return Vec::new();
    }
    let denom = (transcript_len - 1) as f64;
    domain_bounds
        .iter()
        .flat_map(|&(start, end)| [start, end])
        .map(|tp| (tp - 1) as f64 / denom)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UtrRegion;

    fn domain(id: &str, start_tp: TranscriptPos, end_tp: TranscriptPos) -> ProteinDomain {
        ProteinDomain {
            id: id.to_string(),
            name: id.to_string(),
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

    fn palette_for(ids: &[&str]) -> DomainPalette {
        use crate::types::DomainRecord;
        let records: Vec<DomainRecord> = ids
            .iter()
            .map(|id| DomainRecord {
                transcript_id: "T1".into(),
                domain_id: id.to_string(),
                name: id.to_string(),
                length_aa: 100.0,
                start_aa: 0.0,
                end_aa: 1.0,
            })
            .collect();
        DomainPalette::assign(&records)
    }

    fn widths(bounds: &[TranscriptPos]) -> Vec<i64> {
        bounds
            .windows(2)
            .map(|w| w[1] as i64 - w[0] as i64)
            .collect()
    }

    #[test]
    fn overlapping_pair_produces_shared_region() {
        let palette = palette_for(&["A", "B"]);
        let params = StripeParams::default();
        let forward = domain_bar(
            &[domain("A", 10, 30), domain("B", 20, 40)],
            &[],
            &palette,
            &params,
        );
        let reversed = domain_bar(
            &[domain("B", 20, 40), domain("A", 10, 30)],
            &[],
            &palette,
            &params,
        );
        // Covering sets, not input order, decide the partition.
        assert_eq!(forward, reversed);

        // [10,19] A alone, [20,30] striped {A,B}, [31,40] B alone.
        assert_eq!(forward.bar.bounds.first(), Some(&10));
        assert_eq!(forward.bar.bounds.last(), Some(&40));
        let a = palette.fill_for("A");
        let b = palette.fill_for("B");
        assert_eq!(forward.bar.colors[0], a);
        // The first stripe shows the domain entering from the left (B).
        assert_eq!(forward.bar.colors[1], b);
        assert_eq!(forward.bar.colors[2], a);
        assert_eq!(*forward.bar.colors.last().unwrap(), b);
    }

    #[test]
    fn stripe_widths_stay_below_threshold() {
        let palette = palette_for(&["A", "B"]);
        let params = StripeParams::default();
        let part = domain_bar(
            &[domain("A", 1, 300), domain("B", 1, 300)],
            &[],
            &palette,
            &params,
        );
        let widths = widths(&part.bar.bounds);
        for w in &widths {
            assert!(
                (*w as f64) < params.min_stripe_bases as f64 + 1.0,
                "stripe width {} exceeds threshold",
                w
            );
        }
        // Ten equal stripes of ~29.9 bases for a 299-base span.
        assert_eq!(part.bar.colors.len(), 10);
        assert_eq!(part.bar.colors.len() % 2, 0);
    }

    #[test]
    fn shared_first_and_last_domain_never_repeats_at_joins() {
        let palette = palette_for(&["A", "B"]);
        let params = StripeParams::default();
        // B is nested inside A, so B is the domain dropped versus both
        // neighbors and the stripe count must stay odd.
        let part = domain_bar(
            &[domain("A", 1, 100), domain("B", 40, 60)],
            &[],
            &palette,
            &params,
        );
        let a = palette.fill_for("A");
        let b = palette.fill_for("B");

        // Region colors: [1,39] A, stripes, [61,100] A.
        assert_eq!(part.bar.colors[0], a);
        assert_eq!(*part.bar.colors.last().unwrap(), a);
        let stripes = &part.bar.colors[1..part.bar.colors.len() - 1];
        assert_eq!(stripes.len() % 2, 1, "stripe count must be odd");
        assert_eq!(stripes.first(), Some(&b));
        assert_eq!(stripes.last(), Some(&b));
        for pair in part.bar.colors.windows(2) {
            assert_ne!(pair[0], pair[1], "adjacent colors must differ");
        }
    }

    #[test]
    fn no_domains_yields_empty_region_between_utrs() {
        let palette = DomainPalette::default();
        let part = domain_bar(
            &[],
            &[
                utr(UtrSide::FivePrime, 1, 5),
                utr(UtrSide::ThreePrime, 100, 112),
            ],
            &palette,
            &StripeParams::default(),
        );
        assert_eq!(part.bar.bounds, vec![1, 6, 100, 112]);
        assert_eq!(part.bar.colors[0], ColorSpec::named("white"));
        assert_eq!(part.bar.colors[1], ColorSpec::named(EMPTY_FILL));
        assert_eq!(part.bar.colors[2], ColorSpec::named("white"));
        assert!(part.domain_bounds.is_empty());
    }

    #[test]
    fn zero_width_domain_does_not_panic() {
        let palette = palette_for(&["A", "B"]);
        let part = domain_bar(
            &[domain("A", 50, 50), domain("B", 40, 60)],
            &[],
            &palette,
            &StripeParams::default(),
        );
        assert_eq!(part.bar.bounds.first(), Some(&40));
        assert_eq!(part.bar.bounds.last(), Some(&60));
        assert_eq!(part.bar.bounds.len(), part.bar.colors.len() + 1);
    }

    #[test]
    fn bounds_are_monotonic_and_cover_the_span() {
        let palette = palette_for(&["A", "B", "C"]);
        let part = domain_bar(
            &[
                domain("A", 10, 120),
                domain("B", 50, 200),
                domain("C", 90, 260),
            ],
            &[
                utr(UtrSide::FivePrime, 1, 9),
                utr(UtrSide::ThreePrime, 270, 300),
            ],
            &palette,
            &StripeParams::default(),
        );
        assert_eq!(part.bar.bounds.first(), Some(&1));
        assert_eq!(part.bar.bounds.last(), Some(&300));
        for pair in part.bar.bounds.windows(2) {
            assert!(pair[0] <= pair[1], "bounds must not decrease");
        }
        assert_eq!(part.bar.bounds.len(), part.bar.colors.len() + 1);
        assert_eq!(part.domain_bounds, vec![(10, 120), (50, 200), (90, 260)]);
    }

    #[test]
    fn tick_fractions_normalize_to_unit_axis() {
        let ticks = tick_fractions(&[(1, 51), (52, 101)], 101);
        assert_eq!(ticks.len(), 4);
        assert!((ticks[0] - 0.0).abs() < 1e-12);
        assert!((ticks[1] - 0.5).abs() < 1e-12);
        assert!((ticks[3] - 1.0).abs() < 1e-12);
        assert!(tick_fractions(&[(1, 1)], 1).is_empty());
    }
}
