//! Variant annotation placement.
//!
//! Variants are drawn as arrows above or below the exon color bar. Arrows
//! closer than a pixel threshold on screen merge into one annotation so
//! labels stay legible, and consecutive annotations on the same side cycle
//! through a small set of heights to stagger their text vertically.

use crate::types::{TranscriptPos, Variant, VariantAnnotation, VariantEffect, VariantKeyEntry};

/// Axis-fraction to pixel conversion, owned by the renderer. The core only
/// needs relative distances, so one method suffices.
pub trait PixelScale {
    fn pixels(&self, axis_fraction_delta: f64) -> f64;
}

/// Scale for a fixed-width axis, the common case for batch figure output.
#[derive(Debug, Clone, Copy)]
pub struct FixedScale {
    pub axis_width_px: f64,
}

impl PixelScale for FixedScale {
    fn pixels(&self, axis_fraction_delta: f64) -> f64 {
        axis_fraction_delta * self.axis_width_px
    }
}

/// Which side of the color bar each effect is annotated on.
#[derive(Debug, Clone)]
pub struct EffectPlacement {
    below: Vec<VariantEffect>,
}

impl Default for EffectPlacement {
    fn default() -> Self {
        EffectPlacement {
            below: vec![VariantEffect::Missense, VariantEffect::InframeDeletion],
        }
    }
}

impl EffectPlacement {
    pub fn with_below(below: Vec<VariantEffect>) -> Self {
        EffectPlacement { below }
    }

    pub fn is_top(&self, effect: VariantEffect) -> bool {
        !self.below.contains(&effect)
    }
}

/// Grouping and staggering parameters.
#[derive(Debug, Clone, Copy)]
pub struct PlacementParams {
    /// Maximum on-screen gap between variants merged into one annotation.
    pub merge_px: f64,
    /// Number of vertical stagger bins per side.
    pub num_heights: u32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        PlacementParams {
            merge_px: 3.5,
            num_heights: 4,
        }
    }
}

/// Placement result: merged annotations plus the per-variant key entries.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantPlacement {
    pub annotations: Vec<VariantAnnotation>,
    pub key: Vec<VariantKeyEntry>,
}

/// Assign display ids, merge nearby same-side variants into annotation
/// groups and stagger group heights.
pub fn place_variants(
    variants: &[Variant],
    transcript_len: TranscriptPos,
    placement: &EffectPlacement,
    scale: &dyn PixelScale,
    params: &PlacementParams,
) -> VariantPlacement {
    if variants.is_empty() || transcript_len == 0 {
        return VariantPlacement {
            annotations: Vec::new(),
            key: Vec::new(),
        };
    }

    // Display ids are assigned before sorting so the key panel numbers
    // variants in input order.
    let mut entries: Vec<(u32, f64, bool)> = Vec::with_capacity(variants.len());
    let mut key = Vec::with_capacity(variants.len());
    for (i, variant) in variants.iter().enumerate() {
        let id = i as u32 + 1;
        entries.push((
            id,
            variant.tp as f64 / transcript_len as f64,
            placement.is_top(variant.effect),
        ));
        key.push(VariantKeyEntry {
            id,
            dna_change: variant.dna_change.clone(),
            protein_change: variant.protein_change.clone(),
            abbrev: variant.effect.abbrev().to_string(),
        });
    }
    entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    // Left-to-right sweep: a gap wider than the merge threshold, or a side
    // flip, starts a new group.
    let mut groups: Vec<Vec<&(u32, f64, bool)>> = Vec::new();
    for entry in &entries {
        let start_new = match groups.last().and_then(|g| g.last()) {
            None => true,
            Some(prev) => {
                scale.pixels(entry.1 - prev.1) > params.merge_px || entry.2 != prev.2
            }
        };
        if start_new {
            groups.push(vec![entry]);
        } else if let Some(group) = groups.last_mut() {
            group.push(entry);
        }
    }

    let mut annotations = Vec::with_capacity(groups.len());
    let (mut top_bin, mut bottom_bin) = (0u32, 0u32);
    for group in &groups {
        let top = group[0].2;
        let x = group.iter().map(|e| e.1).sum::<f64>() / group.len() as f64;
        let text = group
            .iter()
            .map(|e| e.0.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let bin = if top { &mut top_bin } else { &mut bottom_bin };
        let height = *bin % params.num_heights;
        *bin += 1;
        annotations.push(VariantAnnotation {
            x,
            text,
            top,
            height,
        });
    }

    VariantPlacement { annotations, key }
}
