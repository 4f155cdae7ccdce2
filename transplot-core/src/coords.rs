//! Base-pair to transcript-position mapping.
//!
//! A transcript occupies a set of disjoint exon base-pair intervals on the
//! genome. Enumerating those base pairs in transcription direction (ascending
//! genomic order on the forward strand, descending on the reverse strand) and
//! numbering them from 1 gives the transcript-position axis shared by every
//! track. `TranscriptMap` holds that bijection in per-exon segment form.

use crate::error::TrackError;
use crate::types::{
    BasePair, CodingSpan, DomainRecord, ExonBpRange, ExonCoord, ProteinDomain, Strand,
    TranscriptPos, UtrBpRange, UtrRegion, Variant, VariantRecord,
};

#[derive(Debug, Clone)]
struct ExonSegment {
    name: String,
    /// Genomic bounds, ascending.
    lo_bp: BasePair,
    hi_bp: BasePair,
    /// Transcript position of the first base pair in transcription order.
    first_tp: TranscriptPos,
}

/// Strand-aware bijection between exon base pairs and `1..=len()`.
#[derive(Debug, Clone)]
pub struct TranscriptMap {
    transcript: String,
    strand: Strand,
    segments: Vec<ExonSegment>,
    length: TranscriptPos,
}

impl TranscriptMap {
    /// Build the mapping from exon spans given in transcription order.
    ///
    /// Rejects exon sets whose genomic intervals overlap; the transcript
    /// would no longer map each base pair to exactly one position.
    pub fn build(
        transcript: &str,
        exons: &[ExonBpRange],
        strand: Strand,
    ) -> Result<Self, TrackError> {
        if exons.is_empty() {
            return Err(TrackError::malformed(transcript, "no exons"));
        }

        let mut segments = Vec::with_capacity(exons.len());
        let mut next_tp: TranscriptPos = 1;
        for exon in exons {
            let (lo, hi) = exon.genomic_bounds();
            segments.push(ExonSegment {
                name: exon.name.clone(),
                lo_bp: lo,
                hi_bp: hi,
                first_tp: next_tp,
            });
            next_tp = next_tp
                .checked_add(exon.width() as u32)
                .ok_or_else(|| TrackError::malformed(transcript, "transcript length overflow"))?;
        }

        let mut by_genomic: Vec<(BasePair, BasePair, &str)> = segments
            .iter()
            .map(|s| (s.lo_bp, s.hi_bp, s.name.as_str()))
            .collect();
        by_genomic.sort_by_key(|&(lo, _, _)| lo);
        for pair in by_genomic.windows(2) {
            let (_, prev_hi, prev_name) = pair[0];
            let (next_lo, _, next_name) = pair[1];
            if next_lo <= prev_hi {
                return Err(TrackError::malformed(
                    transcript,
                    format!(
                        "exons {} and {} overlap in genomic space at bp {}",
                        prev_name, next_name, next_lo
                    ),
                ));
            }
        }

        Ok(TranscriptMap {
            transcript: transcript.to_string(),
            strand,
            segments,
            length: next_tp - 1,
        })
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Total transcript length in base pairs.
    pub fn len(&self) -> TranscriptPos {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Map one genomic base pair to its transcript position.
    pub fn tp(&self, bp: BasePair) -> Result<TranscriptPos, TrackError> {
        for seg in &self.segments {
            if bp >= seg.lo_bp && bp <= seg.hi_bp {
                let offset = match self.strand {
                    Strand::Forward => bp - seg.lo_bp,
                    Strand::Reverse => seg.hi_bp - bp,
                };
                return Ok(seg.first_tp + offset as u32);
            }
        }
        Err(TrackError::position_outside_exons(&self.transcript, bp))
    }

    /// Exon records with bp bounds in transcription orientation and the
    /// matching transcript-position bounds.
    pub fn exon_coords(&self) -> Vec<ExonCoord> {
        self.segments
            .iter()
            .map(|seg| {
                let width = (seg.hi_bp - seg.lo_bp) as u32;
                let (start_bp, end_bp) = match self.strand {
                    Strand::Forward => (seg.lo_bp, seg.hi_bp),
                    Strand::Reverse => (seg.hi_bp, seg.lo_bp),
                };
                ExonCoord {
                    name: seg.name.clone(),
                    start_bp,
                    end_bp,
                    start_tp: seg.first_tp,
                    end_tp: seg.first_tp + width,
                }
            })
            .collect()
    }

    /// Map a UTR's base-pair bounds onto the transcript axis.
    pub fn map_utr(&self, utr: &UtrBpRange) -> Result<UtrRegion, TrackError> {
        let a = self.tp(utr.start_bp)?;
        let b = self.tp(utr.end_bp)?;
        let (start_tp, end_tp) = if a <= b { (a, b) } else { (b, a) };
        Ok(UtrRegion {
            side: utr.side,
            start_bp: utr.start_bp,
            end_bp: utr.end_bp,
            start_tp,
            end_tp,
        })
    }

    /// Resolve a variant's base-pair position.
    pub fn map_variant(&self, rec: &VariantRecord) -> Result<Variant, TrackError> {
        let tp = self.tp(rec.bp)?;
        Ok(Variant {
            bp: rec.bp,
            tp,
            effect: rec.effect,
            dna_change: rec.dna_change.clone(),
            protein_change: rec.protein_change.clone(),
        })
    }

    /// Coding span between the UTRs. A missing 5' UTR starts the span at
    /// position 1; a missing 3' UTR ends it at the transcript length.
    pub fn coding_span(&self, utrs: &[UtrRegion]) -> CodingSpan {
        let start_tp = utrs
            .iter()
            .find(|u| u.side == crate::types::UtrSide::FivePrime)
            .map(|u| u.end_tp + 1)
            .unwrap_or(1);
        let end_tp = utrs
            .iter()
            .find(|u| u.side == crate::types::UtrSide::ThreePrime)
            .map(|u| u.start_tp.saturating_sub(1))
            .unwrap_or(self.length);
        CodingSpan { start_tp, end_tp }
    }

    /// Map a protein domain's fractional bounds into the coding span.
    ///
    /// Domains landing outside the span, or inverted after mapping, are a
    /// data error and are reported rather than clipped.
    pub fn map_domain(
        &self,
        rec: &DomainRecord,
        coding: CodingSpan,
    ) -> Result<ProteinDomain, TrackError> {
        let span = coding.width() as f64;
        let start_tp = coding.start_tp as i64 + (rec.start_frac() * span).round() as i64;
        let end_tp = coding.start_tp as i64 + (rec.end_frac() * span).round() as i64;

        let in_span = |tp: i64| tp >= coding.start_tp as i64 && tp <= coding.end_tp as i64;
        if end_tp < start_tp || !in_span(start_tp) || !in_span(end_tp) {
            return Err(TrackError::InvalidDomainRange {
                transcript: self.transcript.clone(),
                domain: rec.domain_id.clone(),
                start_tp: start_tp.max(0) as TranscriptPos,
                end_tp: end_tp.max(0) as TranscriptPos,
                coding_start: coding.start_tp,
                coding_end: coding.end_tp,
            });
        }

        Ok(ProteinDomain {
            id: rec.domain_id.clone(),
            name: rec.name.clone(),
            start_tp: start_tp as TranscriptPos,
            end_tp: end_tp as TranscriptPos,
        })
    }

    /// Map all domain records, sorted by mapped bounds then id so downstream
    /// sweeps see a deterministic order.
    pub fn map_domains(
        &self,
        records: &[DomainRecord],
        coding: CodingSpan,
    ) -> Result<Vec<ProteinDomain>, TrackError> {
        let mut domains = records
            .iter()
            .map(|rec| self.map_domain(rec, coding))
            .collect::<Result<Vec<_>, _>>()?;
        domains.sort_by(|a, b| {
            (a.start_tp, a.end_tp, &a.id).cmp(&(b.start_tp, b.end_tp, &b.id))
        });
        Ok(domains)
    }
}
