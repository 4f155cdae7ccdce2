use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1-based position along a transcript in transcription direction.
pub type TranscriptPos = u32;

/// Genomic base-pair coordinate, strand independent.
pub type BasePair = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn is_forward(&self) -> bool {
        matches!(self, Strand::Forward)
    }
}

impl TryFrom<char> for Strand {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(Strand::Forward),
            '-' => Ok(Strand::Reverse),
            other => Err(format!("invalid strand: {}", other)),
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// Exon base-pair span in transcription orientation: `start_bp` is the first
/// base pair transcribed, so `start_bp > end_bp` on the reverse strand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExonBpRange {
    pub name: String,
    pub start_bp: BasePair,
    pub end_bp: BasePair,
}

impl ExonBpRange {
    /// Genomic (ascending) bounds regardless of orientation.
    pub fn genomic_bounds(&self) -> (BasePair, BasePair) {
        if self.start_bp <= self.end_bp {
            (self.start_bp, self.end_bp)
        } else {
            (self.end_bp, self.start_bp)
        }
    }

    pub fn width(&self) -> u64 {
        let (lo, hi) = self.genomic_bounds();
        hi - lo + 1
    }
}

/// Exon with both base-pair and transcript-position bounds resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExonCoord {
    pub name: String,
    pub start_bp: BasePair,
    pub end_bp: BasePair,
    pub start_tp: TranscriptPos,
    pub end_tp: TranscriptPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtrSide {
    FivePrime,
    ThreePrime,
}

impl fmt::Display for UtrSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtrSide::FivePrime => write!(f, "5'"),
            UtrSide::ThreePrime => write!(f, "3'"),
        }
    }
}

/// Untranslated region with bounds in both coordinate systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtrRegion {
    pub side: UtrSide,
    pub start_bp: BasePair,
    pub end_bp: BasePair,
    pub start_tp: TranscriptPos,
    pub end_tp: TranscriptPos,
}

/// UTR base-pair bounds as read from the annotation table, before the
/// transcript-position mapping has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtrBpRange {
    pub side: UtrSide,
    pub start_bp: BasePair,
    pub end_bp: BasePair,
}

/// Transcript-position span of the coding sequence, between the UTRs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingSpan {
    pub start_tp: TranscriptPos,
    pub end_tp: TranscriptPos,
}

impl CodingSpan {
    pub fn width(&self) -> u32 {
        self.end_tp.saturating_sub(self.start_tp)
    }
}

/// Protein-domain row as read from the domain table: positions are amino-acid
/// offsets against the protein length, not yet transcript positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub transcript_id: String,
    pub domain_id: String,
    pub name: String,
    pub length_aa: f64,
    pub start_aa: f64,
    pub end_aa: f64,
}

impl DomainRecord {
    pub fn start_frac(&self) -> f64 {
        self.start_aa / self.length_aa
    }

    pub fn end_frac(&self) -> f64 {
        self.end_aa / self.length_aa
    }
}

/// Protein domain mapped onto the transcript-position axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinDomain {
    pub id: String,
    pub name: String,
    pub start_tp: TranscriptPos,
    pub end_tp: TranscriptPos,
}

/// Closed vocabulary of variant consequence categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantEffect {
    Missense,
    Frameshift,
    StopGained,
    SpliceAcceptor,
    SpliceDonor,
    InframeDeletion,
    InitiatorCodon,
}

impl VariantEffect {
    /// Short label used in the variant key panel.
    pub fn abbrev(&self) -> &'static str {
        match self {
            VariantEffect::Missense => "M",
            VariantEffect::Frameshift => "F",
            VariantEffect::StopGained => "SG",
            VariantEffect::SpliceAcceptor => "SA",
            VariantEffect::SpliceDonor => "SD",
            VariantEffect::InframeDeletion => "ID",
            VariantEffect::InitiatorCodon => "IC",
        }
    }
}

impl FromStr for VariantEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missense_variant" => Ok(VariantEffect::Missense),
            "frameshift_variant" => Ok(VariantEffect::Frameshift),
            "stop_gained" => Ok(VariantEffect::StopGained),
            "splice_acceptor_variant" => Ok(VariantEffect::SpliceAcceptor),
            "splice_donor_variant" => Ok(VariantEffect::SpliceDonor),
            "inframe_deletion" => Ok(VariantEffect::InframeDeletion),
            "initiator_codon_variant" => Ok(VariantEffect::InitiatorCodon),
            other => Err(format!("unknown variant effect: {}", other)),
        }
    }
}

/// Variant row before coordinate resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub bp: BasePair,
    pub effect: VariantEffect,
    pub dna_change: String,
    pub protein_change: String,
}

/// Variant with its transcript position resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub bp: BasePair,
    pub tp: TranscriptPos,
    pub effect: VariantEffect,
    pub dna_change: String,
    pub protein_change: String,
}

/// Category of one display region on the shared axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    Exon(usize),
    Utr(UtrSide),
    Domain(String),
    Empty,
}

/// Fill or edge color handed to the renderer. Either a named/hex color or an
/// RGBA tuple with components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Named(String),
    Rgba([f64; 4]),
}

impl ColorSpec {
    pub fn named(name: &str) -> Self {
        ColorSpec::Named(name.to_string())
    }

    pub fn is_white(&self) -> bool {
        matches!(self, ColorSpec::Named(name) if name == "white")
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpec::Named(name) => write!(f, "{}", name),
            ColorSpec::Rgba([r, g, b, a]) => write!(f, "{},{},{},{}", r, g, b, a),
        }
    }
}

impl FromStr for ColorSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty color".to_string());
        }
        if !s.contains(',') {
            return Ok(ColorSpec::Named(s.to_string()));
        }
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(format!("invalid color tuple: {}", s));
        }
        let mut rgba = [1.0f64; 4];
        for (i, part) in parts.iter().enumerate() {
            rgba[i] = part
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid color component: {}", part))?;
        }
        Ok(ColorSpec::Rgba(rgba))
    }
}

/// Proportionally spaced color bar: `bounds` has one more entry than the
/// parallel `colors`/`edge_colors` lists, and region `i` spans
/// `bounds[i]..bounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub bounds: Vec<TranscriptPos>,
    pub colors: Vec<ColorSpec>,
    pub edge_colors: Vec<ColorSpec>,
}

impl ColorBar {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Mean depth at one transcript position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoveragePoint {
    pub tp: TranscriptPos,
    pub depth: f64,
}

/// One merged variant annotation: `x` is an axis fraction, `text` the
/// comma-joined display ids, `height` the vertical stagger bin on its side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantAnnotation {
    pub x: f64,
    pub text: String,
    pub top: bool,
    pub height: u32,
}

/// Key panel entry for a single variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantKeyEntry {
    pub id: u32,
    pub dna_change: String,
    pub protein_change: String,
    pub abbrev: String,
}

/// Legend entry for one distinct protein domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainLegendEntry {
    pub id: String,
    pub name: String,
    pub color: ColorSpec,
}

/// Renderer feed for a coverage track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageTrack {
    pub bar: ColorBar,
    pub depth: Vec<CoveragePoint>,
}

/// Renderer feed for a variant track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantTrack {
    pub bar: ColorBar,
    pub annotations: Vec<VariantAnnotation>,
    pub key: Vec<VariantKeyEntry>,
    /// Domain-bound tick positions as axis fractions, present when the
    /// protein-domain track was also requested.
    pub ticks: Vec<f64>,
}

/// Renderer feed for a protein-domain track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTrack {
    pub bar: ColorBar,
    pub domain_bounds: Vec<(TranscriptPos, TranscriptPos)>,
    pub legend: Vec<DomainLegendEntry>,
}

/// All requested tracks for one transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptTracks {
    pub transcript: String,
    pub title: String,
    pub strand: Strand,
    pub length: TranscriptPos,
    pub coverage: Option<CoverageTrack>,
    pub variants: Option<VariantTrack>,
    pub domains: Option<DomainTrack>,
}

/// Complete figure feed: one entry per transcript, stacked top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayout {
    pub fig_rows: u32,
    pub rows_used: u32,
    pub transcripts: Vec<TranscriptTracks>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strand_char_roundtrip() {
        assert_eq!(Strand::try_from('+').unwrap(), Strand::Forward);
        assert_eq!(Strand::try_from('-').unwrap(), Strand::Reverse);
        assert!(Strand::try_from('.').is_err());
        assert_eq!(char::from(Strand::Reverse), '-');
    }

    #[test]
    fn effect_vocabulary_is_closed() {
        assert_eq!(
            "missense_variant".parse::<VariantEffect>().unwrap(),
            VariantEffect::Missense
        );
        assert_eq!(VariantEffect::StopGained.abbrev(), "SG");
        assert!("upstream_gene_variant".parse::<VariantEffect>().is_err());
    }

    #[test]
    fn color_spec_parses_named_and_tuple_forms() {
        assert_eq!(
            "white".parse::<ColorSpec>().unwrap(),
            ColorSpec::named("white")
        );
        assert_eq!(
            "#6E6E6E".parse::<ColorSpec>().unwrap(),
            ColorSpec::named("#6E6E6E")
        );
        let rgba = "0.894,0.102,0.110,1.0".parse::<ColorSpec>().unwrap();
        assert_eq!(rgba, ColorSpec::Rgba([0.894, 0.102, 0.110, 1.0]));
        assert_eq!(rgba.to_string(), "0.894,0.102,0.11,1");
        assert!("".parse::<ColorSpec>().is_err());
        assert!("1,2".parse::<ColorSpec>().is_err());
    }

    #[test]
    fn exon_bp_range_orientation() {
        let fwd = ExonBpRange {
            name: "1".into(),
            start_bp: 100,
            end_bp: 150,
        };
        let rev = ExonBpRange {
            name: "1".into(),
            start_bp: 300,
            end_bp: 250,
        };
        assert_eq!(fwd.genomic_bounds(), (100, 150));
        assert_eq!(rev.genomic_bounds(), (250, 300));
        assert_eq!(fwd.width(), 51);
        assert_eq!(rev.width(), 51);
    }
}
