//! transplot core library
//!
//! Coordinate mapping, region partitioning and variant placement for
//! multi-track transcript figures. Everything here computes render-ready
//! structures (bounds, colors, ticks, annotation records); drawing them is
//! the renderer's job.

pub mod coords;
pub mod domains;
pub mod error;
pub mod io;
pub mod layout;
pub mod palette;
pub mod regions;
pub mod types;
pub mod variants;

// Re-export commonly used types and functions
pub use coords::TranscriptMap;
pub use domains::{domain_bar, tick_fractions, DomainPartition, StripeParams};
pub use error::TrackError;
pub use layout::{build_layout, check_arity, LayoutParams, TrackRows, TrackSelection, TranscriptInputs};
pub use palette::DomainPalette;
pub use regions::{exon_utr_bar, ExonBarStyle};
pub use types::{ColorBar, ColorSpec, Strand, TrackLayout, TranscriptPos};
pub use variants::{place_variants, EffectPlacement, FixedScale, PixelScale, PlacementParams};

/// Version information for the transplot core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
