//! Configuration handling for the transplot CLI
//!
//! Supports loading configuration from transplot.toml files; every figure
//! and track knob is an explicit typed field with a default matching the
//! stock A4 landscape figure.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use transplot_core::layout::{LayoutParams, TrackRows};
use transplot_core::regions::ExonBarStyle;
use transplot_core::types::{ColorSpec, VariantEffect};
use transplot_core::variants::{EffectPlacement, FixedScale, PlacementParams};
use transplot_core::StripeParams;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub figure: FigureConfig,
    #[serde(default)]
    pub tracks: TracksConfig,
    #[serde(default)]
    pub domains: DomainsConfig,
    #[serde(default)]
    pub variants: VariantsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Vertical grid rows available for all tracks
    #[serde(default = "default_fig_rows")]
    pub rows: u32,

    /// Figure width in inches
    #[serde(default = "default_width_inches")]
    pub width_inches: f64,

    /// Figure height in inches
    #[serde(default = "default_height_inches")]
    pub height_inches: f64,

    /// Raster resolution
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Fraction of the figure width occupied by the plot axes
    #[serde(default = "default_axes_width_frac")]
    pub axes_width_frac: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksConfig {
    /// Title rows for the second and later transcripts
    #[serde(default = "default_title_rows")]
    pub title_rows: u32,

    #[serde(default = "default_coverage_rows")]
    pub coverage_rows: u32,

    #[serde(default = "default_coverage_gap_rows")]
    pub coverage_gap_rows: u32,

    #[serde(default = "default_variant_anns_top_rows")]
    pub variant_anns_top_rows: u32,

    #[serde(default = "default_variant_track_rows")]
    pub variant_track_rows: u32,

    #[serde(default = "default_variant_anns_bottom_rows")]
    pub variant_anns_bottom_rows: u32,

    #[serde(default = "default_variant_key_rows")]
    pub variant_key_rows: u32,

    #[serde(default = "default_variant_gap_rows")]
    pub variant_gap_rows: u32,

    #[serde(default = "default_domain_rows")]
    pub domain_rows: u32,

    #[serde(default = "default_domain_gap_rows")]
    pub domain_gap_rows: u32,

    /// First color of the alternating exon cycle
    #[serde(default = "default_exon_color_a")]
    pub exon_color_a: String,

    /// Second color of the alternating exon cycle
    #[serde(default = "default_exon_color_b")]
    pub exon_color_b: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainsConfig {
    /// Domain database to keep from the annotation export
    #[serde(default = "default_database")]
    pub database: String,

    /// Minimum stripe width in bases for overlap regions
    #[serde(default = "default_stripe_min_bases")]
    pub stripe_min_bases: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantsConfig {
    /// Maximum on-screen gap merged into one annotation arrow
    #[serde(default = "default_merge_px")]
    pub merge_px: f64,

    /// Number of vertical stagger bins per side
    #[serde(default = "default_num_heights")]
    pub num_heights: u32,

    /// Effects annotated below the bar; everything else goes above
    #[serde(default = "default_below_effects")]
    pub below: Vec<String>,
}

// Default value functions
fn default_fig_rows() -> u32 { 17 }
fn default_width_inches() -> f64 { 11.69 }
fn default_height_inches() -> f64 { 8.27 }
fn default_dpi() -> u32 { 600 }
fn default_axes_width_frac() -> f64 { 0.775 }
fn default_title_rows() -> u32 { 1 }
fn default_coverage_rows() -> u32 { 3 }
fn default_coverage_gap_rows() -> u32 { 2 }
fn default_variant_anns_top_rows() -> u32 { 2 }
fn default_variant_track_rows() -> u32 { 1 }
fn default_variant_anns_bottom_rows() -> u32 { 2 }
fn default_variant_key_rows() -> u32 { 2 }
fn default_variant_gap_rows() -> u32 { 1 }
fn default_domain_rows() -> u32 { 4 }
fn default_domain_gap_rows() -> u32 { 1 }
fn default_exon_color_a() -> String { "red".to_string() }
fn default_exon_color_b() -> String { "#6E6E6E".to_string() }
fn default_database() -> String { "Pfam".to_string() }
fn default_stripe_min_bases() -> u32 { 30 }
fn default_merge_px() -> f64 { 3.5 }
fn default_num_heights() -> u32 { 4 }
fn default_below_effects() -> Vec<String> {
    vec!["missense_variant".to_string(), "inframe_deletion".to_string()]
}

impl Default for FigureConfig {
    fn default() -> Self {
        FigureConfig {
            rows: default_fig_rows(),
            width_inches: default_width_inches(),
            height_inches: default_height_inches(),
            dpi: default_dpi(),
            axes_width_frac: default_axes_width_frac(),
        }
    }
}

impl Default for TracksConfig {
    fn default() -> Self {
        TracksConfig {
            title_rows: default_title_rows(),
            coverage_rows: default_coverage_rows(),
            coverage_gap_rows: default_coverage_gap_rows(),
            variant_anns_top_rows: default_variant_anns_top_rows(),
            variant_track_rows: default_variant_track_rows(),
            variant_anns_bottom_rows: default_variant_anns_bottom_rows(),
            variant_key_rows: default_variant_key_rows(),
            variant_gap_rows: default_variant_gap_rows(),
            domain_rows: default_domain_rows(),
            domain_gap_rows: default_domain_gap_rows(),
            exon_color_a: default_exon_color_a(),
            exon_color_b: default_exon_color_b(),
        }
    }
}

impl Default for DomainsConfig {
    fn default() -> Self {
        DomainsConfig {
            database: default_database(),
            stripe_min_bases: default_stripe_min_bases(),
        }
    }
}

impl Default for VariantsConfig {
    fn default() -> Self {
        VariantsConfig {
            merge_px: default_merge_px(),
            num_heights: default_num_heights(),
            below: default_below_effects(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("transplot.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: transplot.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Row budget in the core's terms.
    pub fn track_rows(&self) -> TrackRows {
        TrackRows {
            fig_rows: self.figure.rows,
            title_rows: self.tracks.title_rows,
            coverage_rows: self.tracks.coverage_rows,
            coverage_gap_rows: self.tracks.coverage_gap_rows,
            variant_anns_top_rows: self.tracks.variant_anns_top_rows,
            variant_track_rows: self.tracks.variant_track_rows,
            variant_anns_bottom_rows: self.tracks.variant_anns_bottom_rows,
            variant_key_rows: self.tracks.variant_key_rows,
            variant_gap_rows: self.tracks.variant_gap_rows,
            domain_rows: self.tracks.domain_rows,
            domain_gap_rows: self.tracks.domain_gap_rows,
        }
    }

    /// All layout parameters derived from the configuration.
    pub fn layout_params(&self) -> LayoutParams {
        let below = self
            .variants
            .below
            .iter()
            .filter_map(|name| match name.parse::<VariantEffect>() {
                Ok(effect) => Some(effect),
                Err(err) => {
                    log::warn!("ignoring placement rule: {}", err);
                    None
                }
            })
            .collect();

        LayoutParams {
            rows: self.track_rows(),
            style: ExonBarStyle {
                exon_cycle: [
                    ColorSpec::named(&self.tracks.exon_color_a),
                    ColorSpec::named(&self.tracks.exon_color_b),
                ],
                utr_fill: ColorSpec::named("white"),
                utr_edge: ColorSpec::named("black"),
            },
            stripes: StripeParams {
                min_stripe_bases: self.domains.stripe_min_bases,
            },
            placement: PlacementParams {
                merge_px: self.variants.merge_px,
                num_heights: self.variants.num_heights,
            },
            effects: EffectPlacement::with_below(below),
        }
    }

    /// Pixel scale of the rendered axis, for annotation merging.
    pub fn pixel_scale(&self) -> FixedScale {
        FixedScale {
            axis_width_px: self.figure.width_inches
                * self.figure.dpi as f64
                * self.figure.axes_width_frac,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.figure.rows, 17);
        assert_eq!(config.domains.database, "Pfam");
        assert_eq!(config.domains.stripe_min_bases, 30);
        assert_eq!(config.variants.num_heights, 4);
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let config = Config::default();
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded_config = Config::load_from_file(temp_file.path())?;

        assert_eq!(config.figure.rows, loaded_config.figure.rows);
        assert_eq!(config.domains.database, loaded_config.domains.database);
        assert_eq!(config.variants.merge_px, loaded_config.variants.merge_px);

        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let config: Config = toml::from_str("[figure]\nrows = 24\n")?;
        assert_eq!(config.figure.rows, 24);
        assert_eq!(config.figure.dpi, 600);
        assert_eq!(config.tracks.coverage_rows, 3);
        Ok(())
    }

    #[test]
    fn test_layout_params_reflect_settings() {
        let mut config = Config::default();
        config.domains.stripe_min_bases = 45;
        config.variants.below = vec!["missense_variant".to_string(), "bogus".to_string()];

        let params = config.layout_params();
        assert_eq!(params.stripes.min_stripe_bases, 45);
        assert!(!params.effects.is_top(VariantEffect::Missense));
        assert!(params.effects.is_top(VariantEffect::InframeDeletion));
        assert!(params.effects.is_top(VariantEffect::StopGained));
    }

    #[test]
    fn test_pixel_scale_follows_figure_geometry() {
        let config = Config::default();
        let scale = config.pixel_scale();
        let expected = 11.69 * 600.0 * 0.775;
        assert!((scale.axis_width_px - expected).abs() < 1e-9);
    }
}
