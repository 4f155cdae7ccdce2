use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;

#[derive(Parser)]
#[command(name = "transplot")]
#[command(about = "transplot - multi-track transcript figure layouts")]
#[command(version)]
#[command(long_about = "
transplot computes the track layouts for transcript figures: sequencing
coverage, observed variants and protein domains aligned on one shared
transcript-position axis. The layout command emits a JSON feed consumed by
the figure renderer.

Examples:
  transplot colors --domains domains.tsv --transcript ENST00000457016 --out colors.csv
  transplot exons --coverage coverage.csv --transcript ENST00000457016 --out exons.csv
  transplot layout --transcript ENST00000457016 --title APC --tracks 111 \\
      --samples 543_A10 --utrs utrs.csv --exons exons.csv --coverage coverage.csv \\
      --variants variants.tsv --domains domains.tsv --out layout.json
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assign one color per protein domain and write the color table
    Colors {
        /// Protein domain annotation file (TSV)
        #[arg(long, required = true)]
        domains: PathBuf,

        /// Transcript id(s) to keep
        #[arg(long = "transcript", required = true)]
        transcripts: Vec<String>,

        /// Domain database to keep (defaults to the configured one)
        #[arg(long)]
        database: Option<String>,

        /// Output color table (CSV)
        #[arg(short, long, required = true)]
        out: PathBuf,
    },

    /// Derive the exon coordinate table from a coverage file
    Exons {
        /// Coverage file (CSV, one row per sequenced base)
        #[arg(long, required = true)]
        coverage: PathBuf,

        /// Transcript id
        #[arg(long, required = true)]
        transcript: String,

        /// Output exon coordinate table (CSV)
        #[arg(short, long, required = true)]
        out: PathBuf,
    },

    /// Compute the multi-transcript track layout JSON for the renderer
    Layout {
        /// Transcript id, once per stacked transcript
        #[arg(long = "transcript", required = true)]
        transcripts: Vec<String>,

        /// Figure title per transcript
        #[arg(long = "title", required = true)]
        titles: Vec<String>,

        /// Track mask per transcript: coverage/variants/domains, e.g. 101
        #[arg(long = "tracks", required = true)]
        tracks: Vec<String>,

        /// Comma-joined sample ids per transcript (may be empty)
        #[arg(long = "samples", required = true)]
        samples: Vec<String>,

        /// UTR annotation file per transcript
        #[arg(long = "utrs", required = true)]
        utr_files: Vec<PathBuf>,

        /// Exon coordinate table per transcript (see `transplot exons`)
        #[arg(long = "exons", required = true)]
        exon_files: Vec<PathBuf>,

        /// Coverage file per transcript
        #[arg(long = "coverage", required = true)]
        coverage_files: Vec<PathBuf>,

        /// Variant file per transcript
        #[arg(long = "variants", required = true)]
        variant_files: Vec<PathBuf>,

        /// Protein domain file per transcript
        #[arg(long = "domains", required = true)]
        domain_files: Vec<PathBuf>,

        /// Domain color table (see `transplot colors`); colors are assigned
        /// on the fly when omitted
        #[arg(long)]
        domain_colors: Option<PathBuf>,

        /// Output layout file (JSON)
        #[arg(short, long, required = true)]
        out: PathBuf,
    },
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet)?;

    let config = Config::load(cli.config.as_deref())?;

    let threads = cli.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to set thread count")?;

    match cli.command {
        Commands::Colors {
            domains,
            transcripts,
            database,
            out,
        } => {
            commands::colors::execute(&config, &domains, &transcripts, database.as_deref(), &out)?;
        }

        Commands::Exons {
            coverage,
            transcript,
            out,
        } => {
            commands::exons::execute(&coverage, &transcript, &out)?;
        }

        Commands::Layout {
            transcripts,
            titles,
            tracks,
            samples,
            utr_files,
            exon_files,
            coverage_files,
            variant_files,
            domain_files,
            domain_colors,
            out,
        } => {
            let request = commands::layout::LayoutRequest {
                transcripts,
                titles,
                tracks,
                samples,
                utr_files,
                exon_files,
                coverage_files,
                variant_files,
                domain_files,
                domain_colors,
                out,
            };
            commands::layout::execute(&config, &request)?;
        }
    }

    Ok(())
}
