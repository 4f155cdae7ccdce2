use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

use transplot_core::io::{coverage, domains as domain_io, utr, variants as variant_io};
use transplot_core::layout::{build_layout, LayoutParams, TranscriptInputs};
use transplot_core::types::{ColorSpec, Strand};
use transplot_core::variants::FixedScale;
use transplot_core::{DomainPalette, TranscriptMap};

const TRANSCRIPT: &str = "ENST00000457016";

fn coverage_csv() -> String {
    // Two exons: bp 100..=150 and 200..=260 on the forward strand, one
    // sample column.
    let mut out = String::from("name,chromStart,strand,position,543_A10\n");
    for position in 1..=51u64 {
        out.push_str(&format!(
            "{}:0:1,99,+,{},{}\n",
            TRANSCRIPT,
            position,
            10 + position % 5
        ));
    }
    for position in 1..=61u64 {
        out.push_str(&format!(
            "{}:0:2,199,+,{},{}\n",
            TRANSCRIPT,
            position,
            20 + position % 7
        ));
    }
    out
}

fn write_fixtures(dir: &TempDir) -> (PathBuf, PathBuf, PathBuf, PathBuf) {
    let cov_path = dir.path().join("coverage.csv");
    std::fs::write(&cov_path, coverage_csv()).unwrap();

    let utr_path = dir.path().join("utrs.csv");
    std::fs::write(
        &utr_path,
        format!(
            "Ensembl Transcript ID,5' UTR Start,5' UTR End,3' UTR Start,3' UTR End\n\
             {},99,104,,\n",
            TRANSCRIPT
        ),
    )
    .unwrap();

    let domain_path = dir.path().join("domains.tsv");
    std::fs::write(
        &domain_path,
        format!(
            "TranscriptID\tLength\tDomainID\tStart\tEnd\tDomain_type\tname\n\
             {}\t100\tPF00001\t10\t30\tPfam\tExample domain\n",
            TRANSCRIPT
        ),
    )
    .unwrap();

    let variant_path = dir.path().join("variants.tsv");
    std::fs::write(
        &variant_path,
        format!(
            "featureID\tpos\teffect\tdnachange\tprot_change\n\
             {}\t230\tmissense_variant\tc.82A>G\tp.T28A\n\
             {}\t150\tstop_gained\tc.51C>T\tp.Q17*\n",
            TRANSCRIPT, TRANSCRIPT
        ),
    )
    .unwrap();

    (cov_path, utr_path, domain_path, variant_path)
}

#[test]
fn full_pipeline_from_tables_to_layout() {
    let dir = TempDir::new().unwrap();
    let (cov_path, utr_path, domain_path, variant_path) = write_fixtures(&dir);

    let rows = coverage::read_coverage(&cov_path, TRANSCRIPT, &["543_A10".to_string()]).unwrap();
    assert_eq!(rows.len(), 112);
    let (strand, exons) = coverage::exon_ranges(&rows);
    assert_eq!(strand, Strand::Forward);
    assert_eq!(exons.len(), 2);

    let utrs = utr::read_utrs(&utr_path, TRANSCRIPT, strand).unwrap();
    let domain_records =
        domain_io::read_domains(&domain_path, &[TRANSCRIPT.to_string()], "Pfam").unwrap();
    let variant_records = variant_io::read_variants(&variant_path, TRANSCRIPT).unwrap();

    let palette = DomainPalette::assign(&domain_records);
    let inputs = vec![TranscriptInputs {
        transcript: TRANSCRIPT.to_string(),
        title: "APC".to_string(),
        selection: "111".parse().unwrap(),
        strand,
        exons,
        utrs,
        coverage: rows.iter().map(|r| (r.bp, r.depth)).collect(),
        variants: variant_records,
        domains: domain_records,
    }];

    let layout = build_layout(
        &inputs,
        &palette,
        &LayoutParams::default(),
        &FixedScale {
            axis_width_px: 1000.0,
        },
    )
    .unwrap();

    assert_eq!(layout.rows_used, 17);
    let tracks = &layout.transcripts[0];
    assert_eq!(tracks.length, 112);

    // Exon/UTR bar: white UTR head, then the alternating exon colors.
    let coverage_track = tracks.coverage.as_ref().unwrap();
    assert_eq!(coverage_track.bar.bounds, vec![1, 6, 52, 112]);
    assert_eq!(coverage_track.bar.colors[0], ColorSpec::named("white"));
    assert_eq!(coverage_track.depth.len(), 112);

    // Domain [0.1, 0.3] of the coding span [6, 112] lands on tp [17, 38].
    let domain_track = tracks.domains.as_ref().unwrap();
    assert_eq!(domain_track.domain_bounds, vec![(17, 38)]);
    assert_eq!(domain_track.legend[0].name, "Example domain");

    // Variants at bp 230 and bp 150 map to tp 82 and tp 51; ids follow
    // file order, annotations follow axis order.
    let variant_track = tracks.variants.as_ref().unwrap();
    assert_eq!(variant_track.annotations.len(), 2);
    assert_eq!(variant_track.annotations[0].text, "2");
    assert!(variant_track.annotations[0].top, "stop gained goes above");
    assert_eq!(variant_track.annotations[1].text, "1");
    assert!(!variant_track.annotations[1].top, "missense goes below");
    assert!((variant_track.annotations[1].x - 82.0 / 112.0).abs() < 1e-12);

    // Domain bounds become tick fractions on the variant track.
    assert_eq!(variant_track.ticks.len(), 2);
    assert!((variant_track.ticks[0] - 16.0 / 111.0).abs() < 1e-12);
    assert!((variant_track.ticks[1] - 37.0 / 111.0).abs() < 1e-12);
}

#[test]
fn gzipped_tables_read_transparently() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coverage.csv.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(coverage_csv().as_bytes()).unwrap();
    encoder.finish().unwrap();

    let rows = coverage::read_coverage(&path, TRANSCRIPT, &["543_A10".to_string()]).unwrap();
    assert_eq!(rows.len(), 112);
}

#[test]
fn reverse_strand_pipeline_inverts_the_axis() {
    let dir = TempDir::new().unwrap();
    let cov_path = dir.path().join("coverage_rev.csv");
    let mut out = String::from("name,chromStart,strand,position,543_A10\n");
    for position in 1..=51u64 {
        out.push_str(&format!("{}:0:1,249,-,{},12\n", TRANSCRIPT, position));
    }
    std::fs::write(&cov_path, out).unwrap();

    let rows = coverage::read_coverage(&cov_path, TRANSCRIPT, &["543_A10".to_string()]).unwrap();
    let (strand, exons) = coverage::exon_ranges(&rows);
    assert_eq!(strand, Strand::Reverse);
    assert_eq!((exons[0].start_bp, exons[0].end_bp), (300, 250));

    let map = TranscriptMap::build(TRANSCRIPT, &exons, strand).unwrap();
    assert_eq!(map.tp(300).unwrap(), 1);
    assert_eq!(map.tp(250).unwrap(), 51);
}
