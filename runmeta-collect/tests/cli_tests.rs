//! CLI argument-parsing tests.
//!
//! The platform argument must be rejected by parsing alone, before any
//! database interaction is possible.

#![allow(clippy::unwrap_used)]

use clap::Parser;
use runmeta_collect::{Cli, Command};
use runmeta_core::InstrumentPlatform;
use std::path::PathBuf;

#[test]
fn parses_required_collection_flags() {
    let cli = Cli::try_parse_from([
        "runmeta-collect",
        "-i",
        "ILLUMINA",
        "-r",
        "processed_runs.tsv",
    ])
    .unwrap();

    assert_eq!(cli.instrument_platform, Some(InstrumentPlatform::Illumina));
    assert_eq!(cli.processed_runs, Some(PathBuf::from("processed_runs.tsv")));
    assert!(cli.command.is_none());
}

#[test]
fn parses_long_flags_and_output_dir() {
    let cli = Cli::try_parse_from([
        "runmeta-collect",
        "--instrument-platform",
        "OXFORD_NANOPORE",
        "--processed-runs",
        "runs.tsv",
        "--output-dir",
        "reports",
    ])
    .unwrap();

    assert_eq!(
        cli.instrument_platform,
        Some(InstrumentPlatform::OxfordNanopore)
    );
    assert_eq!(cli.output_dir, PathBuf::from("reports"));
}

#[test]
fn output_dir_defaults_to_data() {
    let cli = Cli::try_parse_from(["runmeta-collect", "-i", "ILLUMINA", "-r", "runs.tsv"])
        .unwrap();
    assert_eq!(cli.output_dir, PathBuf::from("data"));
}

#[test]
fn platform_is_upper_cased_before_matching() {
    let cli = Cli::try_parse_from(["runmeta-collect", "-i", "illumina", "-r", "runs.tsv"])
        .unwrap();
    assert_eq!(cli.instrument_platform, Some(InstrumentPlatform::Illumina));
}

#[test]
fn rejects_platform_outside_enumerated_set() {
    let err = Cli::try_parse_from(["runmeta-collect", "-i", "PACBIO_SMRT", "-r", "runs.tsv"])
        .unwrap_err();
    assert!(err.to_string().contains("PACBIO_SMRT"));
}

#[test]
fn parses_test_subcommand_without_collection_flags() {
    let cli = Cli::try_parse_from(["runmeta-collect", "test"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Test)));
    assert!(cli.instrument_platform.is_none());
}

#[test]
fn parses_verbosity_flags() {
    let cli = Cli::try_parse_from([
        "runmeta-collect",
        "-vv",
        "-i",
        "ILLUMINA",
        "-r",
        "runs.tsv",
    ])
    .unwrap();
    assert_eq!(cli.global.verbose, 2);
    assert!(!cli.global.quiet);

    let cli = Cli::try_parse_from(["runmeta-collect", "-q", "test"]).unwrap();
    assert!(cli.global.quiet);
}
