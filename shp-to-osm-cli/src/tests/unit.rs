//! Focused unit tests covering convert CLI configuration validation.

use super::helpers::InputFiles;
use super::*;
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

fn complete_args(files: &InputFiles) -> ConvertArgs {
    ConvertArgs {
        shapefile: Some(files.shapefile().to_owned()),
        rulesfile: Some(files.rules().to_owned()),
        osmfile: Some("stops".to_owned()),
        outdir: Some(files.outdir().to_owned()),
        ..ConvertArgs::default()
    }
}

#[rstest]
#[case(None, Some("stops"), None, ARG_SHAPEFILE, ENV_SHAPEFILE)]
#[case(Some("stops.shp"), Some("stops"), None, ARG_RULESFILE, ENV_RULESFILE)]
#[case(Some("stops.shp"), None, Some("rules.txt"), ARG_OSMFILE, ENV_OSMFILE)]
fn converting_without_required_fields_errors(
    #[case] shapefile: Option<&str>,
    #[case] osmfile: Option<&str>,
    #[case] rulesfile: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = ConvertArgs {
        shapefile: shapefile.map(Utf8PathBuf::from),
        rulesfile: rulesfile.map(Utf8PathBuf::from),
        osmfile: osmfile.map(str::to_owned),
        ..ConvertArgs::default()
    };
    let err = ConvertConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn copy_tags_makes_the_rule_file_optional() {
    let args = ConvertArgs {
        shapefile: Some(Utf8PathBuf::from("stops.shp")),
        osmfile: Some("stops".to_owned()),
        copy_tags: Some(String::new()),
        ..ConvertArgs::default()
    };
    let config = ConvertConfig::try_from(args).expect("copy-tags stands in for rules");
    assert_eq!(config.rulesfile, None);
    assert_eq!(config.copy_tags.as_deref(), Some(""));
}

#[rstest]
fn defaults_fill_optional_settings() {
    let args = ConvertArgs {
        shapefile: Some(Utf8PathBuf::from("stops.shp")),
        rulesfile: Some(Utf8PathBuf::from("rules.txt")),
        osmfile: Some("stops".to_owned()),
        glom_key: Some(String::new()),
        ..ConvertArgs::default()
    };
    let config = ConvertConfig::try_from(args).expect("complete arguments");
    assert_eq!(config.outdir, Utf8PathBuf::from(DEFAULT_OUTDIR));
    assert_eq!(config.max_elements.get(), DEFAULT_MAX_ELEMENTS_PER_FILE);
    assert_eq!(config.format, OutputFormat::Change);
    assert_eq!(config.glom_key, None);
    assert!(!config.keep_only_tagged_ways);
}

#[rstest]
#[case(None, DEFAULT_MAX_ELEMENTS_PER_FILE)]
#[case(Some("1000"), 1000)]
#[case(Some(" 25 "), 25)]
#[case(Some("0"), DEFAULT_MAX_ELEMENTS_PER_FILE)]
#[case(Some("lots"), DEFAULT_MAX_ELEMENTS_PER_FILE)]
#[case(Some("-5"), DEFAULT_MAX_ELEMENTS_PER_FILE)]
fn max_elements_fall_back_to_the_default(#[case] raw: Option<&str>, #[case] expected: usize) {
    assert_eq!(parse_max_elements(raw).get(), expected);
}

#[rstest]
#[case(None, OutputFormat::Change)]
#[case(Some("osm"), OutputFormat::Legacy)]
#[case(Some("osmc"), OutputFormat::Change)]
#[case(Some("pbf"), OutputFormat::Change)]
fn output_format_falls_back_to_change_files(#[case] raw: Option<&str>, #[case] expected: OutputFormat) {
    assert_eq!(parse_output_format(raw), expected);
}

#[rstest]
fn bare_copy_tags_flag_means_an_empty_prefix() {
    let cli = Cli::try_parse_from([
        "shp-to-osm",
        "convert",
        "--shapefile",
        "stops.shp",
        "--osmfile",
        "stops",
        "--copy-tags",
        "-t",
    ])
    .expect("arguments parse");
    let Command::Convert(args) = cli.command;
    assert_eq!(args.copy_tags.as_deref(), Some(""));
    assert!(args.keep_only_tagged_ways);
}

#[rstest]
fn validate_sources_accepts_existing_inputs() {
    let files = InputFiles::new();
    let config = ConvertConfig::try_from(complete_args(&files)).expect("complete arguments");
    config.validate_sources().expect("inputs exist");
}

#[rstest]
fn validate_sources_reports_missing_files() {
    let files = InputFiles::new();
    let mut args = complete_args(&files);
    args.shapefile = Some(files.outdir().join("missing.shp"));
    let config = ConvertConfig::try_from(args).expect("complete arguments");
    match config.validate_sources().expect_err("expected failure") {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_SHAPEFILE),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let files = InputFiles::new();
    let mut args = complete_args(&files);
    args.rulesfile = Some(files.outdir().to_owned());
    let config = ConvertConfig::try_from(args).expect("complete arguments");
    match config.validate_sources().expect_err("expected directory rejection") {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_RULESFILE),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_output_file() {
    let files = InputFiles::new();
    let mut args = complete_args(&files);
    args.outdir = Some(files.rules().to_owned());
    let config = ConvertConfig::try_from(args).expect("complete arguments");
    match config
        .validate_sources()
        .expect_err("expected output directory validation to fail")
    {
        CliError::OutputDirectoryNotDirectory { .. } => {}
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_output_directory() {
    let files = InputFiles::new();
    let mut args = complete_args(&files);
    args.outdir = Some(files.outdir().join("absent"));
    let config = ConvertConfig::try_from(args).expect("complete arguments");
    match config.validate_sources().expect_err("expected failure") {
        CliError::MissingOutputDirectory { path } => assert!(path.ends_with("absent")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn run_convert_logs_rule_warnings_and_still_converts() {
    let files = InputFiles::new();
    let tmp = TempDir::new().expect("tempdir");
    let rules = Utf8PathBuf::from_path_buf(tmp.path().join("noisy.rules")).expect("UTF-8 path");
    fs::write(&rules, "not a rule\npoint,NAME,,name,-\n").expect("write rules");
    let mut args = complete_args(&files);
    args.rulesfile = Some(rules);
    args.output_format = Some("osm".to_owned());
    let config = ConvertConfig::try_from(args).expect("complete arguments");

    let report = convert::run_convert(&config).expect("conversion succeeds");
    assert_eq!(report.records_read, 2);
    assert_eq!(report.output.files, vec!["stops_1.osm".to_owned()]);
    let xml = fs::read_to_string(files.outdir().join("stops_1.osm")).expect("output written");
    assert!(xml.contains("<tag k=\"name\" v=\"Dam\"/>"));
    assert!(!xml.contains("bus_stop"));
}
