//! Wiring of the `convert` subcommand.

use std::io::BufReader;

use log::{info, warn};
use shp_to_osm_core::{BoundedAssembler, ConvertOptions, ConvertReport, Converter, OutputSettings, RuleSet};
use shp_to_osm_data::ShapefileReader;
use shp_to_osm_fs::{OutputDirectory, open_utf8_file};

use crate::{CliError, ConvertConfig};

/// Generator attribute written into every output file.
pub const GENERATOR: &str = concat!("shp-to-osm ", env!("CARGO_PKG_VERSION"));

/// Convert the configured shapefile into OSM files in the output directory.
pub(crate) fn run_convert(config: &ConvertConfig) -> Result<ConvertReport, CliError> {
    let rules = load_rules(config)?;
    let mut reader = ShapefileReader::open(config.shapefile.as_std_path())?;
    let target = OutputDirectory::open(&config.outdir).map_err(|source| CliError::OpenOutputDirectory {
        path: config.outdir.clone(),
        source,
    })?;
    let settings = OutputSettings::new(config.osmfile.as_str(), config.format, GENERATOR)
        .with_max_elements(config.max_elements);
    let mut output = BoundedAssembler::new(target, settings);
    let options = ConvertOptions {
        keep_only_tagged_ways: config.keep_only_tagged_ways,
        glom_key: config.glom_key.clone(),
    };

    let mut source = reader.features();
    let report = Converter::new(&rules, options).convert(&mut source, &mut output)?;
    if source.skipped() > 0 {
        warn!("Skipped {} shapes without geometry", source.skipped());
    }
    log_report(&report);
    Ok(report)
}

fn load_rules(config: &ConvertConfig) -> Result<RuleSet, CliError> {
    let mut rules = match &config.rulesfile {
        Some(path) => {
            let file = open_utf8_file(path).map_err(|source| CliError::OpenRules {
                path: path.clone(),
                source,
            })?;
            let parsed = RuleSet::read_from(BufReader::new(file)).map_err(|source| CliError::ReadRules {
                path: path.clone(),
                source,
            })?;
            for warning in &parsed.warnings {
                warn!("{path}: {warning}");
            }
            parsed.rules
        }
        None => RuleSet::new(),
    };
    if let Some(prefix) = &config.copy_tags {
        rules.set_copy_all_tags(Some(prefix.clone()));
    }
    Ok(rules)
}

fn log_report(report: &ConvertReport) {
    info!(
        "Read {} records: {} units written, {} dropped, {} shapes skipped",
        report.records_read, report.units_written, report.units_dropped, report.shapes_skipped
    );
    for file in &report.output.files {
        info!("Wrote {file}");
    }
}
