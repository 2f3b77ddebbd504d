//! Command-line interface for converting shapefiles into OSM XML files.
#![forbid(unsafe_code)]

mod convert;
mod error;

use std::io;
use std::num::NonZeroUsize;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use shp_to_osm_core::{DEFAULT_MAX_ELEMENTS_PER_FILE, OutputFormat};
use shp_to_osm_fs::{dir_exists, file_is_file};

pub use convert::GENERATOR;
pub use error::CliError;

const ARG_SHAPEFILE: &str = "shapefile";
const ARG_RULESFILE: &str = "rulesfile";
const ARG_OSMFILE: &str = "osmfile";
const ARG_OUTDIR: &str = "outdir";
const ARG_MAXNODES: &str = "maxnodes";
const ARG_OUTPUT_FORMAT: &str = "output-format";
const ARG_GLOM_KEY: &str = "glom-key";
const ARG_COPY_TAGS: &str = "copy-tags";
const ARG_KEEP_ONLY_TAGGED_WAYS: &str = "keep-only-tagged-ways";
const ENV_SHAPEFILE: &str = "SHP_TO_OSM_CMDS_CONVERT_SHAPEFILE";
const ENV_RULESFILE: &str = "SHP_TO_OSM_CMDS_CONVERT_RULESFILE";
const ENV_OSMFILE: &str = "SHP_TO_OSM_CMDS_CONVERT_OSMFILE";
const DEFAULT_OUTDIR: &str = ".";

/// Run the shp-to-osm CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] when arguments are invalid, an input is missing or
/// the conversion fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Convert(args) => {
            let config = resolve_convert_config(args)?;
            convert::run_convert(&config)?;
        }
    }
    Ok(())
}

fn resolve_convert_config(args: ConvertArgs) -> Result<ConvertConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

#[derive(Debug, Parser)]
#[command(
    name = "shp-to-osm",
    about = "Convert ESRI shapefiles into OpenStreetMap XML files",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert one shapefile into numbered OSM files.
    Convert(ConvertArgs),
}

/// CLI arguments for the `convert` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Convert the records of a shapefile into tagged OSM nodes, \
                 ways and relations. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Convert a shapefile into OSM XML files"
)]
#[ortho_config(prefix = "SHP_TO_OSM")]
struct ConvertArgs {
    /// Path to the `.shp` file; the `.shx` and `.dbf` siblings are read too.
    #[arg(long = ARG_SHAPEFILE, value_name = "path")]
    #[serde(default)]
    shapefile: Option<Utf8PathBuf>,
    /// Path to the rule file mapping attributes to tags.
    #[arg(long = ARG_RULESFILE, value_name = "path")]
    #[serde(default)]
    rulesfile: Option<Utf8PathBuf>,
    /// Prefix of the output file names.
    #[arg(long = ARG_OSMFILE, value_name = "prefix")]
    #[serde(default)]
    osmfile: Option<String>,
    /// Directory receiving the output files.
    #[arg(long = ARG_OUTDIR, value_name = "dir")]
    #[serde(default)]
    outdir: Option<Utf8PathBuf>,
    /// Maximum number of elements per output file.
    #[arg(long = ARG_MAXNODES, value_name = "n")]
    #[serde(default)]
    maxnodes: Option<String>,
    /// Output flavour: `osm` or `osmc`.
    #[arg(long = ARG_OUTPUT_FORMAT, value_name = "format")]
    #[serde(default)]
    output_format: Option<String>,
    /// Attribute whose value groups records into one merged element.
    #[arg(long = ARG_GLOM_KEY, value_name = "key")]
    #[serde(default)]
    glom_key: Option<String>,
    /// Copy every attribute into a tag, keyed `prefix:attribute`.
    #[arg(
        long = ARG_COPY_TAGS,
        value_name = "prefix",
        num_args = 0..=1,
        default_missing_value = ""
    )]
    #[serde(default)]
    copy_tags: Option<String>,
    /// Drop ways that carry no tags.
    #[arg(short = 't', long = ARG_KEEP_ONLY_TAGGED_WAYS)]
    #[serde(default)]
    keep_only_tagged_ways: bool,
}

impl ConvertArgs {
    fn into_config(self) -> Result<ConvertConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ConvertConfig::try_from(merged)
    }
}

/// Fully resolved `convert` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConvertConfig {
    shapefile: Utf8PathBuf,
    rulesfile: Option<Utf8PathBuf>,
    osmfile: String,
    outdir: Utf8PathBuf,
    max_elements: NonZeroUsize,
    format: OutputFormat,
    glom_key: Option<String>,
    copy_tags: Option<String>,
    keep_only_tagged_ways: bool,
}

impl ConvertConfig {
    fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_file(&self.shapefile, ARG_SHAPEFILE)?;
        if let Some(rules) = &self.rulesfile {
            Self::require_file(rules, ARG_RULESFILE)?;
        }
        Self::require_directory(&self.outdir)
    }

    fn require_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_owned(),
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(CliError::MissingSourceFile {
                field,
                path: path.to_owned(),
            }),
            Err(source) => Err(CliError::InspectPath {
                field,
                path: path.to_owned(),
                source,
            }),
        }
    }

    fn require_directory(path: &Utf8Path) -> Result<(), CliError> {
        match dir_exists(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::MissingOutputDirectory { path: path.to_owned() }),
            Err(err) if err.kind() == io::ErrorKind::NotADirectory => {
                Err(CliError::OutputDirectoryNotDirectory { path: path.to_owned() })
            }
            Err(source) => Err(CliError::InspectPath {
                field: ARG_OUTDIR,
                path: path.to_owned(),
                source,
            }),
        }
    }
}

impl TryFrom<ConvertArgs> for ConvertConfig {
    type Error = CliError;

    fn try_from(args: ConvertArgs) -> Result<Self, Self::Error> {
        let shapefile = args.shapefile.ok_or(CliError::MissingArgument {
            field: ARG_SHAPEFILE,
            env: ENV_SHAPEFILE,
        })?;
        if args.rulesfile.is_none() && args.copy_tags.is_none() {
            return Err(CliError::MissingArgument {
                field: ARG_RULESFILE,
                env: ENV_RULESFILE,
            });
        }
        let osmfile = args.osmfile.ok_or(CliError::MissingArgument {
            field: ARG_OSMFILE,
            env: ENV_OSMFILE,
        })?;
        Ok(Self {
            shapefile,
            rulesfile: args.rulesfile,
            osmfile,
            outdir: args.outdir.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTDIR)),
            max_elements: parse_max_elements(args.maxnodes.as_deref()),
            format: parse_output_format(args.output_format.as_deref()),
            glom_key: args.glom_key.filter(|key| !key.is_empty()),
            copy_tags: args.copy_tags,
            keep_only_tagged_ways: args.keep_only_tagged_ways,
        })
    }
}

fn default_max_elements() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_MAX_ELEMENTS_PER_FILE).unwrap_or(NonZeroUsize::MIN)
}

fn parse_max_elements(raw: Option<&str>) -> NonZeroUsize {
    let Some(text) = raw else {
        return default_max_elements();
    };
    text.trim()
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .unwrap_or_else(|| {
            warn!("Invalid --{ARG_MAXNODES} value {text:?}; using {DEFAULT_MAX_ELEMENTS_PER_FILE}");
            default_max_elements()
        })
}

fn parse_output_format(raw: Option<&str>) -> OutputFormat {
    let Some(text) = raw else {
        info!("No output format given; writing osmChange files");
        return OutputFormat::Change;
    };
    text.parse().unwrap_or_else(|err: String| {
        warn!("{err}; writing osmChange files");
        OutputFormat::Change
    })
}

#[cfg(test)]
mod tests;
