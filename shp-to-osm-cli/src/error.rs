//! Error types emitted by the shp-to-osm CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use shp_to_osm_core::{ConvertError, RuleFileError};
use shp_to_osm_data::ShapefileSourceError;
use thiserror::Error;

/// Errors emitted by the shp-to-osm CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was given.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was given.
        path: Utf8PathBuf,
    },
    /// A referenced path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectPath {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was given.
        path: Utf8PathBuf,
        /// Source error from the filesystem.
        #[source]
        source: std::io::Error,
    },
    /// The output directory does not exist.
    #[error("output directory {path:?} does not exist")]
    MissingOutputDirectory {
        /// Path that was given.
        path: Utf8PathBuf,
    },
    /// The output directory exists but is not a directory.
    #[error("output directory {path:?} is not a directory")]
    OutputDirectoryNotDirectory {
        /// Path that was given.
        path: Utf8PathBuf,
    },
    /// Opening the output directory failed.
    #[error("failed to open output directory {path:?}: {source}")]
    OpenOutputDirectory {
        /// Path that was given.
        path: Utf8PathBuf,
        /// Source error from the filesystem.
        #[source]
        source: std::io::Error,
    },
    /// Opening the rule file failed.
    #[error("failed to open rule file {path:?}: {source}")]
    OpenRules {
        /// Path of the rule file.
        path: Utf8PathBuf,
        /// Source error from the filesystem.
        #[source]
        source: std::io::Error,
    },
    /// Reading the rule file failed part way.
    #[error("failed to read rule file {path:?}: {source}")]
    ReadRules {
        /// Path of the rule file.
        path: Utf8PathBuf,
        /// Source error from the rule parser.
        #[source]
        source: RuleFileError,
    },
    /// Opening the shapefile failed.
    #[error(transparent)]
    Shapefile(#[from] ShapefileSourceError),
    /// Conversion failed while reading records or writing output.
    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),
}
