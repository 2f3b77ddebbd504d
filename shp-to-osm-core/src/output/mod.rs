//! Serialization of output units into size-bounded OSM XML files.

mod assembler;
mod coordinate;
mod xml;

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use thiserror::Error;

pub use assembler::BoundedAssembler;
pub use coordinate::format_coordinate;
pub use xml::XmlDocument;

/// Default element cap per output file.
pub const DEFAULT_MAX_ELEMENTS_PER_FILE: usize = 50_000;

/// OSM XML flavour written to every output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Snapshot `<osm>` document, `.osm` files.
    Legacy,
    /// `<osmChange>` document with a single `<create>` block, `.osc` files.
    #[default]
    Change,
}

impl OutputFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Legacy => "osm",
            Self::Change => "osc",
        }
    }

    /// Selector accepted by [`OutputFormat::from_str`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "osm",
            Self::Change => "osmc",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "osm" => Ok(Self::Legacy),
            "osmc" => Ok(Self::Change),
            _ => Err(format!("unknown output format '{s}' (expected 'osm' or 'osmc')")),
        }
    }
}

/// Destination for finished output files.
///
/// Implementations must make each file visible all at once: a reader never
/// sees a partially written file under `name`.
pub trait FileTarget {
    /// Store `contents` as the file `name`.
    ///
    /// # Errors
    /// Returns the underlying I/O error when the file cannot be stored.
    fn write_file(&mut self, name: &str, contents: &[u8]) -> std::io::Result<()>;
}

impl<T: FileTarget + ?Sized> FileTarget for &mut T {
    fn write_file(&mut self, name: &str, contents: &[u8]) -> std::io::Result<()> {
        (**self).write_file(name, contents)
    }
}

/// Errors raised while writing output files.
#[derive(Debug, Error)]
pub enum OutputError {
    /// A finished file could not be stored.
    #[error("failed to write output file {file}")]
    Write {
        /// Name of the file being written.
        file: String,
        /// Source error from the file target.
        #[source]
        source: std::io::Error,
    },
    /// One unit alone holds more elements than a file may.
    #[error(
        "an output unit of {elements} elements{} exceeds the cap of {cap} elements per file",
        glom_label(.glom_value.as_deref())
    )]
    UnitExceedsCap {
        /// Elements in the offending unit.
        elements: usize,
        /// Configured element cap.
        cap: usize,
        /// Canonical glom value of the unit, when it was merged.
        glom_value: Option<String>,
    },
}

fn glom_label(glom_value: Option<&str>) -> String {
    glom_value.map_or_else(String::new, |value| format!(" for glom value {value:?}"))
}

/// What an assembler wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSummary {
    /// File names in write order.
    pub files: Vec<String>,
    /// Elements written across all files.
    pub elements: usize,
}

/// Naming, format and size settings for output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    /// File name prefix; files are named `<prefix>_<n>.<ext>`.
    pub prefix: String,
    /// XML flavour.
    pub format: OutputFormat,
    /// Generator string written into each header.
    pub generator: String,
    /// Element cap per file.
    pub max_elements: NonZeroUsize,
}

impl OutputSettings {
    /// Settings with the default element cap.
    #[must_use]
    pub fn new(prefix: impl Into<String>, format: OutputFormat, generator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            format,
            generator: generator.into(),
            max_elements: NonZeroUsize::new(DEFAULT_MAX_ELEMENTS_PER_FILE).unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Replace the element cap.
    #[must_use]
    pub const fn with_max_elements(mut self, max_elements: NonZeroUsize) -> Self {
        self.max_elements = max_elements;
        self
    }

    /// Name of the `sequence`-th file, counting from one.
    #[must_use]
    pub fn file_name(&self, sequence: usize) -> String {
        format!("{}_{sequence}.{}", self.prefix, self.format.extension())
    }
}
