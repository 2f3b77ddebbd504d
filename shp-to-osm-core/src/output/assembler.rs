//! Packs output units into files of bounded size.

use log::{debug, warn};

use super::xml::XmlDocument;
use super::{FileTarget, OutputError, OutputSettings, OutputSummary};
use crate::primitive::Primitive;
use crate::unit::OutputUnit;

/// Writes output units into numbered files of at most
/// [`OutputSettings::max_elements`] elements each.
///
/// A unit is never split across files, so every way and relation resolves
/// within the file that holds it. Each file is buffered and handed to the
/// [`FileTarget`] whole, nodes first, then ways, then relations.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use shp_to_osm_core::test_support::MemoryTarget;
/// use shp_to_osm_core::{BoundedAssembler, GeometryClass, OutputFormat, OutputSettings, OutputUnit, Primitive};
///
/// let settings = OutputSettings::new("poi", OutputFormat::Change, "shp-to-osm");
/// let mut assembler = BoundedAssembler::new(MemoryTarget::default(), settings);
/// let mut unit = OutputUnit::new(GeometryClass::Point);
/// unit.push(Primitive::node(-1, Coord { x: 1.0, y: 2.0 }));
/// assembler.write_unit(unit)?;
///
/// let summary = assembler.finish()?;
/// assert_eq!(summary.files, vec!["poi_1.osc".to_owned()]);
/// # Ok::<(), shp_to_osm_core::OutputError>(())
/// ```
#[derive(Debug)]
pub struct BoundedAssembler<T: FileTarget> {
    target: T,
    settings: OutputSettings,
    nodes: Vec<Primitive>,
    ways: Vec<Primitive>,
    relations: Vec<Primitive>,
    buffered: usize,
    summary: OutputSummary,
}

impl<T: FileTarget> BoundedAssembler<T> {
    /// Assemble files into `target`.
    pub const fn new(target: T, settings: OutputSettings) -> Self {
        Self {
            target,
            settings,
            nodes: Vec::new(),
            ways: Vec::new(),
            relations: Vec::new(),
            buffered: 0,
            summary: OutputSummary {
                files: Vec::new(),
                elements: 0,
            },
        }
    }

    /// Settings in use.
    #[must_use]
    pub const fn settings(&self) -> &OutputSettings {
        &self.settings
    }

    /// Add `unit` to the current file, committing that file first when the
    /// unit would push it over the cap.
    ///
    /// # Errors
    /// Returns [`OutputError::UnitExceedsCap`] when the unit alone is larger
    /// than the cap, and [`OutputError::Write`] when committing a file fails.
    pub fn write_unit(&mut self, unit: OutputUnit) -> Result<(), OutputError> {
        let elements = unit.element_count();
        if elements == 0 {
            return Ok(());
        }
        let cap = self.settings.max_elements.get();
        if elements > cap {
            return Err(OutputError::UnitExceedsCap {
                elements,
                cap,
                glom_value: unit.glom_value().map(str::to_owned),
            });
        }
        if self.buffered + elements > cap {
            self.commit()?;
        }
        let (nodes, ways, relations) = unit.into_parts();
        self.nodes.extend(nodes);
        self.ways.extend(ways);
        self.relations.extend(relations);
        self.buffered += elements;
        Ok(())
    }

    /// Commit the last file and report what was written.
    ///
    /// A run that produced no elements writes no files.
    ///
    /// # Errors
    /// Returns [`OutputError::Write`] when committing the last file fails.
    pub fn finish(&mut self) -> Result<OutputSummary, OutputError> {
        if self.buffered > 0 {
            self.commit()?;
        }
        if self.summary.files.is_empty() {
            warn!("No elements to write; no output files were created");
        }
        Ok(std::mem::take(&mut self.summary))
    }

    /// The file target.
    #[must_use]
    pub const fn target(&self) -> &T {
        &self.target
    }

    /// Give back the file target.
    #[must_use]
    pub fn into_target(self) -> T {
        self.target
    }

    fn commit(&mut self) -> Result<(), OutputError> {
        let name = self.settings.file_name(self.summary.files.len() + 1);
        let mut document = XmlDocument::new(self.settings.format, &self.settings.generator);
        for primitive in self.nodes.drain(..).chain(self.ways.drain(..)).chain(self.relations.drain(..)) {
            document.push(&primitive);
        }
        let xml = document.finish();
        self.target
            .write_file(&name, xml.as_bytes())
            .map_err(|source| OutputError::Write {
                file: name.clone(),
                source,
            })?;
        debug!("Wrote {name} with {} elements", self.buffered);
        self.summary.elements += self.buffered;
        self.summary.files.push(name);
        self.buffered = 0;
        Ok(())
    }
}
