//! In-memory collaborators for tests.

use std::convert::Infallible;
use std::io;

use crate::convert::{Feature, FeatureSource};
use crate::output::FileTarget;

/// Keeps written files in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryTarget {
    files: Vec<(String, String)>,
    fail: bool,
}

impl MemoryTarget {
    /// A target that rejects every write.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            files: Vec::new(),
            fail: true,
        }
    }

    /// Contents of `name`, when it was written.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find_map(|(file, contents)| (file == name).then_some(contents.as_str()))
    }

    /// Written file names in write order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(file, _)| file.as_str())
    }

    /// Number of written files.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was written.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileTarget for MemoryTarget {
    fn write_file(&mut self, name: &str, contents: &[u8]) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only target"));
        }
        let text = String::from_utf8(contents.to_vec()).map_err(io::Error::other)?;
        self.files.push((name.to_owned(), text));
        Ok(())
    }
}

/// Serves features from a vector.
#[derive(Debug, Clone)]
pub struct VecSource {
    geometry_key: String,
    features: std::vec::IntoIter<Feature>,
}

impl VecSource {
    /// Serve `features` in order under the geometry attribute `geometry_key`.
    #[must_use]
    pub fn new(geometry_key: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            geometry_key: geometry_key.into(),
            features: features.into_iter(),
        }
    }
}

impl FeatureSource for VecSource {
    type Error = Infallible;

    fn geometry_key(&self) -> &str {
        &self.geometry_key
    }

    fn next_feature(&mut self) -> Result<Option<Feature>, Self::Error> {
        Ok(self.features.next())
    }
}
