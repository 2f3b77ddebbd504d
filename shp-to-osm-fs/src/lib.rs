//! Filesystem helpers built on `cap-std` and `camino`.
//!
//! [`OutputDirectory`] stores finished OSM files through a capability handle
//! on the output directory, so nothing outside that directory is touched.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use log::debug;
use shp_to_osm_core::FileTarget;
use std::io::{self, Write};

/// Suffix of files still being written.
const PARTIAL_SUFFIX: &str = ".partial";

/// Open a UTF-8 file path using ambient authority.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Resolve an ambient directory for the given path and return the directory
/// with the file name.
///
/// # Errors
/// Fails when `path` has no file name or its parent cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Return whether a path exists and is a regular file using capability-based
/// IO.
///
/// # Errors
/// Fails when the parent directory cannot be opened or the entry cannot be
/// inspected.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Return whether a path exists and is a directory.
///
/// # Errors
/// Fails when the entry cannot be inspected for a reason other than being
/// absent.
pub fn dir_exists(path: &Utf8Path) -> io::Result<bool> {
    match fs_utf8::Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// An existing directory receiving output files.
///
/// Each file is written under a `.partial` name and renamed once complete, so
/// a failed run never leaves a truncated file under its final name.
#[derive(Debug)]
pub struct OutputDirectory {
    path: Utf8PathBuf,
    dir: fs_utf8::Dir,
}

impl OutputDirectory {
    /// Open the existing directory at `path`.
    ///
    /// # Errors
    /// Fails when the directory does not exist or cannot be opened.
    pub fn open(path: &Utf8Path) -> io::Result<Self> {
        let dir = fs_utf8::Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self {
            path: path.to_owned(),
            dir,
        })
    }

    /// Path the directory was opened from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl FileTarget for OutputDirectory {
    fn write_file(&mut self, name: &str, contents: &[u8]) -> io::Result<()> {
        let partial = format!("{name}{PARTIAL_SUFFIX}");
        let mut file = self.dir.create(&partial)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        self.dir.rename(&partial, &self.dir, name)?;
        debug!("Stored {name} in {}", self.path);
        Ok(())
    }
}
