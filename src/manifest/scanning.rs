//! Directory scanning that pairs matching files with their modification times.

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

use crate::error::{ManifestError, Result};
use crate::models::FileEntry;
use crate::pattern::FilePattern;

/// Lazy, single-pass scan over one directory.
///
/// Yields an entry for each regular file whose name matches the pattern. Metadata is read
/// as the iterator advances, so a file removed mid-scan surfaces as
/// [`ManifestError::Metadata`].
#[derive(Debug)]
pub struct EntryScan<'a> {
    dir: PathBuf,
    entries: ReadDir,
    pattern: &'a FilePattern,
}

impl<'a> EntryScan<'a> {
    /// Open `dir` for scanning. Relative directories are resolved against the working
    /// directory so that every yielded path is absolute. The directory path must be valid
    /// UTF-8, since every listed file inherits it.
    pub fn open(dir: &Path, pattern: &'a FilePattern) -> Result<Self> {
        let access_error = |source| ManifestError::Access {
            path: dir.to_path_buf(),
            source,
        };
        let dir = std::path::absolute(dir).map_err(access_error)?;
        if dir.to_str().is_none() {
            return Err(ManifestError::NonUtf8Path(dir));
        }
        let entries = fs::read_dir(&dir).map_err(access_error)?;

        Ok(Self {
            dir,
            entries,
            pattern,
        })
    }

    /// Absolute directory being scanned.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Iterator for EntryScan<'_> {
    type Item = Result<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(ManifestError::Access {
                        path: self.dir.clone(),
                        source,
                    }));
                }
            };

            let path = entry.path();
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                log::warn!("skipping file with non-UTF-8 name {}", path.display());
                continue;
            };
            if !self.pattern.matches(name) {
                continue;
            }

            match read_entry(&path) {
                Ok(Some(found)) => return Some(Ok(found)),
                Ok(None) => log::debug!("skipping non-file {}", path.display()),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

fn read_entry(path: &Path) -> Result<Option<FileEntry>> {
    let metadata_error = |source| ManifestError::Metadata {
        path: path.to_path_buf(),
        source,
    };
    // Follows symlinks, so a link to a data file counts as that file.
    let metadata = fs::metadata(path).map_err(metadata_error)?;
    if !metadata.is_file() {
        return Ok(None);
    }
    let modified = metadata.modified().map_err(metadata_error)?;
    Ok(Some(FileEntry::from_system_time(path, modified)))
}

/// Scan `dir` and collect every matching entry in enumeration order.
pub fn collect_entries(dir: &Path, pattern: &FilePattern) -> Result<Vec<FileEntry>> {
    EntryScan::open(dir, pattern)?.collect()
}
