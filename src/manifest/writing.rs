//! Writers for the plain-text manifests and the optional JSON summary.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ManifestError, Result};
use crate::models::{FileEntry, SelectionSummary};

/// Render entries as one path per line, each line newline-terminated.
///
/// Paths are written verbatim, so one that is not valid UTF-8 is an error rather than a
/// lossy approximation naming a file that does not exist.
pub fn render_manifest(entries: &[FileEntry]) -> Result<String> {
    let mut out = String::new();
    for entry in entries {
        let path = entry
            .path
            .to_str()
            .ok_or_else(|| ManifestError::NonUtf8Path(entry.path.clone()))?;
        out.push_str(path);
        out.push('\n');
    }
    Ok(out)
}

/// Truncate `path` and write the manifest, returning the number of lines written.
///
/// The file is flushed and closed before returning.
pub fn write_manifest(path: &Path, entries: &[FileEntry]) -> Result<usize> {
    let write_error = |source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };

    let contents = render_manifest(entries)?;
    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(write_error)?;
    writer.flush().map_err(write_error)?;

    log::info!("wrote {} entries to {}", entries.len(), path.display());
    Ok(entries.len())
}

/// Serialise the selection summary as pretty JSON to `path`.
pub fn write_summary(path: &Path, summary: &SelectionSummary) -> Result<()> {
    let mut json = serde_json::to_string_pretty(summary)?;
    json.push('\n');
    fs::write(path, json).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}
