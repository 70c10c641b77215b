//! Error type shared by every stage of manifest generation.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Failures that abort a generation run.
///
/// Nothing is retried: each variant is surfaced to the caller as soon as it occurs.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// The source directory is missing or could not be listed.
  #[error("failed to read source directory {}: {source}", .path.display())]
  Access {
    /// Directory that could not be read.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// An entry vanished or became unreadable between listing and `stat`.
  #[error("failed to read metadata for {}: {source}", .path.display())]
  Metadata {
    /// Entry whose metadata could not be read.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// A manifest or summary file could not be written.
  #[error("failed to write {}: {source}", .path.display())]
  Write {
    /// Destination that failed.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// A path cannot be written to a UTF-8 manifest.
  #[error("path is not valid UTF-8: {}", .0.display())]
  NonUtf8Path(PathBuf),
  /// The configuration file could not be read.
  #[error("failed to read config {}: {source}", .path.display())]
  ConfigRead {
    /// Configuration file path.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// The configuration file is not valid JSON for [`crate::ManifestConfig`].
  #[error("failed to parse config {}: {source}", .path.display())]
  ConfigParse {
    /// Configuration file path.
    path: PathBuf,
    /// Parser error.
    #[source]
    source: serde_json::Error,
  },
  /// The configuration values are inconsistent.
  #[error("invalid configuration: {0}")]
  Config(String),
  /// The file-name pattern could not be compiled.
  #[error("invalid file pattern `{pattern}`: {source}")]
  Pattern {
    /// Pattern as written in the configuration.
    pattern: String,
    /// Regex compilation error for the translated pattern.
    #[source]
    source: regex::Error,
  },
  /// The cutoff could not be parsed into a point in time.
  #[error("invalid cutoff `{0}`")]
  Cutoff(String),
  /// The selection summary could not be serialised.
  #[error("failed to serialise selection summary: {0}")]
  Summary(#[from] serde_json::Error),
}
