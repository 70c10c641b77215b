//! Run configuration describing where to scan and where manifests are written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ManifestError, Result};
use crate::models::{Cutoff, RankRange};
use crate::pattern::FilePattern;

/// File name searched for by [`ManifestConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "filelist.config.json";

/// Explicit configuration passed to the generator.
///
/// Every field has a default, so a configuration file only needs to list the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Directory scanned (non-recursively) for data files.
    pub source_dir: PathBuf,
    /// Glob applied to file names, e.g. `*.h5`.
    pub pattern: String,
    /// Exclusive upper bound on modification time.
    pub cutoff: String,
    /// Destination of the short manifest.
    pub output_short: PathBuf,
    /// Destination of the long manifest.
    pub output_long: PathBuf,
    /// Number of top-ranked entries in the short manifest.
    pub short_count: usize,
    /// Ranks written to the long manifest.
    pub long_window: RankRange,
    /// Optional JSON summary of the selection.
    pub summary: Option<PathBuf>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("output_spine"),
            pattern: "*.h5".into(),
            cutoff: "2025-09-30T12:34:00".into(),
            output_short: PathBuf::from("filelist_short.txt"),
            output_long: PathBuf::from("filelist_long.txt"),
            short_count: 5,
            long_window: RankRange::new(5, 20),
            summary: None,
        }
    }
}

impl ManifestConfig {
    /// Load `filelist.config.json` from `dir`, falling back to defaults when absent.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        match Self::load_from_path(&path) {
            Err(ManifestError::ConfigRead { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Read configuration from a JSON file that must exist.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| ManifestError::ConfigRead {
            path: path.to_path_buf(),
            source: err,
        })?;

        serde_json::from_str(&contents).map_err(|err| ManifestError::ConfigParse {
            path: path.to_path_buf(),
            source: err,
        })
    }

    /// Check the values are usable and the two rank ranges cannot overlap.
    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(ManifestError::Config("pattern must not be empty".into()));
        }
        if self.long_window.end < self.long_window.start {
            return Err(ManifestError::Config(format!(
                "long_window end {} is before start {}",
                self.long_window.end, self.long_window.start
            )));
        }
        if self.long_window.start < self.short_count {
            return Err(ManifestError::Config(format!(
                "long_window start {} overlaps the short manifest (short_count {})",
                self.long_window.start, self.short_count
            )));
        }
        if self.output_short == self.output_long {
            return Err(ManifestError::Config(format!(
                "short and long manifests share the path {}",
                self.output_short.display()
            )));
        }
        Ok(())
    }

    /// Ranks written to the short manifest.
    pub fn short_window(&self) -> RankRange {
        RankRange::new(0, self.short_count)
    }

    /// Parse the configured cutoff.
    pub fn parsed_cutoff(&self) -> Result<Cutoff> {
        Cutoff::parse(&self.cutoff)
    }

    /// Compile the configured file-name pattern.
    pub fn file_pattern(&self) -> Result<FilePattern> {
        FilePattern::new(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_fixed_script_values() {
        let config = ManifestConfig::default();
        assert_eq!(config.pattern, "*.h5");
        assert_eq!(config.output_short, PathBuf::from("filelist_short.txt"));
        assert_eq!(config.output_long, PathBuf::from("filelist_long.txt"));
        assert_eq!(config.short_window(), RankRange::new(0, 5));
        assert_eq!(config.long_window, RankRange::new(5, 20));
        assert!(config.summary.is_none());
        config.validate().expect("defaults should validate");
        config.parsed_cutoff().expect("default cutoff should parse");
    }

    #[test]
    fn discover_returns_default_for_missing_file() {
        let temp = tempdir().expect("failed to create temp dir");
        let config = ManifestConfig::discover(temp.path()).expect("missing config is not an error");
        assert_eq!(config, ManifestConfig::default());
    }

    #[test]
    fn load_from_path_requires_the_named_file() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join("typo.json");

        let err = ManifestConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::ConfigRead { path: p, source }
                if p == path && source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[test]
    fn load_from_path_merges_with_defaults() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"{"source_dir": "/data/spine", "cutoff": "2024-01-01T00:00:00Z", "long_window": {"start": 5, "end": 30}}"#,
        )
        .expect("failed to write config");

        let config = ManifestConfig::discover(temp.path()).expect("config should load");
        assert_eq!(config.source_dir, PathBuf::from("/data/spine"));
        assert_eq!(config.cutoff, "2024-01-01T00:00:00Z");
        assert_eq!(config.long_window, RankRange::new(5, 30));
        assert_eq!(config.pattern, "*.h5");
        assert_eq!(config.short_count, 5);
    }

    #[test]
    fn load_from_path_reports_parse_errors() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").expect("failed to write config");

        let err = ManifestConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ManifestError::ConfigParse { path: p, .. } if p == path));
    }

    #[test]
    fn rejects_unknown_fields() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join("typo.json");
        fs::write(&path, r#"{"sourcedir": "x"}"#).expect("failed to write config");

        assert!(ManifestConfig::load_from_path(&path).is_err());
    }

    #[test]
    fn validate_rejects_overlapping_windows() {
        let config = ManifestConfig {
            short_count: 6,
            ..ManifestConfig::default()
        };
        assert!(matches!(config.validate(), Err(ManifestError::Config(_))));
    }

    #[test]
    fn validate_rejects_inverted_long_window() {
        let config = ManifestConfig {
            long_window: RankRange::new(10, 5),
            ..ManifestConfig::default()
        };
        assert!(matches!(config.validate(), Err(ManifestError::Config(_))));
    }

    #[test]
    fn validate_rejects_shared_output_path() {
        let config = ManifestConfig {
            output_long: PathBuf::from("filelist_short.txt"),
            ..ManifestConfig::default()
        };
        assert!(matches!(config.validate(), Err(ManifestError::Config(_))));
    }

    #[test]
    fn validate_rejects_empty_pattern() {
        let config = ManifestConfig {
            pattern: "  ".into(),
            ..ManifestConfig::default()
        };
        assert!(matches!(config.validate(), Err(ManifestError::Config(_))));
    }
}
