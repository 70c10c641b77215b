//! Generation orchestrator: scan, select, then write both manifests.

use std::path::PathBuf;

use crate::config::ManifestConfig;
use crate::error::Result;
use crate::manifest::{EntryScan, write_manifest, write_summary};
use crate::models::{Cutoff, GenerationReport, ManifestSelection, SelectionSummary, SummaryEntry};
use crate::pattern::FilePattern;
use crate::selection::select_entries;

/// Selection computed from one scan, before anything is written.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
  /// Absolute directory that was scanned.
  pub source_dir: PathBuf,
  /// Number of files matching the pattern.
  pub scanned: usize,
  /// Entries assigned to each manifest.
  pub selection: ManifestSelection,
}

/// High-level helper that turns a [`ManifestConfig`] into manifests on disk.
#[derive(Debug)]
pub struct ManifestBuilder {
  config: ManifestConfig,
  pattern: FilePattern,
  cutoff: Cutoff,
}

impl ManifestBuilder {
  /// Validate the configuration and prepare the pattern and cutoff.
  pub fn new(config: ManifestConfig) -> Result<Self> {
    config.validate()?;
    let pattern = config.file_pattern()?;
    let cutoff = config.parsed_cutoff()?;

    Ok(Self {
      config,
      pattern,
      cutoff,
    })
  }

  /// Configuration the builder was created with.
  pub fn config(&self) -> &ManifestConfig {
    &self.config
  }

  /// Scan the source directory and rank the qualifying entries without writing anything.
  pub fn scan(&self) -> Result<ScanOutcome> {
    let scan = EntryScan::open(&self.config.source_dir, &self.pattern)?;
    let source_dir = scan.dir().to_path_buf();
    log::info!(
      "scanning {} for {} modified before {}",
      source_dir.display(),
      self.pattern.as_str(),
      self.cutoff
    );

    let entries = scan.collect::<Result<Vec<_>>>()?;
    let scanned = entries.len();
    let selection = select_entries(
      entries,
      &self.cutoff,
      self.config.short_window(),
      self.config.long_window,
    );
    log::info!(
      "{} of {} matching files precede the cutoff",
      selection.qualifying,
      scanned
    );

    Ok(ScanOutcome {
      source_dir,
      scanned,
      selection,
    })
  }

  /// Run the whole pipeline and write the manifests (and summary, when configured).
  ///
  /// The short manifest is written and closed before the long one is opened. A failure
  /// writing the long manifest leaves the short manifest in place.
  pub fn build(&self) -> Result<GenerationReport> {
    let outcome = self.scan()?;
    let selection = &outcome.selection;

    let short_written = write_manifest(&self.config.output_short, &selection.short)?;
    let long_written = write_manifest(&self.config.output_long, &selection.long)?;

    if let Some(summary_path) = &self.config.summary {
      write_summary(summary_path, &self.summarise(&outcome))?;
      log::info!("wrote selection summary to {}", summary_path.display());
    }

    Ok(GenerationReport {
      scanned: outcome.scanned,
      qualifying: selection.qualifying,
      short_written,
      long_written,
      short_path: self.config.output_short.clone(),
      long_path: self.config.output_long.clone(),
      summary_path: self.config.summary.clone(),
    })
  }

  fn summarise(&self, outcome: &ScanOutcome) -> SelectionSummary {
    SelectionSummary {
      source_dir: outcome.source_dir.to_string_lossy().into_owned(),
      pattern: self.pattern.as_str().to_string(),
      cutoff: self.cutoff.to_string(),
      cutoff_seconds: self.cutoff.seconds(),
      scanned: outcome.scanned,
      qualifying: outcome.selection.qualifying,
      short: outcome.selection.short.iter().map(SummaryEntry::from).collect(),
      long: outcome.selection.long.iter().map(SummaryEntry::from).collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeSet;
  use std::fs::{self, File};
  use std::path::Path;
  use std::time::{Duration, UNIX_EPOCH};
  use tempfile::{TempDir, tempdir};

  use crate::error::ManifestError;
  use crate::models::RankRange;

  const CUTOFF: &str = "2025-09-30T12:34:00Z";
  const CUTOFF_SECS: u64 = 1_759_235_640;

  fn touch(path: &Path, seconds: u64) {
    let file = File::create(path).unwrap();
    file
      .set_modified(UNIX_EPOCH + Duration::from_secs(seconds))
      .unwrap();
  }

  /// Source directory with `count` `.h5` files, one minute apart, ending just before the
  /// cutoff, plus files that must never be selected.
  fn fixture(count: u64) -> TempDir {
    let root = tempdir().unwrap();
    let data = root.path().join("data");
    fs::create_dir(&data).unwrap();
    for idx in 0..count {
      touch(&data.join(format!("run_{idx:03}.h5")), CUTOFF_SECS - 60 * (idx + 1));
    }
    touch(&data.join("after_cutoff.h5"), CUTOFF_SECS + 60);
    touch(&data.join("at_cutoff.h5"), CUTOFF_SECS);
    touch(&data.join("run_999.txt"), CUTOFF_SECS - 1);
    root
  }

  fn config_for(root: &Path) -> ManifestConfig {
    ManifestConfig {
      source_dir: root.join("data"),
      cutoff: CUTOFF.into(),
      output_short: root.join("filelist_short.txt"),
      output_long: root.join("filelist_long.txt"),
      ..ManifestConfig::default()
    }
  }

  fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
      .unwrap()
      .lines()
      .map(str::to_string)
      .collect()
  }

  fn modified(path: &str) -> f64 {
    crate::models::system_time_seconds(fs::metadata(path).unwrap().modified().unwrap())
  }

  #[test]
  fn writes_ranked_disjoint_manifests() {
    let root = fixture(25);
    let config = config_for(root.path());
    let report = ManifestBuilder::new(config.clone()).unwrap().build().unwrap();

    assert_eq!(report.scanned, 27);
    assert_eq!(report.qualifying, 25);
    assert_eq!(report.short_written, 5);
    assert_eq!(report.long_written, 15);

    let short = lines(&config.output_short);
    let long = lines(&config.output_long);
    assert_eq!(short.len(), 5);
    assert_eq!(long.len(), 15);
    assert!(short[0].ends_with("run_000.h5"));
    assert!(long[0].ends_with("run_005.h5"));
    assert!(long[14].ends_with("run_019.h5"));

    let short_set: BTreeSet<_> = short.iter().collect();
    assert!(long.iter().all(|path| !short_set.contains(path)));

    for manifest in [&short, &long] {
      assert!(manifest.iter().all(|path| Path::new(path).is_absolute()));
      assert!(manifest.iter().all(|path| modified(path) < CUTOFF_SECS as f64));
      let times: Vec<f64> = manifest.iter().map(|path| modified(path)).collect();
      assert!(times.windows(2).all(|pair| pair[0] >= pair[1]));
    }
  }

  #[test]
  fn reruns_are_byte_identical() {
    let root = fixture(12);
    let config = config_for(root.path());
    let builder = ManifestBuilder::new(config.clone()).unwrap();

    builder.build().unwrap();
    let first = (
      fs::read(&config.output_short).unwrap(),
      fs::read(&config.output_long).unwrap(),
    );
    builder.build().unwrap();
    let second = (
      fs::read(&config.output_short).unwrap(),
      fs::read(&config.output_long).unwrap(),
    );

    assert_eq!(first, second);
    assert_eq!(lines(&config.output_long).len(), 12 - 5);
  }

  #[test]
  fn few_qualifying_files_leave_long_manifest_empty() {
    let root = fixture(3);
    let config = config_for(root.path());
    fs::write(&config.output_long, "stale\n").unwrap();

    ManifestBuilder::new(config.clone()).unwrap().build().unwrap();

    assert_eq!(lines(&config.output_short).len(), 3);
    assert_eq!(fs::read_to_string(&config.output_long).unwrap(), "");
  }

  #[test]
  fn missing_source_dir_writes_nothing() {
    let root = tempdir().unwrap();
    let config = config_for(root.path());

    let err = ManifestBuilder::new(config.clone()).unwrap().build().unwrap_err();

    assert!(matches!(err, ManifestError::Access { .. }));
    assert!(!config.output_short.exists());
    assert!(!config.output_long.exists());
  }

  #[test]
  fn failed_long_write_keeps_short_manifest() {
    let root = fixture(8);
    let config = ManifestConfig {
      output_long: root.path().join("no-such-dir").join("filelist_long.txt"),
      ..config_for(root.path())
    };

    let err = ManifestBuilder::new(config.clone()).unwrap().build().unwrap_err();

    assert!(matches!(err, ManifestError::Write { .. }));
    assert_eq!(lines(&config.output_short).len(), 5);
  }

  #[test]
  fn writes_summary_when_configured() {
    let root = fixture(7);
    let config = ManifestConfig {
      summary: Some(root.path().join("summary.json")),
      ..config_for(root.path())
    };

    let report = ManifestBuilder::new(config.clone()).unwrap().build().unwrap();
    assert_eq!(report.summary_path, config.summary);

    let summary: serde_json::Value =
      serde_json::from_str(&fs::read_to_string(root.path().join("summary.json")).unwrap())
        .unwrap();
    assert_eq!(summary["scanned"], 9);
    assert_eq!(summary["qualifying"], 7);
    assert_eq!(summary["cutoff_seconds"], CUTOFF_SECS as f64);
    assert_eq!(summary["short"].as_array().unwrap().len(), 5);
    assert_eq!(summary["long"].as_array().unwrap().len(), 2);
  }

  #[test]
  fn custom_windows_are_respected() {
    let root = fixture(10);
    let config = ManifestConfig {
      short_count: 2,
      long_window: RankRange::new(4, 6),
      ..config_for(root.path())
    };

    let report = ManifestBuilder::new(config.clone()).unwrap().build().unwrap();

    assert_eq!(report.short_written, 2);
    assert_eq!(report.long_written, 2);
    let long = lines(&config.output_long);
    assert!(long[0].ends_with("run_004.h5"));
    assert!(long[1].ends_with("run_005.h5"));
  }

  #[cfg(target_os = "linux")]
  #[test]
  fn listed_paths_always_exist_on_disk() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let root = fixture(3);
    touch(
      &root.path().join("data").join(OsStr::from_bytes(b"run_\xff.h5")),
      CUTOFF_SECS - 1,
    );
    let config = config_for(root.path());

    let report = ManifestBuilder::new(config.clone()).unwrap().build().unwrap();

    assert_eq!(report.qualifying, 3);
    let short = lines(&config.output_short);
    assert_eq!(short.len(), 3);
    assert!(short.iter().all(|path| Path::new(path).exists()));
  }

  #[test]
  fn invalid_configuration_is_rejected_up_front() {
    let root = tempdir().unwrap();
    let bad_cutoff = ManifestConfig {
      cutoff: "soon".into(),
      ..config_for(root.path())
    };
    assert!(matches!(
      ManifestBuilder::new(bad_cutoff),
      Err(ManifestError::Cutoff(_))
    ));

    let overlapping = ManifestConfig {
      long_window: RankRange::new(3, 20),
      ..config_for(root.path())
    };
    assert!(matches!(
      ManifestBuilder::new(overlapping),
      Err(ManifestError::Config(_))
    ));
  }
}
