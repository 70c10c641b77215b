//! Data structures produced while selecting files for the manifests.

use std::fmt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use serde::Serialize;

use crate::error::{ManifestError, Result};

/// Naive formats accepted for a cutoff, interpreted in local time.
const NAIVE_CUTOFF_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
];

/// A discovered file paired with its last-modified time.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
  /// Absolute path of the file.
  pub path: PathBuf,
  /// Modification time in seconds since the Unix epoch.
  pub modified: f64,
}

impl FileEntry {
  /// Create an entry from a path and a raw timestamp.
  pub fn new(path: impl Into<PathBuf>, modified: f64) -> Self {
    Self {
      path: path.into(),
      modified,
    }
  }

  /// Create an entry from filesystem metadata time.
  pub fn from_system_time(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
    Self::new(path, system_time_seconds(modified))
  }
}

/// Convert a [`SystemTime`] into fractional seconds, negative before the epoch.
pub fn system_time_seconds(time: SystemTime) -> f64 {
  match time.duration_since(UNIX_EPOCH) {
    Ok(elapsed) => elapsed.as_secs_f64(),
    Err(err) => -err.duration().as_secs_f64(),
  }
}

/// Exclusive upper bound on modification time for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoff {
  seconds: f64,
}

impl Cutoff {
  /// Build a cutoff directly from seconds since the epoch.
  pub fn from_seconds(seconds: f64) -> Self {
    Self { seconds }
  }

  /// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DD HH:MM[:SS]` in local time.
  pub fn parse(value: &str) -> Result<Self> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
      return Ok(Self::from_datetime(&instant));
    }

    let naive = NAIVE_CUTOFF_FORMATS
      .iter()
      .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
      .ok_or_else(|| ManifestError::Cutoff(value.to_string()))?;

    let local = resolve_local(&Local, &naive)
      .ok_or_else(|| ManifestError::Cutoff(value.to_string()))?;
    Ok(Self::from_datetime(&local))
  }

  fn from_datetime<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
    let seconds = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_nanos()) / 1e9;
    Self { seconds }
  }

  /// Seconds since the Unix epoch.
  pub fn seconds(&self) -> f64 {
    self.seconds
  }

  /// Returns `true` when the timestamp lies strictly before the cutoff.
  pub fn admits(&self, modified: f64) -> bool {
    modified < self.seconds
  }

  /// The cutoff as a UTC instant, when representable.
  pub fn to_utc(&self) -> Option<DateTime<Utc>> {
    let whole = self.seconds.floor();
    let nanos = ((self.seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
  }
}

impl fmt::Display for Cutoff {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.to_utc() {
      Some(instant) => write!(f, "{}", instant.with_timezone(&Local).to_rfc3339()),
      None => write!(f, "{}s", self.seconds),
    }
  }
}

/// Map a naive wall-clock time onto an instant in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times skipped by a DST gap
/// keep the offset in force before the transition, which lands one hour later on the
/// wall clock.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
  match tz.from_local_datetime(naive) {
    LocalResult::None => tz
      .from_local_datetime(&(*naive + TimeDelta::hours(1)))
      .earliest(),
    resolved => resolved.earliest(),
  }
}

/// Contiguous half-open range of positions in the ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, Serialize)]
pub struct RankRange {
  /// First rank included.
  pub start: usize,
  /// First rank excluded.
  pub end: usize,
}

impl RankRange {
  /// Create a new range.
  pub const fn new(start: usize, end: usize) -> Self {
    Self { start, end }
  }

  /// Borrow the slice of `entries` covered by this range, clamped to its length.
  pub fn slice<'a, T>(&self, entries: &'a [T]) -> &'a [T] {
    let end = self.end.min(entries.len());
    let start = self.start.min(end);
    &entries[start..end]
  }

  /// Number of positions in the range.
  pub fn len(&self) -> usize {
    self.end.saturating_sub(self.start)
  }

  /// Returns `true` when the range covers no positions.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Entries assigned to each manifest after ranking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestSelection {
  /// Entries for the short manifest, most recent first.
  pub short: Vec<FileEntry>,
  /// Entries for the long manifest, most recent first.
  pub long: Vec<FileEntry>,
  /// Number of entries that passed the cutoff filter.
  pub qualifying: usize,
}

/// Serializable record of one manifest entry in the selection summary.
#[derive(Clone, Debug, Serialize)]
pub struct SummaryEntry {
  /// Absolute path of the file.
  pub path: String,
  /// Modification time in seconds since the Unix epoch.
  pub modified: f64,
}

impl From<&FileEntry> for SummaryEntry {
  fn from(entry: &FileEntry) -> Self {
    Self {
      path: entry.path.to_string_lossy().into_owned(),
      modified: entry.modified,
    }
  }
}

/// Serializable summary of a run, written when a summary path is configured.
#[derive(Clone, Debug, Serialize)]
pub struct SelectionSummary {
  /// Directory that was scanned.
  pub source_dir: String,
  /// File-name pattern applied during the scan.
  pub pattern: String,
  /// Cutoff rendered as RFC 3339 in local time.
  pub cutoff: String,
  /// Cutoff in seconds since the Unix epoch.
  pub cutoff_seconds: f64,
  /// Number of files matching the pattern.
  pub scanned: usize,
  /// Number of files earlier than the cutoff.
  pub qualifying: usize,
  /// Entries written to the short manifest.
  pub short: Vec<SummaryEntry>,
  /// Entries written to the long manifest.
  pub long: Vec<SummaryEntry>,
}

/// Outcome of a successful generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
  /// Number of files matching the pattern.
  pub scanned: usize,
  /// Number of files earlier than the cutoff.
  pub qualifying: usize,
  /// Lines written to the short manifest.
  pub short_written: usize,
  /// Lines written to the long manifest.
  pub long_written: usize,
  /// Short manifest destination.
  pub short_path: PathBuf,
  /// Long manifest destination.
  pub long_path: PathBuf,
  /// Summary destination, when one was written.
  pub summary_path: Option<PathBuf>,
}
