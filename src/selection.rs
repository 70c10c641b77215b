//! Filtering and ranking of scanned entries into the two manifests.

use std::cmp::Ordering;

use crate::models::{Cutoff, FileEntry, ManifestSelection, RankRange};

/// Trait describing which scanned entries are eligible for ranking.
pub trait EntryInclusion {
  /// Returns `true` when the entry should be ranked.
  fn is_included(&self, entry: &FileEntry) -> bool;
}

impl EntryInclusion for Cutoff {
  fn is_included(&self, entry: &FileEntry) -> bool {
    self.admits(entry.modified)
  }
}

/// Drop entries the filter rejects, keeping enumeration order.
pub fn filter_entries<I, F>(entries: I, filter: &F) -> Vec<FileEntry>
where
  I: IntoIterator<Item = FileEntry>,
  F: EntryInclusion + ?Sized,
{
  entries
    .into_iter()
    .filter(|entry| {
      let keep = filter.is_included(entry);
      if !keep {
        log::debug!("excluding {} (modified {})", entry.path.display(), entry.modified);
      }
      keep
    })
    .collect()
}

/// Sort entries most recently modified first.
///
/// Equal timestamps fall back to ascending path order, so the result does not depend on
/// the order the directory was listed in.
pub fn rank_entries(entries: &mut [FileEntry]) {
  entries.sort_by(compare_rank);
}

fn compare_rank(a: &FileEntry, b: &FileEntry) -> Ordering {
  b.modified
    .total_cmp(&a.modified)
    .then_with(|| a.path.cmp(&b.path))
}

/// Filter, rank and partition entries into the short and long manifests.
pub fn select_entries<I, F>(
  entries: I,
  filter: &F,
  short: RankRange,
  long: RankRange,
) -> ManifestSelection
where
  I: IntoIterator<Item = FileEntry>,
  F: EntryInclusion + ?Sized,
{
  let mut ranked = filter_entries(entries, filter);
  rank_entries(&mut ranked);

  ManifestSelection {
    short: short.slice(&ranked).to_vec(),
    long: long.slice(&ranked).to_vec(),
    qualifying: ranked.len(),
  }
}
