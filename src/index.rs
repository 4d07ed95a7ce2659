//! Global hunk ordering.
//!
//! The patch is flattened once, file order then hunk order, so every hunk gets
//! a stable integer address. That address doubles as the hunk's identity: two
//! hunks with identical text still get distinct ids.

use std::fmt;

use crate::error::SessionError;
use crate::patch::{Hunk, Patch, PatchedFile};

/// Stable identity of a hunk for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HunkId(pub(crate) usize);

impl HunkId {
  pub fn index(self) -> usize {
    self.0
  }
}

impl fmt::Display for HunkId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0 + 1)
  }
}

#[derive(Debug, Clone, Copy)]
struct Location {
  file: usize,
  hunk: usize
}

/// A resolved hunk with enough context to present it.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
  pub id:         HunkId,
  pub path:       &'a str,
  pub hunk:       &'a Hunk,
  /// Position of the owning file within the patch.
  pub file_index: usize,
  /// Position of the hunk within its file.
  pub hunk_index: usize,
  pub file_hunks: usize
}

#[derive(Debug, Clone)]
pub struct HunkIndex {
  patch:     Patch,
  locations: Vec<Location>
}

impl HunkIndex {
  pub fn new(patch: Patch) -> Self {
    let locations = patch
      .iter()
      .enumerate()
      .flat_map(|(file, patched)| (0..patched.len()).map(move |hunk| Location { file, hunk }))
      .collect::<Vec<_>>();

    log::debug!("Indexed {} hunks across {} files", locations.len(), patch.files().len());
    Self { patch, locations }
  }

  pub fn patch(&self) -> &Patch {
    &self.patch
  }

  pub fn total(&self) -> usize {
    self.locations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.locations.is_empty()
  }

  pub fn file_count(&self) -> usize {
    self.patch.files().len()
  }

  pub fn id(&self, index: usize) -> Result<HunkId, SessionError> {
    if index < self.total() {
      Ok(HunkId(index))
    } else {
      Err(SessionError::OutOfRange { index, total: self.total() })
    }
  }

  pub fn resolve(&self, index: usize) -> Result<Entry<'_>, SessionError> {
    let location = self
      .locations
      .get(index)
      .ok_or(SessionError::OutOfRange { index, total: self.total() })?;
    let file: &PatchedFile = &self.patch.files()[location.file];

    Ok(Entry {
      id:         HunkId(index),
      path:       &file.path,
      hunk:       &file.hunks[location.hunk],
      file_index: location.file,
      hunk_index: location.hunk,
      file_hunks: file.len()
    })
  }

  /// Every hunk in global order.
  pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> + '_ {
    (0..self.total()).filter_map(move |index| self.resolve(index).ok())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::patch::parse_patch;

  const DIFF: &str = "--- a/a.rs\n+++ b/a.rs\n@@ -1 +1 @@\n-x\n+y\n@@ -5 +5 @@\n-x\n+y\n--- a/b.rs\n+++ b/b.rs\n@@ -1 +1 @@\n-x\n+y\n";

  #[test]
  fn test_total_matches_sum_of_file_hunks() {
    let index = HunkIndex::new(parse_patch(DIFF).unwrap());
    assert_eq!(index.total(), 3);
    assert_eq!(index.total(), index.patch().iter().map(|f| f.len()).sum::<usize>());
  }

  #[test]
  fn test_resolve_walks_files_then_hunks() {
    let index = HunkIndex::new(parse_patch(DIFF).unwrap());

    let second = index.resolve(1).unwrap();
    assert_eq!(second.path, "a.rs");
    assert_eq!(second.hunk_index, 1);
    assert_eq!(second.file_hunks, 2);

    let third = index.resolve(2).unwrap();
    assert_eq!(third.path, "b.rs");
    assert_eq!(third.file_index, 1);
    assert_eq!(third.hunk_index, 0);
  }

  #[test]
  fn test_identical_hunks_get_distinct_ids() {
    let index = HunkIndex::new(parse_patch(DIFF).unwrap());
    let first = index.resolve(0).unwrap();
    let second = index.resolve(1).unwrap();

    assert_eq!(first.hunk.lines(), second.hunk.lines());
    assert_ne!(first.id, second.id);
  }

  #[test]
  fn test_resolve_out_of_range() {
    let index = HunkIndex::new(parse_patch(DIFF).unwrap());
    assert!(matches!(index.resolve(3), Err(SessionError::OutOfRange { index: 3, total: 3 })));
    assert!(index.id(3).is_err());
  }

  #[test]
  fn test_entries_in_global_order() {
    let index = HunkIndex::new(parse_patch(DIFF).unwrap());
    let ids = index.entries().map(|entry| entry.id.index()).collect::<Vec<_>>();
    assert_eq!(ids, vec![0, 1, 2]);
  }
}
