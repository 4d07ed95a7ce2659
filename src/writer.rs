//! Writing bucket patches and the residual patch.
//!
//! Bucket files are appended to so a bucket can collect hunks across several
//! runs over successive chunks of a diff. The residual patch replaces the
//! input file and holds exactly the hunks nobody claimed. Writes are not
//! transactional; a failure midway leaves earlier files written.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::index::HunkIndex;
use crate::patch::FilePath;
use crate::store::{AssignmentStore, Bucket};

pub const PATCH_EXTENSION: &str = "patch";

/// Synthetic file header written in front of every group of hunks.
pub fn diff_header(path: &str) -> String {
  format!("--- a/{path}\n+++ a/{path}\n")
}

/// What a save wrote, for the closing summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSummary {
  pub buckets:  Vec<(PathBuf, usize)>,
  pub residual: (PathBuf, usize)
}

#[derive(Debug, Clone)]
pub struct Writer {
  output_dir: PathBuf
}

impl Writer {
  pub fn new(output_dir: impl Into<PathBuf>) -> Self {
    Self { output_dir: output_dir.into() }
  }

  pub fn bucket_path(&self, name: &str) -> PathBuf {
    self.output_dir.join(format!("{name}.{PATCH_EXTENSION}"))
  }

  /// True when `<name>.patch` is already on disk from an earlier run.
  pub fn has_pending_output(&self, name: &str) -> bool {
    self.bucket_path(name).is_file()
  }

  /// Bucket contents grouped by path, paths ascending, assignment order within a path.
  pub fn render_bucket(&self, index: &HunkIndex, bucket: &Bucket) -> String {
    let mut entries = bucket
      .entries()
      .iter()
      .filter_map(|id| index.resolve(id.index()).ok())
      .collect::<Vec<_>>();
    entries.sort_by(|a, b| a.path.cmp(b.path));

    let mut text = String::new();
    let mut previous: Option<&str> = None;
    for entry in entries {
      if previous != Some(entry.path) {
        previous = Some(entry.path);
        text.push_str(&diff_header(entry.path));
      }
      text.push_str(&entry.hunk.text());
    }
    text
  }

  /// Unassigned hunks in original order; a file header only for files that still have any.
  pub fn render_residual(&self, index: &HunkIndex, store: &AssignmentStore) -> String {
    let mut text = String::new();
    let mut previous: Option<usize> = None;
    for entry in index.entries().filter(|entry| !store.is_assigned(entry.id)) {
      if previous != Some(entry.file_index) {
        previous = Some(entry.file_index);
        text.push_str(&diff_header(entry.path));
      }
      text.push_str(&entry.hunk.text());
    }
    text
  }

  pub fn save_patches(&self, index: &HunkIndex, store: &AssignmentStore, residual: &Path) -> Result<SaveSummary> {
    let mut summary = SaveSummary::default();

    for bucket in store.buckets() {
      let path = self.bucket_path(bucket.name());
      path.append(&self.render_bucket(index, bucket))?;
      log::info!("Appended {} hunks to {}", bucket.len(), path.display());
      summary.buckets.push((path, bucket.len()));
    }

    let remaining = index.total() - store.assigned_count();
    let residual = residual.to_path_buf();
    residual.write(&self.render_residual(index, store))?;
    log::info!("Wrote {} remaining hunks to {}", remaining, residual.display());
    summary.residual = (residual, remaining);

    Ok(summary)
  }
}
