//! Buckets and hunk assignments.

use std::collections::HashMap;

use thiserror::Error;

use crate::index::HunkId;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssignError {
  #[error("Bucket \"{0}\" does not exist!")]
  UnknownBucket(String),

  #[error("Hunk {id} is already in bucket \"{bucket}\"!")]
  AlreadyAssigned { id: HunkId, bucket: String }
}

/// A named output grouping. Entries keep assignment order, not traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
  name:    String,
  entries: Vec<HunkId>
}

impl Bucket {
  fn new(name: &str) -> Self {
    Self { name: name.to_string(), entries: Vec::new() }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn entries(&self) -> &[HunkId] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Which hunk went to which bucket. A hunk lives in at most one bucket.
#[derive(Debug, Default)]
pub struct AssignmentStore {
  buckets:  Vec<Bucket>,
  by_name:  HashMap<String, usize>,
  assigned: HashMap<HunkId, usize>
}

impl AssignmentStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers an empty bucket. Returns false for an empty or already known name.
  pub fn create_bucket(&mut self, name: &str) -> bool {
    if name.is_empty() || self.by_name.contains_key(name) {
      return false;
    }

    log::info!("Created bucket {name}");
    self.by_name.insert(name.to_string(), self.buckets.len());
    self.buckets.push(Bucket::new(name));
    true
  }

  pub fn has_bucket(&self, name: &str) -> bool {
    self.by_name.contains_key(name)
  }

  pub fn assign(&mut self, id: HunkId, name: &str) -> Result<(), AssignError> {
    let slot = *self.by_name.get(name).ok_or_else(|| AssignError::UnknownBucket(name.to_string()))?;

    if let Some(&current) = self.assigned.get(&id) {
      return Err(AssignError::AlreadyAssigned { id, bucket: self.buckets[current].name.clone() });
    }

    log::debug!("Assigned hunk {id} to {name}");
    self.assigned.insert(id, slot);
    self.buckets[slot].entries.push(id);
    Ok(())
  }

  pub fn is_assigned(&self, id: HunkId) -> bool {
    self.assigned.contains_key(&id)
  }

  pub fn assigned_count(&self) -> usize {
    self.assigned.len()
  }

  /// Buckets in creation order.
  pub fn buckets(&self) -> &[Bucket] {
    &self.buckets
  }

  pub fn bucket(&self, name: &str) -> Option<&Bucket> {
    self.by_name.get(name).map(|&slot| &self.buckets[slot])
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn test_create_bucket_twice() {
    let mut store = AssignmentStore::new();
    assert!(store.create_bucket("x"));
    assert!(!store.create_bucket("x"));
    assert_eq!(store.buckets().len(), 1);
  }

  #[test]
  fn test_empty_name_is_rejected() {
    let mut store = AssignmentStore::new();
    assert!(!store.create_bucket(""));
    assert!(store.buckets().is_empty());
  }

  #[test]
  fn test_assign_to_unknown_bucket() {
    let mut store = AssignmentStore::new();
    assert_eq!(store.assign(HunkId(0), "nope"), Err(AssignError::UnknownBucket("nope".into())));
    assert!(!store.is_assigned(HunkId(0)));
    assert_eq!(store.assigned_count(), 0);
  }

  #[test]
  fn test_assign_records_order() {
    let mut store = AssignmentStore::new();
    store.create_bucket("feat");
    store.assign(HunkId(2), "feat").unwrap();
    store.assign(HunkId(0), "feat").unwrap();

    assert_eq!(store.bucket("feat").unwrap().entries(), &[HunkId(2), HunkId(0)]);
    assert!(store.is_assigned(HunkId(0)));
    assert!(!store.is_assigned(HunkId(1)));
  }

  #[test]
  fn test_reassignment_is_refused() {
    let mut store = AssignmentStore::new();
    store.create_bucket("feat");
    store.create_bucket("fix");
    store.assign(HunkId(0), "feat").unwrap();

    let error = store.assign(HunkId(0), "fix").unwrap_err();
    assert_eq!(error, AssignError::AlreadyAssigned { id: HunkId(0), bucket: "feat".into() });
    assert!(store.bucket("fix").unwrap().is_empty());
  }

  #[test]
  fn test_assigned_set_matches_bucket_entries() {
    let mut store = AssignmentStore::new();
    store.create_bucket("a");
    store.create_bucket("b");
    for (index, bucket) in [(0, "a"), (1, "b"), (2, "a"), (1, "a"), (3, "b")] {
      let _ = store.assign(HunkId(index), bucket);
    }

    let listed = store.buckets().iter().flat_map(|b| b.entries().iter().copied()).collect::<Vec<_>>();
    let unique = listed.iter().copied().collect::<HashSet<_>>();
    assert_eq!(listed.len(), unique.len());
    assert_eq!(unique.len(), store.assigned_count());
    assert!(unique.iter().all(|id| store.is_assigned(*id)));
  }
}
