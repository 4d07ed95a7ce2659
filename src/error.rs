//! Session error types.
//!
//! Command mistakes (unknown bucket, duplicate bucket) never show up here: the
//! session answers those with a warning and keeps the cursor where it was.
//! What remains is either the user walking away or a broken index invariant.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
  /// Interrupt or end of input at a prompt. Nothing is saved.
  #[error("Exiting without saving")]
  Cancelled,

  #[error("Hunk index {index} is out of range ({total} hunks)")]
  OutOfRange { index: usize, total: usize },

  #[error(transparent)]
  Anyhow(#[from] anyhow::Error)
}

impl SessionError {
  pub fn is_cancelled(&self) -> bool {
    matches!(self, SessionError::Cancelled)
  }
}

#[cfg(test)]
mod tests {
  use anyhow::anyhow;

  use super::*;

  #[test]
  fn test_cancelled_message() {
    assert_eq!(SessionError::Cancelled.to_string(), "Exiting without saving");
    assert!(SessionError::Cancelled.is_cancelled());
  }

  #[test]
  fn test_out_of_range_message() {
    let error = SessionError::OutOfRange { index: 3, total: 3 };
    assert_eq!(error.to_string(), "Hunk index 3 is out of range (3 hunks)");
    assert!(!error.is_cancelled());
  }

  #[test]
  fn test_wraps_anyhow() {
    let error: SessionError = anyhow!("disk full").into();
    assert_eq!(error.to_string(), "disk full");
  }
}
