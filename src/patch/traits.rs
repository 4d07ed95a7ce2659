//! Utility traits for reading and writing patch files.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Extension trait for PathBuf to support the file operations a save needs
pub trait FilePath {
  fn is_empty(&self) -> Result<bool> {
    self.read().map(|s| s.is_empty())
  }

  /// Replaces the file contents.
  fn write(&self, contents: &str) -> Result<()>;

  /// Appends to the file, creating it when missing.
  fn append(&self, contents: &str) -> Result<()>;

  fn read(&self) -> Result<String>;
}

impl FilePath for PathBuf {
  fn write(&self, contents: &str) -> Result<()> {
    File::create(self)
      .with_context(|| format!("Failed to create {}", self.display()))?
      .write_all(contents.as_bytes())
      .with_context(|| format!("Failed to write {}", self.display()))
  }

  fn append(&self, contents: &str) -> Result<()> {
    OpenOptions::new()
      .create(true)
      .append(true)
      .open(self)
      .with_context(|| format!("Failed to open {} for appending", self.display()))?
      .write_all(contents.as_bytes())
      .with_context(|| format!("Failed to append to {}", self.display()))
  }

  fn read(&self) -> Result<String> {
    let mut contents = String::new();
    File::open(self)
      .with_context(|| format!("Failed to open {}", self.display()))?
      .read_to_string(&mut contents)
      .with_context(|| format!("Failed to read {}", self.display()))?;
    Ok(contents)
  }
}
