//! Unified diff parsing into files and hunks.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatchError {
  #[error("Malformed hunk header at line {line}: {header}")]
  MalformedHeader { line: usize, header: String },

  #[error("Hunk at line {line} appears before any file header")]
  OrphanHunk { line: usize },

  #[error("Hunk \"{header}\" ends early at line {line}")]
  TruncatedHunk { line: usize, header: String },

  #[error("Hunk \"{header}\" has more lines than its header counts, extra line {line}")]
  OverlongHunk { line: usize, header: String }
}

/// A single hunk: its `@@` header line plus the body lines exactly as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
  header:     String,
  lines:      Vec<String>,
  source_len: usize,
  target_len: usize
}

impl Hunk {
  pub fn header(&self) -> &str {
    &self.header
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// Literal text of the hunk, newline terminated. This is what lands in output files.
  pub fn text(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for Hunk {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", self.header)?;
    for line in &self.lines {
      writeln!(f, "{line}")?;
    }
    Ok(())
  }
}

/// All hunks touching one path, in the order they appear in the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedFile {
  pub path:  String,
  pub hunks: Vec<Hunk>
}

impl PatchedFile {
  pub fn len(&self) -> usize {
    self.hunks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.hunks.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Hunk> {
    self.hunks.iter()
  }
}

/// A parsed patch: file sections in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
  files: Vec<PatchedFile>
}

impl Patch {
  pub fn new(files: Vec<PatchedFile>) -> Self {
    Self { files }
  }

  pub fn files(&self) -> &[PatchedFile] {
    &self.files
  }

  pub fn iter(&self) -> std::slice::Iter<'_, PatchedFile> {
    self.files.iter()
  }

  pub fn total_hunks(&self) -> usize {
    self.files.iter().map(PatchedFile::len).sum()
  }
}

impl<'a> IntoIterator for &'a Patch {
  type Item = &'a PatchedFile;
  type IntoIter = std::slice::Iter<'a, PatchedFile>;

  fn into_iter(self) -> Self::IntoIter {
    self.files.iter()
  }
}

/// Strips a single git-style `a/`, `b/`, `c/`, `i/`, `o/` or `w/` prefix.
fn strip_git_prefix(path: &str) -> &str {
  let bytes = path.as_bytes();
  if bytes.len() > 2 && bytes[1] == b'/' && b"abciow".contains(&bytes[0]) {
    &path[2..]
  } else {
    path
  }
}

/// Path part of a `---`/`+++` line, dropping any tab-separated timestamp.
fn header_path(rest: &str) -> &str {
  rest.split('\t').next().unwrap_or(rest).trim_end()
}

fn is_dev_null(path: &str) -> bool {
  path == "/dev/null"
}

/// Looks like hunk content. `-- ` alone is the mail signature `git format-patch` appends.
fn is_body_line(line: &str) -> bool {
  matches!(line.as_bytes().first(), Some(b'+' | b'-' | b' ')) && line != "-- "
}

/// Path from a `diff --git a/x b/x` line, used until `---`/`+++` lines refine it.
fn path_from_git_line(line: &str) -> Option<String> {
  let parts: Vec<&str> = line.split_whitespace().collect();
  if parts.len() < 4 {
    return None;
  }

  Some(strip_git_prefix(parts[3]).to_string())
}

/// Parse "start,count" or just "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(usize, usize)> {
  match s.split_once(',') {
    Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
    None => Some((s.parse().ok()?, 1))
  }
}

/// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()".
fn parse_hunk_header(line: &str) -> Option<Hunk> {
  let rest = line.strip_prefix("@@ ")?;
  let end = rest.find(" @@")?;
  let mut ranges = rest[..end].split_whitespace();

  let (_, source_len) = parse_range(ranges.next()?.strip_prefix('-')?)?;
  let (_, target_len) = parse_range(ranges.next()?.strip_prefix('+')?)?;

  Some(Hunk { header: line.to_string(), lines: Vec::new(), source_len, target_len })
}

/// Hunk under construction together with the line counts it still expects.
struct OpenHunk {
  hunk:        Hunk,
  source_left: usize,
  target_left: usize,
  header_line: usize
}

impl OpenHunk {
  fn is_full(&self) -> bool {
    self.source_left == 0 && self.target_left == 0
  }

  /// Accepts one body line; returns false when the line can't belong to this hunk.
  fn push(&mut self, line: &str) -> bool {
    match line.as_bytes().first() {
      Some(b'+') if self.target_left > 0 => self.target_left -= 1,
      Some(b'-') if self.source_left > 0 => self.source_left -= 1,
      Some(b' ') | None if self.source_left > 0 && self.target_left > 0 => {
        self.source_left -= 1;
        self.target_left -= 1;
      },
      Some(b'\\') => {},
      _ => return false
    }

    self.hunk.lines.push(line.to_string());
    true
  }
}

#[derive(Default)]
struct Builder {
  files:   Vec<PatchedFile>,
  current: Option<PatchedFile>,
  source:  Option<String>,
  open:    Option<OpenHunk>
}

impl Builder {
  fn close_hunk(&mut self) {
    if let Some(open) = self.open.take() {
      if let Some(file) = self.current.as_mut() {
        file.hunks.push(open.hunk);
      }
    }
  }

  fn close_file(&mut self) {
    self.close_hunk();
    if let Some(file) = self.current.take() {
      log::debug!("Parsed {} ({} hunks)", file.path, file.hunks.len());
      self.files.push(file);
    }
  }

  fn start_file(&mut self, path: String) {
    self.close_file();
    self.current = Some(PatchedFile { path, hunks: Vec::new() });
  }
}

/// Parse a unified diff into a [`Patch`].
///
/// Accepts both `git diff` output and plain `diff -u` output. Lines outside of
/// hunks that aren't file headers (index lines, modes, commit preambles) are
/// skipped. Body lines right after a hunk whose counts are used up are an error,
/// as is a hunk that ends before its counts are.
pub fn parse_patch(text: &str) -> Result<Patch, PatchError> {
  let mut builder = Builder::default();

  for (number, raw) in text.split_inclusive('\n').enumerate() {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    let number = number + 1;
    let mut closed = None;

    if let Some(open) = builder.open.as_mut() {
      if !open.is_full() {
        if !open.push(line) {
          return Err(PatchError::TruncatedHunk { line: number, header: open.hunk.header.clone() });
        }
        continue;
      }

      // "\ No newline at end of file" trails the last body line
      if line.starts_with('\\') {
        open.push(line);
        continue;
      }

      closed = Some(open.hunk.header.clone());
      builder.close_hunk();
    }

    if line.starts_with("diff --git ") {
      let path = path_from_git_line(line).unwrap_or_default();
      builder.start_file(path);
      builder.source = None;
    } else if let Some(rest) = line.strip_prefix("--- ") {
      builder.source = Some(header_path(rest).to_string());
    } else if let Some(rest) = line.strip_prefix("+++ ") {
      let target = header_path(rest);
      let source = builder.source.take().unwrap_or_default();
      let path = match is_dev_null(target) {
        true => strip_git_prefix(&source).to_string(),
        false => strip_git_prefix(target).to_string()
      };

      match builder.current.as_mut() {
        // "diff --git" already opened this section
        Some(file) if file.hunks.is_empty() => file.path = path,
        _ => builder.start_file(path)
      }
    } else if line.starts_with("@@") {
      if builder.current.is_none() {
        return Err(PatchError::OrphanHunk { line: number });
      }

      let hunk = parse_hunk_header(line).ok_or_else(|| PatchError::MalformedHeader { line: number, header: line.to_string() })?;
      builder.open = Some(OpenHunk {
        source_left: hunk.source_len,
        target_left: hunk.target_len,
        header_line: number,
        hunk
      });
    } else if let Some(header) = closed.filter(|_| is_body_line(line)) {
      return Err(PatchError::OverlongHunk { line: number, header });
    } else {
      log::trace!("Skipping line {number}: {line}");
    }
  }

  if let Some(open) = builder.open.as_ref() {
    if !open.is_full() {
      log::debug!("Hunk opened at line {} is incomplete", open.header_line);
      return Err(PatchError::TruncatedHunk {
        line:   text.lines().count() + 1,
        header: open.hunk.header.clone()
      });
    }
  }

  builder.close_file();

  let patch = Patch::new(builder.files);
  log::debug!("Parsed {} files with {} hunks", patch.files().len(), patch.total_hunks());
  Ok(patch)
}
