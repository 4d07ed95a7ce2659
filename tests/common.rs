#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::Result;
use split_patch::style::Highlighter;
use split_patch::terminal::Terminal;
use split_patch::{parse_patch, HunkIndex, Options, Session, SessionError, Writer};
use tempfile::TempDir;

/// Two files: a.rs with two hunks, b.rs with one.
pub const THREE_HUNKS: &str = "\
diff --git a/a.rs b/a.rs
index 1111111..2222222 100644
--- a/a.rs
+++ b/a.rs
@@ -1,2 +1,2 @@
-fn a1() {}
+fn a1() -> u8 { 1 }
 // a
@@ -20,2 +20,2 @@
 // a
-fn a2() {}
+fn a2() -> u8 { 2 }
diff --git a/b.rs b/b.rs
index 3333333..4444444 100644
--- a/b.rs
+++ b/b.rs
@@ -1 +1 @@
-fn b1() {}
+fn b1() -> u8 { 3 }
";

pub const A1: &str = "@@ -1,2 +1,2 @@\n-fn a1() {}\n+fn a1() -> u8 { 1 }\n // a\n";
pub const A2: &str = "@@ -20,2 +20,2 @@\n // a\n-fn a2() {}\n+fn a2() -> u8 { 2 }\n";
pub const B1: &str = "@@ -1 +1 @@\n-fn b1() {}\n+fn b1() -> u8 { 3 }\n";

pub fn header(path: &str) -> String {
  format!("--- a/{path}\n+++ a/{path}\n")
}

/// Replays canned answers and records everything the session shows.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
  pub answers:  VecDeque<String>,
  pub prompts:  Vec<String>,
  pub screens:  Vec<String>,
  pub paged:    Vec<String>,
  pub statuses: Vec<String>,
  pub printed:  Vec<String>,
  pub height:   usize
}

impl ScriptedTerminal {
  pub fn new(answers: &[&str]) -> Self {
    Self {
      answers: answers.iter().map(|a| a.to_string()).collect(),
      height: 50,
      ..Default::default()
    }
  }

  pub fn with_height(mut self, height: usize) -> Self {
    self.height = height;
    self
  }
}

impl Terminal for ScriptedTerminal {
  fn prompt(&mut self, message: &str) -> Result<String, SessionError> {
    self.prompts.push(message.to_string());
    // running out of answers behaves like end of input
    self.answers.pop_front().ok_or(SessionError::Cancelled)
  }

  fn height(&self) -> usize {
    self.height
  }

  fn display(&mut self, text: &str) -> Result<()> {
    self.screens.push(text.to_string());
    Ok(())
  }

  fn page(&mut self, text: &str) -> Result<()> {
    self.paged.push(text.to_string());
    Ok(())
  }

  fn status(&mut self, message: &str) -> Result<()> {
    self.statuses.push(message.to_string());
    Ok(())
  }

  fn print(&mut self, line: &str) -> Result<()> {
    self.printed.push(line.to_string());
    Ok(())
  }
}

/// A patch file on disk plus a session over it writing buckets next to it.
pub struct Fixture {
  pub dir:   TempDir,
  pub patch: PathBuf
}

impl Fixture {
  pub fn new(diff: &str) -> Self {
    let dir = TempDir::new().unwrap();
    let patch = dir.path().join("input.patch");
    std::fs::write(&patch, diff).unwrap();
    Self { dir, patch }
  }

  pub fn bucket(&self, name: &str) -> PathBuf {
    self.dir.path().join(format!("{name}.patch"))
  }

  pub fn read(&self, path: &PathBuf) -> String {
    std::fs::read_to_string(path).unwrap()
  }

  pub fn session(&self, terminal: ScriptedTerminal) -> Session<ScriptedTerminal> {
    self.session_with_paging(terminal, true)
  }

  pub fn session_with_paging(&self, terminal: ScriptedTerminal, paging: bool) -> Session<ScriptedTerminal> {
    let text = std::fs::read_to_string(&self.patch).unwrap();
    let index = HunkIndex::new(parse_patch(&text).unwrap());
    let options = Options {
      writer: Writer::new(self.dir.path()),
      residual: self.patch.clone(),
      paging,
      highlighter: Highlighter::plain()
    };
    Session::new(index, terminal, options)
  }
}
