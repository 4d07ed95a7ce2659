//! The interactive triage loop.
//!
//! A session presents the hunk under the cursor, reads one command and either
//! stays, moves, assigns or finishes. All session state lives on [`Session`].

use std::path::PathBuf;

use anyhow::Result as AnyResult;

use crate::error::SessionError;
use crate::index::{Entry, HunkIndex};
use crate::navigator::{Direction, Motion, Navigator};
use crate::store::AssignmentStore;
use crate::style::Highlighter;
use crate::terminal::Terminal;
use crate::writer::{diff_header, SaveSummary, Writer};

pub type Result<T, E = SessionError> = std::result::Result<T, E>;

const COMMAND_HELP: &str = "?,!BUCKET,BUCKET,p,n,q,l";
const SAVE_PROMPT: &str = "We're done. Save? [yn] ";

/// Tells whether a bucket name already has output waiting on disk.
pub type OutputCheck = Box<dyn Fn(&str) -> bool>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Saved(SaveSummary),
  Discarded
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
  ListBuckets,
  CreateBucket(&'a str),
  Redraw,
  Next,
  Previous,
  Quit,
  Assign(&'a str)
}

impl<'a> Command<'a> {
  pub fn parse(input: &'a str) -> Self {
    match input {
      "?" => Command::ListBuckets,
      "l" => Command::Redraw,
      "n" => Command::Next,
      "p" => Command::Previous,
      "q" => Command::Quit,
      _ => match input.strip_prefix('!') {
        Some(name) => Command::CreateBucket(name),
        None => Command::Assign(input)
      }
    }
  }

  /// What an empty line repeats next time. `!name` repeats as plain `name`.
  fn repeatable(&self, input: &'a str) -> &'a str {
    match self {
      Command::CreateBucket(name) => *name,
      _ => input
    }
  }
}

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
  /// Present the hunk under the cursor again.
  Present,
  /// Keep the current screen and ask for another command.
  Reprompt,
  Finish
}

pub struct Options {
  pub writer:      Writer,
  pub residual:    PathBuf,
  pub paging:      bool,
  pub highlighter: Highlighter
}

pub struct Session<T: Terminal> {
  index:        HunkIndex,
  store:        AssignmentStore,
  navigator:    Navigator,
  last_command: Option<String>,
  terminal:     T,
  options:      Options,
  has_output:   OutputCheck
}

impl<T: Terminal> Session<T> {
  pub fn new(index: HunkIndex, terminal: T, options: Options) -> Self {
    let writer = options.writer.clone();
    let has_output: OutputCheck = Box::new(move |name: &str| writer.has_pending_output(name));

    Self {
      navigator: Navigator::new(index.total()),
      store: AssignmentStore::new(),
      last_command: None,
      index,
      terminal,
      options,
      has_output
    }
  }

  /// Replaces the on-disk check used to discover existing bucket files.
  pub fn with_output_check(mut self, check: impl Fn(&str) -> bool + 'static) -> Self {
    self.has_output = Box::new(check);
    self
  }

  pub fn index(&self) -> &HunkIndex {
    &self.index
  }

  pub fn store(&self) -> &AssignmentStore {
    &self.store
  }

  pub fn navigator(&self) -> &Navigator {
    &self.navigator
  }

  pub fn terminal(&self) -> &T {
    &self.terminal
  }

  pub fn run(&mut self) -> Result<Outcome> {
    log::info!("Triaging {} hunks in {} files", self.index.total(), self.index.file_count());

    if self.index.is_empty() {
      return self.finish();
    }

    let mut flow = Flow::Present;
    loop {
      flow = match flow {
        Flow::Present => {
          self.present(false)?;
          self.handle_command()?
        },
        Flow::Reprompt => self.handle_command()?,
        Flow::Finish => return self.finish()
      };
    }
  }

  fn current(&self) -> Result<Entry<'_>> {
    self.index.resolve(self.navigator.target())
  }

  /// Renders the current hunk, through the pager when forced or too tall.
  fn present(&mut self, force_pager: bool) -> Result<()> {
    let entry = self.current()?;
    let plain = format!("{}{}", diff_header(entry.path), entry.hunk);
    let rendered = self.options.highlighter.render(&plain);
    let status = format!(
      "({}/{}) Patched file: {} ({} hunks)",
      entry.file_index + 1,
      self.index.file_count(),
      entry.path,
      entry.file_hunks
    );

    let too_tall = plain.matches('\n').count() + 1 > self.terminal.height();
    if force_pager || (self.options.paging && too_tall) {
      self.terminal.page(&rendered)?;
    }

    self.terminal.display(&rendered)?;
    self.terminal.status(&status)?;
    Ok(())
  }

  fn prompt_message(&self) -> Result<String> {
    let entry = self.current()?;
    let mut message = format!(
      "#({}/{}) ({}/{}) Target bucket [{COMMAND_HELP}]",
      self.navigator.target() + 1,
      self.index.total(),
      entry.hunk_index + 1,
      entry.file_hunks
    );
    if let Some(last) = self.last_command.as_deref() {
      message.push_str(&format!(" (last command: {last})"));
    }
    message.push_str(": ");
    Ok(message)
  }

  fn handle_command(&mut self) -> Result<Flow> {
    let message = self.prompt_message()?;
    let mut input = self.terminal.prompt(&message)?;

    if input.is_empty() {
      match self.last_command.clone() {
        Some(last) => input = last,
        None => return Ok(Flow::Reprompt)
      }
    }

    let command = Command::parse(&input);
    log::debug!("Command {command:?} on hunk {}", self.navigator.target() + 1);
    self.last_command = Some(command.repeatable(&input).to_string());
    self.dispatch(command)
  }

  fn dispatch(&mut self, command: Command<'_>) -> Result<Flow> {
    match command {
      Command::ListBuckets => {
        for bucket in self.store.buckets() {
          self.terminal.print(&format!("  {}", bucket.name()))?;
        }
        Ok(Flow::Reprompt)
      },
      Command::Redraw => {
        self.present(true)?;
        Ok(Flow::Reprompt)
      },
      Command::Next => self.navigate(Direction::Forward),
      Command::Previous => self.navigate(Direction::Backward),
      Command::Quit => Ok(Flow::Finish),
      Command::CreateBucket(name) => {
        if !self.store.create_bucket(name) {
          self.acknowledge(&format!("Cannot create bucket \"{name}\"! "))?;
          return Ok(Flow::Present);
        }
        self.assign_current(name)
      },
      Command::Assign(name) => self.assign_current(name)
    }
  }

  fn assign_current(&mut self, name: &str) -> Result<Flow> {
    if !self.store.has_bucket(name) {
      if !(self.has_output)(name) {
        self.acknowledge(&format!("Bucket \"{name}\" does not exist! "))?;
        return Ok(Flow::Present);
      }

      self.acknowledge(&format!("{name}.patch exists, appending there. "))?;
      self.store.create_bucket(name);
    }

    let id = self.index.id(self.navigator.target())?;
    if let Err(err) = self.store.assign(id, name) {
      self.acknowledge(&format!("{err} "))?;
      return Ok(Flow::Present);
    }

    self.navigate(Direction::Forward)
  }

  fn navigate(&mut self, direction: Direction) -> Result<Flow> {
    let motion = self.navigator.step(direction, false, &self.store);
    self.settle(motion)
  }

  fn settle(&mut self, motion: Motion) -> Result<Flow> {
    match motion {
      Motion::Landed => Ok(Flow::Present),
      Motion::Complete => Ok(Flow::Finish),
      Motion::Boundary(edge) => {
        self.acknowledge(edge.message())?;
        let motion = self.navigator.rebound(edge, &self.store);
        self.settle(motion)
      }
    }
  }

  /// Blocks on a prompt whose answer doesn't matter. Cancellation still aborts.
  fn acknowledge(&mut self, message: &str) -> Result<()> {
    self.terminal.prompt(message).map(drop)
  }

  /// Only an exact `y` or `n` answers the save question.
  fn finish(&mut self) -> Result<Outcome> {
    loop {
      match self.terminal.prompt(SAVE_PROMPT)?.as_str() {
        "y" => return Ok(Outcome::Saved(self.save()?)),
        "n" => {
          log::info!("Leaving without saving");
          return Ok(Outcome::Discarded);
        },
        _ => continue
      }
    }
  }

  fn save(&self) -> AnyResult<SaveSummary> {
    self.options.writer.save_patches(&self.index, &self.store, &self.options.residual)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_commands() {
    assert_eq!(Command::parse("?"), Command::ListBuckets);
    assert_eq!(Command::parse("l"), Command::Redraw);
    assert_eq!(Command::parse("n"), Command::Next);
    assert_eq!(Command::parse("p"), Command::Previous);
    assert_eq!(Command::parse("q"), Command::Quit);
    assert_eq!(Command::parse("!feat"), Command::CreateBucket("feat"));
    assert_eq!(Command::parse("!"), Command::CreateBucket(""));
    assert_eq!(Command::parse("fix"), Command::Assign("fix"));
    assert_eq!(Command::parse("next"), Command::Assign("next"));
  }

  #[test]
  fn test_create_repeats_as_assign() {
    let command = Command::parse("!feat");
    assert_eq!(command.repeatable("!feat"), "feat");
    assert_eq!(Command::parse("n").repeatable("n"), "n");
  }
}
