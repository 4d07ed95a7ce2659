//! Terminal capability used by the session.
//!
//! The session only talks to [`Terminal`], so it runs headless in tests with a
//! scripted double. [`ConsoleTerminal`] is the real thing: line prompts on
//! stdin, `console` for the screen, an external pager for long hunks.

use std::io::{self, BufRead, Write};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use colored::Colorize;
use console::Term;

use crate::error::SessionError;

static PAGER_ACTIVE: AtomicBool = AtomicBool::new(false);
static EXITING: AtomicBool = AtomicBool::new(false);

/// True while an external pager owns the terminal. Interrupts belong to it then.
pub fn pager_active() -> bool {
  PAGER_ACTIVE.load(Ordering::SeqCst)
}

/// Returns true for the first caller only. Whoever wins prints the farewell and exits.
pub fn claim_exit() -> bool {
  !EXITING.swap(true, Ordering::SeqCst)
}

/// Reads one answer. Zero bytes read means the input is gone.
pub fn read_answer<R: BufRead>(reader: &mut R) -> Result<String, SessionError> {
  let mut line = String::new();
  match reader.read_line(&mut line) {
    Ok(0) => Err(SessionError::Cancelled),
    Ok(_) => {
      if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
          line.pop();
        }
      }
      Ok(line)
    },
    Err(err) => Err(anyhow::Error::new(err).context("Failed to read answer").into())
  }
}

pub trait Terminal {
  /// Reads one line. End of input is [`SessionError::Cancelled`].
  fn prompt(&mut self, message: &str) -> Result<String, SessionError>;

  /// Visible rows.
  fn height(&self) -> usize;

  /// Clears the screen and prints `text`.
  fn display(&mut self, text: &str) -> Result<()>;

  /// Shows `text` in a full-screen pager and blocks until it is closed.
  fn page(&mut self, text: &str) -> Result<()>;

  /// A highlighted one-line notice.
  fn status(&mut self, message: &str) -> Result<()>;

  fn print(&mut self, line: &str) -> Result<()>;
}

pub struct ConsoleTerminal {
  term:  Term,
  pager: String
}

impl ConsoleTerminal {
  pub fn new(pager: &str) -> Self {
    Self { term: Term::stdout(), pager: pager.to_string() }
  }
}

impl Terminal for ConsoleTerminal {
  fn prompt(&mut self, message: &str) -> Result<String, SessionError> {
    self.term.write_str(&message.blue().to_string()).context("Failed to write prompt")?;
    self.term.flush().context("Failed to write prompt")?;

    let answer = read_answer(&mut io::stdin().lock());
    if let Err(SessionError::Cancelled) = answer {
      log::debug!("Input closed at prompt");
    }
    answer
  }

  fn height(&self) -> usize {
    self.term.size().0 as usize
  }

  fn display(&mut self, text: &str) -> Result<()> {
    if self.term.is_term() {
      self.term.clear_screen()?;
    }
    self.term.write_line(text.trim_end_matches('\n'))?;
    Ok(())
  }

  fn page(&mut self, text: &str) -> Result<()> {
    let mut parts = self.pager.split_whitespace();
    let program = parts.next().context("Pager command is empty")?;

    let mut file = tempfile::Builder::new()
      .suffix(".patch")
      .tempfile()
      .context("Failed to create pager file")?;
    file.write_all(text.as_bytes())?;
    file.flush()?;

    log::debug!("Paging {} lines through {}", text.lines().count(), self.pager);
    PAGER_ACTIVE.store(true, Ordering::SeqCst);
    let status = Command::new(program).args(parts).arg(file.path()).status();
    PAGER_ACTIVE.store(false, Ordering::SeqCst);

    let status = status.with_context(|| format!("Failed to run pager {}", self.pager))?;
    if !status.success() {
      log::warn!("Pager exited with {status}");
    }
    Ok(())
  }

  fn status(&mut self, message: &str) -> Result<()> {
    self.term.write_line(&message.red().to_string())?;
    Ok(())
  }

  fn print(&mut self, line: &str) -> Result<()> {
    self.term.write_line(line)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::io::{Cursor, ErrorKind, Read};

  use super::*;

  struct Broken;

  impl Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
      Err(io::Error::new(ErrorKind::PermissionDenied, "nope"))
    }
  }

  #[test]
  fn test_end_of_input_cancels() {
    let answer = read_answer(&mut Cursor::new(""));
    assert!(matches!(answer, Err(SessionError::Cancelled)));
  }

  #[test]
  fn test_read_error_is_not_a_cancel() {
    let answer = read_answer(&mut io::BufReader::new(Broken));
    assert!(matches!(answer, Err(SessionError::Anyhow(_))));
  }

  #[test]
  fn test_answer_drops_line_ending_only() {
    let mut input = Cursor::new("y\n y\r\n\nlast");
    assert_eq!(read_answer(&mut input).unwrap(), "y");
    assert_eq!(read_answer(&mut input).unwrap(), " y");
    assert_eq!(read_answer(&mut input).unwrap(), "");
    assert_eq!(read_answer(&mut input).unwrap(), "last");
    assert!(matches!(read_answer(&mut input), Err(SessionError::Cancelled)));
  }

  #[test]
  fn test_exit_is_claimed_once() {
    assert!(claim_exit());
    assert!(!claim_exit());
  }
}
