use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Term;
use split_patch::config::App;
use split_patch::patch::FilePath;
use split_patch::style::Highlighter;
use split_patch::terminal::{self, ConsoleTerminal};
use split_patch::{parse_patch, HunkIndex, Options, Outcome, Session, SessionError, Writer};

/// Organize patch in buckets.
#[derive(Parser, Debug)]
#[command(name = "split-patch", version, about)]
struct Cli {
  /// Input patch, rewritten in place with the hunks left unassigned
  #[arg(value_name = "PATCH")]
  patch: PathBuf,

  /// Print long hunks directly instead of paging them
  #[arg(long, alias = "no-less")]
  no_pager: bool
}

/// Both the interrupt handler and the main thread end up here; the first one exits.
fn abort() -> ! {
  if !terminal::claim_exit() {
    loop {
      std::thread::park();
    }
  }
  println!();
  println!("Exiting without saving");
  process::exit(1);
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  ctrlc::set_handler(|| {
    if !terminal::pager_active() {
      abort();
    }
  })
  .context("Failed to install interrupt handler")?;

  let app = App::new()?;
  log::debug!("Loaded config: {app:?}");

  let text = cli.patch.read()?;
  let patch = parse_patch(&text).with_context(|| format!("Failed to parse {}", cli.patch.display()))?;

  let color = app.color_enabled(Term::stdout().is_term());
  if !color {
    colored::control::set_override(false);
  }
  let highlighter = match color {
    true => Highlighter::new(&app.theme)?,
    false => Highlighter::plain()
  };

  let options = Options {
    writer: Writer::new(&app.output_dir),
    residual: cli.patch.clone(),
    paging: app.paging(cli.no_pager),
    highlighter
  };

  let mut session = Session::new(HunkIndex::new(patch), ConsoleTerminal::new(&app.pager), options);

  match session.run() {
    Ok(Outcome::Saved(summary)) => {
      for (path, count) in &summary.buckets {
        println!("{} {} ({} hunks)", "Wrote".green(), path.display(), count);
      }
      let (path, count) = &summary.residual;
      println!("{} {} hunks left in {}", "Kept".yellow(), count, path.display());
      Ok(())
    },
    Ok(Outcome::Discarded) => Ok(()),
    Err(SessionError::Cancelled) => abort(),
    Err(err) => Err(err.into())
  }
}
