use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, FileFormat};
use serde::{Deserialize, Serialize};

// Constants
const DEFAULT_PAGER: &str = "less -R";
const DEFAULT_THEME: &str = "base16-ocean.dark";
const DEFAULT_OUTPUT_DIR: &str = ".";
const ENV_PREFIX: &str = "SPLIT_PATCH";

#[derive(Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct App {
  pub pager:      String,
  pub no_pager:   bool,
  pub theme:      String,
  pub color:      bool,
  pub output_dir: PathBuf
}

#[derive(Debug)]
pub struct ConfigPaths {
  pub dir:  PathBuf,
  pub file: PathBuf
}

impl ConfigPaths {
  pub fn new() -> Option<Self> {
    let dir = home::home_dir()?.join(".config/split-patch");
    let file = dir.join("config.ini");
    Some(Self { dir, file })
  }
}

impl App {
  /// Defaults, then `~/.config/split-patch/config.ini`, then `SPLIT_PATCH_*` variables.
  pub fn new() -> Result<Self> {
    let paths = ConfigPaths::new();
    Self::load(paths.as_ref().map(|p| p.file.as_path()))
  }

  pub fn load(file: Option<&Path>) -> Result<Self> {
    let mut builder = Config::builder()
      .set_default("pager", DEFAULT_PAGER)?
      .set_default("no_pager", false)?
      .set_default("theme", DEFAULT_THEME)?
      .set_default("color", true)?
      .set_default("output_dir", DEFAULT_OUTPUT_DIR)?;

    if let Some(file) = file {
      log::debug!("Reading config from {}", file.display());
      builder = builder.add_source(config::File::from(file).format(FileFormat::Ini).required(false));
    }

    builder
      .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
      .build()?
      .try_deserialize()
      .context("Failed to deserialize config")
  }

  /// Color needs both the config switch and a terminal on stdout.
  pub fn color_enabled(&self, stdout_is_term: bool) -> bool {
    self.color && stdout_is_term
  }

  /// Paging is engaged unless the flag or the config turns it off.
  pub fn paging(&self, no_pager_flag: bool) -> bool {
    !(no_pager_flag || self.no_pager)
  }
}
