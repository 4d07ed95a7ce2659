//! Display-only styling of hunks. Nothing produced here reaches an output file.

use anyhow::{Context, Result};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const RESET: &str = "\x1b[0m";

/// Cached syntax highlighting state, loaded once per session.
pub struct Highlighter {
  syntax_set: SyntaxSet,
  theme:      Option<Theme>
}

impl Highlighter {
  pub fn new(theme_name: &str) -> Result<Self> {
    let mut themes = ThemeSet::load_defaults();
    let theme = themes
      .themes
      .remove(theme_name)
      .with_context(|| format!("Unknown theme {theme_name}"))?;

    Ok(Self { syntax_set: SyntaxSet::load_defaults_newlines(), theme: Some(theme) })
  }

  /// Passes text through untouched.
  pub fn plain() -> Self {
    Self { syntax_set: SyntaxSet::new(), theme: None }
  }

  pub fn render(&self, text: &str) -> String {
    let Some(theme) = self.theme.as_ref() else {
      return text.to_string();
    };

    let syntax = self
      .syntax_set
      .find_syntax_by_extension("diff")
      .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut out = String::with_capacity(text.len() * 2);
    for line in LinesWithEndings::from(text) {
      match highlighter.highlight_line(line, &self.syntax_set) {
        Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
        Err(err) => {
          log::debug!("Highlighting failed, falling back to plain text: {err}");
          return text.to_string();
        }
      }
    }
    out.push_str(RESET);
    out
  }
}
