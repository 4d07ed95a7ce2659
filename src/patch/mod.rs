//! Diff model: unified diff text parsed into files and hunks.
//!
//! Hunks keep their literal text so they can be written back out unchanged.

pub mod parser;
pub mod traits;

pub use parser::{parse_patch, Hunk, Patch, PatchError, PatchedFile};
pub use traits::FilePath;
