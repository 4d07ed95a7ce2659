pub mod config;
pub mod error;
pub mod index;
pub mod navigator;
pub mod patch;
pub mod session;
pub mod store;
pub mod style;
pub mod terminal;
pub mod writer;

// Re-exports
pub use error::SessionError;
pub use index::{HunkId, HunkIndex};
pub use patch::{parse_patch, Patch};
pub use session::{Options, Outcome, Session};
pub use store::AssignmentStore;
pub use writer::Writer;
