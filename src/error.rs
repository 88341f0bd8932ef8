//! Error taxonomy for the storage engine.
//!
//! Driver IO and corruption errors propagate and abort the current
//! operation. Not-found and duplicate conditions are reported through
//! [`ActionState`] instead of `Result`, per the engine's failure semantics.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("duplicate: {0}")]
  Duplicate(String),

  #[error("out of range: {0}")]
  OutOfRange(String),

  #[error("io error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("corruption: {0}")]
  Corruption(String),

  #[error("busy: {0}")]
  Busy(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io { path: path.into(), source }
  }
}

/// Outcome of a public mutation call.
///
/// Not-found / duplicate preconditions never propagate as `Err` — they
/// collapse into `Invalid` plus a warning on the configured log sink,
/// leaving both the log and the mapped state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
  Valid,
  Invalid,
}

impl ActionState {
  pub fn is_valid(self) -> bool {
    matches!(self, ActionState::Valid)
  }
}
