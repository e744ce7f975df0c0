//! Error types

use std::io;

/// Terminal outcomes of a read call, plus real failures.
///
/// Read-path IO failures inside an interactive session are reported as
/// [`LinoError::Eof`]; [`LinoError::Io`] covers terminal bring-up and
/// history file operations.
#[derive(Debug, thiserror::Error)]
pub enum LinoError {
    /// The input stream ended, or Ctrl-D was pressed on an empty line.
    #[error("end of input")]
    Eof,
    /// The line was cancelled with Ctrl-C.
    #[error("line cancelled")]
    Cancelled,
    /// An operation on the terminal or a history file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl LinoError {
    /// True for the two ordinary end-of-session outcomes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LinoError::Eof | LinoError::Cancelled)
    }
}
