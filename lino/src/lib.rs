//! Lino is a blocking line editor for command-line REPLs on
//! VT100-compatible terminals. It reads keystrokes in raw mode,
//! maintains an in-memory edit buffer, redraws the prompt line in
//! either single-line scrolling or multi-line reflow mode, and keeps a
//! bounded, persistable history of accepted lines.
//!
//! Features:
//! - Emacs keybindings with a single-slot kill ring
//! - Line history with duplicate suppression and file load/save
//! - Tab completion and right-hand hints via host callbacks
//! - Masked (password) input
//! - Plain line-mode fallback on dumb terminals and pipes
//!
//! Editing is byte-wise: the buffer holds UTF-8 bytes verbatim and the
//! cursor moves one byte at a time. Grapheme-aware editing is out of
//! scope.
//!
//! Editors are built with [`builder::EditorBuilder`].
//!
//! # Example
//! ```no_run
//! use lino::builder::EditorBuilder;
//! use lino::error::LinoError;
//!
//! fn main() -> Result<(), LinoError> {
//!     let mut editor = EditorBuilder::new().build();
//!
//!     loop {
//!         match editor.readline("> ") {
//!             Ok(line) => {
//!                 editor.history_add(&line);
//!                 println!("Read: '{line}'");
//!             }
//!             Err(err) if err.is_terminal() => break,
//!             Err(err) => return Err(err),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod complete;
pub mod editor;
pub mod error;
pub mod hint;
pub mod history;
mod input;
pub mod line_buffer;
mod output;
pub mod terminal;

#[cfg(test)]
pub(crate) mod testlib;
