//! Builder for editors
//!
//! All session configuration lives here: callbacks, history capacity
//! and display modes are fixed when the editor is built rather than
//! registered in process-wide slots.

use crate::complete::Completer;
use crate::editor::Editor;
use crate::hint::Hinter;
use crate::history::{History, DEFAULT_MAX_LEN};
use crate::terminal::{Term, Tty};

/// Builder for [`Editor`].
///
/// # Example
/// ```no_run
/// use lino::builder::EditorBuilder;
///
/// let mut editor = EditorBuilder::new()
///     .with_history_max_len(1000)
///     .multi_line(true)
///     .build();
///
/// while let Ok(line) = editor.readline("> ") {
///     editor.history_add(&line);
///     println!("Read: '{line}'");
/// }
/// ```
pub struct EditorBuilder<C = (), H = ()> {
    completer: C,
    hinter: H,
    history_max_len: usize,
    multi_line: bool,
    mask_mode: bool,
}

impl EditorBuilder<(), ()> {
    pub fn new() -> Self {
        Self {
            completer: (),
            hinter: (),
            history_max_len: DEFAULT_MAX_LEN,
            multi_line: false,
            mask_mode: false,
        }
    }
}

impl Default for EditorBuilder<(), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Completer, H: Hinter> EditorBuilder<C, H> {
    /// Use `completer` to produce Tab candidates.
    pub fn with_completer<C2: Completer>(self, completer: C2) -> EditorBuilder<C2, H> {
        EditorBuilder {
            completer,
            hinter: self.hinter,
            history_max_len: self.history_max_len,
            multi_line: self.multi_line,
            mask_mode: self.mask_mode,
        }
    }

    /// Use `hinter` to annotate the line after each edit.
    pub fn with_hinter<H2: Hinter>(self, hinter: H2) -> EditorBuilder<C, H2> {
        EditorBuilder {
            completer: self.completer,
            hinter,
            history_max_len: self.history_max_len,
            multi_line: self.multi_line,
            mask_mode: self.mask_mode,
        }
    }

    /// History capacity; values below one are raised to one.
    pub fn with_history_max_len(mut self, max_len: usize) -> Self {
        self.history_max_len = max_len.max(1);
        self
    }

    /// Start in multi-line reflow mode instead of single-line
    /// scrolling.
    pub fn multi_line(mut self, enabled: bool) -> Self {
        self.multi_line = enabled;
        self
    }

    /// Start with masked (password) display.
    pub fn mask_mode(mut self, enabled: bool) -> Self {
        self.mask_mode = enabled;
        self
    }

    /// Build an editor on the controlling terminal.
    pub fn build(self) -> Editor<Tty, C, H> {
        self.build_with_term(Tty::new())
    }

    /// Build an editor on a custom [`Term`] implementation.
    pub fn build_with_term<T: Term>(self, term: T) -> Editor<T, C, H> {
        Editor::with_parts(
            term,
            History::with_max_len(self.history_max_len),
            self.completer,
            self.hinter,
            self.multi_line,
            self.mask_mode,
        )
    }
}
