//! Completion support
//!
//! On Tab the editor asks the host [`Completer`] for candidates and
//! enters a modal cycle over them. Candidate strings are copied into
//! the [`Completions`] set when added and dropped when the cycle ends.

/// Candidate set for one completion cycle.
pub struct Completions {
    candidates: Vec<String>,
}

impl Completions {
    pub(crate) fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Add a candidate. The candidate replaces the whole line when
    /// committed.
    pub fn add(&mut self, candidate: impl Into<String>) {
        self.candidates.push(candidate.into());
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&str> {
        self.candidates.get(index).map(|s| s.as_str())
    }
}

/// A type that provides line completions.
///
/// ```
/// use lino::complete::{word_at, Completer, Completions};
///
/// static COMMANDS: [&str; 3] = ["help", "hello", "history"];
///
/// struct Commands;
///
/// impl Completer for Commands {
///     fn complete(&self, line: &str, cursor: usize, completions: &mut Completions) {
///         let word = word_at(line, cursor);
///         for candidate in COMMANDS.iter().filter(|c| c.starts_with(word)) {
///             completions.add(*candidate);
///         }
///     }
/// }
/// ```
pub trait Completer {
    /// Populate `completions` with candidates for `line`, where the
    /// cursor sits at byte offset `cursor`.
    fn complete(&self, line: &str, cursor: usize, completions: &mut Completions);
}

/// No completion.
impl Completer for () {
    fn complete(&self, _: &str, _: usize, _: &mut Completions) {}
}

impl<T: Completer> Completer for &T {
    fn complete(&self, line: &str, cursor: usize, completions: &mut Completions) {
        T::complete(self, line, cursor, completions)
    }
}

impl<T: Completer> Completer for &mut T {
    fn complete(&self, line: &str, cursor: usize, completions: &mut Completions) {
        T::complete(self, line, cursor, completions)
    }
}

/// The token under the cursor: the span from the nearest space on the
/// left up to the cursor. Offsets inside a multi-byte character are
/// backed up to the previous boundary.
pub fn word_at(line: &str, cursor: usize) -> &str {
    let mut cursor = cursor.min(line.len());
    while !line.is_char_boundary(cursor) {
        cursor -= 1;
    }

    let start = line[..cursor].rfind(' ').map(|i| i + 1).unwrap_or(0);
    &line[start..cursor]
}
