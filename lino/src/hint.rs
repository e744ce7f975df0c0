//! Hint callback
//!
//! A hint is a non-editable annotation rendered to the right of the
//! cursor after every edit. It never mutates editor state.

/// Hint text plus its display attributes.
///
/// Without attributes the hint is rendered faint; a color is an ANSI
/// SGR foreground code (30–37, 90–97).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub(crate) text: String,
    pub(crate) color: Option<u8>,
    pub(crate) bold: bool,
}

impl Hint {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: false,
        }
    }

    pub fn color(mut self, color: u8) -> Self {
        self.color = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A type that provides hints for the current line.
///
/// The callback receives only the line, not the cursor offset; hints
/// describe the line as a whole.
pub trait Hinter {
    fn hint(&self, line: &str) -> Option<Hint>;
}

/// No hints.
impl Hinter for () {
    fn hint(&self, _: &str) -> Option<Hint> {
        None
    }
}

impl<T: Hinter> Hinter for &T {
    fn hint(&self, line: &str) -> Option<Hint> {
        T::hint(self, line)
    }
}

impl<T: Hinter> Hinter for &mut T {
    fn hint(&self, line: &str) -> Option<Hint> {
        T::hint(self, line)
    }
}
