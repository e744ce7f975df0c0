use std::collections::VecDeque;
use std::io;

use crate::input::ControlCharacter;
use crate::terminal::Term;

/// Scripted terminal: input is a pre-loaded byte queue, output is
/// captured, raw-mode transitions are counted.
pub struct MockTerm {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
    pub fallback_lines: VecDeque<String>,
    pub cols: usize,
    pub tty: bool,
    pub supported: bool,
    pub raw_depth: usize,
    pub raw_toggles: usize,
    pub suspend_count: usize,
}

impl MockTerm {
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            output: Vec::new(),
            fallback_lines: VecDeque::new(),
            cols: 80,
            tty: true,
            supported: true,
            raw_depth: 0,
            raw_toggles: 0,
            suspend_count: 0,
        }
    }

    pub fn with_input(input: impl AsByteVec) -> Self {
        let mut term = Self::new();
        term.feed(input);
        term
    }

    pub fn feed(&mut self, input: impl AsByteVec) {
        self.input.extend(input.as_byte_vec());
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Term for MockTerm {
    fn is_tty(&self) -> bool {
        self.tty
    }

    fn is_unsupported(&self) -> bool {
        !self.supported
    }

    fn enable_raw(&mut self) -> io::Result<()> {
        if self.raw_depth == 0 {
            self.raw_depth = 1;
        }
        Ok(())
    }

    fn disable_raw(&mut self) -> io::Result<()> {
        if self.raw_depth == 1 {
            self.raw_depth = 0;
            self.raw_toggles += 1;
        }
        Ok(())
    }

    fn columns(&mut self) -> usize {
        self.cols
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.fallback_lines.pop_front())
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.suspend_count += 1;
        Ok(())
    }
}

/// Keystroke scripts: strings, control characters and byte arrays can
/// be mixed freely when building test input.
pub trait AsByteVec {
    fn as_byte_vec(self) -> Vec<u8>;
}

impl AsByteVec for &str {
    fn as_byte_vec(self) -> Vec<u8> {
        self.bytes().collect()
    }
}

impl AsByteVec for ControlCharacter {
    fn as_byte_vec(self) -> Vec<u8> {
        vec![self.into()]
    }
}

impl<const N: usize> AsByteVec for [ControlCharacter; N] {
    fn as_byte_vec(self) -> Vec<u8> {
        self.into_iter().map(|c| c.into()).collect()
    }
}

impl AsByteVec for Vec<u8> {
    fn as_byte_vec(self) -> Vec<u8> {
        self
    }
}

/// Common CSI keystrokes.
pub mod csi {
    pub const UP: &str = "\x1b[A";
    pub const DOWN: &str = "\x1b[B";
    pub const RIGHT: &str = "\x1b[C";
    pub const LEFT: &str = "\x1b[D";
    pub const HOME: &str = "\x1b[1~";
    pub const DELETE: &str = "\x1b[3~";
    pub const END: &str = "\x1b[4~";
}

/// Concatenate mixed keystroke fragments into one input script.
pub struct InputBuilder {
    items: Vec<u8>,
}

impl InputBuilder {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add(&mut self, input: impl AsByteVec) -> &mut Self {
        self.items.extend(input.as_byte_vec());
        self
    }
}

impl AsByteVec for InputBuilder {
    fn as_byte_vec(self) -> Vec<u8> {
        self.items
    }
}
