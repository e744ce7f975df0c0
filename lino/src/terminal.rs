//! Terminal driver
//!
//! [`Tty`] talks to the controlling terminal on stdin/stdout: raw mode
//! toggling with guaranteed restoration, width queries, byte IO and the
//! line-mode fallback for dumb terminals. The session controller is
//! generic over [`Term`] so tests can substitute a scripted terminal.

use std::env;
use std::io::{self, Read, Write};

use log::{debug, trace};
use rustix::termios::{
    self, ControlModes, InputModes, LocalModes, OptionalActions, OutputModes, SpecialCodeIndex,
    Termios,
};

use crate::input::{Action, Parser, CSI};

/// Width reported when every query fails.
pub(crate) const DEFAULT_COLUMNS: usize = 80;

/// Terminal types that cannot handle escape-sequence redraws. These
/// fall through to plain buffered input.
const UNSUPPORTED_TERM: &[&str] = &["dumb", "cons25", "emacs"];

pub(crate) fn is_unsupported_term() -> bool {
    match env::var("TERM") {
        Ok(term) => UNSUPPORTED_TERM
            .iter()
            .any(|t| term.eq_ignore_ascii_case(t)),
        Err(_) => false,
    }
}

/// The byte-stream seam between the editor and the terminal.
pub trait Term {
    /// Input is a terminal at all.
    fn is_tty(&self) -> bool;

    /// The terminal type cannot handle redraws; use line-mode input.
    fn is_unsupported(&self) -> bool;

    /// Enter raw mode, recording the attributes to restore. The
    /// attributes observed here are the single source of truth for
    /// [`Term::disable_raw`].
    fn enable_raw(&mut self) -> io::Result<()>;

    /// Restore the attributes recorded by [`Term::enable_raw`]. Must be
    /// safe to call when raw mode is not active.
    fn disable_raw(&mut self) -> io::Result<()>;

    /// Current column count; never zero.
    fn columns(&mut self) -> usize;

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Blocking read of one byte; `None` at end of stream.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Buffered line read for non-interactive or unsupported
    /// terminals. The trailing newline is stripped.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Stop the process until it is continued. The caller drops raw
    /// mode before calling this and re-enters it afterwards.
    fn suspend(&mut self) -> io::Result<()>;
}

/// The controlling terminal on stdin/stdout.
pub struct Tty {
    input: io::Stdin,
    output: io::Stdout,
    saved: Option<Termios>,
}

impl Tty {
    pub fn new() -> Self {
        Self {
            input: io::stdin(),
            output: io::stdout(),
            saved: None,
        }
    }

    /// Report the cursor column via a cursor-position report.
    fn query_cursor_column(&mut self) -> io::Result<usize> {
        self.write_all(b"\x1b[6n")?;
        self.flush()?;

        let mut parser = Parser::new();
        // The reply is ESC [ rows ; cols R. Bound the read so garbage
        // input cannot wedge the probe.
        for _ in 0..32 {
            let Some(byte) = self.read_byte()? else { break };

            if let Action::ControlSequenceIntroducer(CSI::CPR(_, column)) = parser.advance(byte) {
                return Ok(column);
            }
        }

        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "no cursor position report",
        ))
    }

    /// Width via cursor gymnastics: remember the column, jump to column
    /// 999, read where we ended up, and move back.
    fn probe_columns(&mut self) -> io::Result<usize> {
        let start = self.query_cursor_column()?;

        self.write_all(b"\x1b[999C")?;
        let end = self.query_cursor_column()?;

        if end > start {
            self.write_all(format!("\x1b[{}D", end - start).as_bytes())?;
            self.flush()?;
        }

        Ok(end)
    }
}

impl Default for Tty {
    fn default() -> Self {
        Self::new()
    }
}

impl Term for Tty {
    fn is_tty(&self) -> bool {
        termios::isatty(&self.input)
    }

    fn is_unsupported(&self) -> bool {
        is_unsupported_term()
    }

    fn enable_raw(&mut self) -> io::Result<()> {
        if self.saved.is_some() {
            return Ok(());
        }

        let saved = termios::tcgetattr(&self.input).map_err(io::Error::from)?;

        let mut raw = saved.clone();
        raw.input_modes &= !(InputModes::BRKINT
            | InputModes::ICRNL
            | InputModes::INPCK
            | InputModes::ISTRIP
            | InputModes::IXON);
        raw.output_modes &= !OutputModes::OPOST;
        raw.control_modes |= ControlModes::CS8;
        raw.local_modes &=
            !(LocalModes::ECHO | LocalModes::ICANON | LocalModes::IEXTEN | LocalModes::ISIG);
        raw.special_codes[SpecialCodeIndex::VMIN] = 1;
        raw.special_codes[SpecialCodeIndex::VTIME] = 0;

        termios::tcsetattr(&self.input, OptionalActions::Flush, &raw).map_err(io::Error::from)?;

        self.saved = Some(saved);
        trace!("raw mode enabled");
        Ok(())
    }

    fn disable_raw(&mut self) -> io::Result<()> {
        if let Some(saved) = self.saved.take() {
            termios::tcsetattr(&self.input, OptionalActions::Flush, &saved)
                .map_err(io::Error::from)?;
            trace!("raw mode disabled");
        }
        Ok(())
    }

    fn columns(&mut self) -> usize {
        match termios::tcgetwinsize(&self.output) {
            Ok(size) if size.ws_col > 0 => size.ws_col as usize,
            _ => match self.probe_columns() {
                Ok(columns) if columns > 0 => {
                    debug!("window size query failed, probed {columns} columns");
                    columns
                }
                _ => {
                    debug!("column queries failed, assuming {DEFAULT_COLUMNS}");
                    DEFAULT_COLUMNS
                }
            },
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];

        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                // Interrupted covers resumption after Ctrl-Z.
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();

        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }

        Ok(Some(line))
    }

    fn suspend(&mut self) -> io::Result<()> {
        // SAFETY: raise has no memory-safety preconditions.
        if unsafe { libc::raise(libc::SIGTSTP) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for Tty {
    fn drop(&mut self) {
        let _ = self.disable_raw();
    }
}

/// Scoped raw mode. Restoration runs on every exit path, panics
/// included; the editor never touches raw mode outside this guard.
pub(crate) struct RawMode<'a, T: Term> {
    term: &'a mut T,
}

impl<'a, T: Term> RawMode<'a, T> {
    pub fn enter(term: &'a mut T) -> io::Result<Self> {
        term.enable_raw()?;
        Ok(Self { term })
    }

    /// Leave and re-enter raw mode around a suspend, then let the
    /// caller redraw.
    pub fn suspend(&mut self) -> io::Result<()> {
        self.term.disable_raw()?;
        self.term.suspend()?;
        self.term.enable_raw()
    }
}

impl<'a, T: Term> std::ops::Deref for RawMode<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.term
    }
}

impl<'a, T: Term> std::ops::DerefMut for RawMode<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.term
    }
}

impl<'a, T: Term> Drop for RawMode<'a, T> {
    fn drop(&mut self) {
        let _ = self.term.disable_raw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlib::MockTerm;

    #[test]
    fn unsupported_term_denylist() {
        for term in ["dumb", "cons25", "emacs", "DUMB"] {
            assert!(UNSUPPORTED_TERM
                .iter()
                .any(|t| term.eq_ignore_ascii_case(t)));
        }
        assert!(!UNSUPPORTED_TERM
            .iter()
            .any(|t| "xterm-256color".eq_ignore_ascii_case(t)));
    }

    #[test]
    fn raw_mode_guard_balances() {
        let mut term = MockTerm::new();

        {
            let _raw = RawMode::enter(&mut term).unwrap();
        }

        assert_eq!(term.raw_depth, 0);
        assert_eq!(term.raw_toggles, 1);
    }

    #[test]
    fn raw_mode_guard_survives_suspend() {
        let mut term = MockTerm::new();

        {
            let mut raw = RawMode::enter(&mut term).unwrap();
            raw.suspend().unwrap();
            assert_eq!(raw.term.raw_depth, 1);
        }

        assert_eq!(term.raw_depth, 0);
        assert_eq!(term.suspend_count, 1);
        assert_eq!(term.raw_toggles, 2);
    }
}
