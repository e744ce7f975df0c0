//! Session controller
//!
//! [`Editor`] owns the terminal, the history ring and the host
//! callbacks, and drives one blocking read loop per
//! [`Editor::readline`] call. The engine is single-threaded and
//! synchronous; callbacks run on the calling thread and must not
//! re-enter the read call.

use std::io;
use std::path::Path;

use log::{debug, trace};

use crate::complete::{Completer, Completions};
use crate::error::LinoError;
use crate::hint::Hinter;
use crate::history::History;
use crate::input::{Action, ControlCharacter, Parser, CSI};
use crate::line_buffer::{KillRing, LineBuffer};
use crate::output::{Mode, Renderer};
use crate::terminal::{RawMode, Term, Tty};

const CLEAR_SCREEN: &[u8] = b"\x1b[H\x1b[2J";
const BELL: &[u8] = b"\x07";

/// Interactive line editor.
///
/// Configure one with [`crate::builder::EditorBuilder`]; a bare editor
/// with no completion or hints comes from [`Editor::new`].
pub struct Editor<T = Tty, C = (), H = ()> {
    term: T,
    history: History,
    kill_ring: KillRing,
    completer: C,
    hinter: H,
    mode: Mode,
    mask_mode: bool,
}

impl Editor<Tty, (), ()> {
    /// Editor on the controlling terminal with default settings.
    pub fn new() -> Self {
        crate::builder::EditorBuilder::new().build()
    }
}

impl Default for Editor<Tty, (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, H> Editor<T, C, H>
where
    T: Term,
    C: Completer,
    H: Hinter,
{
    pub(crate) fn with_parts(
        term: T,
        history: History,
        completer: C,
        hinter: H,
        multi_line: bool,
        mask_mode: bool,
    ) -> Self {
        Self {
            term,
            history,
            kill_ring: KillRing::new(),
            completer,
            hinter,
            mode: if multi_line {
                Mode::MultiLine
            } else {
                Mode::SingleLine
            },
            mask_mode,
        }
    }

    /// Print `prompt` and block until a line is produced.
    ///
    /// Returns [`LinoError::Eof`] when the stream ends or Ctrl-D is
    /// pressed on an empty line, and [`LinoError::Cancelled`] on
    /// Ctrl-C. The accepted line is not added to history; the host
    /// decides with [`Editor::history_add`].
    pub fn readline(&mut self, prompt: &str) -> Result<String, LinoError> {
        if !self.term.is_tty() {
            debug!("input is not a terminal, reading a plain line");
            return self.buffered_line();
        }

        if self.term.is_unsupported() {
            debug!("unsupported terminal, reading a plain line");
            self.term.write_all(prompt.as_bytes())?;
            self.term.flush()?;
            return self.buffered_line();
        }

        self.edit(prompt)
    }

    /// Append a line to history. See [`History::add`] for the rules.
    pub fn history_add(&mut self, line: &str) -> bool {
        self.history.add(line)
    }

    pub fn history_set_max_len(&mut self, max_len: usize) -> bool {
        self.history.set_max_len(max_len)
    }

    pub fn history_save(&self, path: impl AsRef<Path>) -> io::Result<usize> {
        self.history.save(path)
    }

    pub fn history_load(&mut self, path: impl AsRef<Path>) -> io::Result<usize> {
        self.history.load(path)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Clear the screen and home the cursor.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.term.write_all(CLEAR_SCREEN)?;
        self.term.flush()
    }

    /// Switch between single-line scrolling and multi-line reflow.
    pub fn set_multi_line(&mut self, enabled: bool) {
        self.mode = if enabled {
            Mode::MultiLine
        } else {
            Mode::SingleLine
        };
    }

    /// When enabled, the display shows asterisks instead of the buffer.
    pub fn set_mask_mode(&mut self, enabled: bool) {
        self.mask_mode = enabled;
    }

    /// Diagnostic mode: print the code and mnemonic of every received
    /// byte until `q` is pressed twice in a row. The terminal is
    /// restored on every exit path.
    pub fn print_key_codes(&mut self) -> io::Result<()> {
        let mut raw = RawMode::enter(&mut self.term)?;
        raw.write_all(b"Entering key-code mode. Press 'q' twice in a row to quit.\r\n")?;
        raw.flush()?;

        let mut quit_armed = false;
        while let Some(byte) = raw.read_byte()? {
            let line = format!("0x{byte:02x}\t{}\r\n", key_name(byte));
            raw.write_all(line.as_bytes())?;
            raw.flush()?;

            if byte == b'q' {
                if quit_armed {
                    break;
                }
                quit_armed = true;
            } else {
                quit_armed = false;
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn term(&self) -> &T {
        &self.term
    }

    fn buffered_line(&mut self) -> Result<String, LinoError> {
        match self.term.read_line() {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(LinoError::Eof),
            Err(err) => {
                debug!("line read failed: {err}");
                Err(LinoError::Eof)
            }
        }
    }

    fn edit(&mut self, prompt: &str) -> Result<String, LinoError> {
        let Editor {
            term,
            history,
            kill_ring,
            completer,
            hinter,
            mode,
            mask_mode,
        } = self;

        let mut raw = RawMode::enter(term)?;
        let cols = raw.columns();

        history.push_scratch();

        let mut session = Session {
            term: raw,
            parser: Parser::new(),
            renderer: Renderer::new(*mode, cols),
            buffer: LineBuffer::new(),
            cursor: 0,
            history,
            history_index: 0,
            kill_ring,
            completer: &*completer,
            hinter: &*hinter,
            prompt,
            mask_mode: *mask_mode,
        };

        let result = session.run();
        session.history.pop_scratch();
        result
    }
}

/// What a dispatched command means for the read loop.
enum Flow {
    Continue,
    Accept,
    Cancelled,
    Eof,
}

/// How a completion cycle ended.
enum Cycle {
    Done,
    Replay(u8),
    Eof,
}

/// State of one read call. Owns the raw-mode guard, so dropping the
/// session restores the terminal.
struct Session<'a, T: Term, C: Completer, H: Hinter> {
    term: RawMode<'a, T>,
    parser: Parser,
    renderer: Renderer,
    buffer: LineBuffer,
    cursor: usize,
    history: &'a mut History,
    /// Offset from the scratch slot: 0 is the line being edited,
    /// `history.len() - 1` is the oldest entry.
    history_index: usize,
    kill_ring: &'a mut KillRing,
    completer: &'a C,
    hinter: &'a H,
    prompt: &'a str,
    mask_mode: bool,
}

impl<'a, T: Term, C: Completer, H: Hinter> Session<'a, T, C, H> {
    fn run(&mut self) -> Result<String, LinoError> {
        self.refresh();

        loop {
            let byte = match self.term.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => return self.finish(Err(LinoError::Eof)),
                Err(err) => {
                    debug!("read failed: {err}");
                    return self.finish(Err(LinoError::Eof));
                }
            };

            let action = self.parser.advance(byte);
            match self.dispatch(action) {
                Flow::Continue => self.refresh(),
                Flow::Accept => {
                    // Redraw once without the hint so it does not
                    // linger on the accepted line.
                    self.cursor = self.buffer.len();
                    self.draw_line(false);
                    let line = self.buffer.to_str_lossy().into_owned();
                    return self.finish(Ok(line));
                }
                Flow::Cancelled => return self.finish(Err(LinoError::Cancelled)),
                Flow::Eof => return self.finish(Err(LinoError::Eof)),
            }
        }
    }

    /// Leave the cursor on a fresh line for the host, whatever the
    /// outcome was.
    fn finish(&mut self, result: Result<String, LinoError>) -> Result<String, LinoError> {
        let _ = self.term.write_all(b"\n\r");
        let _ = self.term.flush();
        result
    }

    fn dispatch(&mut self, action: Action) -> Flow {
        match action {
            Action::Ignore => Flow::Continue,
            Action::Print(byte) => {
                self.buffer.insert_bytes(self.cursor, &[byte]);
                self.cursor += 1;
                Flow::Continue
            }
            Action::ControlCharacter(c) => self.control(c),
            Action::EscapeSequence(byte) => {
                self.escape(byte);
                Flow::Continue
            }
            Action::ControlSequenceIntroducer(csi) => {
                self.csi(csi);
                Flow::Continue
            }
        }
    }

    fn control(&mut self, c: ControlCharacter) -> Flow {
        use ControlCharacter::*;

        match c {
            CtrlA => self.cursor = 0,
            CtrlB => self.move_left(),
            CtrlC => return Flow::Cancelled,
            CtrlD => {
                if self.buffer.is_empty() {
                    return Flow::Eof;
                }
                self.delete_at_cursor();
            }
            CtrlE => self.cursor = self.buffer.len(),
            CtrlF => self.move_right(),
            CtrlH | Backspace => self.backspace(),
            Tab => {
                return match self.completion_cycle() {
                    Cycle::Done => Flow::Continue,
                    Cycle::Eof => Flow::Eof,
                    Cycle::Replay(byte) => {
                        let action = self.parser.advance(byte);
                        self.dispatch(action)
                    }
                }
            }
            LineFeed | CarriageReturn => return Flow::Accept,
            CtrlK => {
                let killed = self.buffer.kill_to_end(self.cursor);
                self.kill_ring.fill(killed);
            }
            CtrlL => self.clear_screen(),
            CtrlN => self.history_move(false),
            CtrlP => self.history_move(true),
            CtrlT => self.transpose(),
            CtrlU => {
                self.cursor = 0;
                let killed = self.buffer.take_all();
                self.kill_ring.fill(killed);
            }
            CtrlW => self.kill_prev_word(),
            CtrlY => self.yank(),
            CtrlZ => self.suspend(),
            _ => self.beep(),
        }

        Flow::Continue
    }

    fn escape(&mut self, byte: u8) {
        match byte {
            b'b' => self.cursor = self.buffer.prev_word_start(self.cursor),
            b'f' => self.cursor = self.buffer.next_word_end(self.cursor),
            b'd' => {
                let end = self.buffer.next_word_end(self.cursor);
                let killed = self.buffer.delete_range(self.cursor..end);
                self.kill_ring.fill(killed);
            }
            0x8 => self.kill_prev_word(),
            // Unknown escape sequences are consumed silently.
            _ => {}
        }
    }

    fn csi(&mut self, csi: CSI) {
        match csi {
            CSI::CUU(_) => self.history_move(true),
            CSI::CUD(_) => self.history_move(false),
            CSI::CUF(_) => self.move_right(),
            CSI::CUB(_) => self.move_left(),
            CSI::Home | CSI::CUP(_, _) => self.cursor = 0,
            CSI::End => self.cursor = self.buffer.len(),
            CSI::Delete => self.delete_at_cursor(),
            // A stray probe reply or anything else we do not handle.
            CSI::CPR(_, _) | CSI::ED(_) | CSI::DSR | CSI::Unknown(_) => {}
        }
    }

    fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        } else {
            self.beep();
        }
    }

    fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor += 1;
        } else {
            self.beep();
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.delete_byte(self.cursor);
        } else {
            self.beep();
        }
    }

    fn delete_at_cursor(&mut self) {
        if self.buffer.delete_byte(self.cursor).is_none() {
            self.beep();
        }
    }

    fn transpose(&mut self) {
        if self.cursor > 0 && self.cursor < self.buffer.len() {
            self.buffer.swap_bytes(self.cursor);
            if self.cursor != self.buffer.len() - 1 {
                self.cursor += 1;
            }
        } else {
            self.beep();
        }
    }

    fn kill_prev_word(&mut self) {
        let start = self.buffer.prev_word_start(self.cursor);
        let killed = self.buffer.delete_range(start..self.cursor);
        self.kill_ring.fill(killed);
        self.cursor = start;
    }

    fn yank(&mut self) {
        if let Some(bytes) = self.kill_ring.yank() {
            self.buffer.insert_bytes(self.cursor, bytes);
            self.cursor += bytes.len();
        } else {
            self.beep();
        }
    }

    /// Browse history. The buffer is written back into the slot being
    /// left, so edits made while browsing survive within the session;
    /// the scratch slot at offset zero holds the in-progress line.
    fn history_move(&mut self, previous: bool) {
        let len = self.history.len();
        if len <= 1 {
            self.beep();
            return;
        }

        let current = len - 1 - self.history_index;
        self.history
            .replace(current, self.buffer.to_str_lossy().into_owned());

        if previous {
            if self.history_index + 1 >= len {
                self.beep();
                return;
            }
            self.history_index += 1;
        } else {
            if self.history_index == 0 {
                self.beep();
                return;
            }
            self.history_index -= 1;
        }

        let target = len - 1 - self.history_index;
        if let Some(entry) = self.history.get(target) {
            let bytes = entry.as_bytes().to_vec();
            self.buffer.replace_with(&bytes);
            self.cursor = self.buffer.len();
        }
    }

    /// Modal completion. Tab rotates through the candidates plus the
    /// original line, Esc restores the original, anything else commits
    /// the shown candidate and is replayed as a normal key.
    fn completion_cycle(&mut self) -> Cycle {
        let mut completions = Completions::new();
        let line = self.buffer.to_str_lossy().into_owned();
        self.completer.complete(&line, self.cursor, &mut completions);

        if completions.is_empty() {
            self.beep();
            return Cycle::Done;
        }

        let mut index = 0;
        loop {
            if let Some(candidate) = completions.get(index) {
                self.preview(candidate.as_bytes());
            } else {
                self.refresh();
            }

            let byte = match self.term.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => return Cycle::Eof,
                Err(err) => {
                    debug!("read failed during completion: {err}");
                    return Cycle::Eof;
                }
            };

            match ControlCharacter::try_from(byte) {
                Ok(ControlCharacter::Tab) => {
                    index = (index + 1) % (completions.len() + 1);
                    if index == completions.len() {
                        self.beep();
                    }
                }
                Ok(ControlCharacter::Escape) => {
                    self.refresh();
                    return Cycle::Done;
                }
                _ => {
                    if let Some(candidate) = completions.get(index) {
                        // The candidate replaces the line wholesale.
                        self.buffer.replace_with(candidate.as_bytes());
                        self.cursor = self.buffer.len();
                    }
                    return Cycle::Replay(byte);
                }
            }
        }
    }

    fn clear_screen(&mut self) {
        if let Err(err) = self
            .term
            .write_all(CLEAR_SCREEN)
            .and_then(|()| self.term.flush())
        {
            trace!("clear screen failed: {err}");
        }
        self.renderer.reset();
    }

    fn suspend(&mut self) {
        if let Err(err) = self.term.suspend() {
            debug!("suspend failed: {err}");
        }
        // The screen is unknown after resume; draw from scratch.
        self.renderer.reset();
    }

    fn beep(&mut self) {
        let _ = self.term.write_all(BELL);
        let _ = self.term.flush();
    }

    /// Redraw the current line. Failures only hurt the display and the
    /// next keystroke redraws, so they are swallowed.
    fn refresh(&mut self) {
        self.draw_line(true);
    }

    fn draw_line(&mut self, with_hint: bool) {
        let hint = if with_hint && !self.mask_mode {
            self.hinter.hint(&self.buffer.to_str_lossy())
        } else {
            None
        };

        let frame = self.renderer.frame(
            self.prompt.as_bytes(),
            self.buffer.as_slice(),
            self.cursor,
            self.mask_mode,
            hint.as_ref(),
        );

        if let Err(err) = self
            .term
            .write_all(&frame)
            .and_then(|()| self.term.flush())
        {
            trace!("redraw failed: {err}");
        }
    }

    /// Draw a completion candidate in place of the buffer without
    /// touching it.
    fn preview(&mut self, candidate: &[u8]) {
        let frame = self.renderer.frame(
            self.prompt.as_bytes(),
            candidate,
            candidate.len(),
            self.mask_mode,
            None,
        );

        if let Err(err) = self
            .term
            .write_all(&frame)
            .and_then(|()| self.term.flush())
        {
            trace!("redraw failed: {err}");
        }
    }
}

fn key_name(byte: u8) -> String {
    match ControlCharacter::try_from(byte) {
        Ok(ControlCharacter::Tab) => "Tab".into(),
        Ok(ControlCharacter::CarriageReturn) => "Enter".into(),
        Ok(ControlCharacter::LineFeed) => "LineFeed".into(),
        Ok(ControlCharacter::Escape) => "Esc".into(),
        Ok(ControlCharacter::Backspace) => "Backspace".into(),
        Ok(c) => format!("{c:?}"),
        Err(_) if (0x20..0x7f).contains(&byte) => format!("'{}'", byte as char),
        Err(_) => "byte".into(),
    }
}
