//! Frame renderers
//!
//! Each keystroke produces one frame: the minimal byte sequence that
//! reconciles the terminal with the current (prompt, buffer, cursor,
//! hint) tuple. A frame is built in memory and written in a single
//! flush to avoid tearing.
//!
//! Two strategies exist. Single-line mode keeps everything on one
//! terminal row and scrolls the visible window so the cursor stays in
//! view. Multi-line mode erases the rows of the previous frame and
//! redraws the whole block, relying on terminal autowrap.

use crate::hint::Hint;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Mode {
    SingleLine,
    MultiLine,
}

/// Rows occupied by a multi-line frame when the cursor sits at the end
/// of the buffer. The extra column reserves the cell the cursor lands
/// on after the last byte.
pub(crate) fn multi_line_rows(plen: usize, len: usize, cols: usize) -> usize {
    (plen + len + 1).div_ceil(cols.max(1))
}

pub(crate) struct Renderer {
    mode: Mode,
    cols: usize,
    /// Rows drawn by the previous multi-line frame.
    prev_rows: usize,
    /// Cursor offset at the previous multi-line frame.
    prev_cursor: usize,
}

impl Renderer {
    pub fn new(mode: Mode, cols: usize) -> Self {
        Self {
            mode,
            cols: cols.max(1),
            prev_rows: 0,
            prev_cursor: 0,
        }
    }

    /// Forget the previous frame. Used after the screen is cleared or
    /// the session is resumed from a suspend.
    pub fn reset(&mut self) {
        self.prev_rows = 0;
        self.prev_cursor = 0;
    }

    pub fn frame(
        &mut self,
        prompt: &[u8],
        buf: &[u8],
        cursor: usize,
        mask: bool,
        hint: Option<&Hint>,
    ) -> Vec<u8> {
        let cursor = cursor.min(buf.len());

        match self.mode {
            Mode::SingleLine => self.single_line(prompt, buf, cursor, mask, hint),
            Mode::MultiLine => self.multi_line(prompt, buf, cursor, mask, hint),
        }
    }

    fn single_line(
        &mut self,
        prompt: &[u8],
        buf: &[u8],
        cursor: usize,
        mask: bool,
        hint: Option<&Hint>,
    ) -> Vec<u8> {
        let plen = prompt.len();
        let cols = self.cols;

        // Scroll the window right until the cursor fits, then trim the
        // tail to the remaining width. The `> 0` guards keep a prompt
        // wider than the terminal from underflowing; the frame is
        // simply clipped in that case.
        let mut start = 0;
        let mut pos = cursor;
        while plen + pos >= cols && pos > 0 {
            start += 1;
            pos -= 1;
        }

        let mut shown = buf.len() - start;
        while plen + shown > cols && shown > 0 {
            shown -= 1;
        }

        let mut out = Vec::with_capacity(plen + shown + 32);
        out.push(b'\r');
        out.extend_from_slice(prompt);
        push_visible(&mut out, &buf[start..start + shown], mask);

        if start == 0 && shown == buf.len() {
            push_hint(&mut out, hint, cols.saturating_sub(plen + shown));
        }

        out.extend_from_slice(b"\x1b[0K");
        out.push(b'\r');
        push_cursor_forward(&mut out, plen + pos);

        out
    }

    fn multi_line(
        &mut self,
        prompt: &[u8],
        buf: &[u8],
        cursor: usize,
        mask: bool,
        hint: Option<&Hint>,
    ) -> Vec<u8> {
        let plen = prompt.len();
        let len = buf.len();
        let cols = self.cols;

        let mut rows = (plen + len).div_ceil(cols).max(1);
        // 1-based row holding the cursor in the previous frame.
        let old_row = (plen + self.prev_cursor + cols) / cols;

        let mut out = Vec::with_capacity(plen + len + 64);

        // Walk down to the last row of the previous frame, then erase
        // every row on the way back up.
        if self.prev_rows > old_row {
            push_csi(&mut out, self.prev_rows - old_row, b'B');
        }
        for _ in 1..self.prev_rows {
            out.extend_from_slice(b"\r\x1b[0K\x1b[1A");
        }
        out.extend_from_slice(b"\r\x1b[0K");

        out.extend_from_slice(prompt);
        push_visible(&mut out, buf, mask);

        if plen + len < cols {
            push_hint(&mut out, hint, cols - (plen + len));
        }

        // The cursor would sit past the last column; force the wrap the
        // terminal defers and take the reserved row.
        if cursor == len && plen + len > 0 && (plen + len) % cols == 0 {
            out.extend_from_slice(b"\n\r");
            rows += 1;
        }

        let new_row = (plen + cursor + cols) / cols;
        if rows > new_row {
            push_csi(&mut out, rows - new_row, b'A');
        }

        out.push(b'\r');
        push_cursor_forward(&mut out, (plen + cursor) % cols);

        self.prev_rows = rows;
        self.prev_cursor = cursor;

        out
    }
}

fn push_visible(out: &mut Vec<u8>, bytes: &[u8], mask: bool) {
    if mask {
        out.extend(std::iter::repeat(b'*').take(bytes.len()));
    } else {
        out.extend_from_slice(bytes);
    }
}

fn push_cursor_forward(out: &mut Vec<u8>, columns: usize) {
    if columns > 0 {
        push_csi(out, columns, b'C');
    }
}

fn push_csi(out: &mut Vec<u8>, n: usize, final_byte: u8) {
    out.extend_from_slice(format!("\x1b[{n}").as_bytes());
    out.push(final_byte);
}

/// Append the hint, truncated to `avail` columns, wrapped in its SGR
/// attributes. Hints without attributes render faint.
fn push_hint(out: &mut Vec<u8>, hint: Option<&Hint>, avail: usize) {
    let Some(hint) = hint else { return };

    let text = hint.text.as_bytes();
    let shown = text.len().min(avail);
    if shown == 0 {
        return;
    }

    match hint.color {
        Some(color) => {
            out.extend_from_slice(format!("\x1b[{};{color};49m", hint.bold as u8).as_bytes())
        }
        None if hint.bold => out.extend_from_slice(b"\x1b[1m"),
        None => out.extend_from_slice(b"\x1b[2m"),
    }
    out.extend_from_slice(&text[..shown]);
    out.extend_from_slice(b"\x1b[0m");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_string(frame: Vec<u8>) -> String {
        String::from_utf8(frame).unwrap()
    }

    #[test]
    fn single_line_basic() {
        let mut renderer = Renderer::new(Mode::SingleLine, 80);

        let frame = renderer.frame(b"> ", b"hello", 5, false, None);
        assert_eq!(frame_string(frame), "\r> hello\x1b[0K\r\x1b[7C");

        let frame = renderer.frame(b"> ", b"hello", 0, false, None);
        assert_eq!(frame_string(frame), "\r> hello\x1b[0K\r\x1b[2C");

        // Empty prompt and buffer leaves the cursor at column zero.
        let frame = renderer.frame(b"", b"", 0, false, None);
        assert_eq!(frame_string(frame), "\r\x1b[0K\r");
    }

    #[test]
    fn single_line_scrolls_to_keep_cursor_in_view() {
        let mut renderer = Renderer::new(Mode::SingleLine, 10);

        let frame = renderer.frame(b"> ", b"0123456789abc", 13, false, None);
        assert_eq!(frame_string(frame), "\r> 6789abc\x1b[0K\r\x1b[9C");

        // Cursor at the start shows the head of the buffer.
        let frame = renderer.frame(b"> ", b"0123456789abc", 0, false, None);
        assert_eq!(frame_string(frame), "\r> 01234567\x1b[0K\r\x1b[2C");
    }

    #[test]
    fn single_line_mask() {
        let mut renderer = Renderer::new(Mode::SingleLine, 80);

        let frame = renderer.frame(b"pw: ", b"secret", 6, true, None);
        assert_eq!(frame_string(frame), "\rpw: ******\x1b[0K\r\x1b[10C");
    }

    #[test]
    fn single_line_hint() {
        let mut renderer = Renderer::new(Mode::SingleLine, 80);

        let hint = Hint::new(" <name>");
        let frame = renderer.frame(b"> ", b"hello", 5, false, Some(&hint));
        assert_eq!(
            frame_string(frame),
            "\r> hello\x1b[2m <name>\x1b[0m\x1b[0K\r\x1b[7C"
        );

        let hint = Hint::new(" <name>").color(35).bold();
        let frame = renderer.frame(b"> ", b"hello", 5, false, Some(&hint));
        assert_eq!(
            frame_string(frame),
            "\r> hello\x1b[1;35;49m <name>\x1b[0m\x1b[0K\r\x1b[7C"
        );
    }

    #[test]
    fn single_line_hint_truncated_to_fit() {
        let mut renderer = Renderer::new(Mode::SingleLine, 10);

        let hint = Hint::new("0123456789");
        let frame = renderer.frame(b"> ", b"abc", 3, false, Some(&hint));
        assert_eq!(
            frame_string(frame),
            "\r> abc\x1b[2m01234\x1b[0m\x1b[0K\r\x1b[5C"
        );

        // No room at all: the hint disappears entirely.
        let frame = renderer.frame(b"> ", b"01234567", 8, false, Some(&hint));
        assert_eq!(frame_string(frame), "\r> 01234567\x1b[0K\r\x1b[9C");
    }

    #[test]
    fn multi_line_first_frame() {
        let mut renderer = Renderer::new(Mode::MultiLine, 10);

        let frame = renderer.frame(b"> ", b"hello", 5, false, None);
        assert_eq!(frame_string(frame), "\r\x1b[0K> hello\r\x1b[7C");
        assert_eq!(renderer.prev_rows, 1);
    }

    #[test]
    fn multi_line_wraps_and_erases_previous_rows() {
        let mut renderer = Renderer::new(Mode::MultiLine, 10);

        let frame = renderer.frame(b"> ", b"0123456789", 10, false, None);
        assert_eq!(frame_string(frame), "\r\x1b[0K> 0123456789\r\x1b[2C");
        assert_eq!(renderer.prev_rows, 2);
        assert_eq!(renderer.prev_rows, multi_line_rows(2, 10, 10));

        // The next frame erases both rows before redrawing. The cursor
        // sits on row 2 of 2, so there is no downward move first.
        let frame = renderer.frame(b"> ", b"0123456789", 0, false, None);
        assert_eq!(
            frame_string(frame),
            "\r\x1b[0K\x1b[1A\r\x1b[0K> 0123456789\x1b[1A\r\x1b[2C"
        );
    }

    #[test]
    fn multi_line_reserves_a_row_at_the_boundary() {
        let mut renderer = Renderer::new(Mode::MultiLine, 10);

        // Prompt plus buffer exactly fill one row; the cursor needs the
        // next one.
        let frame = renderer.frame(b"> ", b"01234567", 8, false, None);
        assert_eq!(frame_string(frame), "\r\x1b[0K> 01234567\n\r\r");
        assert_eq!(renderer.prev_rows, 2);
        assert_eq!(renderer.prev_rows, multi_line_rows(2, 8, 10));
    }

    #[test]
    fn multi_line_steps_down_before_erasing() {
        let mut renderer = Renderer::new(Mode::MultiLine, 10);

        // Build a two-row frame with the cursor on the first row.
        renderer.frame(b"> ", b"012345678901234567", 0, false, None);
        assert_eq!(renderer.prev_rows, 2);

        let frame = renderer.frame(b"> ", b"", 0, false, None);
        assert_eq!(
            frame_string(frame),
            "\x1b[1B\r\x1b[0K\x1b[1A\r\x1b[0K> \r\x1b[2C"
        );
        assert_eq!(renderer.prev_rows, 1);
    }

    #[test]
    fn row_count_formula() {
        assert_eq!(multi_line_rows(2, 0, 10), 1);
        assert_eq!(multi_line_rows(2, 7, 10), 1);
        assert_eq!(multi_line_rows(2, 8, 10), 2);
        assert_eq!(multi_line_rows(2, 10, 10), 2);
        assert_eq!(multi_line_rows(2, 17, 10), 2);
        assert_eq!(multi_line_rows(2, 18, 10), 3);
        assert_eq!(multi_line_rows(0, 0, 10), 1);
        // Degenerate width never divides by zero.
        assert_eq!(multi_line_rows(0, 3, 0), 4);
    }

    #[test]
    fn cursor_is_clamped_to_the_buffer() {
        let mut renderer = Renderer::new(Mode::SingleLine, 80);

        let frame = renderer.frame(b"> ", b"ab", 100, false, None);
        assert_eq!(frame_string(frame), "\r> ab\x1b[0K\r\x1b[4C");
    }
}
