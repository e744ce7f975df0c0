use num_enum::{IntoPrimitive, TryFromPrimitive};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Eq, PartialEq, Copy, Clone, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ControlCharacter {
    NUL = 0x0,
    CtrlA = 0x1,
    CtrlB = 0x2,
    CtrlC = 0x3,
    CtrlD = 0x4,
    CtrlE = 0x5,
    CtrlF = 0x6,
    CtrlG = 0x7,
    CtrlH = 0x8,
    Tab = 0x9,
    LineFeed = 0xA,
    CtrlK = 0xB,
    CtrlL = 0xC,
    CarriageReturn = 0xD,
    CtrlN = 0xE,
    CtrlO = 0xF,
    CtrlP = 0x10,
    CtrlQ = 0x11,
    CtrlR = 0x12,
    CtrlS = 0x13,
    CtrlT = 0x14,
    CtrlU = 0x15,
    CtrlV = 0x16,
    CtrlW = 0x17,
    CtrlX = 0x18,
    CtrlY = 0x19,
    CtrlZ = 0x1A,
    Escape = 0x1B,
    FS = 0x1C,
    GS = 0x1D,
    RS = 0x1E,
    US = 0x1F,
    Backspace = 0x7F,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum CSI {
    CUU(usize),
    CUD(usize),
    CUF(usize),
    CUB(usize),
    CPR(usize, usize),
    CUP(usize, usize),
    ED(usize),
    DSR,
    Home,
    Delete,
    End,
    Unknown(u8),
}

impl CSI {
    fn new(byte: u8, arg1: Option<usize>, arg2: Option<usize>) -> Self {
        match byte as char {
            'A' => Self::CUU(arg1.unwrap_or(1)),
            'B' => Self::CUD(arg1.unwrap_or(1)),
            'C' => Self::CUF(arg1.unwrap_or(1)),
            'D' => Self::CUB(arg1.unwrap_or(1)),
            'F' => Self::End,
            'H' => Self::CUP(arg1.unwrap_or(1), arg2.unwrap_or(1)),
            'J' => Self::ED(arg1.unwrap_or(0)),
            'R' => Self::CPR(arg1.unwrap_or(1), arg2.unwrap_or(1)),
            'n' => Self::DSR,
            '~' => match arg1 {
                Some(1) | Some(7) => Self::Home,
                Some(3) => Self::Delete,
                Some(4) | Some(8) => Self::End,
                _ => Self::Unknown(byte),
            },
            _ => Self::Unknown(byte),
        }
    }
}

/// One decoded editor event.
///
/// Bytes in `0x20..` outside escape sequences are inserted verbatim;
/// the buffer is edited at the byte level.
#[cfg_attr(test, derive(Debug))]
#[derive(Eq, PartialEq, Copy, Clone)]
pub enum Action {
    Ignore,
    Print(u8),
    ControlCharacter(ControlCharacter),
    EscapeSequence(u8),
    ControlSequenceIntroducer(CSI),
}

impl Action {
    fn control_character(byte: u8) -> Self {
        match ControlCharacter::try_from(byte) {
            Ok(c) => Action::ControlCharacter(c),
            Err(_) => Action::Ignore,
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
enum State {
    Ground,
    EscapeSequence,
    CSIStart,
    CSIArg1(Option<usize>),
    CSIArg2(Option<usize>, Option<usize>),
}

/// Byte-at-a-time decoder with bounded lookahead for escape sequences.
pub struct Parser {
    state: State,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
        }
    }

    pub fn advance(&mut self, byte: u8) -> Action {
        match self.state {
            State::Ground => match byte {
                0x1b => {
                    self.state = State::EscapeSequence;
                    Action::Ignore
                }
                0x0..=0x1a | 0x1c..=0x1f | 0x7f => Action::control_character(byte),
                0x20..=0x7e | 0x80..=0xff => Action::Print(byte),
            },
            State::EscapeSequence => {
                if byte == 0x5b {
                    self.state = State::CSIStart;
                    Action::Ignore
                } else {
                    self.state = State::Ground;
                    Action::EscapeSequence(byte)
                }
            }
            State::CSIStart => match byte {
                0x30..=0x39 => {
                    self.state = State::CSIArg1(Some((byte - 0x30) as usize));
                    Action::Ignore
                }
                0x3b => {
                    self.state = State::CSIArg2(None, None);
                    Action::Ignore
                }
                0x40..=0x7e => {
                    self.state = State::Ground;
                    Action::ControlSequenceIntroducer(CSI::new(byte, None, None))
                }
                _ => Action::Ignore,
            },
            State::CSIArg1(value) => match byte {
                0x30..=0x39 => {
                    let value = value.unwrap_or(0) * 10 + (byte - 0x30) as usize;
                    self.state = State::CSIArg1(Some(value));
                    Action::Ignore
                }
                0x3b => {
                    self.state = State::CSIArg2(value, None);
                    Action::Ignore
                }
                0x40..=0x7e => {
                    self.state = State::Ground;
                    Action::ControlSequenceIntroducer(CSI::new(byte, value, None))
                }
                _ => Action::Ignore,
            },
            State::CSIArg2(arg1, arg2) => match byte {
                0x30..=0x39 => {
                    let arg2 = arg2.unwrap_or(0) * 10 + (byte - 0x30) as usize;
                    self.state = State::CSIArg2(arg1, Some(arg2));
                    Action::Ignore
                }
                0x3b => {
                    // Extra parameters are not used by any sequence we
                    // care about; keep consuming digits into arg2.
                    self.state = State::CSIArg2(arg1, arg2);
                    Action::Ignore
                }
                0x40..=0x7e => {
                    self.state = State::Ground;
                    Action::ControlSequenceIntroducer(CSI::new(byte, arg1, arg2))
                }
                _ => Action::Ignore,
            },
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ControlCharacter::*;

    fn input_sequence(parser: &mut Parser, seq: &str) -> Vec<Action> {
        seq.bytes().map(|b| parser.advance(b)).collect()
    }

    #[test]
    fn parser() {
        let mut parser = Parser::new();

        assert_eq!(parser.state, State::Ground);

        assert_eq!(parser.advance(b'a'), Action::Print(b'a'));
        assert_eq!(parser.advance(0x7), Action::ControlCharacter(CtrlG));
        assert_eq!(parser.advance(0x3), Action::ControlCharacter(CtrlC));
        assert_eq!(parser.advance(0x9), Action::ControlCharacter(Tab));
        assert_eq!(parser.advance(0x7f), Action::ControlCharacter(Backspace));

        // Multi-byte UTF-8 input arrives as individual byte inserts.
        let actions = input_sequence(&mut parser, "æ");
        assert_eq!(actions, [Action::Print(0xc3), Action::Print(0xa6)]);

        let mut actions = input_sequence(&mut parser, "\x1b[312;836R");
        assert_eq!(
            actions.pop().unwrap(),
            Action::ControlSequenceIntroducer(CSI::CPR(312, 836))
        );
        while let Some(action) = actions.pop() {
            assert_eq!(action, Action::Ignore);
        }

        let mut actions = input_sequence(&mut parser, "\x1b[A");
        assert_eq!(
            actions.pop().unwrap(),
            Action::ControlSequenceIntroducer(CSI::CUU(1))
        );

        let mut actions = input_sequence(&mut parser, "\x1b[10B");
        assert_eq!(
            actions.pop().unwrap(),
            Action::ControlSequenceIntroducer(CSI::CUD(10))
        );

        let mut actions = input_sequence(&mut parser, "\x1b[H");
        assert_eq!(
            actions.pop().unwrap(),
            Action::ControlSequenceIntroducer(CSI::CUP(1, 1))
        );

        let mut actions = input_sequence(&mut parser, "\x1b[F");
        assert_eq!(
            actions.pop().unwrap(),
            Action::ControlSequenceIntroducer(CSI::End)
        );

        let mut actions = input_sequence(&mut parser, "\x1b[1~");
        assert_eq!(
            actions.pop().unwrap(),
            Action::ControlSequenceIntroducer(CSI::Home)
        );

        let mut actions = input_sequence(&mut parser, "\x1b[3~");
        assert_eq!(
            actions.pop().unwrap(),
            Action::ControlSequenceIntroducer(CSI::Delete)
        );
    }

    #[test]
    fn escape_sequences() {
        let mut parser = Parser::new();

        let mut actions = input_sequence(&mut parser, "\x1bb");
        assert_eq!(actions.pop().unwrap(), Action::EscapeSequence(b'b'));

        let mut actions = input_sequence(&mut parser, "\x1bf");
        assert_eq!(actions.pop().unwrap(), Action::EscapeSequence(b'f'));

        let mut actions = input_sequence(&mut parser, "\x1bd");
        assert_eq!(actions.pop().unwrap(), Action::EscapeSequence(b'd'));

        assert_eq!(parser.advance(0x1b), Action::Ignore);
        assert_eq!(parser.advance(0x8), Action::EscapeSequence(0x8));
    }

    #[test]
    fn unknown_csi_is_reported_once() {
        let mut parser = Parser::new();

        let mut actions = input_sequence(&mut parser, "\x1b[5Z");
        assert_eq!(
            actions.pop().unwrap(),
            Action::ControlSequenceIntroducer(CSI::Unknown(b'Z'))
        );

        // Parser must be back in ground state.
        assert_eq!(parser.advance(b'x'), Action::Print(b'x'));
    }
}
