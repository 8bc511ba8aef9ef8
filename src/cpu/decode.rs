//! Instruction decoder.
//!
//! Every byte in the program store decodes to an opcode class plus a
//! one-bit sign that selects between the two polarities of that class.
//! Decoding is total: bytes outside the instruction set are NOPs.

use serde::{Serialize, Deserialize};
use std::fmt;

/// Operation class of an instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Opcode {
    /// No effect.
    #[default]
    Nop,
    /// Move the tape pointer one cell.
    Move,
    /// Increment or decrement the current cell.
    Update,
    /// Loop bracket.
    Loop,
    /// Emit the current cell on the output port.
    Out,
}

/// Polarity bit attached to an opcode.
///
/// `Positive` is sign 0 (`>`, `+`, `]`, `.`), `Negative` is sign 1
/// (`<`, `-`, `[`). For LOOP the negative polarity is the opening bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

impl Sign {
    /// Signed unit step for this polarity: +1 or -1.
    #[inline]
    pub const fn step(self) -> i32 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }

    /// True for the negative polarity (sign bit set).
    #[inline]
    pub const fn is_negative(self) -> bool {
        matches!(self, Sign::Negative)
    }
}

/// A decoded instruction: opcode plus sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Opcode,
    pub sign: Sign,
}

impl Instruction {
    /// The instruction every unrecognized byte decodes to.
    pub const NOP: Instruction = Instruction { op: Opcode::Nop, sign: Sign::Positive };

    pub const fn new(op: Opcode, sign: Sign) -> Self {
        Self { op, sign }
    }

    /// True if this is an opening bracket `[`.
    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self.op, Opcode::Loop) && self.sign.is_negative()
    }

    /// True if this is a closing bracket `]`.
    #[inline]
    pub const fn is_close(self) -> bool {
        matches!(self.op, Opcode::Loop) && !self.sign.is_negative()
    }

    /// Source symbol for this instruction, if it has one.
    pub const fn symbol(self) -> Option<char> {
        match (self.op, self.sign) {
            (Opcode::Move, Sign::Positive) => Some('>'),
            (Opcode::Move, Sign::Negative) => Some('<'),
            (Opcode::Update, Sign::Positive) => Some('+'),
            (Opcode::Update, Sign::Negative) => Some('-'),
            (Opcode::Loop, Sign::Positive) => Some(']'),
            (Opcode::Loop, Sign::Negative) => Some('['),
            (Opcode::Out, _) => Some('.'),
            (Opcode::Nop, _) => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.sign.is_negative() { '-' } else { '+' };
        match self.op {
            Opcode::Nop => write!(f, "NOP"),
            Opcode::Move => write!(f, "MOVE {}", sign),
            Opcode::Update => write!(f, "UPDATE {}", sign),
            Opcode::Loop if self.sign.is_negative() => write!(f, "LOOP open"),
            Opcode::Loop => write!(f, "LOOP close"),
            Opcode::Out => write!(f, "OUT"),
        }
    }
}

/// Decode a program byte.
pub fn decode(byte: u8) -> Instruction {
    use Opcode::*;
    use Sign::*;

    match byte {
        b'>' => Instruction::new(Move, Positive),
        b'<' => Instruction::new(Move, Negative),
        b'+' => Instruction::new(Update, Positive),
        b'-' => Instruction::new(Update, Negative),
        b']' => Instruction::new(Loop, Positive),
        b'[' => Instruction::new(Loop, Negative),
        b'.' => Instruction::new(Out, Positive),
        _ => Instruction::NOP,
    }
}

/// Encode an instruction back to its canonical program byte.
///
/// NOP encodes to 0, the padding byte the assembler emits.
pub fn encode(instr: Instruction) -> u8 {
    instr.symbol().map_or(0, |c| c as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table() {
        assert_eq!(decode(b'>'), Instruction::new(Opcode::Move, Sign::Positive));
        assert_eq!(decode(b'<'), Instruction::new(Opcode::Move, Sign::Negative));
        assert_eq!(decode(b'+'), Instruction::new(Opcode::Update, Sign::Positive));
        assert_eq!(decode(b'-'), Instruction::new(Opcode::Update, Sign::Negative));
        assert_eq!(decode(b']'), Instruction::new(Opcode::Loop, Sign::Positive));
        assert_eq!(decode(b'['), Instruction::new(Opcode::Loop, Sign::Negative));
        assert_eq!(decode(b'.'), Instruction::new(Opcode::Out, Sign::Positive));
    }

    #[test]
    fn test_decode_defaults_to_nop() {
        for byte in [0u8, b' ', b'a', b',', b'\n', 0x7f, 0xff] {
            assert_eq!(decode(byte), Instruction::NOP, "byte {:#04x}", byte);
        }
    }

    #[test]
    fn test_high_bit_is_not_masked() {
        // '>' with bit 7 set is not an instruction
        assert_eq!(decode(b'>' | 0x80), Instruction::NOP);
    }

    #[test]
    fn test_bracket_polarity() {
        assert!(decode(b'[').is_open());
        assert!(!decode(b'[').is_close());
        assert!(decode(b']').is_close());
        assert!(!decode(b'+').is_open());
    }

    #[test]
    fn test_encode_inverts_decode() {
        for &byte in b"><+-[]." {
            assert_eq!(encode(decode(byte)), byte);
        }
        assert_eq!(encode(Instruction::NOP), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(decode(b'[').to_string(), "LOOP open");
        assert_eq!(decode(b'-').to_string(), "UPDATE -");
        assert_eq!(decode(b'x').to_string(), "NOP");
    }
}
