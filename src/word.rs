use std::{error::Error, fmt};

/// Width of a machine word in bits.
pub const WORD_BITS: usize = 16;

/// Extract `width` bits of `instr`, starting at bit `shift` (counted from the least significant bit).
#[inline]
pub fn bits(instr: u16, shift: u32, width: u32) -> u16 {
    debug_assert!(width > 0 && shift + width <= 16);
    let mask = (1u32 << width) - 1;
    ((instr as u32 >> shift) & mask) as u16
}

/// Sign-extend the lowest `bits` bits of `val` to a full word.
#[inline]
pub fn sign_extend(val: u16, bits: u32) -> u16 {
    debug_assert!(bits > 0 && bits <= 16);
    if bits == 16 {
        return val;
    }
    let magnitude = val & ((1u16 << bits) - 1);
    if magnitude & (1u16 << (bits - 1)) == 0 {
        magnitude
    } else {
        // Sign bit and everything above it set
        magnitude | (u16::MAX << bits)
    }
}

/// Parse a word from its wire representation: 16 characters of `0`/`1`, most significant first.
pub fn parse_word(text: &str) -> Result<u16, WordError> {
    let len = text.chars().count();
    if len != WORD_BITS {
        return Err(WordError::WrongLength { len });
    }
    parse_bits(text)
}

/// Parse between 1 and 16 binary digits and sign-extend the result using the leading digit.
pub fn parse_signed_bits(text: &str) -> Result<u16, WordError> {
    let len = text.chars().count();
    if len == 0 || len > WORD_BITS {
        return Err(WordError::WrongLength { len });
    }
    let raw = parse_bits(text)?;
    Ok(sign_extend(raw, len as u32))
}

fn parse_bits(text: &str) -> Result<u16, WordError> {
    let mut word = 0u16;
    for (index, ch) in text.chars().enumerate() {
        let bit = match ch {
            '0' => 0,
            '1' => 1,
            _ => return Err(WordError::InvalidChar { ch, index }),
        };
        word = (word << 1) | bit;
    }
    Ok(word)
}

/// Wire representation of a word.
pub fn format_word(word: u16) -> String {
    format!("{:016b}", word)
}

/// Malformed wire-format word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordError {
    WrongLength { len: usize },
    InvalidChar { ch: char, index: usize },
}

impl Error for WordError {}

impl fmt::Display for WordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength { len } => {
                write!(f, "Expected {} binary digits, found {}", WORD_BITS, len)
            }
            Self::InvalidChar { ch, index } => {
                write!(f, "Invalid binary digit `{}` at position {}", ch, index)
            }
        }
    }
}
