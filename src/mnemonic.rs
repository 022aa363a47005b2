//! Bit-field tables for C-instructions and their inverses.
//!
//! A C-instruction word is laid out as `111a cccc ccdd djjj`.

use crate::error::{Field, Result};
use crate::instruction::{Address, Dest, Instruction};
use crate::Error;

/// `comp` encodings in their A-register spelling. The memory forms share the
/// same bits with `a` set.
const COMP: [(&str, u16); 18] = [
    ("0", 0b101010),
    ("1", 0b111111),
    ("-1", 0b111010),
    ("D", 0b001100),
    ("A", 0b110000),
    ("!D", 0b001101),
    ("!A", 0b110001),
    ("-D", 0b001111),
    ("-A", 0b110011),
    ("D+1", 0b011111),
    ("A+1", 0b110111),
    ("D-1", 0b001110),
    ("A-1", 0b110010),
    ("D+A", 0b000010),
    ("D-A", 0b010011),
    ("A-D", 0b000111),
    ("D&A", 0b000000),
    ("D|A", 0b010101),
];

const JUMP: [(&str, u16); 7] = [
    ("JGT", 0b001),
    ("JEQ", 0b010),
    ("JGE", 0b011),
    ("JLT", 0b100),
    ("JNE", 0b101),
    ("JLE", 0b110),
    ("JMP", 0b111),
];

const C_PREFIX: u16 = 0b111 << 13;

/// Largest value an A-instruction can load.
pub const MAX_LITERAL: u32 = (1 << 15) - 1;

/// Returns the `a` bit and the six `c` bits for a computation.
pub fn encode_comp(comp: &str) -> Result<(u16, u16)> {
    let uses_memory = comp.contains('M');
    if uses_memory && comp.contains('A') {
        return Err(Error::unknown(Field::Comp, comp));
    }
    let normalized = comp.replace('M', "A");
    COMP.iter()
        .find(|(mnemonic, _)| *mnemonic == normalized)
        .map(|(_, bits)| (uses_memory as u16, *bits))
        .ok_or_else(|| Error::unknown(Field::Comp, comp))
}

/// `None` and `"null"` both mean "no jump".
pub fn encode_jump(jump: Option<&str>) -> Result<u16> {
    match jump {
        None | Some("null") => Ok(0),
        Some(jump) => JUMP
            .iter()
            .find(|(mnemonic, _)| *mnemonic == jump)
            .map(|(_, bits)| *bits)
            .ok_or_else(|| Error::unknown(Field::Jump, jump)),
    }
}

pub fn encode_compute(dest: &Dest, comp: &str, jump: Option<&str>) -> Result<u16> {
    let (a, c) = encode_comp(comp)?;
    let j = encode_jump(jump)?;
    Ok(C_PREFIX | a << 12 | c << 6 | dest.bits() << 3 | j)
}

pub fn encode_address(value: u32) -> Result<u16> {
    if value > MAX_LITERAL {
        return Err(Error::ValueOverflow(value));
    }
    Ok(value as u16)
}

/// Render a word the way the binary output file stores it.
pub fn to_binary(word: u16) -> String {
    format!("{:016b}", word)
}

fn decode_comp(a: u16, bits: u16) -> Option<String> {
    let (mnemonic, _) = COMP.iter().find(|(_, b)| *b == bits)?;
    Some(if a == 1 {
        mnemonic.replace('A', "M")
    } else {
        mnemonic.to_string()
    })
}

fn decode_jump(bits: u16) -> Option<String> {
    JUMP.iter()
        .find(|(_, b)| *b == bits)
        .map(|(mnemonic, _)| mnemonic.to_string())
}

/// Inverse of the encoders. Returns `None` for words that no instruction
/// assembles to.
pub fn decode(word: u16) -> Option<Instruction> {
    if word & 0x8000 == 0 {
        return Some(Instruction::Address(Address::Literal(word as u32)));
    }
    if word & C_PREFIX != C_PREFIX {
        return None;
    }
    let a = (word >> 12) & 1;
    let comp = decode_comp(a, (word >> 6) & 0b111111)?;
    if a == 1 && !comp.contains('M') {
        return None;
    }
    Some(Instruction::Compute {
        dest: Dest::from_bits((word >> 3) & 0b111),
        comp,
        jump: decode_jump(word & 0b111),
    })
}
