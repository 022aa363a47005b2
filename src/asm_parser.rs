use std::iter::Enumerate;
use std::str::Lines;

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, opt, verify},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use crate::error::Field;
use crate::instruction::{Address, Dest, Instruction};
use crate::{Error, Result};

/// Characters a symbol may contain. Symbols never start with a digit.
pub(crate) fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.$:".contains(c)
}

pub(crate) fn symbol(input: &str) -> IResult<&str, &str> {
    verify(take_while1(is_symbol_char), |s: &str| {
        !s.starts_with(|c: char| c.is_ascii_digit())
    })(input)
}

/// Whether all of `text` is one symbol.
pub(crate) fn is_symbol(text: &str) -> bool {
    all_consuming(symbol)(text).is_ok()
}

#[test]
fn test_symbol() {
    assert_eq!(symbol("Main.loop$1 rest"), Ok((" rest", "Main.loop$1")));
    assert!(symbol("1abc").is_err());
    assert!(is_symbol("Main.loop$1"));
    assert!(!is_symbol("my-prog"));
    assert!(!is_symbol("7seg"));
}

// Anything too long for a u32 is an overflow anyway.
fn literal(input: &str) -> IResult<&str, u32> {
    map(digit1, |digits: &str| digits.parse().unwrap_or(u32::MAX))(input)
}

enum Shape<'a> {
    Address(Address),
    Label(&'a str),
    Compute(Option<&'a str>, &'a str, Option<&'a str>),
}

fn address(input: &str) -> IResult<&str, Shape> {
    map(
        preceded(
            char('@'),
            alt((
                map(literal, Address::Literal),
                map(symbol, |s| Address::Symbol(s.to_string())),
            )),
        ),
        Shape::Address,
    )(input)
}

fn label(input: &str) -> IResult<&str, Shape> {
    map(delimited(char('('), symbol, char(')')), Shape::Label)(input)
}

fn letters(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphabetic())(input)
}

/// Registers, digits and operators. Whether the combination is a known
/// computation is up to the encoder.
fn is_comp_char(c: char) -> bool {
    c.is_ascii_digit()
        || "ADM".contains(c)
        || (c.is_ascii_punctuation() && !";=()@".contains(c))
}

fn compute(input: &str) -> IResult<&str, Shape> {
    map(
        tuple((
            opt(terminated(letters, char('='))),
            take_while1(is_comp_char),
            opt(preceded(char(';'), letters)),
        )),
        |(dest, comp, jump)| Shape::Compute(dest, comp, jump),
    )(input)
}

#[test]
fn test_compute_shape() {
    match compute("AM=M+1;JGT") {
        Ok(("", Shape::Compute(Some("AM"), "M+1", Some("JGT")))) => {}
        _ => panic!("expected full compute"),
    }
    match compute("0;JMP") {
        Ok(("", Shape::Compute(None, "0", Some("JMP")))) => {}
        _ => panic!("expected jump-only compute"),
    }
    match compute("D=D*A") {
        Ok(("", Shape::Compute(Some("D"), "D*A", None))) => {}
        _ => panic!("expected unknown comp to still be a compute"),
    }
}

fn parse_dest(text: &str) -> Result<Dest> {
    let mut dest = Dest::default();
    if text == "null" {
        return Ok(dest);
    }
    for c in text.chars() {
        let slot = match c {
            'A' => &mut dest.a,
            'D' => &mut dest.d,
            'M' => &mut dest.m,
            _ => return Err(Error::unknown(Field::Dest, text)),
        };
        if *slot {
            return Err(Error::unknown(Field::Dest, text));
        }
        *slot = true;
    }
    Ok(dest)
}

/// Remove the trailing comment and every whitespace character.
pub fn normalize(line: &str) -> String {
    let code = line.split("//").next().unwrap_or("");
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn test_normalize() {
    assert_eq!(normalize("  D = D + M // add"), "D=D+M");
    assert_eq!(normalize("// only a comment"), "");
    assert_eq!(normalize("\t"), "");
}

/// Classify one normalized, non-empty line.
pub fn parse_instruction(line: &str) -> Result<Instruction> {
    let shape = match all_consuming(alt((address, label, compute)))(line) {
        Ok((_, shape)) => shape,
        Err(_) => return Err(Error::MalformedInstruction(line.to_string())),
    };

    Ok(match shape {
        Shape::Address(address) => Instruction::Address(address),
        Shape::Label(name) => Instruction::Label(name.to_string()),
        Shape::Compute(dest, comp, jump) => Instruction::Compute {
            dest: dest.map(parse_dest).transpose()?.unwrap_or_default(),
            comp: comp.to_string(),
            jump: jump.filter(|j| *j != "null").map(str::to_string),
        },
    })
}

/// An instruction together with the 1-based line it came from.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Parsed {
    pub line: usize,
    pub instruction: Instruction,
}

/// Lazily yields the instructions of an assembly source, skipping blank and
/// comment-only lines.
pub struct Parser<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            lines: source.lines().enumerate(),
        }
    }

    /// Next instruction, or `None` once the source is exhausted.
    pub fn advance(&mut self) -> Result<Option<Parsed>> {
        for (index, raw) in self.lines.by_ref() {
            let line = normalize(raw);
            if line.is_empty() {
                continue;
            }
            let instruction =
                parse_instruction(&line).map_err(|e| e.at_line(index + 1, raw.trim()))?;
            return Ok(Some(Parsed {
                line: index + 1,
                instruction,
            }));
        }
        Ok(None)
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Parsed>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}
