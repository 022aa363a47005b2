use std::iter::Enumerate;
use std::str::Lines;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{all_consuming, map_res, value},
    IResult,
};

use crate::asm_parser::symbol;
use crate::ast::{ArithmeticOp, Command, Segment, TEMP_SIZE};
use crate::error::Field;
use crate::mnemonic::MAX_LITERAL;
use crate::{Error, Result};

fn integer(input: &str) -> IResult<&str, u16> {
    map_res(digit1, |c: &str| c.parse())(input)
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        value(Segment::Constant, tag("constant")),
        value(Segment::Local, tag("local")),
        value(Segment::Static, tag("static")),
        value(Segment::Argument, tag("argument")),
        value(Segment::This, tag("this")),
        value(Segment::That, tag("that")),
        value(Segment::Pointer, tag("pointer")),
        value(Segment::Temp, tag("temp")),
    ))(input)
}

fn prim(input: &str) -> IResult<&str, ArithmeticOp> {
    alt((
        value(ArithmeticOp::Add, tag("add")),
        value(ArithmeticOp::Sub, tag("sub")),
        value(ArithmeticOp::Neg, tag("neg")),
        value(ArithmeticOp::Eq, tag("eq")),
        value(ArithmeticOp::Gt, tag("gt")),
        value(ArithmeticOp::Lt, tag("lt")),
        value(ArithmeticOp::And, tag("and")),
        value(ArithmeticOp::Or, tag("or")),
        value(ArithmeticOp::Not, tag("not")),
    ))(input)
}

#[test]
fn test_prim() {
    assert_eq!(prim("neg"), Ok(("", ArithmeticOp::Neg)));
}

/// Run `parser` over a whole token.
fn token<'a, O>(parser: impl FnMut(&'a str) -> IResult<&'a str, O>, input: &'a str) -> Option<O> {
    all_consuming(parser)(input).ok().map(|(_, out)| out)
}

#[test]
fn test_token() {
    assert_eq!(token(segment, "pointer"), Some(Segment::Pointer));
    assert_eq!(token(segment, "pointers"), None);
    assert_eq!(token(integer, "70000"), None);
}

fn operand(input: &str) -> Result<u16> {
    token(integer, input)
        .ok_or_else(|| Error::invalid_operand(input, "expected a non-negative 16-bit integer"))
}

fn memory_access(line: &str, keyword: &str, seg: &str, index: &str) -> Result<Command> {
    let malformed = || Error::MalformedCommand(line.to_string());
    let seg = token(segment, seg).ok_or_else(malformed)?;
    let index_value = operand(index)?;

    match seg {
        Segment::Pointer if index_value > 1 => {
            return Err(Error::invalid_operand(index, "pointer index must be 0 or 1"))
        }
        Segment::Temp if index_value >= TEMP_SIZE => {
            return Err(Error::invalid_operand(index, "temp index must be between 0 and 7"))
        }
        Segment::Constant if index_value as u32 > MAX_LITERAL => {
            return Err(Error::invalid_operand(index, "constant must fit in 15 bits"))
        }
        _ if index_value as u32 > MAX_LITERAL => {
            return Err(Error::invalid_operand(index, "index must fit in 15 bits"))
        }
        _ => {}
    }

    match (keyword, seg) {
        ("push", _) => Ok(Command::Push(seg, index_value)),
        ("pop", Segment::Constant) => Err(malformed()),
        _ => Ok(Command::Pop(seg, index_value)),
    }
}

/// Classify one comment-free, trimmed, non-empty line by its token count.
pub fn parse_command(line: &str) -> Result<Command> {
    let malformed = || Error::MalformedCommand(line.to_string());
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        ["return"] => Ok(Command::Return),
        [op] => token(prim, op)
            .map(Command::Arithmetic)
            .ok_or_else(|| Error::unknown(Field::Arithmetic, *op)),
        [keyword, name] => {
            let name = token(symbol, name).ok_or_else(malformed)?.to_string();
            match *keyword {
                "label" => Ok(Command::Label(name)),
                "goto" => Ok(Command::Goto(name)),
                "if-goto" => Ok(Command::IfGoto(name)),
                _ => Err(malformed()),
            }
        }
        [keyword @ ("push" | "pop"), seg, index] => memory_access(line, keyword, seg, index),
        [keyword @ ("function" | "call"), name, count_text] => {
            let name = token(symbol, name).ok_or_else(malformed)?.to_string();
            let count = operand(count_text)?;
            // `call` loads `count + 5` as a literal
            let limit = if *keyword == "call" { MAX_LITERAL - 5 } else { MAX_LITERAL };
            if count as u32 > limit {
                return Err(Error::invalid_operand(*count_text, "count is too large"));
            }
            Ok(if *keyword == "function" {
                Command::Function(name, count)
            } else {
                Command::Call(name, count)
            })
        }
        _ => Err(malformed()),
    }
}

/// Strip a trailing `//` comment and surrounding whitespace.
pub fn normalize(line: &str) -> &str {
    line.split("//").next().unwrap_or("").trim()
}

/// A command with its 1-based line and the source text it came from.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Parsed<'a> {
    pub line: usize,
    pub text: &'a str,
    pub command: Command,
}

/// Lazily yields the commands of a VM source.
pub struct Parser<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            lines: source.lines().enumerate(),
        }
    }

    pub fn advance(&mut self) -> Result<Option<Parsed<'a>>> {
        for (index, raw) in self.lines.by_ref() {
            let text = normalize(raw);
            if text.is_empty() {
                continue;
            }
            let command = parse_command(text).map_err(|e| e.at_line(index + 1, text))?;
            return Ok(Some(Parsed {
                line: index + 1,
                text,
                command,
            }));
        }
        Ok(None)
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Parsed<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

/// Parse a whole source, stopping at the first error.
pub fn parse(input: &str) -> Result<Vec<Command>> {
    Parser::new(input)
        .map(|parsed| parsed.map(|p| p.command))
        .collect()
}
