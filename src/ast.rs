use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

/// How a segment's `index` turns into a RAM address.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Addressing {
    /// `*base + index`, where `base` is a pointer register
    Indirect(&'static str),
    /// `base + index`
    Fixed(u16),
    /// `Pointer` selects THIS or THAT by index
    Register,
    /// `<file>.<index>`
    Static,
    /// No memory, the index is the value
    Literal,
}

pub const TEMP_BASE: u16 = 5;
pub const TEMP_SIZE: u16 = 8;

impl Segment {
    pub fn name(&self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }

    pub fn addressing(&self) -> Addressing {
        match self {
            Segment::Constant => Addressing::Literal,
            Segment::Local => Addressing::Indirect("LCL"),
            Segment::Argument => Addressing::Indirect("ARG"),
            Segment::This => Addressing::Indirect("THIS"),
            Segment::That => Addressing::Indirect("THAT"),
            Segment::Temp => Addressing::Fixed(TEMP_BASE),
            Segment::Pointer => Addressing::Register,
            Segment::Static => Addressing::Static,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    // Stack basics
    Arithmetic(ArithmeticOp),
    Push(Segment, u16),
    Pop(Segment, u16),

    // Control
    Label(String),
    Goto(String),
    IfGoto(String),

    // Functions
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl Command {
    /// The mnemonic for arithmetic commands, otherwise the first operand.
    pub fn arg1(&self) -> Option<&str> {
        match self {
            Command::Arithmetic(op) => Some(op.mnemonic()),
            Command::Push(seg, _) | Command::Pop(seg, _) => Some(seg.name()),
            Command::Label(name)
            | Command::Goto(name)
            | Command::IfGoto(name)
            | Command::Function(name, _)
            | Command::Call(name, _) => Some(name),
            Command::Return => None,
        }
    }

    /// The index or count operand of push, pop, function and call.
    pub fn arg2(&self) -> Option<u16> {
        match self {
            Command::Push(_, n)
            | Command::Pop(_, n)
            | Command::Function(_, n)
            | Command::Call(_, n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => f.write_str(op.mnemonic()),
            Command::Push(seg, n) => write!(f, "push {} {}", seg, n),
            Command::Pop(seg, n) => write!(f, "pop {} {}", seg, n),
            Command::Label(name) => write!(f, "label {}", name),
            Command::Goto(name) => write!(f, "goto {}", name),
            Command::IfGoto(name) => write!(f, "if-goto {}", name),
            Command::Function(name, n) => write!(f, "function {} {}", name, n),
            Command::Call(name, n) => write!(f, "call {} {}", name, n),
            Command::Return => f.write_str("return"),
        }
    }
}

#[test]
fn test_args() {
    let push = Command::Push(Segment::Local, 3);
    assert_eq!(push.arg1(), Some("local"));
    assert_eq!(push.arg2(), Some(3));
    assert_eq!(Command::Arithmetic(ArithmeticOp::Lt).arg1(), Some("lt"));
    assert_eq!(Command::Return.arg1(), None);
    assert_eq!(Command::Goto("LOOP".into()).arg2(), None);
    assert_eq!(Command::Call("Math.max".into(), 2).to_string(), "call Math.max 2");
}
