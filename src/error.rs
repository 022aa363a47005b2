use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Which field of a C-instruction (or VM command) a mnemonic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Dest,
    Comp,
    Jump,
    Arithmetic,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Dest => "dest",
            Field::Comp => "comp",
            Field::Jump => "jump",
            Field::Arithmetic => "arithmetic",
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed instruction `{0}`")]
    MalformedInstruction(String),

    #[error("malformed command `{0}`")]
    MalformedCommand(String),

    #[error("unknown {field} mnemonic `{mnemonic}`")]
    UnknownMnemonic { field: Field, mnemonic: String },

    #[error("invalid operand `{operand}`: {reason}")]
    InvalidOperand { operand: String, reason: String },

    #[error("value {0} does not fit in 15 bits")]
    ValueOverflow(u32),

    #[error("undefined symbol `{0}`")]
    UndefinedSymbol(String),

    #[error("symbol `{0}` is already bound")]
    DuplicateSymbol(String),

    #[error("line {line}: `{text}`: {error}")]
    AtLine {
        line: usize,
        text: String,
        error: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_operand(operand: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidOperand {
            operand: operand.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(field: Field, mnemonic: impl Into<String>) -> Self {
        Error::UnknownMnemonic {
            field,
            mnemonic: mnemonic.into(),
        }
    }

    /// Attach the source location this error was raised at.
    pub(crate) fn at_line(self, line: usize, text: &str) -> Self {
        match self {
            located @ Error::AtLine { .. } => located,
            other => Error::AtLine {
                line,
                text: text.to_string(),
                error: Box::new(other),
            },
        }
    }

    /// The underlying error with any location wrapper removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::AtLine { error, .. } => error.root(),
            other => other,
        }
    }

    /// 1-based source line, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }
}
