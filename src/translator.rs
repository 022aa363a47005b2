//! Drives the VM parser and the code writer over one or more source files.

use tracing::{debug, info};

use crate::asm_parser::is_symbol;
use crate::code_writer::CodeWriter;
use crate::parser::{Parsed, Parser};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Prepend `SP = 256; call Sys.init 0`.
    pub bootstrap: bool,
    /// Echo each VM line as an assembly comment.
    pub comments: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            bootstrap: false,
            comments: true,
        }
    }
}

/// `Closed` has no variant: `finish` consumes the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Emitting,
}

pub struct Translator {
    writer: CodeWriter,
    options: Options,
    state: State,
    output: Vec<String>,
}

impl Translator {
    pub fn new(options: Options) -> Self {
        Translator {
            writer: CodeWriter::new(),
            options,
            state: State::Idle,
            output: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn start_emitting(&mut self) {
        if self.state == State::Emitting {
            return;
        }
        self.state = State::Emitting;
        if self.options.bootstrap {
            if self.options.comments {
                self.output.push("// bootstrap".to_string());
            }
            self.output.extend(self.writer.bootstrap());
        }
    }

    /// Translate one source file. `name` is the file stem that namespaces its
    /// statics and top-level labels, so it must itself be a symbol.
    pub fn translate_unit(&mut self, name: &str, source: &str) -> Result<()> {
        if !is_symbol(name) {
            return Err(Error::invalid_operand(name, "file name is not a valid symbol"));
        }
        debug!(file = name, "translating unit");
        self.writer.set_file_name(name);
        let mut commands = 0;

        for parsed in Parser::new(source) {
            let Parsed {
                line,
                text,
                command,
            } = parsed?;
            self.start_emitting();
            if self.options.comments {
                self.output.push(format!("// {}", text));
            }
            let code = self
                .writer
                .write(&command)
                .map_err(|e| e.at_line(line, text))?;
            self.output.extend(code);
            commands += 1;
        }

        self.writer
            .check_labels()
            .map_err(|e| in_file(e, name))?;
        info!(file = name, commands, "translated");
        Ok(())
    }

    /// Append the halt loop and hand back the finished program.
    pub fn finish(mut self) -> Vec<String> {
        self.output.extend(self.writer.halt());
        self.output
    }
}

fn in_file(err: Error, name: &str) -> Error {
    match err {
        Error::UndefinedSymbol(sym) => Error::UndefinedSymbol(format!("{} (in {})", sym, name)),
        other => other,
    }
}

/// Translate a single source unit with default options.
pub fn translate(name: &str, source: &str) -> Result<Vec<String>> {
    let mut translator = Translator::new(Options::default());
    translator.translate_unit(name, source)?;
    Ok(translator.finish())
}
