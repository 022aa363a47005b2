//! Two-pass assembler: labels are collected first so they can be referenced
//! before they are declared, then every real instruction is encoded.

use tracing::{debug, info, trace};

use crate::asm_parser::{Parsed, Parser};
use crate::instruction::{Address, Instruction};
use crate::mnemonic;
use crate::symbol_table::SymbolTable;
use crate::{Error, Result};

/// Owns the symbol table for exactly one run.
#[derive(Debug, Default)]
pub struct Assembler {
    symbols: SymbolTable,
}

impl Assembler {
    pub fn new() -> Self {
        Assembler {
            symbols: SymbolTable::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Pass 1: bind every label to the address of the instruction after it.
    pub fn collect_labels(&mut self, source: &str) -> Result<()> {
        let mut counter: u32 = 0;
        for parsed in Parser::new(source) {
            let Parsed { line, instruction } = parsed?;
            match &instruction {
                Instruction::Label(name) => {
                    let address =
                        u16::try_from(counter).map_err(|_| Error::ValueOverflow(counter));
                    address
                        .and_then(|address| self.symbols.add_label(name, address))
                        .map_err(|e| e.at_line(line, &instruction.to_string()))?;
                }
                Instruction::Address(_) | Instruction::Compute { .. } => counter += 1,
            }
        }
        debug!(instructions = counter, "collected labels");
        Ok(())
    }

    /// Pass 2: resolve symbols, allocating variables, and encode.
    pub fn encode(&mut self, source: &str) -> Result<Vec<u16>> {
        let mut words = Vec::new();
        for parsed in Parser::new(source) {
            let Parsed { line, instruction } = parsed?;
            if let Some(word) = self
                .encode_instruction(&instruction)
                .map_err(|e| e.at_line(line, &instruction.to_string()))?
            {
                trace!(line, %instruction, word = %mnemonic::to_binary(word));
                words.push(word);
            }
        }
        Ok(words)
    }

    /// `None` for labels, which occupy no ROM.
    pub fn encode_instruction(&mut self, instruction: &Instruction) -> Result<Option<u16>> {
        let word = match instruction {
            Instruction::Address(Address::Literal(value)) => mnemonic::encode_address(*value)?,
            Instruction::Address(Address::Symbol(symbol)) => {
                let address = self.symbols.resolve_variable(symbol);
                mnemonic::encode_address(address as u32)?
            }
            Instruction::Compute { dest, comp, jump } => {
                mnemonic::encode_compute(dest, comp, jump.as_deref())?
            }
            Instruction::Label(_) => return Ok(None),
        };
        Ok(Some(word))
    }

    pub fn assemble(mut self, source: &str) -> Result<Vec<u16>> {
        self.collect_labels(source)?;
        let words = self.encode(source)?;
        info!(words = words.len(), "assembled");
        Ok(words)
    }
}

/// Assemble a whole source into machine words.
pub fn assemble(source: &str) -> Result<Vec<u16>> {
    Assembler::new().assemble(source)
}

/// Assemble a whole source into the lines of a `.hack` file.
pub fn assemble_to_binary(source: &str) -> Result<Vec<String>> {
    Ok(assemble(source)?
        .into_iter()
        .map(mnemonic::to_binary)
        .collect())
}
