use std::collections::HashMap;

use tracing::debug;

use crate::{Error, Result};

/// First RAM address handed out to variable symbols.
pub const VARIABLE_BASE: u16 = 16;

pub const SCREEN: u16 = 16384;
pub const KBD: u16 = 24576;

const PREDEFINED: [(&str, u16); 7] = [
    ("SP", 0),
    ("LCL", 1),
    ("ARG", 2),
    ("THIS", 3),
    ("THAT", 4),
    ("SCREEN", SCREEN),
    ("KBD", KBD),
];

/// Whether every assembler run binds `symbol` before reading any source.
pub fn is_predefined(symbol: &str) -> bool {
    PREDEFINED.iter().any(|(name, _)| *name == symbol)
        || (0..16).any(|i| symbol == format!("R{}", i))
}

/// Symbol name to address mapping for one assembler run.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: HashMap<String, u16>,
    next_variable: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A table holding only the predefined symbols.
    pub fn new() -> Self {
        let symbols = (0..16)
            .map(|i| (format!("R{}", i), i))
            .chain(PREDEFINED.iter().map(|(name, addr)| (name.to_string(), *addr)))
            .collect();
        SymbolTable {
            symbols,
            next_variable: VARIABLE_BASE,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<u16> {
        self.symbols.get(symbol).copied()
    }

    /// Bind a label to a ROM address. A symbol is never rebound.
    pub fn add_label(&mut self, label: &str, address: u16) -> Result<()> {
        if self.contains(label) {
            return Err(Error::DuplicateSymbol(label.to_string()));
        }
        debug!(label, address, "bound label");
        self.symbols.insert(label.to_string(), address);
        Ok(())
    }

    /// Address of `symbol`, allocating the next free RAM slot on first use.
    pub fn resolve_variable(&mut self, symbol: &str) -> u16 {
        if let Some(address) = self.get(symbol) {
            return address;
        }
        let address = self.next_variable;
        self.next_variable = self.next_variable.saturating_add(1);
        debug!(symbol, address, "allocated variable");
        self.symbols.insert(symbol.to_string(), address);
        address
    }
}
