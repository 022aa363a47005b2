//! A toolchain for the 16-bit Hack computer.
//!
//! [`translator`] turns the stack-based VM language into Hack assembly, and
//! [`assembler`] turns Hack assembly into 16-bit binary words.
//!
//! ```
//! use hack_toolchain::{assembler, translator};
//!
//! let asm = translator::translate("Main", "push constant 7\npush constant 8\nadd\n")?;
//! let binary = assembler::assemble_to_binary(&asm.join("\n"))?;
//! assert_eq!(binary[0], "0000000000000111");
//! # Ok::<(), hack_toolchain::Error>(())
//! ```

pub mod asm_parser;
pub mod assembler;
pub mod ast;
pub mod code_writer;
pub mod error;
pub mod files;
pub mod instruction;
pub mod logging;
pub mod mnemonic;
pub mod parser;
pub mod symbol_table;
pub mod translator;

pub use error::{Error, Result};
