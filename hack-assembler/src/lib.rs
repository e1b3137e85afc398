//! Assembler for the 16-bit Hack architecture.
//!
//! Translates symbolic Hack assembly into binary machine code in two passes:
//!
//! 1. **Pass 1** walks the commands and binds each `(LABEL)` to the ROM
//!    address of the next real instruction. Nothing is emitted.
//! 2. **Pass 2** emits exactly one 16-bit word per A- or C-command,
//!    allocating RAM cells for fresh variable symbols from address 16 up.
//!
//! # Example
//!
//! ```
//! let lines: Vec<String> = ["@2", "D=A", "@3", "D=D+A"]
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! let words = hack_assembler::assemble(&lines).unwrap();
//! assert_eq!(words[0], "0000000000000010");
//! assert_eq!(words[1], "1110110000010000");
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod code;
pub mod error;
pub mod parser;
pub mod symbol_table;

pub use error::AsmError;
pub use parser::{Command, Parser};
pub use symbol_table::SymbolTable;

/// RAM address handed to the first variable symbol.
const FIRST_VARIABLE_ADDRESS: u16 = 16;

/// Pass 1: record label addresses. Never emits code.
pub fn first_pass(lines: &[String], symbols: &mut SymbolTable) -> Result<(), AsmError> {
    let mut rom_address = 0u16;
    for command in Parser::new(lines) {
        match command? {
            Command::Label(name) => symbols.add_entry(name, rom_address),
            Command::Address(_) | Command::Compute { .. } => rom_address += 1,
        }
    }
    Ok(())
}

/// Pass 2: emit one binary word per real instruction.
pub fn second_pass(lines: &[String], symbols: &mut SymbolTable) -> Result<Vec<String>, AsmError> {
    let mut next_variable = FIRST_VARIABLE_ADDRESS;
    let mut words = Vec::new();

    for command in Parser::new(lines) {
        match command? {
            Command::Address(symbol) => {
                let address = resolve_address(symbol, symbols, &mut next_variable)?;
                words.push(code::encode_a_instruction(address));
            }
            Command::Compute { dest, comp, jump } => {
                words.push(code::encode_c_instruction(dest, comp, jump)?);
            }
            Command::Label(_) => {}
        }
    }

    Ok(words)
}

/// Runs both passes over an in-memory source.
pub fn assemble(lines: &[String]) -> Result<Vec<String>, AsmError> {
    let mut symbols = SymbolTable::new();
    first_pass(lines, &mut symbols)?;
    second_pass(lines, &mut symbols)
}

/// Resolves an A-command argument to a 15-bit address.
///
/// An argument starting with a digit must be a plain decimal number; anything
/// else is a symbol, allocated as a variable on first sight.
#[allow(clippy::cast_possible_truncation)]
fn resolve_address(
    symbol: &str,
    symbols: &mut SymbolTable,
    next_variable: &mut u16,
) -> Result<u16, AsmError> {
    if symbol.as_bytes()[0].is_ascii_digit() {
        if !symbol.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AsmError::MalformedAddress(symbol.to_string()));
        }
        let value: u32 = symbol
            .parse()
            .map_err(|_| AsmError::AddressOverflow(symbol.to_string()))?;
        if value > 0x7FFF {
            return Err(AsmError::AddressOverflow(symbol.to_string()));
        }
        Ok(value as u16)
    } else {
        Ok(symbols.get_or_insert(symbol, next_variable))
    }
}
