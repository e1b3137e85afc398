//! Symbol management for the two assembler passes.
//!
//! Predefined symbols never change, so they sit in a compile-time perfect
//! hash map; labels and variables discovered while assembling go into a
//! per-run `HashMap`. Tables are per assembly run, never shared.

use phf::phf_map;
use std::collections::HashMap;

/// Symbols built into the Hack platform.
static PREDEFINED_SYMBOLS: phf::Map<&'static str, u16> = phf_map! {
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,

    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,

    "SCREEN" => 16384,
    "KBD" => 24576,
};

/// Maps symbols to RAM/ROM addresses for one assembly run.
#[derive(Debug, Default)]
pub struct SymbolTable {
    user_symbols: HashMap<String, u16>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_symbols: HashMap::with_capacity(32),
        }
    }

    /// Binds a label to a ROM address (pass 1).
    pub fn add_entry(&mut self, symbol: &str, address: u16) {
        self.user_symbols.insert(symbol.to_string(), address);
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        PREDEFINED_SYMBOLS.contains_key(symbol) || self.user_symbols.contains_key(symbol)
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<u16> {
        PREDEFINED_SYMBOLS
            .get(symbol)
            .or_else(|| self.user_symbols.get(symbol))
            .copied()
    }

    /// Resolves a symbol, allocating a fresh variable cell on first sight.
    ///
    /// Any symbol `get` already knows (predefined or bound earlier) keeps
    /// its address. Otherwise the symbol is a new variable: it takes the
    /// cell under `next_address` and the cursor moves up one.
    pub fn get_or_insert(&mut self, symbol: &str, next_address: &mut u16) -> u16 {
        if let Some(addr) = self.get(symbol) {
            return addr;
        }
        let addr = *next_address;
        self.user_symbols.insert(symbol.to_string(), addr);
        *next_address += 1;
        addr
    }
}
