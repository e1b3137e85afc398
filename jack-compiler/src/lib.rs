//! Compiler lowering the Jack language to VM code.
//!
//! A single pass couples the token stream to the VM emitter: the grammar
//! is parsed and code is written as it is recognized, with a two-scope
//! symbol table (class and subroutine) resolving identifiers. One
//! translation unit is one `.jack` class compiled to one `.vm` file.
//!
//! # Example
//!
//! ```
//! let vm = jack_compiler::compile_source(
//!     "class Main { function int main() { return 1; } }",
//!     Vec::new(),
//! )
//! .unwrap();
//! let text = String::from_utf8(vm).unwrap();
//! assert!(text.starts_with("function Main.main 0\n"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod symbol_table;
pub mod tokenizer;
pub mod vm_writer;

pub use engine::CompilationEngine;
pub use error::CompileError;
pub use symbol_table::{Entry, Kind, SymbolTable};
pub use tokenizer::{token_type, TokenType, Tokenizer};
pub use vm_writer::{Segment, VmCommand, VmWriter};

use std::io::Write;

/// Compiles one Jack class into the sink; returns the sink on success.
pub fn compile_source<W: Write>(source: &str, out: W) -> Result<W, CompileError> {
    let mut engine = CompilationEngine::new(source, out)?;
    engine.compile_class()?;
    Ok(engine.into_inner())
}
