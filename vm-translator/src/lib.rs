//! Translator from the stack-based VM language to Hack assembly.
//!
//! A program is either one VM unit (a single `.vm` file, translated without
//! a bootstrap) or a directory of units (translated behind a bootstrap that
//! sets `SP = 256` and calls `Sys.init`). Commands are lowered one at a
//! time; between any two commands the emitted code leaves `SP`, `LCL`,
//! `ARG`, `THIS` and `THAT` consistent with the VM-level state.
//!
//! # Example
//!
//! ```
//! use vm_translator::{translate_unit, CodeWriter};
//!
//! let mut writer = CodeWriter::new(Vec::new());
//! translate_unit("Main", "push constant 7\npush constant 8\nadd\n".as_bytes(), &mut writer)
//!     .unwrap();
//! let asm = String::from_utf8(writer.into_inner()).unwrap();
//! assert!(asm.contains("// add"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::TranslateError;
pub use parser::{ArithmeticOp, Command, Parser, Segment};

use std::io::{BufRead, Write};

/// Translates one VM unit into the writer's output program.
///
/// `unit_name` is the unit's basename without extension; it namespaces the
/// unit's `static` cells.
pub fn translate_unit<R: BufRead, W: Write>(
    unit_name: &str,
    reader: R,
    writer: &mut CodeWriter<W>,
) -> Result<(), TranslateError> {
    writer.set_unit_name(unit_name);
    let mut parser = Parser::new(reader)?;
    while parser.has_more_commands() {
        let command = parser.advance()?;
        writer.write_command(command)?;
    }
    Ok(())
}
