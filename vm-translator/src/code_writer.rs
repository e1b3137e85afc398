//! Lowering of VM commands to Hack assembly.
//!
//! One `CodeWriter` produces one output program. It carries the current
//! unit name (for `static` mangling), the enclosing function name (for
//! label scoping), and two label counters that stay monotonic across all
//! units written to the same sink, so every generated label is unique in
//! the output.

use crate::parser::{ArithmeticOp, Command, Segment};
use std::io::{self, Write};

/// Writes fixed assembly lines without run-time formatting.
macro_rules! emit {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

const TEMP_BASE: u16 = 5;
const POINTER_BASE: u16 = 3;
const STACK_BASE: u16 = 256;

/// Slots 5 values deep in a call frame: return address, saved LCL, ARG,
/// THIS, THAT.
const FRAME_WORDS: u16 = 5;

pub struct CodeWriter<W: Write> {
    out: W,
    unit_name: String,
    function_name: String,
    cmp_counter: usize,
    ret_counter: usize,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            unit_name: String::new(),
            function_name: String::new(),
            cmp_counter: 0,
            ret_counter: 0,
        }
    }

    /// Names the unit whose commands follow; `static i` becomes the
    /// assembler symbol `<unit>.<i>`.
    pub fn set_unit_name(&mut self, name: &str) {
        self.unit_name.clear();
        self.unit_name.push_str(name);
    }

    /// Program prologue for directory translation: point SP at the stack
    /// base and transfer control to `Sys.init`.
    pub fn write_bootstrap(&mut self) -> io::Result<()> {
        emit!(self.out, "// bootstrap")?;
        writeln!(self.out, "@{STACK_BASE}")?;
        emit!(
            self.out,
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0)?;
        self.out.write_all(b"\n")
    }

    /// Lowers one command, prefixed by its source text as a comment.
    pub fn write_command(&mut self, command: &Command) -> io::Result<()> {
        writeln!(self.out, "// {command}")?;
        match command {
            Command::Arithmetic(op) => self.write_arithmetic(*op)?,
            Command::Push { segment, index } => self.write_push(*segment, *index)?,
            Command::Pop { segment, index } => self.write_pop(*segment, *index)?,
            Command::Label(name) => {
                let scoped = self.scoped_label(name);
                writeln!(self.out, "({scoped})")?;
            }
            Command::Goto(name) => {
                let scoped = self.scoped_label(name);
                writeln!(self.out, "@{scoped}")?;
                emit!(self.out, "0;JMP")?;
            }
            Command::IfGoto(name) => {
                let scoped = self.scoped_label(name);
                self.pop_to_d()?;
                writeln!(self.out, "@{scoped}")?;
                emit!(self.out, "D;JNE")?;
            }
            Command::Function { name, locals } => self.write_function(name, *locals)?,
            Command::Call { name, args } => self.write_call(name, *args)?,
            Command::Return => self.write_return()?,
        }
        self.out.write_all(b"\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_arithmetic(&mut self, op: ArithmeticOp) -> io::Result<()> {
        match op {
            ArithmeticOp::Add => self.write_binary("D=D+M"),
            ArithmeticOp::Sub => self.write_binary("D=M-D"),
            ArithmeticOp::And => self.write_binary("D=D&M"),
            ArithmeticOp::Or => self.write_binary("D=D|M"),
            ArithmeticOp::Neg => emit!(
                self.out,
                "@SP"
                "A=M-1"
                "M=-M"
            ),
            ArithmeticOp::Not => emit!(
                self.out,
                "@SP"
                "A=M-1"
                "M=!M"
            ),
            ArithmeticOp::Eq => self.write_comparison("JEQ"),
            ArithmeticOp::Gt => self.write_comparison("JGT"),
            ArithmeticOp::Lt => self.write_comparison("JLT"),
        }
    }

    /// Pops y into D, steps SP back onto x, and combines into D.
    ///
    /// The second operand is read through M at the decremented SP; `sub`
    /// therefore computes x - y as `M-D`.
    fn write_binary(&mut self, combine: &str) -> io::Result<()> {
        self.pop_to_d()?;
        emit!(
            self.out,
            "@SP"
            "M=M-1"
            "A=M"
        )?;
        writeln!(self.out, "{combine}")?;
        self.push_d()
    }

    /// Pushes -1 (true) or 0 (false) from comparing x against y.
    fn write_comparison(&mut self, jump: &str) -> io::Result<()> {
        let k = self.cmp_counter;
        self.cmp_counter += 1;

        self.pop_to_d()?;
        emit!(
            self.out,
            "@SP"
            "M=M-1"
            "A=M"
            "D=M-D"
        )?;
        writeln!(self.out, "@CMP_TRUE_{k}")?;
        writeln!(self.out, "D;{jump}")?;
        emit!(self.out, "D=0")?;
        writeln!(self.out, "@CMP_END_{k}")?;
        emit!(self.out, "0;JMP")?;
        writeln!(self.out, "(CMP_TRUE_{k})")?;
        emit!(self.out, "D=-1")?;
        writeln!(self.out, "(CMP_END_{k})")?;
        self.push_d()
    }

    fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Constant => {
                writeln!(self.out, "@{index}")?;
                emit!(self.out, "D=A")?;
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                writeln!(self.out, "@{}", base_symbol(segment))?;
                emit!(self.out, "D=M")?;
                writeln!(self.out, "@{index}")?;
                emit!(
                    self.out,
                    "A=D+A"
                    "D=M"
                )?;
            }
            Segment::Temp | Segment::Pointer => {
                writeln!(self.out, "@{}", fixed_base(segment))?;
                emit!(self.out, "D=A")?;
                writeln!(self.out, "@{index}")?;
                emit!(
                    self.out,
                    "A=D+A"
                    "D=M"
                )?;
            }
            Segment::Static => {
                writeln!(self.out, "@{}.{index}", self.unit_name)?;
                emit!(self.out, "D=M")?;
            }
        }
        self.push_d()
    }

    fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                writeln!(self.out, "@{}", base_symbol(segment))?;
                emit!(self.out, "D=M")?;
                self.pop_via_r13(index)
            }
            Segment::Temp | Segment::Pointer => {
                writeln!(self.out, "@{}", fixed_base(segment))?;
                emit!(self.out, "D=A")?;
                self.pop_via_r13(index)
            }
            Segment::Static => {
                self.pop_to_d()?;
                writeln!(self.out, "@{}.{index}", self.unit_name)?;
                emit!(self.out, "M=D")
            }
            Segment::Constant => unreachable!("pop constant is rejected by the parser"),
        }
    }

    /// Finishes a pop whose target base address is in D: parks base+index
    /// in R13, pops into D, stores through R13.
    fn pop_via_r13(&mut self, index: u16) -> io::Result<()> {
        writeln!(self.out, "@{index}")?;
        emit!(
            self.out,
            "D=D+A"
            "@R13"
            "M=D"
        )?;
        self.pop_to_d()?;
        emit!(
            self.out,
            "@R13"
            "A=M"
            "M=D"
        )
    }

    fn write_function(&mut self, name: &str, locals: u16) -> io::Result<()> {
        self.function_name.clear();
        self.function_name.push_str(name);
        writeln!(self.out, "({name})")?;
        for _ in 0..locals {
            emit!(
                self.out,
                "@SP"
                "A=M"
                "M=0"
                "@SP"
                "M=M+1"
            )?;
        }
        Ok(())
    }

    fn write_call(&mut self, name: &str, args: u16) -> io::Result<()> {
        let ret = format!("RET_{}", self.ret_counter);
        self.ret_counter += 1;

        // Save the return site and the caller's frame pointers.
        writeln!(self.out, "@{ret}")?;
        emit!(self.out, "D=A")?;
        self.push_d()?;
        for register in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{register}")?;
            emit!(self.out, "D=M")?;
            self.push_d()?;
        }

        // ARG = SP - args - 5, LCL = SP.
        emit!(
            self.out,
            "@SP"
            "D=M"
        )?;
        writeln!(self.out, "@{}", args + FRAME_WORDS)?;
        emit!(
            self.out,
            "D=D-A"
            "@ARG"
            "M=D"
            "@SP"
            "D=M"
            "@LCL"
            "M=D"
        )?;

        writeln!(self.out, "@{name}")?;
        emit!(self.out, "0;JMP")?;
        writeln!(self.out, "({ret})")
    }

    fn write_return(&mut self) -> io::Result<()> {
        // The return address is latched into R14 before the return value
        // lands in *ARG: with zero arguments, *ARG and *(FRAME-5) are the
        // same cell.
        emit!(
            self.out,
            "@LCL"
            "D=M"
            "@R13"
            "M=D"
            "@5"
            "A=D-A"
            "D=M"
            "@R14"
            "M=D"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
            "@ARG"
            "A=M"
            "M=D"
            "@ARG"
            "D=M+1"
            "@SP"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@THAT"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@THIS"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@ARG"
            "M=D"
            "@R13"
            "AM=M-1"
            "D=M"
            "@LCL"
            "M=D"
            "@R14"
            "A=M"
            "0;JMP"
        )
    }

    /// `*SP = D; SP++`
    fn push_d(&mut self) -> io::Result<()> {
        emit!(
            self.out,
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )
    }

    /// `SP--; D = *SP`
    fn pop_to_d(&mut self) -> io::Result<()> {
        emit!(
            self.out,
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )
    }

    /// Labels declared inside function F become `F$name`; outside any
    /// function the name is used as is.
    fn scoped_label(&self, name: &str) -> String {
        if self.function_name.is_empty() {
            name.to_string()
        } else {
            format!("{}${name}", self.function_name)
        }
    }
}

fn base_symbol(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        Segment::That => "THAT",
        _ => unreachable!("segment has no base register"),
    }
}

fn fixed_base(segment: Segment) -> u16 {
    match segment {
        Segment::Temp => TEMP_BASE,
        Segment::Pointer => POINTER_BASE,
        _ => unreachable!("segment has no fixed base"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> CodeWriter<Vec<u8>> {
        CodeWriter::new(Vec::new())
    }

    fn output(writer: CodeWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn labels_scope_to_enclosing_function() {
        let mut w = writer();
        assert_eq!(w.scoped_label("LOOP"), "LOOP");
        w.write_function("Main.fib", 0).unwrap();
        assert_eq!(w.scoped_label("LOOP"), "Main.fib$LOOP");
    }

    #[test]
    fn static_cells_are_mangled_per_unit() {
        let mut w = writer();
        w.set_unit_name("Screen");
        w.write_command(&Command::Push {
            segment: Segment::Static,
            index: 4,
        })
        .unwrap();
        let asm = output(w);
        assert!(asm.contains("@Screen.4"));
    }

    #[test]
    fn comparison_sites_get_fresh_labels() {
        let mut w = writer();
        w.write_command(&Command::Arithmetic(ArithmeticOp::Eq))
            .unwrap();
        w.write_command(&Command::Arithmetic(ArithmeticOp::Lt))
            .unwrap();
        let asm = output(w);
        assert!(asm.contains("(CMP_TRUE_0)"));
        assert!(asm.contains("(CMP_END_0)"));
        assert!(asm.contains("(CMP_TRUE_1)"));
        assert!(asm.contains("(CMP_END_1)"));
    }

    #[test]
    fn call_defines_return_label_after_jump() {
        let mut w = writer();
        w.write_command(&Command::Call {
            name: "Main.fib".to_string(),
            args: 1,
        })
        .unwrap();
        let asm = output(w);
        let push_site = asm.find("@RET_0").unwrap();
        let jump_site = asm.find("@Main.fib\n0;JMP").unwrap();
        let label_site = asm.find("(RET_0)").unwrap();
        assert!(push_site < jump_site);
        assert!(jump_site < label_site);
    }

    #[test]
    fn function_reserves_locals() {
        let mut w = writer();
        w.write_command(&Command::Function {
            name: "Sys.init".to_string(),
            locals: 2,
        })
        .unwrap();
        let asm = output(w);
        assert!(asm.contains("(Sys.init)"));
        assert_eq!(asm.matches("M=0").count(), 2);
    }
}
