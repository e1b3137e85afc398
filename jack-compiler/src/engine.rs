//! Recursive-descent compilation of one Jack class.
//!
//! The engine consumes tokens and writes VM code in the same pass; no
//! syntax tree exists. The only place the grammar forces buffering is the
//! `function` header, whose local count is known only after the `var`
//! declarations; the header write is simply deferred until then.
//!
//! Expressions are compiled left to right with no operator precedence.
//! Control-flow labels come from two per-class counters (`IF_TRUEk` /
//! `IF_FALSEk` / `IF_ENDk` and `WHILE_EXPk` / `WHILE_ENDk`), allocated on
//! statement entry so nested statements number themselves outside in.

use crate::error::CompileError;
use crate::symbol_table::{Entry, Kind, SymbolTable};
use crate::tokenizer::{token_type, TokenType, Tokenizer};
use crate::vm_writer::{Segment, VmCommand, VmWriter};
use std::io::Write;

pub struct CompilationEngine<W: Write> {
    tokenizer: Tokenizer,
    table: SymbolTable,
    writer: VmWriter<W>,
    class_name: String,
    if_counter: usize,
    while_counter: usize,
}

impl<W: Write> CompilationEngine<W> {
    pub fn new(source: &str, out: W) -> Result<Self, CompileError> {
        Ok(Self {
            tokenizer: Tokenizer::new(source)?,
            table: SymbolTable::new(),
            writer: VmWriter::new(out),
            class_name: String::new(),
            if_counter: 0,
            while_counter: 0,
        })
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Compiles the single class of the translation unit.
    pub fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect("class")?;
        self.class_name = self.expect_identifier()?;
        self.expect("{")?;
        loop {
            match self.tokenizer.peek() {
                Some("static" | "field") => self.compile_class_var_dec()?,
                Some("constructor" | "function" | "method") => self.compile_subroutine()?,
                _ => break,
            }
        }
        self.expect("}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let kind = if self.tokenizer.advance()? == "static" {
            Kind::Static
        } else {
            Kind::Field
        };
        let var_type = self.expect_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.table.define(&name, &var_type, kind);
            if self.peek_is(",") {
                self.tokenizer.advance()?;
            } else {
                break;
            }
        }
        self.expect(";")
    }

    fn compile_subroutine(&mut self) -> Result<(), CompileError> {
        self.table.start_subroutine();
        let flavor = self.tokenizer.advance()?;

        let ret = self.tokenizer.advance()?;
        let ret_ok = ret == "void"
            || matches!(ret.as_str(), "int" | "char" | "boolean")
            || token_type(&ret) == TokenType::Identifier;
        if !ret_ok {
            return Err(CompileError::UnexpectedToken {
                expected: "a return type".to_string(),
                found: ret,
            });
        }

        let name = self.expect_identifier()?;
        if flavor == "method" {
            // The receiver is argument 0 of every method.
            let class_name = self.class_name.clone();
            self.table.define("this", &class_name, Kind::Arg);
        }
        self.expect("(")?;
        self.compile_parameter_list()?;
        self.expect(")")?;
        self.expect("{")?;
        while self.peek_is("var") {
            self.compile_var_dec()?;
        }

        // All locals are known now; the header can be written.
        let full_name = format!("{}.{name}", self.class_name);
        self.writer
            .write_function(&full_name, self.table.var_count(Kind::Var))?;

        match flavor.as_str() {
            "constructor" => {
                self.writer
                    .write_push(Segment::Constant, self.table.var_count(Kind::Field))?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            "method" => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect("}")
    }

    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if self.peek_is(")") {
            return Ok(());
        }
        loop {
            let var_type = self.expect_type()?;
            let name = self.expect_identifier()?;
            self.table.define(&name, &var_type, Kind::Arg);
            if self.peek_is(",") {
                self.tokenizer.advance()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.expect("var")?;
        let var_type = self.expect_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.table.define(&name, &var_type, Kind::Var);
            if self.peek_is(",") {
                self.tokenizer.advance()?;
            } else {
                break;
            }
        }
        self.expect(";")
    }

    fn compile_statements(&mut self) -> Result<(), CompileError> {
        loop {
            match self.tokenizer.peek() {
                Some("let") => self.compile_let()?,
                Some("if") => self.compile_if()?,
                Some("while") => self.compile_while()?,
                Some("do") => self.compile_do()?,
                Some("return") => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect("let")?;
        let name = self.expect_identifier()?;
        let entry = self.resolve_variable(&name)?;

        if self.peek_is("[") {
            self.tokenizer.advance()?;
            self.compile_expression()?;
            self.expect("]")?;
            self.writer.write_push(entry.kind.segment(), entry.index)?;
            self.writer.write_arithmetic(VmCommand::Add)?;

            self.expect("=")?;
            self.compile_expression()?;
            self.expect(";")?;

            // The right-hand side may have set pointer 1 itself, so the
            // target address waits in temp 0 until the value is ready.
            self.writer.write_pop(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.expect("=")?;
            self.compile_expression()?;
            self.expect(";")?;
            self.writer.write_pop(entry.kind.segment(), entry.index)?;
        }
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), CompileError> {
        let k = self.if_counter;
        self.if_counter += 1;

        self.expect("if")?;
        self.expect("(")?;
        self.compile_expression()?;
        self.expect(")")?;
        self.writer.write_if(&format!("IF_TRUE{k}"))?;
        self.writer.write_goto(&format!("IF_FALSE{k}"))?;
        self.writer.write_label(&format!("IF_TRUE{k}"))?;

        self.expect("{")?;
        self.compile_statements()?;
        self.expect("}")?;

        if self.peek_is("else") {
            self.writer.write_goto(&format!("IF_END{k}"))?;
            self.writer.write_label(&format!("IF_FALSE{k}"))?;
            self.tokenizer.advance()?;
            self.expect("{")?;
            self.compile_statements()?;
            self.expect("}")?;
            self.writer.write_label(&format!("IF_END{k}"))?;
        } else {
            self.writer.write_label(&format!("IF_FALSE{k}"))?;
        }
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), CompileError> {
        let k = self.while_counter;
        self.while_counter += 1;

        self.expect("while")?;
        self.writer.write_label(&format!("WHILE_EXP{k}"))?;
        self.expect("(")?;
        self.compile_expression()?;
        self.expect(")")?;
        self.writer.write_arithmetic(VmCommand::Not)?;
        self.writer.write_if(&format!("WHILE_END{k}"))?;

        self.expect("{")?;
        self.compile_statements()?;
        self.expect("}")?;
        self.writer.write_goto(&format!("WHILE_EXP{k}"))?;
        self.writer.write_label(&format!("WHILE_END{k}"))?;
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect("do")?;
        let first = self.expect_identifier()?;
        self.compile_subroutine_call(&first)?;
        self.expect(";")?;
        // The call's value is not used.
        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect("return")?;
        if self.peek_is(";") {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.expect(";")?;
        self.writer.write_return()?;
        Ok(())
    }

    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;
        loop {
            let token = self.tokenizer.advance()?;
            match token.as_str() {
                "*" => {
                    self.compile_term()?;
                    self.writer.write_call("Math.multiply", 2)?;
                }
                "/" => {
                    self.compile_term()?;
                    self.writer.write_call("Math.divide", 2)?;
                }
                _ => {
                    if let Some(command) = binary_command(&token) {
                        self.compile_term()?;
                        self.writer.write_arithmetic(command)?;
                    } else {
                        self.tokenizer.put_back();
                        return Ok(());
                    }
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn compile_term(&mut self) -> Result<(), CompileError> {
        let token = self.tokenizer.advance()?;
        match token_type(&token) {
            TokenType::IntConst => {
                let value: u32 = token
                    .parse()
                    .map_err(|_| CompileError::IntegerOutOfRange(token.clone()))?;
                if value > 32767 {
                    return Err(CompileError::IntegerOutOfRange(token));
                }
                self.writer.write_push(Segment::Constant, value as u16)?;
            }
            TokenType::StringConst => {
                let text = &token[1..token.len() - 1];
                self.writer
                    .write_push(Segment::Constant, text.chars().count() as u16)?;
                self.writer.write_call("String.new", 1)?;
                for c in text.chars() {
                    self.writer.write_push(Segment::Constant, c as u16)?;
                    self.writer.write_call("String.appendChar", 2)?;
                }
            }
            TokenType::Keyword => match token.as_str() {
                "true" => {
                    self.writer.write_push(Segment::Constant, 0)?;
                    self.writer.write_arithmetic(VmCommand::Not)?;
                }
                "false" | "null" => self.writer.write_push(Segment::Constant, 0)?,
                "this" => self.writer.write_push(Segment::Pointer, 0)?,
                _ => {
                    return Err(CompileError::UnexpectedToken {
                        expected: "a term".to_string(),
                        found: token,
                    })
                }
            },
            TokenType::Symbol => match token.as_str() {
                "(" => {
                    self.compile_expression()?;
                    self.expect(")")?;
                }
                "-" => {
                    self.compile_term()?;
                    self.writer.write_arithmetic(VmCommand::Neg)?;
                }
                "~" => {
                    self.compile_term()?;
                    self.writer.write_arithmetic(VmCommand::Not)?;
                }
                _ => {
                    return Err(CompileError::UnexpectedToken {
                        expected: "a term".to_string(),
                        found: token,
                    })
                }
            },
            TokenType::Identifier => match self.tokenizer.peek() {
                Some("[") => {
                    self.tokenizer.advance()?;
                    self.compile_expression()?;
                    self.expect("]")?;
                    let entry = self.resolve_variable(&token)?;
                    self.writer.write_push(entry.kind.segment(), entry.index)?;
                    self.writer.write_arithmetic(VmCommand::Add)?;
                    self.writer.write_pop(Segment::Pointer, 1)?;
                    self.writer.write_push(Segment::That, 0)?;
                }
                Some("(" | ".") => self.compile_subroutine_call(&token)?,
                _ => {
                    let entry = self.resolve_variable(&token)?;
                    self.writer.write_push(entry.kind.segment(), entry.index)?;
                }
            },
        }
        Ok(())
    }

    /// Compiles a call whose leading identifier is already consumed.
    ///
    /// `Cls.name(...)` with an uppercase receiver is a class call, no
    /// matter what the symbol tables say; a lowercase receiver found in a
    /// table is a method call on that variable; anything else dotted is a
    /// class call. A bare `name(...)` dispatches on the current object.
    fn compile_subroutine_call(&mut self, first: &str) -> Result<(), CompileError> {
        if self.peek_is(".") {
            self.tokenizer.advance()?;
            let method = self.expect_identifier()?;
            let starts_upper = first.chars().next().is_some_and(char::is_uppercase);
            let receiver = if starts_upper {
                None
            } else {
                self.table.resolve(first).cloned()
            };

            self.expect("(")?;
            match receiver {
                Some(entry) => {
                    self.writer.write_push(entry.kind.segment(), entry.index)?;
                    let args = self.compile_expression_list()?;
                    self.expect(")")?;
                    self.writer
                        .write_call(&format!("{}.{method}", entry.var_type), args + 1)?;
                }
                None => {
                    let args = self.compile_expression_list()?;
                    self.expect(")")?;
                    self.writer.write_call(&format!("{first}.{method}"), args)?;
                }
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0)?;
            self.expect("(")?;
            let args = self.compile_expression_list()?;
            self.expect(")")?;
            let name = format!("{}.{first}", self.class_name);
            self.writer.write_call(&name, args + 1)?;
        }
        Ok(())
    }

    /// Compiles `,`-separated expressions; the count feeds the call's
    /// argument number.
    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        if self.peek_is(")") {
            return Ok(0);
        }
        let mut count = 1;
        self.compile_expression()?;
        while self.peek_is(",") {
            self.tokenizer.advance()?;
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }

    fn resolve_variable(&self, name: &str) -> Result<Entry, CompileError> {
        self.table
            .resolve(name)
            .cloned()
            .ok_or_else(|| CompileError::UndefinedVariable(name.to_string()))
    }

    fn expect(&mut self, expected: &str) -> Result<(), CompileError> {
        let token = self.tokenizer.advance()?;
        if token == expected {
            Ok(())
        } else {
            Err(CompileError::UnexpectedToken {
                expected: format!("\"{expected}\""),
                found: token,
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        let token = self.tokenizer.advance()?;
        if token_type(&token) == TokenType::Identifier {
            Ok(token)
        } else {
            Err(CompileError::UnexpectedToken {
                expected: "an identifier".to_string(),
                found: token,
            })
        }
    }

    fn expect_type(&mut self) -> Result<String, CompileError> {
        let token = self.tokenizer.advance()?;
        if matches!(token.as_str(), "int" | "char" | "boolean")
            || token_type(&token) == TokenType::Identifier
        {
            Ok(token)
        } else {
            Err(CompileError::UnexpectedToken {
                expected: "a type".to_string(),
                found: token,
            })
        }
    }

    fn peek_is(&self, token: &str) -> bool {
        self.tokenizer.peek() == Some(token)
    }
}

/// Binary operators lowered to a single VM instruction. `*` and `/` are
/// not here; they lower to OS calls.
fn binary_command(op: &str) -> Option<VmCommand> {
    match op {
        "+" => Some(VmCommand::Add),
        "-" => Some(VmCommand::Sub),
        "&" => Some(VmCommand::And),
        "|" => Some(VmCommand::Or),
        "<" => Some(VmCommand::Lt),
        ">" => Some(VmCommand::Gt),
        "=" => Some(VmCommand::Eq),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Result<String, CompileError> {
        let mut engine = CompilationEngine::new(source, Vec::new())?;
        engine.compile_class()?;
        Ok(String::from_utf8(engine.into_inner()).unwrap())
    }

    #[test]
    fn undefined_variable_outside_call_position_is_fatal() {
        let err = compile(
            "class Main { function void main() { let x = 1; return; } }",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::UndefinedVariable(name) if name == "x"));
    }

    #[test]
    fn oversized_integer_is_fatal() {
        let err = compile(
            "class Main { function int main() { return 32768; } }",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::IntegerOutOfRange(_)));
    }

    #[test]
    fn boundary_integer_is_accepted() {
        let vm = compile("class Main { function int main() { return 32767; } }").unwrap();
        assert!(vm.contains("push constant 32767"));
    }

    #[test]
    fn missing_semicolon_is_fatal() {
        let err = compile(
            "class Main { function void main() { return } }",
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::UnexpectedToken { .. }));
    }

    #[test]
    fn class_keyword_is_required() {
        let err = compile("klass Main { }").unwrap_err();
        assert!(matches!(err, CompileError::UnexpectedToken { .. }));
    }
}
