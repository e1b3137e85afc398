//! Parsing of VM source lines into commands.
//!
//! Lines are tokenized by whitespace after the `//` tail is cut; blank
//! results are dropped at load time. The parser then steps through the
//! remaining lines one command at a time: `has_more_commands` reports
//! whether a line is waiting, `advance` consumes it and yields the parsed
//! command.

use crate::error::TranslateError;
use std::fmt;
use std::io::BufRead;

/// The eight VM memory segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

impl Segment {
    fn from_str(name: &str) -> Option<Self> {
        match name {
            "constant" => Some(Self::Constant),
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "temp" => Some(Self::Temp),
            "pointer" => Some(Self::Pointer),
            "static" => Some(Self::Static),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Constant => "constant",
            Self::Local => "local",
            Self::Argument => "argument",
            Self::This => "this",
            Self::That => "that",
            Self::Temp => "temp",
            Self::Pointer => "pointer",
            Self::Static => "static",
        })
    }
}

/// The nine arithmetic/logic commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    fn from_str(name: &str) -> Option<Self> {
        match name {
            "add" => Some(Self::Add),
            "sub" => Some(Self::Sub),
            "neg" => Some(Self::Neg),
            "eq" => Some(Self::Eq),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        })
    }
}

/// One source-level VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arithmetic(ArithmeticOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl fmt::Display for Command {
    /// Canonical VM text form, as it appears in source.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arithmetic(op) => write!(f, "{op}"),
            Self::Push { segment, index } => write!(f, "push {segment} {index}"),
            Self::Pop { segment, index } => write!(f, "pop {segment} {index}"),
            Self::Label(name) => write!(f, "label {name}"),
            Self::Goto(name) => write!(f, "goto {name}"),
            Self::IfGoto(name) => write!(f, "if-goto {name}"),
            Self::Function { name, locals } => write!(f, "function {name} {locals}"),
            Self::Call { name, args } => write!(f, "call {name} {args}"),
            Self::Return => f.write_str("return"),
        }
    }
}

/// Steps through the commands of one VM source unit.
pub struct Parser {
    lines: Vec<String>,
    cursor: usize,
    current: Option<Command>,
}

impl Parser {
    /// Loads a unit, dropping comments and blank lines up front.
    pub fn new<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let stripped = match line.find("//") {
                Some(pos) => &line[..pos],
                None => &line[..],
            };
            let trimmed = stripped.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        Ok(Self {
            lines,
            cursor: 0,
            current: None,
        })
    }

    /// Convenience for in-memory sources.
    pub fn from_source(source: &str) -> Self {
        Self::new(source.as_bytes()).expect("reading from a string cannot fail")
    }

    #[must_use]
    pub fn has_more_commands(&self) -> bool {
        self.cursor < self.lines.len()
    }

    /// Consumes the next line and returns its command.
    ///
    /// Call only while `has_more_commands` is true.
    pub fn advance(&mut self) -> Result<&Command, TranslateError> {
        let line = &self.lines[self.cursor];
        self.cursor += 1;
        let command = parse_line(line)?;
        Ok(self.current.insert(command))
    }

    /// The most recently parsed command, if any.
    #[must_use]
    pub fn command(&self) -> Option<&Command> {
        self.current.as_ref()
    }
}

fn parse_line(line: &str) -> Result<Command, TranslateError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let malformed = || TranslateError::MalformedCommand(line.to_string());

    let keyword = fields[0];
    if let Some(op) = ArithmeticOp::from_str(keyword) {
        if fields.len() != 1 {
            return Err(malformed());
        }
        return Ok(Command::Arithmetic(op));
    }

    match keyword {
        "push" | "pop" => {
            if fields.len() != 3 {
                return Err(malformed());
            }
            let segment = Segment::from_str(fields[1])
                .ok_or_else(|| TranslateError::UnknownSegment(fields[1].to_string()))?;
            let index: u16 = fields[2].parse().map_err(|_| malformed())?;
            if keyword == "push" {
                Ok(Command::Push { segment, index })
            } else if segment == Segment::Constant {
                // There is no cell behind `constant` to pop into.
                Err(malformed())
            } else {
                Ok(Command::Pop { segment, index })
            }
        }
        "label" | "goto" | "if-goto" => {
            if fields.len() != 2 {
                return Err(malformed());
            }
            let name = fields[1].to_string();
            Ok(match keyword {
                "label" => Command::Label(name),
                "goto" => Command::Goto(name),
                _ => Command::IfGoto(name),
            })
        }
        "function" | "call" => {
            if fields.len() != 3 {
                return Err(malformed());
            }
            let name = fields[1].to_string();
            let count: u16 = fields[2].parse().map_err(|_| malformed())?;
            if keyword == "function" {
                Ok(Command::Function {
                    name,
                    locals: count,
                })
            } else {
                Ok(Command::Call { name, args: count })
            }
        }
        "return" => {
            if fields.len() != 1 {
                return Err(malformed());
            }
            Ok(Command::Return)
        }
        _ => Err(TranslateError::UnknownCommand(line.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_command_shape() {
        assert_eq!(
            parse_line("push constant 7").unwrap(),
            Command::Push {
                segment: Segment::Constant,
                index: 7
            }
        );
        assert_eq!(
            parse_line("pop local 2").unwrap(),
            Command::Pop {
                segment: Segment::Local,
                index: 2
            }
        );
        assert_eq!(
            parse_line("add").unwrap(),
            Command::Arithmetic(ArithmeticOp::Add)
        );
        assert_eq!(
            parse_line("label LOOP").unwrap(),
            Command::Label("LOOP".to_string())
        );
        assert_eq!(
            parse_line("if-goto LOOP").unwrap(),
            Command::IfGoto("LOOP".to_string())
        );
        assert_eq!(
            parse_line("function Main.fib 0").unwrap(),
            Command::Function {
                name: "Main.fib".to_string(),
                locals: 0
            }
        );
        assert_eq!(
            parse_line("call Main.fib 1").unwrap(),
            Command::Call {
                name: "Main.fib".to_string(),
                args: 1
            }
        );
        assert_eq!(parse_line("return").unwrap(), Command::Return);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(matches!(
            parse_line("shove constant 7"),
            Err(TranslateError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse_line("push heap 0"),
            Err(TranslateError::UnknownSegment(_))
        ));
        assert!(matches!(
            parse_line("push constant"),
            Err(TranslateError::MalformedCommand(_))
        ));
        assert!(matches!(
            parse_line("push constant x"),
            Err(TranslateError::MalformedCommand(_))
        ));
        assert!(matches!(
            parse_line("pop constant 3"),
            Err(TranslateError::MalformedCommand(_))
        ));
        assert!(matches!(
            parse_line("add 1"),
            Err(TranslateError::MalformedCommand(_))
        ));
    }

    #[test]
    fn steps_through_a_unit() {
        let mut parser = Parser::from_source(
            "// comment only\n\
             push constant 1\n\
             \n\
             add // trailing\n",
        );
        assert!(parser.has_more_commands());
        assert_eq!(
            parser.advance().unwrap(),
            &Command::Push {
                segment: Segment::Constant,
                index: 1
            }
        );
        assert!(parser.has_more_commands());
        assert_eq!(
            parser.advance().unwrap(),
            &Command::Arithmetic(ArithmeticOp::Add)
        );
        assert!(!parser.has_more_commands());
        assert!(parser.command().is_some());
    }

    #[test]
    fn command_text_round_trips() {
        for line in [
            "push static 3",
            "pop that 1",
            "if-goto END",
            "function Sys.init 0",
            "call Math.multiply 2",
            "return",
            "neg",
        ] {
            assert_eq!(parse_line(line).unwrap().to_string(), line);
        }
    }
}
