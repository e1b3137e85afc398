use std::fmt;

/// Errors produced while compiling a Jack class. All are fatal; the first
/// one aborts the compilation of its translation unit.
#[derive(Debug)]
pub enum CompileError {
    Io(std::io::Error),
    UnexpectedToken { expected: String, found: String },
    UnexpectedEndOfFile,
    /// A character no Jack token can start with.
    UnexpectedCharacter(char),
    UnterminatedString,
    UnterminatedComment,
    /// Integer literal above 32767.
    IntegerOutOfRange(String),
    /// An identifier used as a variable but present in neither scope.
    UndefinedVariable(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found \"{found}\"")
            }
            Self::UnexpectedEndOfFile => f.write_str("unexpected end of file"),
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
            Self::UnterminatedString => f.write_str("unterminated string constant"),
            Self::UnterminatedComment => f.write_str("unterminated block comment"),
            Self::IntegerOutOfRange(s) => {
                write!(f, "integer constant out of range (max 32767): {s}")
            }
            Self::UndefinedVariable(name) => write!(f, "undefined variable \"{name}\""),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
