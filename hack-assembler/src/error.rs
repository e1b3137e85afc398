use std::fmt;

/// Errors produced while assembling a Hack program.
///
/// Every variant is fatal: the assembler reports the offending text and
/// stops without emitting partial output.
#[derive(Debug)]
pub enum AsmError {
    Io(std::io::Error),
    /// `@` with an empty argument, or an argument that starts with a digit
    /// but is not a plain decimal number.
    MalformedAddress(String),
    /// Numeric A-argument outside the 15-bit range 0..=32767.
    AddressOverflow(String),
    /// `(label` without a closing parenthesis, or an empty label.
    UnterminatedLabel(String),
    UnknownDest(String),
    UnknownComp(String),
    UnknownJump(String),
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MalformedAddress(s) => write!(f, "malformed A-command argument: \"{s}\""),
            Self::AddressOverflow(s) => {
                write!(f, "address out of range (max 32767): \"{s}\"")
            }
            Self::UnterminatedLabel(s) => write!(f, "unterminated label: \"{s}\""),
            Self::UnknownDest(s) => write!(f, "unknown dest mnemonic: \"{s}\""),
            Self::UnknownComp(s) => write!(f, "unknown comp mnemonic: \"{s}\""),
            Self::UnknownJump(s) => write!(f, "unknown jump mnemonic: \"{s}\""),
        }
    }
}

impl std::error::Error for AsmError {}

impl From<std::io::Error> for AsmError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
