use std::fmt;

/// Errors produced while translating a VM program. All are fatal.
#[derive(Debug)]
pub enum TranslateError {
    Io(std::io::Error),
    /// First word of the line is not a VM command.
    UnknownCommand(String),
    /// `push`/`pop` with a segment name outside the eight known segments.
    UnknownSegment(String),
    /// Missing argument, non-numeric index, or `pop constant`.
    MalformedCommand(String),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnknownCommand(line) => write!(f, "unknown command: \"{line}\""),
            Self::UnknownSegment(name) => write!(f, "unknown segment: \"{name}\""),
            Self::MalformedCommand(line) => write!(f, "malformed command: \"{line}\""),
        }
    }
}

impl std::error::Error for TranslateError {}

impl From<std::io::Error> for TranslateError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
