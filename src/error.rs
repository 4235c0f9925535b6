//! The error taxonomy shared by every pipeline stage.
//!
//! Each stage propagates its errors unchanged rather than recovering
//! internally; the driver in `src/bin/fragment.rs` is the only place that
//! turns an [`Error`] into a printed diagnostic and a process exit code.

use std::fmt;
use std::io;

use crate::position::Position;

/// Unified error type for every stage of the pipeline (lexer through
/// evaluator), matching the taxonomy of `spec.md` §7.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The input file could not be opened or read.
    Io { message: String },
    /// The lexer could not classify a lexeme (bad numeric, unterminated
    /// string).
    InvalidLexeme { message: String, position: Position },
    /// A [`crate::lexer::LexStream`] was iterated a second time.
    DoubleRead,
    /// A top-level form did not begin with `(`, or a block was left open
    /// at end of file.
    InvalidBlock { message: String, position: Position },
    /// Arity mismatch for `define`/`lambda`/`if`, an unknown keyword or
    /// operator, a zero-argument function call, or a non-function callee.
    InvalidExpression { message: String, position: Position },
    /// A reference name was not found in any scope frame.
    InvalidState { message: String, position: Position },
    /// An operator or stdlib function was applied to incompatible kinds or
    /// the wrong arity.
    NotImplemented { message: String, position: Position },
}

impl Error {
    /// The taxonomy label used both in the diagnostic header and in any
    /// machine-readable reporting of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io { .. } => "io_failure",
            Error::InvalidLexeme { .. } => "invalid_lexeme",
            Error::DoubleRead => "double_read",
            Error::InvalidBlock { .. } => "invalid_block",
            Error::InvalidExpression { .. } => "invalid_expression",
            Error::InvalidState { .. } => "invalid_state",
            Error::NotImplemented { .. } => "not_implemented",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Io { message } => message,
            Error::InvalidLexeme { message, .. } => message,
            Error::DoubleRead => "attempted to iterate a LexStream a second time",
            Error::InvalidBlock { message, .. } => message,
            Error::InvalidExpression { message, .. } => message,
            Error::InvalidState { message, .. } => message,
            Error::NotImplemented { message, .. } => message,
        }
    }

    /// Source position of the failure, or [`Position::INVALID`] for
    /// variants that have none (`Io`, `DoubleRead`).
    pub fn position(&self) -> Position {
        match self {
            Error::Io { .. } | Error::DoubleRead => Position::INVALID,
            Error::InvalidLexeme { position, .. }
            | Error::InvalidBlock { position, .. }
            | Error::InvalidExpression { position, .. }
            | Error::InvalidState { position, .. }
            | Error::NotImplemented { position, .. } => *position,
        }
    }

    /// Render the `spec.md` §6 diagnostic form for the given source file
    /// path.
    pub fn report(&self, file: &str) -> String {
        format!(
            "{}\n\terror: {}\n\tposition: {} in file {}\n",
            self.kind(),
            self.message(),
            self.position(),
            file
        )
    }

    pub fn invalid_lexeme(message: impl Into<String>, position: Position) -> Self {
        Error::InvalidLexeme {
            message: message.into(),
            position,
        }
    }

    pub fn invalid_block(message: impl Into<String>, position: Position) -> Self {
        Error::InvalidBlock {
            message: message.into(),
            position,
        }
    }

    pub fn invalid_expression(message: impl Into<String>, position: Position) -> Self {
        Error::InvalidExpression {
            message: message.into(),
            position,
        }
    }

    pub fn invalid_state(message: impl Into<String>, position: Position) -> Self {
        Error::InvalidState {
            message: message.into(),
            position,
        }
    }

    pub fn not_implemented(message: impl Into<String>, position: Position) -> Self {
        Error::NotImplemented {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.kind())
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
