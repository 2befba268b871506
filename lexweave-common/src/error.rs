use std::io;

use crate::position::Position;

/// Errors surfaced by the lexing and parsing framework.
///
/// [`Error::EndOfInput`] is not a failure: lexer and parser states return it
/// to signal clean termination and the drivers convert it into normal
/// completion. Everything else stops the machine that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Clean end of input, signaled by a state.
    #[error("end of input")]
    EndOfInput,

    /// The input ended where a token or rune was required.
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// The operation was canceled.
    #[error("canceled")]
    Canceled,

    /// Reading the underlying byte stream failed.
    #[error("reading input: {0}")]
    Input(#[from] io::Error),

    /// The byte stream is not valid UTF-8.
    #[error("input is not valid UTF-8")]
    InvalidUtf8,

    /// A lexer state rejected the input.
    #[error("lex error: {message} at {position}")]
    Lex {
        message: String,
        position: Position,
    },

    /// A parser state rejected the token stream.
    #[error("parse error: {message} at {position}")]
    Parse {
        message: String,
        position: Position,
    },

    /// An error raised by user grammar code.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Error::Other(err)
    }
}

impl Error {
    /// Returns true for the clean end-of-input sentinel.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Error::EndOfInput)
    }

    /// Returns true if the error represents cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }
}
