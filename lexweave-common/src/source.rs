use crate::cancel::CancelToken;
use crate::error::Error;
use crate::token::Token;

/// A pull source of [`Token`]s for the parser.
///
/// An exhausted source returns the `EOF` token from every subsequent call;
/// it must never block once the end of input has been delivered.
pub trait TokenSource {
    /// Returns the next token, running the underlying producer as needed.
    fn next_token(&mut self, cancel: &CancelToken) -> Token;

    /// Takes the first error the source encountered, if any.
    fn take_err(&mut self) -> Option<Error> {
        None
    }
}
