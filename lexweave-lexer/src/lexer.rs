use std::collections::VecDeque;

use log::{debug, trace};

use lexweave_common::{CancelToken, Error, Token, TokenSource};

use crate::context::LexContext;
use crate::cursor::RuneCursor;
use crate::state::LexState;

/// Drives a [`LexState`] machine over a [`RuneCursor`], producing tokens on
/// demand.
///
/// Each call to [`next_token`](Lexer::next_token) runs states until a token
/// has been emitted. Once the machine terminates, every subsequent call
/// returns the `EOF` token stamped with the position where input ran out.
pub struct Lexer {
    cursor: RuneCursor,
    state: Option<Box<dyn LexState>>,
    queue: VecDeque<Token>,
    err: Option<Error>,
}

impl Lexer {
    /// Creates a lexer over `cursor` starting in the `initial` state.
    pub fn new(cursor: RuneCursor, initial: Box<dyn LexState>) -> Lexer {
        Lexer {
            cursor,
            state: Some(initial),
            queue: VecDeque::new(),
            err: None,
        }
    }

    /// The first error the lexer encountered, if any. End of input is not
    /// an error and is never recorded here.
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Returns the next token, running lexer states as needed.
    ///
    /// Cancellation is checked between state invocations and recorded as a
    /// sticky [`Error::Canceled`].
    pub fn next_token(&mut self, cancel: &CancelToken) -> Token {
        loop {
            if self.err.is_some() {
                return self.eof_token();
            }
            if let Some(front) = self.queue.front() {
                // An emitted EOF token stays at the front and is returned
                // on every subsequent call.
                if front.is_eof() {
                    return front.clone();
                }
            }
            if let Some(token) = self.queue.pop_front() {
                return token;
            }
            let Some(mut state) = self.state.take() else {
                return self.eof_token();
            };
            if cancel.is_canceled() {
                debug!("lexer canceled at {}", self.cursor.pos());
                self.set_err(Error::Canceled);
                return self.eof_token();
            }
            let mut ctx = LexContext {
                cursor: &mut self.cursor,
                queue: &mut self.queue,
                cancel,
            };
            match state.run(&mut ctx) {
                Ok(next) => self.state = next,
                // EndOfInput terminates the machine cleanly; set_err
                // filters it out. Anything else is sticky.
                Err(err) => self.set_err(err),
            }
            if let Some(cursor_err) = self.cursor.take_err() {
                self.set_err(cursor_err);
            }
            trace!(
                "lexer state ran: {} queued token(s), pos {}",
                self.queue.len(),
                self.cursor.pos()
            );
        }
    }

    fn eof_token(&self) -> Token {
        Token::eof(self.cursor.pos())
    }

    fn set_err(&mut self, err: Error) {
        if self.err.is_none() && !err.is_end_of_input() {
            debug!("lexer error: {err}");
            self.err = Some(err);
        }
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self, cancel: &CancelToken) -> Token {
        Lexer::next_token(self, cancel)
    }

    fn take_err(&mut self) -> Option<Error> {
        self.err.take()
    }
}
