use std::collections::VecDeque;

use lexweave_common::{CancelToken, Position, Token, TokenType};

use crate::cursor::RuneCursor;

/// The view of the lexer handed to a [`LexState`](crate::state::LexState):
/// every cursor operation plus token emission.
pub struct LexContext<'a> {
    pub(crate) cursor: &'a mut RuneCursor,
    pub(crate) queue: &'a mut VecDeque<Token>,
    pub(crate) cancel: &'a CancelToken,
}

impl LexContext<'_> {
    /// Returns the next rune without consuming it, or `None` at end of
    /// input.
    pub fn peek(&mut self) -> Option<char> {
        self.cursor.peek()
    }

    /// Returns up to `n` runes of lookahead without consuming them.
    pub fn peek_n(&mut self, n: usize) -> Vec<char> {
        self.cursor.peek_n(n)
    }

    /// Reads one rune, advancing the reader but not the token cursor.
    pub fn next_rune(&mut self) -> Option<char> {
        self.cursor.next_rune()
    }

    /// Advances the reader one rune; returns true if actually advanced.
    pub fn advance(&mut self) -> bool {
        self.cursor.advance()
    }

    /// Advances the reader up to `n` runes, returning the number consumed.
    pub fn advance_n(&mut self, n: usize) -> usize {
        self.cursor.advance_n(n)
    }

    /// Discards the next rune, advancing the token cursor with the reader;
    /// returns true if actually discarded.
    pub fn discard(&mut self) -> bool {
        self.cursor.discard()
    }

    /// Discards up to `n` runes, returning the number consumed.
    pub fn discard_n(&mut self, n: usize) -> usize {
        self.cursor.discard_n(n)
    }

    /// Advances until one of `needles` is a prefix of the upcoming runes,
    /// buffering the consumed prefix. Returns the matched needle, or the
    /// empty string if the input runs out first.
    pub fn find(&mut self, needles: &[&str]) -> String {
        self.cursor.find(needles)
    }

    /// Like [`find`](LexContext::find), but the consumed prefix is
    /// discarded and the token cursor moves to the start of the match.
    pub fn discard_to(&mut self, needles: &[&str]) -> String {
        self.cursor.discard_to(needles)
    }

    /// Resets the token cursor to the reader position, dropping the
    /// in-progress text.
    pub fn ignore(&mut self) {
        self.cursor.ignore();
    }

    /// Emits the token between the token cursor and the reader position,
    /// queueing it for delivery, and returns it.
    pub fn emit(&mut self, kind: TokenType) -> Token {
        let token = self.cursor.emit_token(kind);
        self.queue.push_back(token.clone());
        token
    }

    /// Rune width of the in-progress token.
    pub fn width(&self) -> usize {
        self.cursor.width()
    }

    /// Text of the in-progress token.
    pub fn current_text(&self) -> &str {
        self.cursor.current_text()
    }

    /// Position of the next not-yet-consumed rune.
    pub fn pos(&self) -> Position {
        self.cursor.pos()
    }

    /// Position of the first rune of the in-progress token.
    pub fn cursor(&self) -> Position {
        self.cursor.cursor()
    }

    /// True once the shared cancellation token has fired. The driver checks
    /// between state invocations; long-running states may check earlier.
    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }
}
