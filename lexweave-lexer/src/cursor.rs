use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::mem;
use std::path::Path;
use std::str;
use std::sync::Arc;

use lexweave_common::{Error, Position, Token, TokenType};

/// Number of bytes requested from the underlying reader at a time.
const READ_CHUNK: usize = 4096;

/// A buffered rune-level reader over an arbitrary byte stream.
///
/// The cursor maintains two synchronized positions: the reader position
/// ([`pos`](RuneCursor::pos)), marking the next not-yet-consumed rune, and
/// the token cursor ([`cursor`](RuneCursor::cursor)), marking the first rune
/// of the token currently being built. Runes consumed with
/// [`advance`](RuneCursor::advance) accumulate in an in-progress buffer;
/// [`emit_token`](RuneCursor::emit_token) packages that buffer into a
/// [`Token`] spanning `[cursor, pos)`.
///
/// I/O failures and invalid UTF-8 put the cursor into a sticky error state:
/// runes decoded before the broken spot remain readable, and once
/// consumption reaches it every operation behaves as end-of-input, with the
/// error reported through [`err`](RuneCursor::err). End of input itself is
/// not an error.
pub struct RuneCursor {
    reader: Box<dyn Read + Send>,
    /// Raw bytes read but not yet decoded.
    bytes: Vec<u8>,
    /// Decoded runes not yet consumed.
    lookahead: VecDeque<char>,
    /// Text of the in-progress token.
    token: String,
    pos: Position,
    cursor: Position,
    err: Option<Error>,
    failed: bool,
    /// Error waiting to surface once the lookahead drains down to it.
    pending: Option<Error>,
    input_done: bool,
}

impl RuneCursor {
    /// Creates a cursor over the given byte stream.
    pub fn new(reader: impl Read + Send + 'static) -> RuneCursor {
        RuneCursor {
            reader: Box::new(reader),
            bytes: Vec::new(),
            lookahead: VecDeque::new(),
            token: String::new(),
            pos: Position::new(),
            cursor: Position::new(),
            err: None,
            failed: false,
            pending: None,
            input_done: false,
        }
    }

    /// Opens the file at `path` and records its name as the filename carried
    /// by every emitted position.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<RuneCursor> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut cursor = RuneCursor::new(file);
        cursor.set_filename(&path.to_string_lossy());
        Ok(cursor)
    }

    /// Sets the filename recorded in the cursor's positional information.
    pub fn set_filename(&mut self, name: &str) {
        let name: Arc<str> = Arc::from(name);
        self.pos.filename = Some(name.clone());
        self.cursor.filename = Some(name);
    }

    /// Returns the next rune without consuming it, or `None` at end of input
    /// or after a failure.
    pub fn peek(&mut self) -> Option<char> {
        self.fill(1);
        if self.failed {
            return None;
        }
        self.lookahead.front().copied()
    }

    /// Returns up to `n` runes of lookahead without consuming them. Fewer
    /// runes are returned when the input ends first. Repeated calls return
    /// the same prefix until the cursor moves.
    pub fn peek_n(&mut self, n: usize) -> Vec<char> {
        self.fill(n);
        if self.failed {
            return Vec::new();
        }
        self.lookahead.iter().take(n).copied().collect()
    }

    /// Reads exactly one rune, advancing the reader position and appending
    /// the rune to the in-progress token. The token cursor does not move.
    /// Returns `None` at end of input.
    pub fn next_rune(&mut self) -> Option<char> {
        let ch = self.take()?;
        self.token.push(ch);
        Some(ch)
    }

    /// Advances the reader one rune, appending it to the in-progress token.
    /// Returns true if a rune was actually consumed.
    pub fn advance(&mut self) -> bool {
        self.next_rune().is_some()
    }

    /// Advances the reader up to `n` runes, returning the number actually
    /// consumed.
    pub fn advance_n(&mut self, n: usize) -> usize {
        let mut advanced = 0;
        while advanced < n && self.advance() {
            advanced += 1;
        }
        advanced
    }

    /// Discards the next rune: both the reader position and the token cursor
    /// move, and the in-progress buffer is cleared. Returns true if a rune
    /// was actually consumed.
    pub fn discard(&mut self) -> bool {
        self.discard_n(1) == 1
    }

    /// Discards up to `n` runes. The token cursor is moved to the reader
    /// position and the in-progress buffer is cleared, so the discarded
    /// runes (and any previously advanced ones) are irretrievable. Returns
    /// the number actually consumed.
    pub fn discard_n(&mut self, n: usize) -> usize {
        let mut discarded = 0;
        while discarded < n && self.take().is_some() {
            discarded += 1;
        }
        self.ignore();
        discarded
    }

    /// Advances until one of `needles` is a prefix of the upcoming runes,
    /// buffering the consumed prefix into the in-progress token. The reader
    /// is left positioned at the start of the match and the matched needle
    /// is returned; the empty string is returned if the input is exhausted
    /// first. The token cursor does not move.
    ///
    /// Needles are compared as rune sequences; when several match at the
    /// same offset, the earliest in the caller-supplied order wins. The scan
    /// moves forward one rune at a time without backtracking, costing
    /// O(input length × longest needle) in the worst case. An empty needle
    /// set (or one containing only empty strings) returns the empty string
    /// immediately without moving; an individually empty needle never
    /// matches.
    pub fn find(&mut self, needles: &[&str]) -> String {
        self.scan(needles, false)
    }

    /// Like [`find`](RuneCursor::find), but the consumed prefix is discarded
    /// rather than buffered, and the token cursor is moved to the start of
    /// the match.
    pub fn discard_to(&mut self, needles: &[&str]) -> String {
        self.scan(needles, true)
    }

    fn scan(&mut self, needles: &[&str], discard: bool) -> String {
        let needles: Vec<Vec<char>> = needles
            .iter()
            .filter(|needle| !needle.is_empty())
            .map(|needle| needle.chars().collect())
            .collect();
        let max_len = needles.iter().map(Vec::len).max().unwrap_or(0);
        if max_len == 0 {
            return String::new();
        }

        loop {
            self.fill(max_len);
            for needle in &needles {
                if needle.len() <= self.lookahead.len()
                    && needle.iter().zip(self.lookahead.iter()).all(|(a, b)| a == b)
                {
                    if discard {
                        self.ignore();
                    }
                    return needle.iter().collect();
                }
            }
            let consumed = if discard {
                self.take()
            } else {
                self.next_rune()
            };
            if consumed.is_none() {
                if discard {
                    self.ignore();
                }
                return String::new();
            }
        }
    }

    /// Resets the token cursor to the reader position and clears the
    /// in-progress buffer. The skipped runes are irretrievable.
    pub fn ignore(&mut self) {
        self.cursor = self.pos.clone();
        self.token.clear();
    }

    /// Packages the in-progress buffer into a [`Token`] spanning the token
    /// cursor to the reader position, then resets the token cursor as
    /// [`ignore`](RuneCursor::ignore) does.
    pub fn emit_token(&mut self, kind: TokenType) -> Token {
        let token = Token {
            kind,
            value: mem::take(&mut self.token),
            start: self.cursor.clone(),
            end: self.pos.clone(),
        };
        self.cursor = self.pos.clone();
        token
    }

    /// Rune width of the in-progress token.
    pub fn width(&self) -> usize {
        self.pos.offset - self.cursor.offset
    }

    /// Text of the in-progress token.
    pub fn current_text(&self) -> &str {
        &self.token
    }

    /// Position of the next not-yet-consumed rune.
    pub fn pos(&self) -> Position {
        self.pos.clone()
    }

    /// Position of the first rune of the in-progress token.
    pub fn cursor(&self) -> Position {
        self.cursor.clone()
    }

    /// The sticky error, if the cursor has failed.
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Takes the sticky error out of the cursor. The cursor keeps behaving
    /// as if it were at end of input afterwards.
    pub fn take_err(&mut self) -> Option<Error> {
        self.err.take()
    }

    /// Consumes one rune, updating the reader position. Does not touch the
    /// in-progress buffer or the token cursor.
    fn take(&mut self) -> Option<char> {
        self.fill(1);
        if self.failed {
            return None;
        }
        let ch = self.lookahead.pop_front()?;
        self.pos.offset += 1;
        self.pos.column += 1;
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        }
        Some(ch)
    }

    fn fail(&mut self, err: Error) {
        if !self.failed {
            self.failed = true;
            self.err = Some(err);
        }
    }

    /// Ensures up to `want` runes of lookahead, stopping early at end of
    /// input or on an error. Runes decoded before a broken spot stay
    /// readable; the error fires once consumption drains down to it.
    fn fill(&mut self, want: usize) {
        while !self.failed && self.lookahead.len() < want {
            self.decode_pending();
            if self.lookahead.len() >= want {
                return;
            }
            if self.pending.is_some() {
                // No further rune can ever be produced.
                if self.lookahead.is_empty() {
                    if let Some(err) = self.pending.take() {
                        self.fail(err);
                    }
                }
                return;
            }
            if self.input_done {
                return;
            }
            let mut chunk = [0u8; READ_CHUNK];
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    // Loop once more so a truncated trailing sequence gets
                    // classified by decode_pending.
                    self.input_done = true;
                }
                Ok(n) => self.bytes.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.input_done = true;
                    self.pending = Some(Error::Input(e));
                }
            }
        }
    }

    /// Decodes as many complete runes as possible from the pending bytes.
    fn decode_pending(&mut self) {
        if self.bytes.is_empty() {
            return;
        }
        match str::from_utf8(&self.bytes) {
            Ok(text) => {
                self.lookahead.extend(text.chars());
                self.bytes.clear();
            }
            Err(e) => {
                let valid = e.valid_up_to();
                if let Ok(text) = str::from_utf8(&self.bytes[..valid]) {
                    self.lookahead.extend(text.chars());
                }
                self.bytes.drain(..valid);
                // A sequence that is invalid outright, or truncated at the
                // end of input, can never decode. A truncated sequence with
                // more input on the way just needs another read.
                if self.pending.is_none() && (e.error_len().is_some() || self.input_done) {
                    self.pending = Some(Error::InvalidUtf8);
                }
            }
        }
    }
}
