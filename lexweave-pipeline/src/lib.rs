//! Runs a lexer and a parser concurrently, bridged by a bounded token
//! channel.
//!
//! The lexer is the producer: it runs on its own thread and pushes tokens
//! into a bounded FIFO channel, suspending when the channel is full. The
//! parser is the consumer, pulling tokens on the calling thread through a
//! [`ChannelSource`]. Completion of the parser, successful or not, cancels
//! the lexer; external cancellation aborts both sides.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use log::debug;

use lexweave_common::{CancelToken, Error, Position, Token, TokenSource};
use lexweave_lexer::Lexer;
use lexweave_parser::{ParseState, Parser, Tree};

/// Capacity of the token channel between the lexer and the parser.
pub const CHANNEL_CAPACITY: usize = 1024;

/// Lexes and parses concurrently, returning the parse tree and the first
/// meaningful error.
///
/// The parser's error takes precedence; the lexer's error is surfaced only
/// if the parser reports none, and only if it is neither end-of-input nor
/// the cancellation triggered by the parser's completion. The tree, which
/// may be partial on error, is returned in every case.
pub fn lex_parse<V: Default>(
    cancel: &CancelToken,
    lexer: Lexer,
    initial: Box<dyn ParseState<V>>,
) -> (Tree<V>, Option<Error>) {
    lex_parse_with_capacity(cancel, lexer, initial, CHANNEL_CAPACITY)
}

/// [`lex_parse`] with a caller-chosen channel capacity.
pub fn lex_parse_with_capacity<V: Default>(
    cancel: &CancelToken,
    mut lexer: Lexer,
    initial: Box<dyn ParseState<V>>,
    capacity: usize,
) -> (Tree<V>, Option<Error>) {
    // Both sides observe a child token so that completing the parse can
    // release the lexer without canceling the caller's token.
    let inner = cancel.child();
    let (sender, receiver) = mpsc::sync_channel::<Token>(capacity);

    thread::scope(|scope| {
        let producer_cancel = inner.clone();
        let producer = scope.spawn(move || {
            produce(&mut lexer, &sender, &producer_cancel);
            lexer.take_err()
        });

        let source = ChannelSource::new(receiver);
        let parser = Parser::new(source, initial);
        // `parse` consumes the parser, dropping the receiver when it
        // returns; a producer blocked on a full channel wakes immediately.
        let (tree, parse_err) = parser.parse(&inner);
        inner.cancel();

        let lex_err = producer.join().unwrap_or(None);
        debug!(
            "pipeline finished: parse_err={:?} lex_err={:?}",
            parse_err.as_ref().map(|e| e.to_string()),
            lex_err.as_ref().map(|e| e.to_string()),
        );

        let err = match parse_err {
            Some(err) => Some(err),
            None => lex_err.filter(|err| !err.is_end_of_input() && !err.is_canceled()),
        };
        (tree, err)
    })
}

/// Pulls tokens from the lexer into the channel until the `EOF` token has
/// been delivered or the parser has gone away.
fn produce(lexer: &mut Lexer, sender: &SyncSender<Token>, cancel: &CancelToken) {
    loop {
        let token = lexer.next_token(cancel);
        let done = token.is_eof();
        if sender.send(token).is_err() {
            // Receiver dropped: the parser has finished.
            debug!("token channel closed before EOF");
            return;
        }
        if done {
            return;
        }
    }
}

/// Adapts the receiving end of the token channel to a [`TokenSource`].
///
/// Cancellation is deliberately not checked here: the lexer observes the
/// same token and delivers an `EOF` token carrying the position where input
/// stopped, which is more useful to parser diagnostics than a synthesized
/// one. A disconnected channel (the producer died without sending `EOF`)
/// yields a synthetic `EOF` token so the parser can still wind down.
pub struct ChannelSource {
    receiver: Receiver<Token>,
    eof: Option<Token>,
}

impl ChannelSource {
    /// Wraps the receiving end of a token channel.
    pub fn new(receiver: Receiver<Token>) -> ChannelSource {
        ChannelSource {
            receiver,
            eof: None,
        }
    }
}

impl TokenSource for ChannelSource {
    fn next_token(&mut self, _cancel: &CancelToken) -> Token {
        if let Some(eof) = &self.eof {
            return eof.clone();
        }
        match self.receiver.recv() {
            Ok(token) => {
                if token.is_eof() {
                    self.eof = Some(token.clone());
                }
                token
            }
            Err(_) => {
                let eof = Token::eof(Position::new());
                self.eof = Some(eof.clone());
                eof
            }
        }
    }
}
