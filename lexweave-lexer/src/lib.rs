//! State-machine lexing over buffered rune streams.
//!
//! A lexer is written as a set of state functions. Each state inspects and
//! consumes runes through a [`LexContext`], emits zero or more tokens, and
//! returns the next state to run (or terminates the machine). The [`Lexer`]
//! driver turns such a machine into a pull source of tokens; the
//! [`RuneCursor`] underneath provides buffered lookahead, multi-needle
//! scanning, and line/column tracking over any `io::Read`.

pub mod context;
pub mod cursor;
pub mod lexer;
pub mod state;

pub use context::LexContext;
pub use cursor::RuneCursor;
pub use lexer::Lexer;
pub use state::{lex_fn, LexState, NextLex};
