//! State-stack parsing into arena-allocated trees.
//!
//! A parser is written as a set of state functions driven by a stack rather
//! than a single successor: each state consumes tokens through a
//! [`ParseContext`], mutates the [`Tree`] via the current-node cursor, and
//! pushes the states expected to run next. The [`Parser`] pops and runs
//! states until the stack is empty.

pub mod parser;
pub mod state;
pub mod tree;

pub use parser::{ParseContext, Parser};
pub use state::{parse_fn, ParseState};
pub use tree::{Node, NodeId, Tree};
