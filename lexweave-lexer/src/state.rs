use lexweave_common::Error;

use crate::context::LexContext;

/// The continuation returned by a lexer state: the next state to run, or
/// `None` when the machine has no successor.
pub type NextLex = Option<Box<dyn LexState>>;

/// A single state of a lexer state machine.
///
/// A state reads and consumes input through the [`LexContext`], emits zero
/// or more tokens, and names the state to run next. Returning
/// `Err(Error::EndOfInput)` terminates the machine cleanly; any other error
/// is sticky and stops lexing.
pub trait LexState: Send {
    fn run(&mut self, ctx: &mut LexContext<'_>) -> Result<NextLex, Error>;
}

/// Adapts a plain function or closure into a boxed [`LexState`].
pub fn lex_fn<F>(f: F) -> Box<dyn LexState>
where
    F: FnMut(&mut LexContext<'_>) -> Result<NextLex, Error> + Send + 'static,
{
    Box::new(FnState(f))
}

struct FnState<F>(F);

impl<F> LexState for FnState<F>
where
    F: FnMut(&mut LexContext<'_>) -> Result<NextLex, Error> + Send + 'static,
{
    fn run(&mut self, ctx: &mut LexContext<'_>) -> Result<NextLex, Error> {
        (self.0)(ctx)
    }
}
