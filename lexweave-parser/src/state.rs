use lexweave_common::Error;

use crate::parser::ParseContext;

/// A single state of the parser state machine.
///
/// A state consumes tokens and mutates the tree through the
/// [`ParseContext`], and plans future work by pushing successor states.
/// Returning `Err(Error::EndOfInput)` completes parsing cleanly; any other
/// error stops the parser, which still hands back the partial tree.
pub trait ParseState<V> {
    fn run(&mut self, ctx: &mut ParseContext<'_, V>) -> Result<(), Error>;
}

/// Adapts a plain function or closure into a boxed [`ParseState`].
pub fn parse_fn<V, F>(f: F) -> Box<dyn ParseState<V>>
where
    F: FnMut(&mut ParseContext<'_, V>) -> Result<(), Error> + 'static,
{
    Box::new(FnState(f))
}

struct FnState<F>(F);

impl<V, F> ParseState<V> for FnState<F>
where
    F: FnMut(&mut ParseContext<'_, V>) -> Result<(), Error> + 'static,
{
    fn run(&mut self, ctx: &mut ParseContext<'_, V>) -> Result<(), Error> {
        (self.0)(ctx)
    }
}
