use log::{debug, trace};

use lexweave_common::{CancelToken, Error, Position, Token, TokenSource};

use crate::state::ParseState;
use crate::tree::{Node, NodeId, Tree};

/// Builds a [`Tree`] by running a stack of [`ParseState`]s over a token
/// source.
///
/// The parser maintains a current node. States grow the tree downward with
/// [`ParseContext::push`] and [`ParseContext::add_node`], move back up with
/// [`ParseContext::climb`], and schedule future work with
/// [`ParseContext::push_state`]. Parsing finishes when the state stack is
/// empty, a state signals end of input, or an error occurs; the (possibly
/// partial) tree is returned in every case.
pub struct Parser<V> {
    source: Box<dyn TokenSource + Send>,
    stack: Vec<Box<dyn ParseState<V>>>,
    tree: Tree<V>,
    current: NodeId,
    /// Last token consumed via `next`; new nodes start at its start.
    token: Option<Token>,
    /// One-token lookahead cache.
    lookahead: Option<Token>,
}

impl<V: Default> Parser<V> {
    /// Creates a parser reading from `source`, starting in the `initial`
    /// state. The tree is seeded with a root node holding `V::default()`.
    pub fn new(
        source: impl TokenSource + Send + 'static,
        initial: Box<dyn ParseState<V>>,
    ) -> Parser<V> {
        let tree = Tree::new(V::default());
        let root = tree.root();
        Parser {
            source: Box::new(source),
            stack: vec![initial],
            tree,
            current: root,
            token: None,
            lookahead: None,
        }
    }
}

impl<V> Parser<V> {
    /// Runs states until the stack empties, a state signals end of input,
    /// or an error occurs. The tree under construction is always returned,
    /// alongside the error if there was one.
    ///
    /// Cancellation is checked between state invocations and reported as
    /// [`Error::Canceled`].
    pub fn parse(mut self, cancel: &CancelToken) -> (Tree<V>, Option<Error>) {
        loop {
            let Some(mut state) = self.stack.pop() else {
                break;
            };
            if cancel.is_canceled() {
                debug!("parser canceled with {} state(s) pending", self.stack.len() + 1);
                return (self.tree, Some(Error::Canceled));
            }
            let mut ctx = ParseContext {
                parser: &mut self,
                cancel,
            };
            match state.run(&mut ctx) {
                Ok(()) => {}
                Err(Error::EndOfInput) => break,
                Err(err) => {
                    debug!("parser error: {err}");
                    return (self.tree, Some(err));
                }
            }
            trace!("parser state ran: {} state(s) pending", self.stack.len());
        }
        (self.tree, None)
    }

    fn peek(&mut self, cancel: &CancelToken) -> Token {
        if let Some(token) = &self.lookahead {
            return token.clone();
        }
        let token = self.source.next_token(cancel);
        self.lookahead = Some(token.clone());
        token
    }

    fn next(&mut self, cancel: &CancelToken) -> Token {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.source.next_token(cancel),
        };
        self.token = Some(token.clone());
        token
    }

    /// Start position for newly created nodes: the start of the last
    /// consumed token, or line 1, column 1, offset 0 before any token has
    /// been consumed.
    fn start_position(&self) -> Position {
        match &self.token {
            Some(token) => token.start.clone(),
            None => Position::new(),
        }
    }
}

/// The view of the parser handed to a [`ParseState`]: token access, tree
/// cursor operations, and state scheduling.
pub struct ParseContext<'a, V> {
    parser: &'a mut Parser<V>,
    cancel: &'a CancelToken,
}

impl<V> ParseContext<'_, V> {
    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Token {
        self.parser.peek(self.cancel)
    }

    /// Consumes and returns the next token. Nodes created afterwards start
    /// at this token's start position.
    pub fn next(&mut self) -> Token {
        self.parser.next(self.cancel)
    }

    /// Creates a child of the current node and makes it the current node.
    pub fn push(&mut self, value: V) -> NodeId {
        let start = self.parser.start_position();
        let id = self.parser.tree.add_child(self.parser.current, value, start);
        self.parser.current = id;
        id
    }

    /// Creates a child of the current node; the current node is unchanged.
    pub fn add_node(&mut self, value: V) -> NodeId {
        let start = self.parser.start_position();
        self.parser.tree.add_child(self.parser.current, value, start)
    }

    /// Creates a detached node without inserting it into the tree.
    pub fn new_node(&mut self, value: V) -> NodeId {
        let start = self.parser.start_position();
        self.parser.tree.alloc(value, start)
    }

    /// Moves the current node to its parent, returning the previous current
    /// node. A no-op at the root.
    pub fn climb(&mut self) -> NodeId {
        let previous = self.parser.current;
        if let Some(parent) = self.parser.tree.node(previous).parent() {
            self.parser.current = parent;
        }
        previous
    }

    /// Replaces the current node's value in place, returning the previous
    /// value. The node keeps its parent, its children, and its root-ness;
    /// its start position is restamped from the last consumed token. Works
    /// on the root as well.
    pub fn replace(&mut self, value: V) -> V {
        let start = self.parser.start_position();
        self.parser.tree.replace_value(self.parser.current, value, start)
    }

    /// Makes `id` the root of the tree and the current node.
    pub fn set_root(&mut self, id: NodeId) {
        self.parser.tree.set_root(id);
        self.parser.current = id;
    }

    /// The root of the tree under construction.
    pub fn root(&self) -> NodeId {
        self.parser.tree.root()
    }

    /// The current node.
    pub fn pos(&self) -> NodeId {
        self.parser.current
    }

    /// Read access to any node of the tree under construction.
    pub fn node(&self, id: NodeId) -> &Node<V> {
        self.parser.tree.node(id)
    }

    /// Pushes future states onto the state stack; the first listed state
    /// runs next.
    pub fn push_state<I>(&mut self, states: I)
    where
        I: IntoIterator<Item = Box<dyn ParseState<V>>>,
    {
        let mut states: Vec<_> = states.into_iter().collect();
        while let Some(state) = states.pop() {
            self.parser.stack.push(state);
        }
    }

    /// True once the shared cancellation token has fired.
    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }
}
