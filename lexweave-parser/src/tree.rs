use std::fmt;

use lexweave_common::Position;

/// Index of a node within a [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single node of a parse tree.
///
/// Children are ordered; the order reflects source order. The parent link is
/// a non-owning back-reference used for climbing.
#[derive(Debug, Clone)]
pub struct Node<V> {
    value: V,
    start: Position,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl<V> Node<V> {
    /// The value carried by this node.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Position in the input where the value was found.
    pub fn start(&self) -> &Position {
        &self.start
    }

    /// This node's parent, or `None` for the root (and detached nodes).
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// This node's children, eldest first.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// An arena-allocated parse tree.
///
/// Nodes are owned by the arena and linked by [`NodeId`] indices. Nodes
/// allocated but never inserted simply stay unreachable from the root.
#[derive(Debug)]
pub struct Tree<V> {
    nodes: Vec<Node<V>>,
    root: NodeId,
}

impl<V> Tree<V> {
    /// Creates a tree whose root holds `value` and starts at line 1,
    /// column 1, offset 0.
    pub fn new(value: V) -> Tree<V> {
        Tree {
            nodes: vec![Node {
                value,
                start: Position::new(),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    /// The root of the tree.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrows the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &Node<V> {
        &self.nodes[id.0]
    }

    /// Allocates a detached node.
    pub(crate) fn alloc(&mut self, value: V, start: Position) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            start,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocates a node and appends it to `parent`'s children.
    pub(crate) fn add_child(&mut self, parent: NodeId, value: V, start: Position) -> NodeId {
        let id = self.alloc(value, start);
        self.nodes[id.0].parent = Some(parent);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Swaps the value of `id` in place, restamping its start position and
    /// returning the previous value. Parent and children are untouched.
    pub(crate) fn replace_value(&mut self, id: NodeId, value: V, start: Position) -> V {
        let node = &mut self.nodes[id.0];
        node.start = start;
        std::mem::replace(&mut node.value, value)
    }

    /// Makes `id` the root of the tree.
    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }
}

impl<V: fmt::Display> Tree<V> {
    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        last_rank: &mut Vec<bool>,
    ) -> fmt::Result {
        if let Some((&last, rest)) = last_rank.split_last() {
            for &done in rest {
                f.write_str(if done { "    " } else { "│   " })?;
            }
            f.write_str(if last { "└── " } else { "├── " })?;
        }
        let node = self.node(id);
        writeln!(f, "{} ({})", node.value, node.start)?;
        let count = node.children.len();
        for (i, &child) in node.children.iter().enumerate() {
            last_rank.push(i == count - 1);
            self.fmt_node(f, child, last_rank)?;
            last_rank.pop();
        }
        Ok(())
    }
}

/// Renders the tree with box-drawing prefixes, one node per line,
/// depth-first and eldest child first. A diagnostic aid, not a stable
/// format.
impl<V: fmt::Display> fmt::Display for Tree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last_rank = Vec::new();
        self.fmt_node(f, self.root, &mut last_rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree() {
        let tree = Tree::new("root");
        let root = tree.node(tree.root());
        assert_eq!(*root.value(), "root");
        assert_eq!(*root.start(), Position::new());
        assert_eq!(root.parent(), None);
        assert!(root.children().is_empty());
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let mut tree = Tree::new("root");
        let root = tree.root();
        let child = tree.add_child(root, "child", Position::at(1, 2, 1));
        assert_eq!(tree.node(root).children(), &[child]);
        assert_eq!(tree.node(child).parent(), Some(root));
        assert_eq!(*tree.node(child).start(), Position::at(1, 2, 1));
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = Tree::new("root");
        let root = tree.root();
        let a = tree.add_child(root, "a", Position::new());
        let b = tree.add_child(root, "b", Position::new());
        let c = tree.add_child(root, "c", Position::new());
        assert_eq!(tree.node(root).children(), &[a, b, c]);
    }

    #[test]
    fn test_replace_value_keeps_structure() {
        let mut tree = Tree::new("root");
        let root = tree.root();
        let child = tree.add_child(root, "old", Position::new());
        let grandchild = tree.add_child(child, "leaf", Position::new());

        let previous = tree.replace_value(child, "new", Position::at(3, 1, 9));
        assert_eq!(previous, "old");
        assert_eq!(*tree.node(child).value(), "new");
        assert_eq!(*tree.node(child).start(), Position::at(3, 1, 9));
        assert_eq!(tree.node(child).parent(), Some(root));
        assert_eq!(tree.node(child).children(), &[grandchild]);
        assert_eq!(tree.node(grandchild).parent(), Some(child));
    }

    #[test]
    fn test_set_root() {
        let mut tree = Tree::new("old");
        let new_root = tree.alloc("new", Position::new());
        tree.set_root(new_root);
        assert_eq!(tree.root(), new_root);
        assert_eq!(*tree.node(tree.root()).value(), "new");
    }

    #[test]
    fn test_display() {
        let mut tree = Tree::new("root");
        let root = tree.root();
        let a = tree.add_child(root, "a", Position::at(1, 1, 0));
        tree.add_child(a, "a1", Position::at(1, 3, 2));
        tree.add_child(a, "a2", Position::at(2, 1, 5));
        tree.add_child(root, "b", Position::at(3, 1, 9));

        let expected = "\
root (1:1)
├── a (1:1)
│   ├── a1 (1:3)
│   └── a2 (2:1)
└── b (3:1)
";
        assert_eq!(tree.to_string(), expected);
    }
}
