use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

/// Stable identity of a node within one [`Tree`].
pub type NodeId = Index;

/// Data payload carried by every tree node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    /// Display name, possibly empty
    pub name: String,
    /// Length of the edge towards the parent, if the input carried one
    pub branch_length: Option<f64>,
}

impl NodeData {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branch_length: None,
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.branch_length {
            Some(len) => write!(f, "{}:{}", self.name, len),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Tree node in the arena.
///
/// Edges are stored undirected: a node knows its neighbors but not which of
/// them is its parent. Walks have to remember where they came from.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Adjacent nodes, parent included
    pub neighbors: Vec<NodeId>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// Degree 0 covers the single-node tree.
    pub fn is_tip(&self) -> bool {
        self.neighbors.len() <= 1
    }
}

/// Arena-backed tree with a designated root.
///
/// Nodes are never removed, so arena iteration order is insertion order.
#[derive(Debug, Default)]
pub struct Tree {
    arena: Arena<TreeNode>,
    root: Option<NodeId>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the root node. Replaces any previously designated root.
    #[instrument(level = "trace", skip(self))]
    pub fn add_root(&mut self, data: NodeData) -> NodeId {
        let idx = self.arena.insert(TreeNode {
            data,
            neighbors: Vec::new(),
        });
        self.root = Some(idx);
        idx
    }

    /// Inserts a node and connects it to `parent` in both directions.
    ///
    /// Returns `None` if `parent` does not belong to this tree.
    #[instrument(level = "trace", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, data: NodeData) -> Option<NodeId> {
        self.arena.get(parent)?;
        let idx = self.arena.insert(TreeNode {
            data,
            neighbors: vec![parent],
        });
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.neighbors.push(idx);
        }
        Some(idx)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, idx: NodeId) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_mut(&mut self, idx: NodeId) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn contains(&self, idx: NodeId) -> bool {
        self.arena.contains(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// All nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.arena.iter()
    }

    pub fn neighbors(&self, idx: NodeId) -> &[NodeId] {
        self.arena
            .get(idx)
            .map(|node| node.neighbors.as_slice())
            .unwrap_or(&[])
    }

    pub fn name(&self, idx: NodeId) -> Option<&str> {
        self.arena.get(idx).map(TreeNode::name)
    }

    pub fn is_tip(&self, idx: NodeId) -> bool {
        self.arena.get(idx).is_some_and(TreeNode::is_tip)
    }

    /// All tips in insertion order, which for parsed trees is input order.
    pub fn tips(&self) -> Vec<NodeId> {
        self.arena
            .iter()
            .filter(|(_, node)| node.is_tip())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// A tree is rooted when its root is a bifurcation.
    pub fn is_rooted(&self) -> bool {
        self.root
            .and_then(|root| self.arena.get(root))
            .is_some_and(|root| root.degree() == 2)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }
}

/// Post-order walk from the root, yielding `(node, came_from)`.
///
/// Uses an explicit stack so that caterpillar-shaped trees of any depth are
/// safe to walk.
pub struct PostOrderIterator<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, Option<NodeId>, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, None, false));
        }
        Self { tree, stack }
    }
}

impl Iterator for PostOrderIterator<'_> {
    type Item = (NodeId, Option<NodeId>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, prev, expanded)) = self.stack.pop() {
            if expanded {
                return Some((current, prev));
            }
            self.stack.push((current, prev, true));
            // Push in reverse order for left-to-right traversal
            for &next in self.tree.neighbors(current).iter().rev() {
                if Some(next) != prev {
                    self.stack.push((next, Some(current), false));
                }
            }
        }
        None
    }
}
