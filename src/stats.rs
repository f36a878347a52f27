//! Statistics and introspection for the trie.
//!
//! Counts the node kinds making up a trie and how deep it goes, which is useful when judging
//! how well path compression is doing for a given set of prefixes.

use crate::node::Node;

pub trait TreeStatsTrait {
    fn get_tree_stats(&self) -> TreeStats;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeStats {
    /// Nodes holding a value.
    pub num_values: usize,
    /// Nodes without children. Every leaf holds a value.
    pub num_leaves: usize,
    /// Nodes without a value, which exist only where two subtrees fork.
    pub num_branch_nodes: usize,
    /// Value-holding nodes that also have children.
    pub num_inner_values: usize,
    pub num_nodes: usize,
    /// Child links in use, over all nodes.
    pub num_children: usize,
    /// Nodes on the longest root-to-leaf path.
    pub max_height: usize,
}

impl TreeStats {
    pub(crate) fn update<V>(&mut self, node: &Node<V>, height: usize) {
        let children = node.num_children();
        self.num_nodes += 1;
        self.num_children += children;
        self.max_height = self.max_height.max(height);
        if node.is_leaf() {
            self.num_leaves += 1;
        }
        match (node.has_value(), children) {
            (true, 0) => self.num_values += 1,
            (true, _) => {
                self.num_values += 1;
                self.num_inner_values += 1;
            }
            (false, _) => self.num_branch_nodes += 1,
        }
    }

    /// Fraction of child slots in use among nodes that have any children.
    pub fn density(&self) -> f64 {
        let inner = self.num_nodes - self.num_leaves;
        if inner == 0 {
            return 0.0;
        }
        self.num_children as f64 / (inner * 2) as f64
    }
}
