//! Structural checks over a whole trie, used by tests and fuzzing to catch a broken link or a
//! misplaced node right after the operation that caused it.

use std::collections::HashSet;

use thiserror::Error;

use crate::keys;
use crate::node::{Direction, Node};
use crate::utils::fillvector::{FVIndex, FillVector};

/// A violated structural invariant, see [`PatriciaTrie::check_well_formed`].
///
/// Nodes are identified by their arena slot.
///
/// [`PatriciaTrie::check_well_formed`]: crate::tree::PatriciaTrie::check_well_formed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTrie {
    #[error("node {node} is reachable along more than one path")]
    LoopFound { node: u32 },

    #[error("a link points at free slot {node}")]
    DanglingLink { node: u32 },

    /// A child does not test a later bit than its parent.
    #[error("node {node} tests bit {child_bit}, not past its parent's bit {parent_bit}")]
    BitNotIncreasing {
        node: u32,
        parent_bit: usize,
        child_bit: usize,
    },

    /// A child's prefix does not extend its parent's.
    #[error("node {node} (/{prefix_len}) does not extend its parent's prefix")]
    PrefixMismatch { node: u32, prefix_len: usize },

    #[error("node {node} (/{prefix_len}) hangs on the wrong side of its parent")]
    WrongSide { node: u32, prefix_len: usize },

    /// A node without a value that does not fork into two subtrees.
    #[error("branch node {node} (/{prefix_len}) has {num_children} children")]
    DanglingBranch {
        node: u32,
        prefix_len: usize,
        num_children: usize,
    },

    /// The stored prefix bytes are the wrong size or have bits set past the prefix length.
    #[error("node {node} stores a malformed /{prefix_len} prefix")]
    TrailingBits { node: u32, prefix_len: usize },

    #[error("trie reports {expected} entries but holds {found}")]
    LenMismatch { expected: usize, found: usize },

    #[error("{allocated} nodes allocated but only {reachable} reachable from the root")]
    UnreachableNodes { reachable: usize, allocated: usize },
}

pub(crate) struct WellFormedChecker<'a, V> {
    nodes: &'a FillVector<Node<V>>,
    root: Option<FVIndex>,
    len: usize,
}

impl<'a, V> WellFormedChecker<'a, V> {
    pub(crate) fn new(nodes: &'a FillVector<Node<V>>, root: Option<FVIndex>, len: usize) -> Self {
        Self { nodes, root, len }
    }

    pub(crate) fn check(&self) -> Result<(), MalformedTrie> {
        let mut seen = HashSet::new();
        let mut values = 0usize;
        // (node, parent and the side the node hangs on)
        let mut stack: Vec<(FVIndex, Option<(&Node<V>, Direction)>)> =
            self.root.into_iter().map(|id| (id, None)).collect();

        while let Some((id, parent)) = stack.pop() {
            if !seen.insert(id) {
                return Err(MalformedTrie::LoopFound { node: id.0 });
            }
            let Some(node) = self.nodes.get(id) else {
                return Err(MalformedTrie::DanglingLink { node: id.0 });
            };
            self.check_node(id, node)?;
            if let Some((parent, side)) = parent {
                Self::check_edge(id, parent, side, node)?;
            }
            if node.has_value() {
                values += 1;
            }
            for dir in [Direction::Left, Direction::Right] {
                if let Some(child) = node.child(dir) {
                    stack.push((child, Some((node, dir))));
                }
            }
        }

        if values != self.len {
            return Err(MalformedTrie::LenMismatch {
                expected: self.len,
                found: values,
            });
        }
        if seen.len() != self.nodes.size() {
            return Err(MalformedTrie::UnreachableNodes {
                reachable: seen.len(),
                allocated: self.nodes.size(),
            });
        }
        Ok(())
    }

    fn check_node(&self, id: FVIndex, node: &Node<V>) -> Result<(), MalformedTrie> {
        let prefix_len = node.prefix_len;
        let clean = node.prefix.len() == prefix_len.div_ceil(8)
            && keys::truncated(&node.prefix, prefix_len).is_ok_and(|t| t == node.prefix);
        if !clean {
            return Err(MalformedTrie::TrailingBits {
                node: id.0,
                prefix_len,
            });
        }
        if !node.has_value() && node.num_children() != 2 {
            return Err(MalformedTrie::DanglingBranch {
                node: id.0,
                prefix_len,
                num_children: node.num_children(),
            });
        }
        Ok(())
    }

    fn check_edge(
        id: FVIndex,
        parent: &Node<V>,
        side: Direction,
        node: &Node<V>,
    ) -> Result<(), MalformedTrie> {
        let parent_bit = parent.discriminating_bit();
        if node.discriminating_bit() <= parent_bit {
            return Err(MalformedTrie::BitNotIncreasing {
                node: id.0,
                parent_bit,
                child_bit: node.discriminating_bit(),
            });
        }
        if !parent.matches(&node.prefix) {
            return Err(MalformedTrie::PrefixMismatch {
                node: id.0,
                prefix_len: node.prefix_len,
            });
        }
        if parent.direction_for(&node.prefix) != Some(side) {
            return Err(MalformedTrie::WrongSide {
                node: id.0,
                prefix_len: node.prefix_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::keys::truncated;
    use crate::node::{Direction, Node};
    use crate::utils::fillvector::{FVIndex, FillVector};
    use crate::well_formed::{MalformedTrie, WellFormedChecker};

    fn leaf(bytes: &[u8], len: usize) -> Node<u8> {
        Node::new_leaf(truncated(bytes, len).unwrap(), len, 0)
    }

    fn branch(bytes: &[u8], len: usize) -> Node<u8> {
        Node::new_branch(truncated(bytes, len).unwrap(), len)
    }

    fn check(nodes: &FillVector<Node<u8>>, root: FVIndex, len: usize) -> Result<(), MalformedTrie> {
        WellFormedChecker::new(nodes, Some(root), len).check()
    }

    #[test]
    fn empty_is_well_formed() {
        let nodes = FillVector::<Node<u8>>::new();
        assert_eq!(WellFormedChecker::new(&nodes, None, 0).check(), Ok(()));
        assert_eq!(
            WellFormedChecker::new(&nodes, None, 3).check(),
            Err(MalformedTrie::LenMismatch {
                expected: 3,
                found: 0
            })
        );
    }

    #[test]
    fn fork_is_well_formed() {
        let mut nodes = FillVector::new();
        let a = nodes.add(leaf(&[0b0000_0000], 8));
        let b = nodes.add(leaf(&[0b1000_0000], 8));
        let mut root = branch(&[0], 0);
        root.set_child(Direction::Left, Some(a));
        root.set_child(Direction::Right, Some(b));
        let root = nodes.add(root);
        assert_eq!(check(&nodes, root, 2), Ok(()));
    }

    #[test]
    fn branch_with_one_child() {
        let mut nodes = FillVector::new();
        let a = nodes.add(leaf(&[0b0000_0000], 8));
        let mut root = branch(&[0], 0);
        root.set_child(Direction::Left, Some(a));
        let root = nodes.add(root);
        assert_eq!(
            check(&nodes, root, 1),
            Err(MalformedTrie::DanglingBranch {
                node: root.0,
                prefix_len: 0,
                num_children: 1
            })
        );
    }

    #[test]
    fn child_on_wrong_side() {
        let mut nodes = FillVector::new();
        let a = nodes.add(leaf(&[0b1000_0000], 8));
        let mut root = leaf(&[0], 0);
        root.set_child(Direction::Left, Some(a));
        let root = nodes.add(root);
        assert_eq!(
            check(&nodes, root, 2),
            Err(MalformedTrie::WrongSide {
                node: a.0,
                prefix_len: 8
            })
        );
    }

    #[test]
    fn child_not_extending_parent() {
        let mut nodes = FillVector::new();
        let a = nodes.add(leaf(&[0b0100_0000], 8));
        let mut root = leaf(&[0b1000_0000], 1);
        root.set_child(Direction::Left, Some(a));
        let root = nodes.add(root);
        assert_eq!(
            check(&nodes, root, 2),
            Err(MalformedTrie::PrefixMismatch {
                node: a.0,
                prefix_len: 8
            })
        );
    }

    #[test]
    fn child_not_deeper() {
        let mut nodes = FillVector::new();
        let a = nodes.add(leaf(&[0b1000_0000], 4));
        let mut root = leaf(&[0b1000_0000], 4);
        root.set_child(Direction::Left, Some(a));
        let root = nodes.add(root);
        assert_eq!(
            check(&nodes, root, 2),
            Err(MalformedTrie::BitNotIncreasing {
                node: a.0,
                parent_bit: 4,
                child_bit: 4
            })
        );
    }

    #[test]
    fn trailing_bits_set() {
        let mut nodes = FillVector::new();
        let root = nodes.add(Node::new_leaf(Box::from([0xFFu8].as_slice()), 4, 0));
        assert_eq!(
            check(&nodes, root, 1),
            Err(MalformedTrie::TrailingBits {
                node: root.0,
                prefix_len: 4
            })
        );
    }

    #[test]
    fn loop_found() {
        let mut nodes = FillVector::new();
        let root = nodes.add(leaf(&[0], 0));
        nodes[root].set_child(Direction::Left, Some(root));
        assert_eq!(
            check(&nodes, root, 1),
            Err(MalformedTrie::LoopFound { node: root.0 })
        );
    }

    #[test]
    fn dangling_and_unreachable() {
        let mut nodes = FillVector::new();
        let a = nodes.add(leaf(&[0b0000_0000], 8));
        let mut root = leaf(&[0], 0);
        root.set_child(Direction::Left, Some(a));
        let root = nodes.add(root);
        nodes.free(a);
        assert_eq!(
            check(&nodes, root, 2),
            Err(MalformedTrie::DanglingLink { node: a.0 })
        );

        nodes[root].set_child(Direction::Left, None);
        nodes.add(leaf(&[0b1000_0000], 8));
        assert_eq!(
            check(&nodes, root, 1),
            Err(MalformedTrie::UnreachableNodes {
                reachable: 1,
                allocated: 2
            })
        );
    }
}
