use crate::keys;
use crate::utils::fillvector::FVIndex;

/// Which child a bit selects: 0 goes left, 1 goes right.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Left = 0,
    Right = 1,
}

impl Direction {
    #[inline]
    pub(crate) fn from_bit(bit: bool) -> Self {
        if bit {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    #[inline]
    pub(crate) fn flip(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A node of the trie.
///
/// Every node stands for a prefix: the first `prefix_len` bits of `prefix`. Both children extend
/// that prefix, and the first bit past it decides which side they hang on, so a node's
/// discriminating bit is its own prefix length. Nodes without a value are pure branch points and
/// always have two children.
pub(crate) struct Node<V> {
    pub(crate) prefix: Box<[u8]>,
    pub(crate) prefix_len: usize,
    pub(crate) value: Option<V>,
    pub(crate) children: [Option<FVIndex>; 2],
}

impl<V> Node<V> {
    #[inline]
    pub(crate) fn new_leaf(prefix: Box<[u8]>, prefix_len: usize, value: V) -> Self {
        Self {
            prefix,
            prefix_len,
            value: Some(value),
            children: [None, None],
        }
    }

    #[inline]
    pub(crate) fn new_branch(prefix: Box<[u8]>, prefix_len: usize) -> Self {
        Self {
            prefix,
            prefix_len,
            value: None,
            children: [None, None],
        }
    }

    /// The bit position this node tests to route a search.
    #[inline]
    pub(crate) fn discriminating_bit(&self) -> usize {
        self.prefix_len
    }

    #[inline]
    pub(crate) fn has_value(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub(crate) fn child(&self, dir: Direction) -> Option<FVIndex> {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Direction, child: Option<FVIndex>) {
        self.children[dir as usize] = child;
    }

    pub(crate) fn num_children(&self) -> usize {
        self.children.iter().flatten().count()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.num_children() == 0
    }

    /// The child a search for `key` continues into, or `None` if `key` has no bit at the
    /// discriminating position.
    #[inline]
    pub(crate) fn direction_for(&self, key: &[u8]) -> Option<Direction> {
        keys::bit_at(key, self.discriminating_bit()).map(Direction::from_bit)
    }

    /// True if this node's prefix is a prefix of `key`.
    #[inline]
    pub(crate) fn matches(&self, key: &[u8]) -> bool {
        keys::prefix_matches(&self.prefix, key, self.prefix_len)
    }

    /// Like [`matches`](Self::matches) for a `key` already known to agree with this node's prefix
    /// on its first `verified` bits.
    #[inline]
    pub(crate) fn matches_from(&self, key: &[u8], verified: usize) -> bool {
        keys::prefix_matches_from(&self.prefix, key, verified, self.prefix_len)
    }
}
