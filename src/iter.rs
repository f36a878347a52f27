use crate::node::Node;
use crate::utils::fillvector::{FVIndex, FillVector};

/// The nodes on the search path for a key whose prefixes the key matches, root first.
///
/// Each step moves to a node with a strictly longer prefix, so the walk ends after at most one
/// node per key bit. Every key bit is compared at most once over the whole walk.
pub(crate) struct SearchPath<'a, V> {
    nodes: &'a FillVector<Node<V>>,
    key: &'a [u8],
    next: Option<FVIndex>,
    /// Leading bits of `key` already known to agree with the path.
    verified: usize,
}

impl<'a, V> SearchPath<'a, V> {
    pub(crate) fn new(nodes: &'a FillVector<Node<V>>, root: Option<FVIndex>, key: &'a [u8]) -> Self {
        Self {
            nodes,
            key,
            next: root,
            verified: 0,
        }
    }
}

impl<'a, V> Iterator for SearchPath<'a, V> {
    type Item = (FVIndex, &'a Node<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        let node = &self.nodes[id];
        // Children extend the node's prefix, so nothing below a mismatch can match either.
        if !node.matches_from(self.key, self.verified) {
            return None;
        }
        // A child agrees with its parent's prefix and hangs on the side of the bit just past it.
        self.verified = node.prefix_len + 1;
        self.next = node.direction_for(self.key).and_then(|dir| node.child(dir));
        debug_assert!(self.next.is_none_or(
            |child| self.nodes[child].discriminating_bit() > node.discriminating_bit()
        ));
        Some((id, node))
    }
}

/// Iterator over the stored prefixes of a key, see [`PatriciaTrie::matches`].
///
/// [`PatriciaTrie::matches`]: crate::tree::PatriciaTrie::matches
pub struct Matches<'a, V> {
    path: SearchPath<'a, V>,
}

impl<'a, V> Matches<'a, V> {
    pub(crate) fn new(path: SearchPath<'a, V>) -> Self {
        Self { path }
    }
}

impl<'a, V> Iterator for Matches<'a, V> {
    type Item = (usize, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (_, node) = self.path.next()?;
            if let Some(v) = &node.value {
                return Some((node.prefix_len, v));
            }
        }
    }
}

/// Pre-order iterator over the entries of a trie: `(prefix bytes, prefix length, value)`.
///
/// Left (0) subtrees come before right (1) subtrees and a node comes before its descendants, so
/// entries appear in bit order with every prefix ahead of its extensions.
pub struct Iter<'a, V> {
    nodes: &'a FillVector<Node<V>>,
    stack: Vec<FVIndex>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(nodes: &'a FillVector<Node<V>>, root: Option<FVIndex>) -> Self {
        Self {
            nodes,
            stack: root.into_iter().collect(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], usize, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.stack.pop()?;
            let node = &self.nodes[id];
            // Right first, so left is popped first.
            self.stack.extend(node.children.iter().rev().flatten());
            if let Some(v) = &node.value {
                return Some((&*node.prefix, node.prefix_len, v));
            }
        }
    }
}

pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Values<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, _, v)| v)
    }
}
