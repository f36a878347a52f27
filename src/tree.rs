//! Path-compressed bitwise prefix trie.
//!
//! This module contains the main [`PatriciaTrie`] implementation.

use tracing::{debug, trace};

use crate::config::Config;
use crate::error::TrieError;
use crate::iter::{Iter, Matches, SearchPath, Values};
use crate::keys;
use crate::node::{Direction, Node};
use crate::stats::{TreeStats, TreeStatsTrait};
use crate::utils::fillvector::{FVIndex, FillVector};
use crate::well_formed::{MalformedTrie, WellFormedChecker};

/// A Patricia trie mapping bit-string prefixes to values, with longest-prefix-match lookup.
///
/// Entries are addressed by a key and a prefix length in bits; only the first `prefix_len` bits
/// of the key are significant. Bits are numbered most-significant first within each byte, so
/// this behaves the way IP routing tables do.
///
/// Nodes live in a slot arena and refer to their children by index. Branch nodes only exist
/// where two stored prefixes diverge, so every operation is bounded by the key length rather
/// than by the number of entries.
///
/// The trie stores `V` but never looks inside it. Use a reference or an index into your own
/// storage for `V` if the trie should not own the data.
///
/// ## Examples
///
/// ```rust
/// use std::net::Ipv4Addr;
/// use patricia::{ArrayKey, PatriciaTrie};
///
/// let mut routes = PatriciaTrie::new();
/// let net = |a, b, c, d| ArrayKey::<4>::from(Ipv4Addr::new(a, b, c, d));
///
/// routes.insert(net(10, 0, 0, 0), 8, "core").unwrap();
/// routes.insert(net(10, 20, 0, 0), 16, "lab").unwrap();
/// routes.insert(net(0, 0, 0, 0), 0, "default").unwrap();
///
/// assert_eq!(routes.lookup(net(10, 20, 1, 1)), Some(&"lab"));
/// assert_eq!(routes.lookup(net(10, 30, 1, 1)), Some(&"core"));
/// assert_eq!(routes.lookup(net(192, 168, 0, 1)), Some(&"default"));
///
/// assert_eq!(routes.remove(net(10, 20, 0, 0), 16), Ok("lab"));
/// assert_eq!(routes.lookup(net(10, 20, 1, 1)), Some(&"core"));
/// ```
pub struct PatriciaTrie<V> {
    nodes: FillVector<Node<V>>,
    root: Option<FVIndex>,
    len: usize,
    config: Config,
}

/// Where a node hangs: from the trie root, or from a parent on one side.
#[derive(Clone, Copy, Debug)]
enum Link {
    Root,
    Child(FVIndex, Direction),
}

/// Outcome of descending towards the position of a new entry.
enum Seek {
    /// A node already stands for exactly this prefix.
    Exact(FVIndex),
    /// The descent fell off the tree; the entry goes in this empty slot.
    Vacant(Link),
    /// `existing`, hanging at `link`, does not lie under the new prefix. `common` is the number
    /// of leading bits they share.
    Split {
        link: Link,
        existing: FVIndex,
        common: usize,
    },
}

/// A node matching an exact prefix, plus the links needed to unhook it and its parent.
struct Found {
    id: FVIndex,
    link: Link,
    parent_link: Link,
}

impl<V> Default for PatriciaTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PatriciaTrie<V> {
    /// Create a new empty trie.
    pub fn new() -> Self {
        Self {
            nodes: FillVector::new(),
            root: None,
            len: 0,
            config: Config::default(),
        }
    }

    /// Create a new empty trie with the given configuration, reserving its initial capacity.
    pub fn with_config(config: Config) -> Result<Self, TrieError> {
        let nodes = FillVector::try_with_capacity(config.initial_capacity)?;
        Ok(Self {
            nodes,
            root: None,
            len: 0,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, counting pure branch nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.size()
    }

    /// Store `value` under the first `prefix_len` bits of `key`.
    ///
    /// Fails with [`TrieError::DuplicateKey`] if that exact prefix is already stored, in which
    /// case the stored value is kept and `value` is dropped. Bits of `key` past `prefix_len` are
    /// ignored.
    pub fn insert<K>(&mut self, key: K, prefix_len: usize, value: V) -> Result<(), TrieError>
    where
        K: AsRef<[u8]>,
    {
        self.upsert(key.as_ref(), prefix_len, value, false).map(|_| ())
    }

    /// Store `value` under the first `prefix_len` bits of `key`, returning the value it
    /// replaces, if any.
    pub fn replace<K>(
        &mut self,
        key: K,
        prefix_len: usize,
        value: V,
    ) -> Result<Option<V>, TrieError>
    where
        K: AsRef<[u8]>,
    {
        self.upsert(key.as_ref(), prefix_len, value, true)
    }

    /// Longest-prefix match: the value of the longest stored prefix of `key`.
    #[inline]
    pub fn lookup<K>(&self, key: K) -> Option<&V>
    where
        K: AsRef<[u8]>,
    {
        self.longest_match(key).map(|(_, v)| v)
    }

    /// Like [`lookup`](Self::lookup), also returning the length of the matched prefix.
    pub fn longest_match<K>(&self, key: K) -> Option<(usize, &V)>
    where
        K: AsRef<[u8]>,
    {
        let node = &self.nodes[self.longest_match_id(key.as_ref())?];
        node.value.as_ref().map(|v| (node.prefix_len, v))
    }

    pub fn longest_match_mut<K>(&mut self, key: K) -> Option<(usize, &mut V)>
    where
        K: AsRef<[u8]>,
    {
        let id = self.longest_match_id(key.as_ref())?;
        let node = &mut self.nodes[id];
        let prefix_len = node.prefix_len;
        node.value.as_mut().map(|v| (prefix_len, v))
    }

    /// Every stored prefix of `key` with its value, shortest first.
    pub fn matches<'a, K>(&'a self, key: &'a K) -> Matches<'a, V>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        Matches::new(SearchPath::new(&self.nodes, self.root, key.as_ref()))
    }

    /// Exact-prefix lookup.
    pub fn get<K>(&self, key: K, prefix_len: usize) -> Option<&V>
    where
        K: AsRef<[u8]>,
    {
        let found = self.find_exact(key.as_ref(), prefix_len)?;
        self.nodes[found.id].value.as_ref()
    }

    pub fn get_mut<K>(&mut self, key: K, prefix_len: usize) -> Option<&mut V>
    where
        K: AsRef<[u8]>,
    {
        let found = self.find_exact(key.as_ref(), prefix_len)?;
        self.nodes[found.id].value.as_mut()
    }

    pub fn contains<K>(&self, key: K, prefix_len: usize) -> bool
    where
        K: AsRef<[u8]>,
    {
        self.get(key, prefix_len).is_some()
    }

    /// Remove the entry stored under exactly the first `prefix_len` bits of `key` and return its
    /// value. Longer and shorter prefixes are left alone.
    pub fn remove<K>(&mut self, key: K, prefix_len: usize) -> Result<V, TrieError>
    where
        K: AsRef<[u8]>,
    {
        let Some(Found {
            id,
            link,
            parent_link,
        }) = self.find_exact(key.as_ref(), prefix_len)
        else {
            return Err(TrieError::NotFound);
        };
        let Some(value) = self.nodes[id].value.take() else {
            return Err(TrieError::NotFound);
        };
        self.len -= 1;

        let node = &self.nodes[id];
        match (node.child(Direction::Left), node.child(Direction::Right)) {
            (Some(_), Some(_)) => {
                trace!(prefix_len, "entry demoted to branch node");
            }
            (Some(only), None) | (None, Some(only)) => {
                trace!(prefix_len, "splicing out entry with one child");
                self.set_link(link, Some(only));
                self.nodes.free(id);
            }
            (None, None) => {
                self.set_link(link, None);
                self.nodes.free(id);
                if let Link::Child(parent, _) = link {
                    self.collapse(parent, parent_link);
                }
            }
        }
        Ok(value)
    }

    /// Remove every entry, freeing nodes children-first.
    pub fn clear(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        let mut freed = 0usize;
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                self.nodes.free(id);
                freed += 1;
                continue;
            }
            stack.push((id, true));
            stack.extend(self.nodes[id].children.iter().flatten().map(|&c| (c, false)));
        }
        debug_assert!(self.nodes.is_empty());
        debug!(freed, entries = self.len, "released trie");
        self.nodes.clear();
        self.len = 0;
    }

    /// Iterate over `(prefix bytes, prefix length, value)` in bit order, each prefix ahead of
    /// the prefixes that extend it.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.nodes, self.root)
    }

    pub fn values(&self) -> Values<'_, V> {
        Values::new(self.iter())
    }

    /// Verify the structural invariants of the trie.
    pub fn check_well_formed(&self) -> Result<(), MalformedTrie> {
        WellFormedChecker::new(&self.nodes, self.root, self.len).check()
    }
}

// Internals implementation
impl<V> PatriciaTrie<V> {
    fn check_prefix_len(&self, key: &[u8], prefix_len: usize) -> Result<(), TrieError> {
        let mut max = keys::bit_len(key);
        if let Some(limit) = self.config.max_prefix_len {
            max = max.min(limit);
        }
        if prefix_len > max {
            return Err(TrieError::PrefixTooLong { prefix_len, max });
        }
        Ok(())
    }

    fn set_link(&mut self, link: Link, target: Option<FVIndex>) {
        match link {
            Link::Root => self.root = target,
            Link::Child(parent, dir) => self.nodes[parent].set_child(dir, target),
        }
    }

    fn longest_match_id(&self, key: &[u8]) -> Option<FVIndex> {
        SearchPath::new(&self.nodes, self.root, key)
            .filter(|(_, node)| node.has_value())
            .last()
            .map(|(id, _)| id)
    }

    fn seek(&self, key: &[u8], prefix_len: usize) -> Seek {
        let mut link = Link::Root;
        let mut cur = self.root;
        let mut verified = 0;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            let limit = node.prefix_len.min(prefix_len);
            let common = keys::common_prefix_len_from(&node.prefix, key, verified, limit);
            if common < node.prefix_len {
                return Seek::Split {
                    link,
                    existing: id,
                    common,
                };
            }
            if node.prefix_len == prefix_len {
                return Seek::Exact(id);
            }
            // `prefix_len` was checked against the key, so the bit at `node.prefix_len` exists.
            let dir = Direction::from_bit(keys::bit_at(key, node.prefix_len) == Some(true));
            verified = node.prefix_len + 1;
            link = Link::Child(id, dir);
            cur = node.child(dir);
        }
        Seek::Vacant(link)
    }

    fn find_exact(&self, key: &[u8], prefix_len: usize) -> Option<Found> {
        if prefix_len > keys::bit_len(key) {
            return None;
        }
        let mut link = Link::Root;
        let mut parent_link = Link::Root;
        let mut cur = self.root;
        let mut verified = 0;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if node.prefix_len > prefix_len || !node.matches_from(key, verified) {
                return None;
            }
            if node.prefix_len == prefix_len {
                return Some(Found {
                    id,
                    link,
                    parent_link,
                });
            }
            let dir = node.direction_for(key)?;
            verified = node.prefix_len + 1;
            parent_link = link;
            link = Link::Child(id, dir);
            cur = node.child(dir);
        }
        None
    }

    fn upsert(
        &mut self,
        key: &[u8],
        prefix_len: usize,
        value: V,
        overwrite: bool,
    ) -> Result<Option<V>, TrieError> {
        self.check_prefix_len(key, prefix_len)?;

        // Everything that can fail is allocated before the first link changes.
        match self.seek(key, prefix_len) {
            Seek::Exact(id) => {
                let slot = &mut self.nodes[id].value;
                if slot.is_none() {
                    trace!(prefix_len, "promoting branch node to entry");
                    *slot = Some(value);
                    self.len += 1;
                    return Ok(None);
                }
                if !overwrite {
                    return Err(TrieError::DuplicateKey { prefix_len });
                }
                return Ok(slot.replace(value));
            }
            Seek::Vacant(link) => {
                let prefix = keys::truncated(key, prefix_len)?;
                self.nodes.try_reserve(1)?;
                let leaf = self.nodes.add(Node::new_leaf(prefix, prefix_len, value));
                self.set_link(link, Some(leaf));
            }
            Seek::Split {
                link,
                existing,
                common,
            } if common == prefix_len => {
                // The new prefix is a proper prefix of the existing subtree's: it goes above it.
                let prefix = keys::truncated(key, prefix_len)?;
                self.nodes.try_reserve(1)?;
                let side = keys::bit_at(&self.nodes[existing].prefix, prefix_len);
                debug_assert!(side.is_some());
                let mut node = Node::new_leaf(prefix, prefix_len, value);
                node.set_child(Direction::from_bit(side == Some(true)), Some(existing));
                trace!(prefix_len, "inserting entry above existing subtree");
                let id = self.nodes.add(node);
                self.set_link(link, Some(id));
            }
            Seek::Split {
                link,
                existing,
                common,
            } => {
                // The prefixes diverge at bit `common`; fork there.
                let branch_prefix = keys::truncated(key, common)?;
                let leaf_prefix = keys::truncated(key, prefix_len)?;
                self.nodes.try_reserve(2)?;
                let new_side = Direction::from_bit(keys::bit_at(key, common) == Some(true));
                let leaf = self.nodes.add(Node::new_leaf(leaf_prefix, prefix_len, value));
                let mut branch = Node::new_branch(branch_prefix, common);
                branch.set_child(new_side, Some(leaf));
                branch.set_child(new_side.flip(), Some(existing));
                trace!(prefix_len, branch_bit = common, "creating branch node");
                let id = self.nodes.add(branch);
                self.set_link(link, Some(id));
            }
        }
        self.len += 1;
        Ok(None)
    }

    /// Splice out the node at `id` if it is a branch node left with a single child.
    fn collapse(&mut self, id: FVIndex, link: Link) {
        let node = &self.nodes[id];
        if node.has_value() {
            return;
        }
        let mut remaining = node.children.iter().flatten().copied();
        let (Some(only), None) = (remaining.next(), remaining.next()) else {
            return;
        };
        trace!(
            branch_bit = node.discriminating_bit(),
            "collapsing branch node"
        );
        self.set_link(link, Some(only));
        self.nodes.free(id);
    }
}

impl<V> Drop for PatriciaTrie<V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, V> IntoIterator for &'a PatriciaTrie<V> {
    type Item = (&'a [u8], usize, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V> TreeStatsTrait for PatriciaTrie<V> {
    fn get_tree_stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let Some(root) = self.root else {
            return stats;
        };

        let mut stack = vec![(root, 1usize)];
        while let Some((id, height)) = stack.pop() {
            let node = &self.nodes[id];
            stats.update(node, height);
            stack.extend(
                node.children
                    .iter()
                    .flatten()
                    .map(|&child| (child, height + 1)),
            );
        }
        stats
    }
}
