use std::collections::TryReserveError;

use thiserror::Error;

/// Errors returned by trie operations. A failed operation never leaves the trie modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// Node or key storage could not be reserved.
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// An entry with this exact prefix is already stored.
    #[error("a /{prefix_len} entry for this prefix already exists")]
    DuplicateKey { prefix_len: usize },

    /// No entry is stored for this exact prefix.
    #[error("no entry stored for this prefix")]
    NotFound,

    /// The prefix length is longer than the key, or than the configured maximum.
    #[error("prefix length {prefix_len} exceeds the {max} bits available")]
    PrefixTooLong { prefix_len: usize, max: usize },
}
