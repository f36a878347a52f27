/// Construction-time settings for a [`PatriciaTrie`](crate::tree::PatriciaTrie).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Number of node slots to reserve up front.
    pub initial_capacity: usize,
    /// Longest prefix accepted by `insert`, in bits. `None` bounds prefixes only by key length.
    pub max_prefix_len: Option<usize>,
}

impl Config {
    /// Settings for IPv4 routes: prefixes of at most 32 bits.
    pub fn ipv4() -> Self {
        Self {
            initial_capacity: 0,
            max_prefix_len: Some(32),
        }
    }

    /// Settings for IPv6 routes: prefixes of at most 128 bits.
    pub fn ipv6() -> Self {
        Self {
            initial_capacity: 0,
            max_prefix_len: Some(128),
        }
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_max_prefix_len(mut self, max_prefix_len: usize) -> Self {
        self.max_prefix_len = Some(max_prefix_len);
        self
    }
}
