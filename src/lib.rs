//! A path-compressed Patricia trie for longest-prefix matching over bit strings.
//!
//! Entries are stored under a key and a prefix length in bits, and looked up by the longest
//! stored prefix of a query key. The classic use is an IP routing table, where `10.0.0.0/8` is
//! the key `[10, 0, 0, 0]` with prefix length 8.
//!
//! ```rust
//! use patricia::{ArrayKey, Config, PatriciaTrie};
//!
//! let mut table = PatriciaTrie::with_config(Config::ipv4()).unwrap();
//! table.insert(ArrayKey::<4>::from(0x0A00_0000u32), 8, "ten").unwrap();
//! assert_eq!(table.lookup(ArrayKey::<4>::from(0x0A01_0203u32)), Some(&"ten"));
//! assert_eq!(table.lookup(ArrayKey::<4>::from(0x0B00_0000u32)), None);
//! ```

mod node;

pub mod config;
pub mod error;
pub mod iter;
pub mod keys;
pub mod stats;
pub mod tree;
pub mod utils;
pub mod well_formed;

pub use config::Config;
pub use error::TrieError;
pub use iter::{Iter, Matches, Values};
pub use keys::array_key::ArrayKey;
pub use stats::{TreeStats, TreeStatsTrait};
pub use tree::PatriciaTrie;
pub use well_formed::MalformedTrie;
