#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use patricia::{ArrayKey, PatriciaTrie, TrieError};

#[derive(Arbitrary, Debug)]
enum TrieMethod {
    Lookup { addr: u32 },
    Get { addr: u32, len: u8 },
    Insert { addr: u32, len: u8, val: usize },
    Replace { addr: u32, len: u8, val: usize },
    Remove { addr: u32, len: u8 },
}

fn mask(addr: u32, len: usize) -> u32 {
    if len == 0 {
        0
    } else {
        addr & (u32::MAX << (32 - len))
    }
}

fuzz_target!(|methods: Vec<TrieMethod>| {
    let mut trie = PatriciaTrie::<usize>::new();
    let mut oracle = BTreeMap::<(u32, usize), usize>::new();

    for m in methods {
        match m {
            TrieMethod::Lookup { addr } => {
                let expected = (0..=32usize)
                    .rev()
                    .find_map(|len| oracle.get(&(mask(addr, len), len)).map(|v| (len, v)));
                assert_eq!(trie.longest_match(ArrayKey::<4>::from(addr)), expected);
            }
            TrieMethod::Get { addr, len } => {
                let len = len as usize % 33;
                assert_eq!(
                    trie.get(ArrayKey::<4>::from(addr), len),
                    oracle.get(&(mask(addr, len), len))
                );
            }
            TrieMethod::Insert { addr, len, val } => {
                let len = len as usize % 33;
                let result = trie.insert(ArrayKey::<4>::from(addr), len, val);
                eprintln!("Insert: {:08x}/{} {:?}", addr, len, result);
                match oracle.entry((mask(addr, len), len)) {
                    std::collections::btree_map::Entry::Vacant(e) => {
                        e.insert(val);
                        assert_eq!(result, Ok(()));
                    }
                    std::collections::btree_map::Entry::Occupied(_) => {
                        assert_eq!(result, Err(TrieError::DuplicateKey { prefix_len: len }));
                    }
                }
            }
            TrieMethod::Replace { addr, len, val } => {
                let len = len as usize % 33;
                let old = trie.replace(ArrayKey::<4>::from(addr), len, val);
                assert_eq!(old, Ok(oracle.insert((mask(addr, len), len), val)));
            }
            TrieMethod::Remove { addr, len } => {
                let len = len as usize % 33;
                let removed = trie.remove(ArrayKey::<4>::from(addr), len);
                eprintln!("Remove: {:08x}/{} {:?}", addr, len, removed);
                let expected = oracle.remove(&(mask(addr, len), len)).ok_or(TrieError::NotFound);
                assert_eq!(removed, expected);
            }
        }
        assert_eq!(trie.len(), oracle.len());
        if let Err(e) = trie.check_well_formed() {
            panic!("malformed trie: {e}");
        }
    }

    let mut entries: Vec<_> = trie
        .iter()
        .map(|(k, len, v)| {
            let mut bytes = [0u8; 4];
            bytes[..k.len()].copy_from_slice(k);
            ((u32::from_be_bytes(bytes), len), *v)
        })
        .collect();
    entries.sort();
    assert_eq!(entries, oracle.into_iter().collect::<Vec<_>>());
});
