//! Bit addressing over byte-string keys.
//!
//! Bits are numbered most-significant-bit first within each byte, so bit 0 is the top bit of
//! the first byte. This is the numbering used for IP prefixes: `10.0.0.0/8` is the key
//! `[10, 0, 0, 0]` with its first 8 bits significant.

use std::collections::TryReserveError;

pub mod array_key;

/// Number of bits addressable in `key`.
#[inline]
pub fn bit_len(key: &[u8]) -> usize {
    key.len() * 8
}

/// Returns the bit at `pos`, or `None` if `key` is too short to have one.
#[inline]
pub fn bit_at(key: &[u8], pos: usize) -> Option<bool> {
    let byte = key.get(pos >> 3)?;
    Some(byte & (0x80 >> (pos & 7)) != 0)
}

/// Mask selecting the top `bits` bits of a byte. `bits` must be below 8.
#[inline]
fn high_mask(bits: usize) -> u8 {
    !(0xFFu8 >> bits)
}

#[cfg(test)]
thread_local! {
    /// Key bytes examined by `common_prefix_len_from` on this thread.
    pub(crate) static BYTES_COMPARED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Length of the common prefix of `a` and `b`, looking at no more than `limit` bits (and never
/// past the end of either key).
#[inline]
pub fn common_prefix_len(a: &[u8], b: &[u8], limit: usize) -> usize {
    common_prefix_len_from(a, b, 0, limit)
}

/// Like [`common_prefix_len`], for keys already known to agree on their first `start` bits.
/// Only bytes holding bits in `start..limit` are read.
pub fn common_prefix_len_from(a: &[u8], b: &[u8], start: usize, limit: usize) -> usize {
    let limit = limit.min(bit_len(a)).min(bit_len(b));
    let mut byte = start / 8;
    // Bits before `start` in the first byte are not compared.
    let mut live = 0xFFu8 >> (start % 8);
    while byte * 8 < limit {
        #[cfg(test)]
        BYTES_COMPARED.with(|n| n.set(n.get() + 1));
        let mut diff = (a[byte] ^ b[byte]) & live;
        if (byte + 1) * 8 > limit {
            diff &= high_mask(limit % 8);
        }
        if diff != 0 {
            return byte * 8 + diff.leading_zeros() as usize;
        }
        live = 0xFF;
        byte += 1;
    }
    limit
}

/// True if the first `len` bits of `stored` and `key` agree. A key with fewer than `len` bits
/// never matches.
#[inline]
pub fn prefix_matches(stored: &[u8], key: &[u8], len: usize) -> bool {
    prefix_matches_from(stored, key, 0, len)
}

/// Like [`prefix_matches`], comparing only bits `start..len`.
#[inline]
pub fn prefix_matches_from(stored: &[u8], key: &[u8], start: usize, len: usize) -> bool {
    len <= bit_len(key)
        && len <= bit_len(stored)
        && common_prefix_len_from(stored, key, start, len) == len
}

/// Copy out the first `len` bits of `key`, clearing whatever trails them in the last byte.
/// `len` must not exceed `bit_len(key)`.
pub fn truncated(key: &[u8], len: usize) -> Result<Box<[u8]>, TryReserveError> {
    debug_assert!(len <= bit_len(key), "prefix longer than key");
    let nbytes = len.div_ceil(8);
    let mut bytes = Vec::new();
    bytes.try_reserve_exact(nbytes)?;
    bytes.extend_from_slice(&key[..nbytes]);
    let rem = len % 8;
    if rem != 0 {
        if let Some(last) = bytes.last_mut() {
            *last &= high_mask(rem);
        }
    }
    Ok(bytes.into_boxed_slice())
}
