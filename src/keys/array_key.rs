use std::net::{Ipv4Addr, Ipv6Addr};

use num_traits::{PrimInt, ToBytes, Unsigned};

use crate::keys::bit_at;

/// A fixed-width key of `N` bytes, i.e. `N * 8` addressable bits.
///
/// `ArrayKey` is a stack-allocated key for the common case where every key in a trie has the
/// same width, such as IPv4 (`ArrayKey<4>`) or IPv6 (`ArrayKey<16>`) addresses. Any
/// `AsRef<[u8]>` works as a key; this type just makes the conversions convenient.
///
/// ## Examples
///
/// ```rust
/// use std::net::Ipv4Addr;
/// use patricia::keys::array_key::ArrayKey;
///
/// let key: ArrayKey<4> = Ipv4Addr::new(10, 1, 2, 3).into();
/// assert_eq!(key.as_ref(), &[10, 1, 2, 3]);
///
/// // Unsigned integers are stored big-endian, so bit 0 is the integer's top bit.
/// let key: ArrayKey<4> = 0x8000_0000u32.into();
/// assert!(key.bit(0));
/// ```
#[derive(Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct ArrayKey<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> AsRef<[u8]> for ArrayKey<N> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> Default for ArrayKey<N> {
    fn default() -> Self {
        Self { data: [0; N] }
    }
}

impl<const N: usize> ArrayKey<N> {
    pub const BITS: usize = N * 8;

    pub fn new(data: [u8; N]) -> Self {
        Self { data }
    }

    /// Build a key from the leading bytes of `data`, zero-filling on the right. Returns `None`
    /// if `data` is wider than the key.
    pub fn new_from_slice(data: &[u8]) -> Option<Self> {
        if data.len() > N {
            return None;
        }
        let mut arr = [0; N];
        arr[..data.len()].copy_from_slice(data);
        Some(Self { data: arr })
    }

    /// Build a key from the big-endian bytes of an unsigned integer, left-aligned so that the
    /// integer's most significant bit is bit 0 of the key.
    pub fn new_from_unsigned<T>(v: T) -> Self
    where
        T: PrimInt + Unsigned + ToBytes,
    {
        let be = v.to_be_bytes();
        let be = be.as_ref();
        debug_assert!(be.len() <= N, "integer is wider than the key");
        let mut arr = [0; N];
        let n = be.len().min(N);
        arr[..n].copy_from_slice(&be[..n]);
        Self { data: arr }
    }

    pub fn as_array(&self) -> &[u8; N] {
        &self.data
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn bit_len(&self) -> usize {
        Self::BITS
    }

    /// The bit at `pos`, most significant first. Panics if `pos >= Self::BITS`.
    pub fn bit(&self, pos: usize) -> bool {
        match bit_at(&self.data, pos) {
            Some(b) => b,
            None => panic!("bit {pos} out of range for a {}-bit key", Self::BITS),
        }
    }
}

impl<const N: usize> From<[u8; N]> for ArrayKey<N> {
    fn from(data: [u8; N]) -> Self {
        Self::new(data)
    }
}

impl From<Ipv4Addr> for ArrayKey<4> {
    fn from(addr: Ipv4Addr) -> Self {
        Self::new(addr.octets())
    }
}

impl From<Ipv6Addr> for ArrayKey<16> {
    fn from(addr: Ipv6Addr) -> Self {
        Self::new(addr.octets())
    }
}

macro_rules! impl_from_unsigned {
    ( $($t:ty => $n:expr),* ) => {
    $(
    impl From< $t > for ArrayKey<$n>
    {
        fn from(data: $t) -> Self {
            ArrayKey::new_from_unsigned(data)
        }
    }
    impl From< &$t > for ArrayKey<$n>
    {
        fn from(data: &$t) -> Self {
            (*data).into()
        }
    }
    ) *
    }
}
impl_from_unsigned!(u8 => 1, u16 => 2, u32 => 4, u64 => 8, u128 => 16);

#[cfg(test)]
mod test {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use crate::keys::array_key::ArrayKey;

    #[test]
    fn from_unsigned_is_big_endian() {
        let k: ArrayKey<4> = 0x0A01_0203u32.into();
        assert_eq!(k.as_slice(), &[0x0A, 0x01, 0x02, 0x03]);
        assert_eq!(k, ArrayKey::from(Ipv4Addr::new(10, 1, 2, 3)));

        let k: ArrayKey<2> = 0x8001u16.into();
        assert!(k.bit(0));
        assert!(!k.bit(1));
        assert!(k.bit(15));
    }

    #[test]
    fn narrow_integer_in_wide_key_is_left_aligned() {
        let k = ArrayKey::<8>::new_from_unsigned(0xABCDu16);
        assert_eq!(k.as_slice(), &[0xAB, 0xCD, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn from_slice() {
        assert_eq!(
            ArrayKey::<4>::new_from_slice(&[1, 2]).map(|k| *k.as_array()),
            Some([1, 2, 0, 0])
        );
        assert!(ArrayKey::<2>::new_from_slice(&[1, 2, 3]).is_none());
    }

    #[test]
    fn ipv6() {
        let k: ArrayKey<16> = "2001:db8::1".parse::<Ipv6Addr>().unwrap().into();
        assert_eq!(k.bit_len(), 128);
        assert_eq!(&k.as_slice()[..4], &[0x20, 0x01, 0x0d, 0xb8]);
    }

    #[test]
    #[should_panic]
    fn bit_out_of_range() {
        let k: ArrayKey<1> = 0u8.into();
        k.bit(8);
    }
}
