use rand::Rng;
use ref_cast::RefCast;
pub use std::ops::{Deref, DerefMut, Index, IndexMut};

/// A block of bits. This is an alias for [`u64`]
pub type BitBlock = u64;

/// Number of bits in a [`BitBlock`]
pub const BLOCKSIZE: usize = 64;

/// Bitwise OR with this constant to set most signficant bit to one
pub const MSB_ON: BitBlock = 0x8000000000000000;

/// Returns the minimum number of [`BitBlock`]s required to store the given number of bits.
///
/// If `bits` is not a multiple of [`BLOCKSIZE`], the result is rounded up to ensure all bits fit.
#[inline]
pub fn min_blocks(bits: usize) -> usize {
    bits / BLOCKSIZE + if bits % BLOCKSIZE == 0 { 0 } else { 1 }
}

/// Returns a block whose `len` most significant bits are set, for `len <= BLOCKSIZE`.
#[inline]
pub fn leading_mask(len: usize) -> BitBlock {
    if len >= BLOCKSIZE {
        BitBlock::MAX
    } else {
        !(BitBlock::MAX >> len)
    }
}

/// A vector of bits, stored as a vector of [`BitBlock`]s.
///
/// Bits are addressed most significant first: bit 0 is the top bit of the first block. This is
/// the order in which Hadamard rows are stored and in which code words are emitted, so a row can
/// be cut into code words without reversing anything.
///
/// # Examples
///
/// ```
/// use hadamard::bitvec::*;
///
/// let bv: BitVec = [MSB_ON >> 5, 0].into_iter().collect();
/// assert!(bv.bit(5));
/// assert!(!bv.bit(6));
/// assert_eq!(bv.num_bits(), 2 * BLOCKSIZE);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct BitVec(Vec<BitBlock>);

/// A range of bits, represented as a slice of [`BitBlock`]s.
#[derive(RefCast, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(transparent)]
pub struct BitRange([BitBlock]);

/// Iterator over the bits in a [`BitRange`].
///
/// Yields each bit as a `bool`, starting from the most significant bit of the first block.
pub struct BitRangeIter<'a> {
    inner: std::slice::Iter<'a, BitBlock>,
    c: usize,
    block: BitBlock,
}

impl<'a> Iterator for BitRangeIter<'a> {
    type Item = bool;
    fn next(&mut self) -> Option<Self::Item> {
        if self.c == BLOCKSIZE {
            self.block = self.inner.next().copied()?;
            self.c = 0;
        }
        let bit = self.block & MSB_ON == MSB_ON;
        self.block <<= 1;
        self.c += 1;
        Some(bit)
    }
}

impl BitRange {
    /// Returns an iterator over all bits in this range as `bool`s.
    #[inline]
    pub fn iter(&self) -> BitRangeIter<'_> {
        BitRangeIter {
            inner: self.0.iter(),
            c: BLOCKSIZE,
            block: 0,
        }
    }

    /// Counts the positions at which `self` and `rhs` differ, i.e. the Hamming distance.
    ///
    /// Blocks beyond the shorter of the two ranges are ignored.
    #[inline]
    pub fn count_differences(&self, rhs: &BitRange) -> u32 {
        self.0
            .iter()
            .zip(rhs.0.iter())
            .fold(0, |c, (bits0, bits1)| c + (bits0 ^ bits1).count_ones())
    }

    /// Returns the value of the bit at the specified index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        let block_index = index / BLOCKSIZE;
        let bit_index = (index % BLOCKSIZE) as u32;
        let block = self.0[block_index].rotate_left(bit_index);
        block & MSB_ON == MSB_ON
    }

    /// Copies `len` blocks starting at block `source` over the blocks starting at `target`.
    ///
    /// The two ranges may overlap.
    #[inline]
    pub fn copy_range(&mut self, source: usize, target: usize, len: usize) {
        self.0.copy_within(source..source + len, target);
    }

    /// Flips every bit of the `len` blocks starting at block `start`.
    #[inline]
    pub fn invert_range(&mut self, start: usize, len: usize) {
        for block in &mut self.0[start..start + len] {
            *block = !*block;
        }
    }

    #[inline]
    pub fn num_bits(&self) -> usize {
        self.0.len() * BLOCKSIZE
    }
}

impl Index<usize> for BitRange {
    type Output = BitBlock;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.0.index(index)
    }
}

impl IndexMut<usize> for BitRange {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.0.index_mut(index)
    }
}

impl BitVec {
    #[inline]
    pub fn bit_range(&self, from_block: usize, to_block: usize) -> &BitRange {
        BitRange::ref_cast(&self.0[from_block..to_block])
    }

    #[inline]
    pub fn random(rng: &mut impl Rng, num_blocks: usize) -> Self {
        (0..num_blocks).map(|_| rng.random::<BitBlock>()).collect()
    }

    #[inline]
    pub fn zeros(num_blocks: usize) -> Self {
        BitVec(vec![0; num_blocks])
    }
}

impl FromIterator<BitBlock> for BitVec {
    fn from_iter<T: IntoIterator<Item = BitBlock>>(iter: T) -> Self {
        BitVec(Vec::from_iter(iter))
    }
}

impl Deref for BitVec {
    type Target = BitRange;
    fn deref(&self) -> &Self::Target {
        BitRange::ref_cast(&self.0)
    }
}

impl DerefMut for BitVec {
    fn deref_mut(&mut self) -> &mut Self::Target {
        BitRange::ref_cast_mut(&mut self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn blocks(b: &[BitBlock]) -> BitVec {
        b.iter().copied().collect()
    }

    #[test]
    fn bits_and_iter() {
        let vec = blocks(&[MSB_ON | 1, MSB_ON >> 3]);
        let set = [0, 63, 67];
        for i in 0..vec.num_bits() {
            assert_eq!(vec.bit(i), set.contains(&i), "bit {}", i);
        }
        let from_iter: Vec<usize> = vec
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.then_some(i))
            .collect();
        assert_eq!(from_iter, set);
        assert_eq!(vec.iter().count(), 2 * BLOCKSIZE);
    }

    #[test]
    fn copy_and_invert() {
        let i = BitBlock::MAX;
        let mut vec0 = blocks(&[0, i, 0x0f, 0, 0]);
        vec0.copy_range(1, 3, 2);
        assert_eq!(vec0, blocks(&[0, i, 0x0f, i, 0x0f]));

        vec0.invert_range(2, 2);
        assert_eq!(vec0, blocks(&[0, i, !0x0f, 0, 0x0f]));
    }

    #[test]
    fn differences() {
        let mut rng = SmallRng::seed_from_u64(1);
        let vec0 = BitVec::random(&mut rng, 6);
        let vec1 = BitVec::random(&mut rng, 6);
        assert_eq!(vec0.count_differences(&vec0), 0);

        let expected = (0..vec0.num_bits())
            .filter(|&b| vec0.bit(b) != vec1.bit(b))
            .count();
        assert_eq!(vec0.count_differences(&vec1) as usize, expected);
    }

    #[test]
    fn leading_masks() {
        assert_eq!(leading_mask(0), 0);
        assert_eq!(leading_mask(1), MSB_ON);
        assert_eq!(leading_mask(16), 0xffff_0000_0000_0000);
        assert_eq!(leading_mask(BLOCKSIZE), BitBlock::MAX);
    }

    #[test]
    fn block_access() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut vec = BitVec::random(&mut rng, 10);
        let r = vec.bit_range(4, 9);
        assert_eq!(r.num_bits(), 5 * BLOCKSIZE);
        let expected = vec[4];
        assert_eq!(r[0], expected);

        vec[4] = 0;
        assert!((4 * BLOCKSIZE..5 * BLOCKSIZE).all(|b| !vec.bit(b)));
    }
}
