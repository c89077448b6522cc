//! Spreading codes cut out of the rows of a [`HadamardMatrix`]
//!
//! A code of order `k` and index `i` is the first `2^k` entries of row `i`, written as bits
//! (`+1` as 1, `-1` as 0) into 16-bit words, most significant bit first. If `2^k` is not a
//! multiple of 16, the low bits of the last word are 0.

use std::{fmt, iter::FusedIterator};

use log::{debug, trace};
use thiserror::Error;

use crate::bitvec::{BitBlock, BitRange, BLOCKSIZE};
use crate::matrix::HadamardMatrix;

/// Number of bits in each word of a code
pub const CODE_WORD_BITS: usize = 16;

const WORDS_PER_BLOCK: usize = BLOCKSIZE / CODE_WORD_BITS;

/// Reasons a code can't be extracted from a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The code index doesn't name one of the `codes` rows available at `order`, either because
    /// the matrix is too small or because the requested order only has that many codes.
    #[error("code index {code_index} is invalid, order {order} has {codes} codes (0..{codes})")]
    InvalidCodeIndex {
        code_index: usize,
        order: usize,
        codes: usize,
    },

    /// The requested order is larger than the order the matrix was built with.
    #[error("order {requested} is invalid, the matrix was built with order {built}")]
    InvalidOrder { requested: usize, built: usize },
}

/// Extracts the code of order `requested_order` at `code_index` from `matrix`
///
/// Shorthand for [`HadamardMatrix::code_words`].
#[inline]
pub fn extract_code(
    matrix: &HadamardMatrix,
    requested_order: usize,
    code_index: usize,
) -> Result<CodeWords<'_>, ExtractError> {
    matrix.code_words(requested_order, code_index)
}

impl HadamardMatrix {
    /// Returns the 16-bit words of the code at `code_index`, truncated to `2^requested_order`
    /// entries
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`ExtractError::InvalidCodeIndex`] if `code_index` is not a row of this matrix
    /// - [`ExtractError::InvalidOrder`] if `requested_order` exceeds [`HadamardMatrix::order`]
    /// - [`ExtractError::InvalidCodeIndex`] if `code_index >= 2^requested_order`
    ///
    /// Only the first violated bound is reported, e.g. a request with both a bad index and a bad
    /// order reports the index against the built order.
    pub fn code_words(
        &self,
        requested_order: usize,
        code_index: usize,
    ) -> Result<CodeWords<'_>, ExtractError> {
        self.check_code(requested_order, code_index)
            .inspect_err(|err| debug!("rejected code request: {err}"))?;

        let len = 1usize << requested_order;
        let words = CodeWords::new(self.row(code_index), len);
        trace!(
            "code {code_index} of order {requested_order}: {} words",
            words.len()
        );
        Ok(words)
    }

    /// Collects the code at `code_index` into an owned [`CodeWord`]
    ///
    /// # Errors
    ///
    /// The same as [`HadamardMatrix::code_words`].
    #[inline]
    pub fn code_word(
        &self,
        requested_order: usize,
        code_index: usize,
    ) -> Result<CodeWord, ExtractError> {
        Ok(self.code_words(requested_order, code_index)?.collect())
    }

    fn check_code(&self, requested_order: usize, code_index: usize) -> Result<(), ExtractError> {
        if code_index >= self.dim() {
            return Err(ExtractError::InvalidCodeIndex {
                code_index,
                order: self.order(),
                codes: self.dim(),
            });
        }

        if requested_order > self.order() {
            return Err(ExtractError::InvalidOrder {
                requested: requested_order,
                built: self.order(),
            });
        }

        let codes = 1usize << requested_order;
        if code_index >= codes {
            return Err(ExtractError::InvalidCodeIndex {
                code_index,
                order: requested_order,
                codes,
            });
        }

        Ok(())
    }
}

/// Iterator over the 16-bit words of a code
///
/// Words are sliced directly out of the [`BitBlock`]s of a matrix row, four to a block. The last
/// word is masked so that bits past the end of the code are 0.
#[derive(Clone, Debug)]
pub struct CodeWords<'a> {
    row: &'a BitRange,
    next: usize,
    words: usize,
    tail_mask: u16,
}

impl<'a> CodeWords<'a> {
    /// # Panics
    ///
    /// Panics if `row` holds fewer than `len` bits.
    fn new(row: &'a BitRange, len: usize) -> Self {
        if len > row.num_bits() {
            panic!("Code of length {} doesn't fit in {} bits", len, row.num_bits());
        }
        let rem = len % CODE_WORD_BITS;
        let tail_mask = if rem == 0 {
            u16::MAX
        } else {
            !(u16::MAX >> rem)
        };
        CodeWords {
            row,
            next: 0,
            words: len.div_ceil(CODE_WORD_BITS),
            tail_mask,
        }
    }
}

impl Iterator for CodeWords<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.words {
            return None;
        }
        let block: BitBlock = self.row[self.next / WORDS_PER_BLOCK];
        let shift = BLOCKSIZE - CODE_WORD_BITS * (self.next % WORDS_PER_BLOCK + 1);
        let mut word = (block >> shift) as u16;
        self.next += 1;
        if self.next == self.words {
            word &= self.tail_mask;
        }
        Some(word)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.words - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for CodeWords<'_> {}

impl FusedIterator for CodeWords<'_> {}

/// Packs a stream of `+1`/`-1` entries into 16-bit words
///
/// A cursor starts at bit 15 of an empty word. Each positive entry sets the bit under the cursor,
/// anything else leaves it 0, and the cursor moves one bit down. A full word is emitted once 16
/// entries have been placed, and a partial word is emitted, zero-padded, when the entries run
/// out.
///
/// For a matrix row this yields the same words as [`CodeWords`], without needing the row to be
/// stored as bits.
#[derive(Clone, Debug)]
pub struct SignedPacker<I> {
    entries: std::iter::Fuse<I>,
    word: u16,
    bit_index: usize,
}

/// Packs `entries` into 16-bit words, see [`SignedPacker`]
#[inline]
pub fn pack_signed<I: IntoIterator<Item = i8>>(entries: I) -> SignedPacker<I::IntoIter> {
    SignedPacker {
        entries: entries.into_iter().fuse(),
        word: 0,
        bit_index: CODE_WORD_BITS,
    }
}

impl<I: Iterator<Item = i8>> Iterator for SignedPacker<I> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        for value in self.entries.by_ref() {
            // -1 is already 0 in a fresh word
            if value > 0 {
                self.word |= 1u16 << (self.bit_index - 1);
            }
            self.bit_index -= 1;
            if self.bit_index == 0 {
                self.bit_index = CODE_WORD_BITS;
                return Some(std::mem::take(&mut self.word));
            }
        }

        if self.bit_index < CODE_WORD_BITS {
            self.bit_index = CODE_WORD_BITS;
            Some(std::mem::take(&mut self.word))
        } else {
            None
        }
    }
}

impl<I: Iterator<Item = i8>> FusedIterator for SignedPacker<I> {}

/// An owned code, as a vector of 16-bit words
///
/// Displays as the concatenated words in lowercase hex, four digits each.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CodeWord(Vec<u16>);

impl CodeWord {
    #[inline]
    pub fn words(&self) -> &[u16] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the bit at `index`, counting from the most significant bit of the first word
    ///
    /// # Panics
    ///
    /// Panics if the index is past the last word.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        let word = self.0[index / CODE_WORD_BITS];
        word & (0x8000 >> (index % CODE_WORD_BITS)) != 0
    }
}

impl FromIterator<u16> for CodeWord {
    fn from_iter<T: IntoIterator<Item = u16>>(iter: T) -> Self {
        CodeWord(Vec::from_iter(iter))
    }
}

impl From<Vec<u16>> for CodeWord {
    fn from(value: Vec<u16>) -> Self {
        CodeWord(value)
    }
}

impl From<CodeWord> for Vec<u16> {
    fn from(value: CodeWord) -> Self {
        value.0
    }
}

impl fmt::Display for CodeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in &self.0 {
            write!(f, "{:04x}", word)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bitvec::BitVec;
    use crate::matrix::build_matrix;
    use rand::{rngs::SmallRng, SeedableRng};

    fn words(m: &HadamardMatrix, order: usize, index: usize) -> Vec<u16> {
        m.code_words(order, index).unwrap().collect()
    }

    #[test]
    fn all_ones_byte() {
        let m = build_matrix(5);
        assert_eq!(words(&m, 3, 0), vec![0xff00]);
    }

    #[test]
    fn alternating_nibble() {
        let m = build_matrix(2);
        assert_eq!(words(&m, 2, 1), vec![0xa000]);
        assert_eq!(m.code_word(2, 1).unwrap().to_string(), "a000");
    }

    #[test]
    fn order_zero_code() {
        let m = build_matrix(0);
        assert_eq!(words(&m, 0, 0), vec![0x8000]);
    }

    #[test]
    fn demo_requests() {
        let m = build_matrix(5);

        assert_eq!(
            m.code_words(5, 33).unwrap_err(),
            ExtractError::InvalidCodeIndex {
                code_index: 33,
                order: 5,
                codes: 32
            }
        );

        // row 31 of the 32x32 matrix follows the Thue-Morse sequence
        let code = m.code_word(5, 31).unwrap();
        assert_eq!(code.words(), &[0x9669, 0x6996]);
        assert_eq!(code.to_string(), "96696996");

        assert_eq!(words(&m, 4, 13), vec![0xa55a]);

        assert_eq!(
            m.code_words(4, 16).unwrap_err(),
            ExtractError::InvalidCodeIndex {
                code_index: 16,
                order: 4,
                codes: 16
            }
        );
    }

    #[test]
    fn invalid_order() {
        let m = build_matrix(5);
        let before = m.clone();
        assert_eq!(
            extract_code(&m, 6, 0).unwrap_err(),
            ExtractError::InvalidOrder {
                requested: 6,
                built: 5
            }
        );
        // the row check comes first
        assert_eq!(
            extract_code(&m, 6, 40).unwrap_err(),
            ExtractError::InvalidCodeIndex {
                code_index: 40,
                order: 5,
                codes: 32
            }
        );
        assert_eq!(m, before);
    }

    #[test]
    fn error_messages() {
        let m = build_matrix(3);
        assert_eq!(
            m.code_words(2, 5).unwrap_err().to_string(),
            "code index 5 is invalid, order 2 has 4 codes (0..4)"
        );
        assert_eq!(
            m.code_words(4, 1).unwrap_err().to_string(),
            "order 4 is invalid, the matrix was built with order 3"
        );
    }

    #[test]
    fn lengths_and_padding() {
        let m = build_matrix(8);
        for order in 0..=8 {
            let len = 1usize << order;
            for index in 0..len {
                let code = m.code_words(order, index).unwrap();
                assert_eq!(code.len(), len.div_ceil(CODE_WORD_BITS));
                let code: CodeWord = code.collect();
                assert_eq!(code.len(), len.div_ceil(CODE_WORD_BITS));

                for b in 0..len {
                    assert_eq!(code.bit(b), m.bit(index, b), "code ({}, {})", order, index);
                }
                for b in len..code.len() * CODE_WORD_BITS {
                    assert!(!code.bit(b), "padding of code ({}, {})", order, index);
                }
            }
        }
    }

    #[test]
    fn repeatable() {
        let m = build_matrix(7);
        for index in [0, 3, 64, 127] {
            assert_eq!(words(&m, 7, index), words(&m, 7, index));
        }
    }

    #[test]
    fn exact_size() {
        let m = build_matrix(6);
        let mut code = m.code_words(6, 9).unwrap();
        assert_eq!(code.len(), 4);
        code.next();
        assert_eq!(code.size_hint(), (3, Some(3)));
        assert_eq!(code.by_ref().count(), 3);
        assert_eq!(code.next(), None);
        assert_eq!(code.next(), None);
    }

    #[test]
    fn packer_agrees_with_rows() {
        let m = build_matrix(7);
        for order in 0..=7 {
            let len = 1usize << order;
            for index in 0..len {
                let packed: Vec<u16> =
                    pack_signed(m.signed_row(index).into_iter().take(len)).collect();
                assert_eq!(packed, words(&m, order, index), "code ({}, {})", order, index);
            }
        }
    }

    #[test]
    fn packer_random() {
        let mut rng = SmallRng::seed_from_u64(1);
        let bits = BitVec::random(&mut rng, 3);
        for len in [0, 1, 15, 16, 17, 100, 192] {
            let entries: Vec<i8> = bits.iter().take(len).map(|b| if b { 1 } else { -1 }).collect();
            let packed: CodeWord = pack_signed(entries).collect();
            assert_eq!(packed.len(), len.div_ceil(CODE_WORD_BITS));
            for b in 0..packed.len() * CODE_WORD_BITS {
                assert_eq!(packed.bit(b), b < len && bits.bit(b), "len {} bit {}", len, b);
            }
        }
    }

    #[test]
    fn packer_empty() {
        assert_eq!(pack_signed(Vec::<i8>::new()).next(), None);
    }

    #[test]
    fn concurrent_readers() {
        let m = build_matrix(9);
        let expected = m.code_word(9, 300).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| m.code_word(9, 300).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
