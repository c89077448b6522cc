use crate::bitvec::*;
use log::{debug, trace};
use std::fmt;

/// A Sylvester Hadamard matrix of dimension `2^order`
///
/// Entries are `+1` or `-1`. They are stored as bits, `+1` as 1 and `-1` as 0, in row-major order
/// with each row occupying `col_blocks` many [`BitBlock`]s, most significant bit first. If the
/// dimension is smaller than [`BLOCKSIZE`], the unused low bits of each row are always 0.
///
/// The matrix is built once and never mutated afterwards, so it can be shared freely between
/// readers, e.g. to extract codes on several threads at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HadamardMatrix {
    /// the exponent `n` with `dim == 2^n`
    order: usize,

    /// the number of rows (and columns) of the matrix
    dim: usize,

    /// the number of [`BitBlock`]s used to store each row
    col_blocks: usize,

    /// a [`BitVec`] containing the signs of the matrix, stored in row-major order
    data: BitVec,
}

/// Builds the Hadamard matrix of dimension `2^order`
///
/// Shorthand for [`HadamardMatrix::new`].
#[inline]
pub fn build_matrix(order: usize) -> HadamardMatrix {
    HadamardMatrix::new(order)
}

impl HadamardMatrix {
    /// Builds the Hadamard matrix of dimension `2^order` from `[[+1]]` by repeated doubling
    ///
    /// Each step turns the current matrix `M` into
    ///
    /// ```text
    /// M | M
    /// --+--
    /// M |-M
    /// ```
    ///
    /// Storage for the final matrix is allocated up front and the doublings happen in place, so
    /// after step `k` the top-left `2^k x 2^k` corner holds the Hadamard matrix of order `k`.
    ///
    /// # Panics
    ///
    /// Panics if the storage for `2^order x 2^order` entries can't be addressed, see
    /// [`HadamardMatrix::try_new`].
    pub fn new(order: usize) -> Self {
        Self::try_new(order)
            .unwrap_or_else(|| panic!("Hadamard order {} is too large to address", order))
    }

    /// Builds the Hadamard matrix of dimension `2^order`, or returns `None` if its storage can't
    /// be addressed
    ///
    /// An order passes this check when `2^order` fits in a `usize` and the bytes needed for all
    /// rows don't exceed `isize::MAX`. Passing it doesn't guarantee the allocation succeeds.
    pub fn try_new(order: usize) -> Option<Self> {
        if order >= usize::BITS as usize {
            return None;
        }
        let dim = 1usize << order;
        let col_blocks = min_blocks(dim);
        let num_blocks = dim.checked_mul(col_blocks)?;
        let num_bytes = num_blocks.checked_mul(std::mem::size_of::<BitBlock>())?;
        if num_bytes > isize::MAX as usize {
            return None;
        }

        debug!("generating Hadamard matrix of order {order} ({dim}x{dim})");

        let mut m = HadamardMatrix {
            order,
            dim,
            col_blocks,
            data: BitVec::zeros(num_blocks),
        };
        m.data[0] = MSB_ON;

        let mut size = 1;
        while size < dim {
            m.double(size);
            size <<= 1;
            trace!("doubled Hadamard matrix to {size}x{size}");
        }

        debug!("Hadamard matrix of order {order} done, {num_blocks} blocks of storage");
        Some(m)
    }

    /// Doubles the `size x size` matrix in the top-left corner, assuming everything outside of it
    /// is still 0
    fn double(&mut self, size: usize) {
        let cb = self.col_blocks;
        if size < BLOCKSIZE {
            // the doubled matrix still fits in the first block of each row
            let quadrant = leading_mask(2 * size) ^ leading_mask(size);
            for row in 0..size {
                let bits = self.data[row * cb];
                self.data[row * cb] = bits | (bits >> size);
            }
            for row in size..2 * size {
                self.data[row * cb] = self.data[(row - size) * cb] ^ quadrant;
            }
        } else {
            // `size` is a power of two, hence a whole number of blocks
            let blocks = size / BLOCKSIZE;
            for row in 0..size {
                self.data.copy_range(row * cb, row * cb + blocks, blocks);
            }
            for row in size..2 * size {
                self.data.copy_range((row - size) * cb, row * cb, 2 * blocks);
                self.data.invert_range(row * cb + blocks, blocks);
            }
        }
    }

    /// The exponent `n` such that the matrix is `2^n x 2^n`
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// The number of rows, which is also the number of columns and the number of codes
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns `true` if the entry at row `i` and column `j` is `+1`
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn bit(&self, i: usize, j: usize) -> bool {
        if i >= self.dim || j >= self.dim {
            panic!(
                "Index ({}, {}) out of range for {}x{} matrix",
                i, j, self.dim, self.dim
            );
        }
        self.data.bit(self.col_blocks * BLOCKSIZE * i + j)
    }

    /// Returns the entry at row `i` and column `j`, either `1` or `-1`
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn entry(&self, i: usize, j: usize) -> i8 {
        if self.bit(i, j) {
            1
        } else {
            -1
        }
    }

    /// Returns the bits of row `i`, including any zero padding past the last column
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn row(&self, i: usize) -> &BitRange {
        if i >= self.dim {
            panic!("Row {} out of range for {}x{} matrix", i, self.dim, self.dim);
        }
        self.data.bit_range(i * self.col_blocks, (i + 1) * self.col_blocks)
    }

    /// Returns row `i` as a vector of `1`s and `-1`s
    pub fn signed_row(&self, i: usize) -> Vec<i8> {
        self.row(i)
            .iter()
            .take(self.dim)
            .map(|b| if b { 1 } else { -1 })
            .collect()
    }

    /// Returns all rows as vectors of `1`s and `-1`s
    pub fn to_signed_rows(&self) -> Vec<Vec<i8>> {
        (0..self.dim).map(|i| self.signed_row(i)).collect()
    }

    /// The dot product of rows `i` and `j` over the integers
    ///
    /// Each agreeing position contributes `+1` and each disagreeing one `-1`, so this is
    /// `dim - 2 * hamming_distance`.
    #[inline]
    pub fn dot(&self, i: usize, j: usize) -> i64 {
        let differences = self.row(i).count_differences(self.row(j)) as i64;
        self.dim as i64 - 2 * differences
    }

    /// Checks that all pairs of distinct rows are orthogonal
    pub fn is_orthogonal(&self) -> bool {
        (0..self.dim).all(|i| ((i + 1)..self.dim).all(|j| self.dot(i, j) == 0))
    }

    /// Returns a copy of the top-left `2^order x 2^order` block, or `None` if `order` exceeds the
    /// order of this matrix
    ///
    /// By construction this is the Hadamard matrix of the smaller order.
    pub fn leading_block(&self, order: usize) -> Option<HadamardMatrix> {
        if order > self.order {
            return None;
        }
        let dim = 1usize << order;
        let col_blocks = min_blocks(dim);
        let mask = leading_mask(dim);
        let data = (0..dim)
            .flat_map(|i| (0..col_blocks).map(move |j| (i, j)))
            .map(|(i, j)| {
                let bits = self.data[i * self.col_blocks + j];
                if j == col_blocks - 1 {
                    bits & mask
                } else {
                    bits
                }
            })
            .collect();
        Some(HadamardMatrix {
            order,
            dim,
            col_blocks,
            data,
        })
    }
}

impl Index<(usize, usize)> for HadamardMatrix {
    type Output = i8;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        if self.bit(index.0, index.1) {
            &1
        } else {
            &-1
        }
    }
}

impl fmt::Display for HadamardMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.dim {
            for j in 0..self.dim {
                write!(f, "{:>2} ", self[(i, j)])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
