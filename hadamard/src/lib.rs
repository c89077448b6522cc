//! `hadamard` builds Sylvester Hadamard matrices of order `2^n` and cuts their rows into packed
//! orthogonal spreading codes, e.g. for CDMA-style coding. Some features include:
//! - building the `2^n x 2^n` matrix by repeated doubling, stored as bits in a single allocation
//! - reading entries as `+1`/`-1`, whole rows, and fast row dot products via XOR and popcount
//! - extracting any row truncated to `2^k` entries, `k <= n`, as 16-bit words, most significant
//!   bit first, with the last partial word zero-padded
//!
//! The main data structures provided by this crate are:
//! - [`HadamardMatrix`]: the immutable matrix, which can be shared between readers
//! - [`CodeWords`]: a lazy iterator over the words of one code, and [`CodeWord`], its owned form
//! - [`BitVec`]: a vector of bits stored in 64-bit chunks, the storage behind the matrix
//!
//! ```
//! use hadamard::{build_matrix, extract_code};
//!
//! let m = build_matrix(2);
//! assert_eq!(m.signed_row(1), vec![1, -1, 1, -1]);
//!
//! let words: Vec<u16> = extract_code(&m, 2, 1).unwrap().collect();
//! assert_eq!(words, vec![0xa000]);
//! ```

#![allow(
    clippy::needless_range_loop,
    clippy::uninlined_format_args,
    clippy::cast_possible_truncation,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]
pub mod bitvec;
pub mod code;
pub mod matrix;

pub use bitvec::{BitBlock, BitRange, BitVec, BLOCKSIZE};
pub use code::{
    extract_code, pack_signed, CodeWord, CodeWords, ExtractError, SignedPacker, CODE_WORD_BITS,
};
pub use matrix::{build_matrix, HadamardMatrix};
