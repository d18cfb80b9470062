//! Alphabet descriptors and k-tuple encoding.
//!
//! An [`Alphabet`] is an explicit value threaded through every encoding and
//! index-building call, rather than a process-global symbol table: no
//! pointer identity tricks, no statics.

use crate::error::{Error, Result};

/// A 1-based k-tuple id, in `[1, A^k]`. 0 is reserved as the "no chain" LAST/PREV
/// sentinel.
pub type TupleId = u32;

/// A symbol table plus its size and the bit width needed to store one symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
    /// optional wildcard symbol: always a mismatch during match extension,
    /// but still indexable (the amino alphabet's `.`). DNA has no wildcard
    /// in its k-tuple alphabet; an unrecognized base such as `N` is simply
    /// `InvalidSymbol` for encoding purposes.
    wildcard: Option<u8>,
}

impl Alphabet {
    /// The four-letter nucleotide alphabet used for k-tuple indexing.
    pub fn dna() -> Self {
        Self { symbols: b"ACGT".to_vec(), wildcard: None }
    }

    /// The amino acid alphabet, including the stop codon `-` and the
    /// "unknown" wildcard `.`.
    pub fn amino() -> Self {
        Self { symbols: b"ACDEFGHIKLMNPQRSTVWY-.".to_vec(), wildcard: Some(b'.') }
    }

    /// Number of symbols in the alphabet.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Bits needed to represent one symbol.
    pub fn bit_width(&self) -> u32 {
        // ceil(log2(size)), with size==1 needing 1 bit.
        let size = self.size().max(1);
        (usize::BITS - (size - 1).leading_zeros()).max(1)
    }

    pub fn is_wildcard(&self, symbol: u8) -> bool {
        self.wildcard == Some(symbol)
    }

    fn index_of(&self, symbol: u8) -> Option<usize> {
        self.symbols.iter().position(|&s| s == symbol)
    }

    /// Returns the 1-based tuple id of the length-k window `buf`, treating the
    /// symbols as a base-`A` positional number, most significant first, then
    /// offset by one so that 0 remains free as the LAST/PREV "no chain"
    /// sentinel.
    pub fn encode_tuple(&self, buf: &[u8]) -> Result<TupleId> {
        let mut id: u64 = 0;
        for &symbol in buf {
            let index = self
                .index_of(symbol)
                .ok_or(Error::InvalidSymbol(symbol as char))?;
            id = id * self.size() as u64 + index as u64;
        }
        Ok(id as TupleId + 1)
    }
}

/// `A^k`, used to size the `LAST` array.
pub fn ipow(base: usize, exp: usize) -> usize {
    if exp == 0 {
        1
    } else if exp % 2 == 1 {
        base * ipow(base, exp - 1)
    } else {
        let half = ipow(base, exp / 2);
        half * half
    }
}
