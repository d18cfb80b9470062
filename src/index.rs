//! K-tuple inverted index (`LAST`/`PREV`) over a single sequence.
//!
//! `LAST[t-1]` holds the most recent (1-based) position of k-tuple `t`,
//! `PREV[i]` links position `i` back to the previous occurrence of the
//! same k-tuple, 0 terminates the chain.

use crate::alphabet::{ipow, Alphabet, TupleId};
use crate::error::{Error, Result};

/// The two-array inverted index built once per `(sequence, k)` pair.
pub struct TupleIndex {
    last: Vec<u32>,
    prev: Vec<u32>,
    k: usize,
}

impl TupleIndex {
    /// Builds the index over `sequence` for k-tuples of size `k` drawn from
    /// `alphabet`. Fails with `SequenceTooShort` if `sequence.len() < k`.
    pub fn build(sequence: &[u8], k: usize, alphabet: &Alphabet) -> Result<Self> {
        if sequence.len() < k {
            return Err(Error::SequenceTooShort { len: sequence.len(), k });
        }
        if k == 0 {
            return Err(Error::InvalidParameter("k must be >= 1"));
        }

        let last_len = ipow(alphabet.size(), k);
        let prev_len = sequence.len() - k + 1;
        let mut last = vec![0u32; last_len];
        let mut prev = vec![0u32; prev_len];

        for i in 0..prev_len {
            let tuple_id = alphabet.encode_tuple(&sequence[i..i + k])?;
            let slot = (tuple_id - 1) as usize;
            let head = last[slot];
            prev[i] = head;
            last[slot] = (i + 1) as u32;
        }

        log::debug!(
            "built k-tuple index: k={} alphabet_size={} last_len={} prev_len={}",
            k,
            alphabet.size(),
            last_len,
            prev_len
        );

        Ok(Self { last, prev, k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the 0-based sequence positions of every occurrence of tuple
    /// id `t`, most recent first (as stored by construction).
    pub fn occurrences(&self, tuple_id: TupleId) -> Occurrences<'_> {
        let head = self
            .last
            .get((tuple_id - 1) as usize)
            .copied()
            .unwrap_or(0);
        Occurrences { prev: &self.prev, next: head }
    }
}

/// Iterator walking a `LAST`/`PREV` chain in reverse order of position.
pub struct Occurrences<'a> {
    prev: &'a [u32],
    next: u32,
}

impl<'a> Iterator for Occurrences<'a> {
    /// 0-based sequence position.
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next == 0 {
            return None;
        }
        let position = (self.next - 1) as usize;
        self.next = self.prev[position];
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_sequence_errors() {
        let alpha = Alphabet::dna();
        assert_eq!(
            TupleIndex::build(b"AC", 4, &alpha).unwrap_err(),
            Error::SequenceTooShort { len: 2, k: 4 }
        );
    }

    #[test]
    fn index_completeness_worked_example() {
        let seq = b"AGCTCGATCGAGTCTCGAGTAG";
        let alpha = Alphabet::dna();
        let index = TupleIndex::build(seq, 2, &alpha).unwrap();
        assert_eq!(index.last.len(), 16);
        assert_eq!(index.prev.len(), 21);

        // "AG" occurs at positions 0, 8, 17, 20 (0-based); chain walked from
        // LAST must enumerate them in reverse order.
        let ag_id = alpha.encode_tuple(b"AG").unwrap();
        let positions: Vec<usize> = index.occurrences(ag_id).collect();
        assert_eq!(positions, vec![20, 17, 8, 0]);
    }

    #[test]
    fn every_tuple_occurrence_is_reachable() {
        // for every k-tuple t occurring at positions P = {i1 < i2 < ... <
        // in}, walking PREV from LAST yields exactly P in reverse.
        let seq = b"GCGGGTACTGATATACTCATGATTATACCGCGCGG";
        let alpha = Alphabet::dna();
        let k = 3;
        let index = TupleIndex::build(seq, k, &alpha).unwrap();

        for start in 0..=seq.len() - k {
            let tuple_id = alpha.encode_tuple(&seq[start..start + k]).unwrap();
            let mut expected: Vec<usize> = (0..=seq.len() - k)
                .filter(|&i| &seq[i..i + k] == &seq[start..start + k])
                .collect();
            expected.reverse();
            let actual: Vec<usize> = index.occurrences(tuple_id).collect();
            assert_eq!(actual, expected);
        }
    }
}
