//! The comparison driver: turns a pre-built k-tuple index over `s1` plus a
//! raw `s2` into a [`DotStore`] of maximal near-exact matches.

use crate::alphabet::Alphabet;
use crate::dotstore::DotStore;
use crate::error::{Error, Result};
use crate::extend::{extend_match, validate_extension_params};
use crate::index::TupleIndex;

/// Builds the k-tuple index over `s1` and compares `s2` against it in one
/// call.
pub fn compare(
    s1: &[u8],
    s2: &[u8],
    k: usize,
    window: usize,
    mismatch: usize,
    min_match: usize,
    alphabet: &Alphabet,
) -> Result<DotStore> {
    let index = TupleIndex::build(s1, k, alphabet)?;
    compare_with_index(&index, s1, s2, k, window, mismatch, min_match, alphabet)
}

/// Compares `s2` against an already-built index over `s1`. Grounded on
/// `doComparison`: for every k-tuple of `s2`, walk the matching chain in
/// `s1`'s index and extend each hit.
pub fn compare_with_index(
    index: &TupleIndex,
    s1: &[u8],
    s2: &[u8],
    k: usize,
    window: usize,
    mismatch: usize,
    min_match: usize,
    alphabet: &Alphabet,
) -> Result<DotStore> {
    validate_extension_params(window, mismatch, k)?;
    if min_match < k {
        return Err(Error::InvalidParameter("min_match must be >= k"));
    }
    if s2.len() < k {
        return Err(Error::SequenceTooShort { len: s2.len(), k });
    }

    log::debug!(
        "compare: |s1|={} |s2|={} k={} window={} mismatch={} min_match={}",
        s1.len(),
        s2.len(),
        k,
        window,
        mismatch,
        min_match
    );

    let mut dots = DotStore::new();
    let tuple_count = s2.len() - k + 1;

    for i in 0..tuple_count {
        let tuple_id = alphabet.encode_tuple(&s2[i..i + k])?;
        for position in index.occurrences(tuple_id) {
            let match_len = extend_match(s1, position, s2, i, k, window, mismatch, alphabet);
            log::trace!("candidate s1@{} s2@{} len={}", position, i, match_len);
            if match_len >= min_match {
                dots.append(position as i64, i as i64, match_len as i64);
            }
        }
    }

    log::debug!("compare: found {} dots", dots.count());
    Ok(dots)
}
