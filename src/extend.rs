//! Gap-tolerant match extension.
//!
//! Walks outward from a seed hit, tracking per-position match/mismatch
//! bits over a sliding window of size `W` and extending while the running
//! mismatch count inside that window stays `<= M`. The window is dense
//! 0/1 state, so it is kept in a `bit_vec::BitVec` rather than a plain
//! `Vec<bool>`.

use bit_vec::BitVec;

use crate::alphabet::Alphabet;
use crate::error::{Error, Result};

/// Validates the window/mismatch/k-tuple preconditions shared by
/// [`extend_match`] and the comparison driver.
pub fn validate_extension_params(window: usize, mismatch: usize, k: usize) -> Result<()> {
    if window < 1 {
        return Err(Error::InvalidParameter("window must be >= 1"));
    }
    if window < k {
        return Err(Error::InvalidParameter("window must be >= k"));
    }
    if mismatch >= window {
        return Err(Error::InvalidParameter("mismatch must be < window"));
    }
    Ok(())
}

/// Extends a seed hit at `(p1, p2)` of tuple size `k`, assumed to already
/// match for the first `k` symbols, for as long as the count of mismatches
/// inside any `window`-wide sliding window stays `<= mismatch`. Returns the
/// final match length in symbols.
pub fn extend_match(
    s1: &[u8],
    p1: usize,
    s2: &[u8],
    p2: usize,
    k: usize,
    window: usize,
    mismatch: usize,
    alphabet: &Alphabet,
) -> usize {
    let mut ring = BitVec::from_elem(window, false);
    let mut sum: usize = 0;
    let mut d = k;

    loop {
        let i1 = p1 + d;
        let i2 = p2 + d;
        if i1 >= s1.len() || i2 >= s2.len() {
            // ran out of symbols before reaching offset d: normal termination.
            return d;
        }

        let is_mismatch = alphabet.is_wildcard(s1[i1]) || s1[i1] != s2[i2];
        let slot = d % window;
        if ring.get(slot).unwrap() {
            sum -= 1;
        }
        ring.set(slot, is_mismatch);
        if is_mismatch {
            sum += 1;
        }
        d += 1;

        if sum > mismatch {
            // the slot just written pushed sum above the budget: the
            // mismatched symbol at offset d-1 is not part of the match.
            return d - 1;
        }
    }
}

/// The fast-path extension variant used by [`crate::fastcompare::fast_compare`]:
/// same windowed mismatch budget as [`extend_match`], plus a cumulative
/// match/mismatch score that aborts the extension early once it drops below
/// `-mismatch`, on the theory that a run this lopsided is unlikely to recover
/// inside the window before the plain budget check would have caught it
/// anyway. Either stopping condition trims the reported length by the
/// trailing run of consecutive mismatches that triggered it, so a dying
/// match does not drag a tail of low-quality symbols into its reported
/// length.
pub fn extend_match_fast(
    s1: &[u8],
    p1: usize,
    s2: &[u8],
    p2: usize,
    k: usize,
    window: usize,
    mismatch: usize,
    alphabet: &Alphabet,
) -> usize {
    let mut ring = BitVec::from_elem(window, false);
    let mut sum: usize = 0;
    let mut d = k;
    let mut score: i64 = 0;
    let mut trailing_breaks: usize = 0;
    let abort_below = -(mismatch as i64) - 1;

    loop {
        let i1 = p1 + d;
        let i2 = p2 + d;
        if i1 >= s1.len() || i2 >= s2.len() {
            return d - trailing_breaks;
        }

        let is_mismatch = alphabet.is_wildcard(s1[i1]) || s1[i1] != s2[i2];
        let slot = d % window;
        if ring.get(slot).unwrap() {
            sum -= 1;
        }
        ring.set(slot, is_mismatch);
        if is_mismatch {
            sum += 1;
            score -= 1;
            trailing_breaks += 1;
        } else {
            score += 1;
            trailing_breaks = 0;
        }
        d += 1;

        if sum > mismatch || score < abort_below {
            // either the windowed budget was breached, or the early-abort
            // heuristic fired: trim the trailing mismatch run that caused
            // whichever stop condition tripped.
            return d - trailing_breaks;
        }
    }
}
