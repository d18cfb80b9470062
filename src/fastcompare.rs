//! The monolithic fast comparison path: a single index built once over
//! `s1`, compared against both `s2` and its reverse complement, with
//! same-diagonal-run deduplication and suppression of highly repetitive
//! k-tuple classes.
//!
//! This folds in optimizations that the plain driver in [`crate::compare`]
//! does not need: it skips re-reporting a hit whose previous base pair
//! already matched (since the longer run starting one position earlier
//! already covers it), it drops k-tuple classes that repeat more than
//! `r_max` times outright, since a class that common produces a
//! combinatorial number of low-information hits, and its extension
//! ([`crate::extend::extend_match_fast`]) aborts early on a run that has
//! gone sour and trims the reported length back past the trailing
//! mismatches that triggered the abort.

use std::collections::HashSet;

use crate::alphabet::{Alphabet, TupleId};
use crate::dotstore::DotStore;
use crate::error::{Error, Result};
use crate::extend::{extend_match_fast, validate_extension_params};
use crate::index::TupleIndex;
use crate::revcomp::reverse_complement;

/// Runs the fast comparison, returning `(forward, reverse_complement)` dot
/// stores.
pub fn fast_compare(
    s1: &[u8],
    s2: &[u8],
    window: usize,
    mismatch: usize,
    r_max: usize,
    k_max: usize,
) -> Result<(DotStore, DotStore)> {
    let k = window.min(k_max).max(1);
    validate_extension_params(window, mismatch, k)?;
    if s1.len() < k {
        return Err(Error::SequenceTooShort { len: s1.len(), k });
    }

    let alphabet = Alphabet::dna();
    let index = TupleIndex::build(s1, k, &alphabet)?;
    let suppressed = suppressed_classes(&index, &alphabet, s1, k, r_max);

    log::debug!(
        "fast_compare: |s1|={} |s2|={} k={} suppressed_classes={}",
        s1.len(),
        s2.len(),
        k,
        suppressed.len()
    );

    let same_sequence = std::ptr::eq(s1, s2);
    let plus = run_pass(s1, s2, &index, &alphabet, &suppressed, k, window, mismatch, same_sequence);

    let s2_rc = reverse_complement(s2);
    let minus = run_pass(s1, &s2_rc, &index, &alphabet, &suppressed, k, window, mismatch, false);

    log::debug!("fast_compare: plus={} minus={} dots", plus.count(), minus.count());
    Ok((plus, minus))
}

fn suppressed_classes(
    index: &TupleIndex,
    alphabet: &Alphabet,
    s1: &[u8],
    k: usize,
    r_max: usize,
) -> HashSet<TupleId> {
    let mut suppressed = HashSet::new();
    if r_max == 0 {
        // a threshold of 0 means "no suppression".
        return suppressed;
    }

    for window in s1.windows(k) {
        if let Ok(id) = alphabet.encode_tuple(window) {
            if suppressed.contains(&id) {
                continue;
            }
            let count = index.occurrences(id).count();
            if count > r_max {
                suppressed.insert(id);
                log::warn!("fast_compare: suppressing over-represented k-tuple class (count={})", count);
            }
        }
    }
    suppressed
}

#[allow(clippy::too_many_arguments)]
fn run_pass(
    s1: &[u8],
    s2: &[u8],
    index: &TupleIndex,
    alphabet: &Alphabet,
    suppressed: &HashSet<TupleId>,
    k: usize,
    window: usize,
    mismatch: usize,
    same_sequence: bool,
) -> DotStore {
    let mut dots = DotStore::new();
    if s2.len() < k {
        return dots;
    }

    for j in 0..=s2.len() - k {
        let tuple_id = match alphabet.encode_tuple(&s2[j..j + k]) {
            Ok(id) => id,
            Err(_) => continue,
        };
        if suppressed.contains(&tuple_id) {
            continue;
        }

        for ix in index.occurrences(tuple_id) {
            // previous-base skip: a hit one diagonal step up-left already
            // matched, so the run starting there already covers this dot --
            // unless we are walking the self-comparison diagonal, where the
            // "earlier" hit is this same position and must not be dropped.
            let on_diagonal = same_sequence && ix == j;
            if j > 0 && ix > 0 && s2[j - 1] == s1[ix - 1] && !on_diagonal {
                continue;
            }

            let match_len = extend_match_fast(s1, ix, s2, j, k, window, mismatch, alphabet);
            if match_len >= k {
                dots.append(ix as i64, j as i64, match_len as i64);
            }
        }
    }

    dots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_comparison_reports_full_diagonal() {
        let seq = b"GCGGGTACTGATATACTCATGATTATACCGCGCGGTTGTGTGAATTAATATCAACACCACAAAAGAGAGGAGGACTTCCTCTCTCTCTCTAACACCAATATATCCGGCCGGTTG";
        let (plus, _minus) = fast_compare(seq, seq, 3, 0, 0, 2).unwrap();

        let has_full_diagonal = (0..plus.count())
            .filter_map(|i| plus.get_by_index(i))
            .any(|d| d.x == 0 && d.y == 0 && d.length as usize == seq.len());
        assert!(has_full_diagonal);
    }

    #[test]
    fn reverse_complement_pass_finds_palindromic_hits() {
        // a sequence that is its own reverse complement produces a full
        // self-diagonal hit in the minus (reverse-complement) pass.
        let seq = b"ACGTACGTACGTACGTACGTACGT";
        let (_plus, minus) = fast_compare(seq, seq, 3, 0, 0, 2).unwrap();
        assert!(minus.count() > 0);
    }

    #[test]
    fn overrepresented_class_is_suppressed() {
        let repetitive = b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let (plus_unsuppressed, _) = fast_compare(repetitive, repetitive, 3, 0, 0, 2).unwrap();
        let (plus_suppressed, _) = fast_compare(repetitive, repetitive, 3, 0, 2, 2).unwrap();
        assert!(plus_suppressed.count() <= plus_unsuppressed.count());
    }

    #[test]
    fn rejects_sequence_shorter_than_k() {
        assert!(fast_compare(b"AC", b"ACGTACGT", 3, 0, 0, 2).is_err());
    }
}
