//! Three-frame amino-acid translation and translated-space comparison.
//!
//! Translates a DNA sequence in all three forward reading frames and
//! compares the translations pairwise, so that a match disrupted by
//! synonymous codon substitutions at the nucleotide level still shows up
//! as one contiguous hit in amino-acid space.

use crate::alphabet::Alphabet;
use crate::compare::compare_with_index;
use crate::dotstore::DotStore;
use crate::error::{Error, Result};
use crate::extend::extend_match;
use crate::index::TupleIndex;

/// The universal genetic code, indexed by codon id (each base 0..4,
/// most-significant first, the same positional-number scheme
/// `Alphabet::encode_tuple` uses for the DNA alphabet).
const TRANSLATE_UNIVERSAL: &[u8; 64] = b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV-Y-YSSSS-CWCLFLF";

fn codon_id(codon: &[u8; 3]) -> Option<usize> {
    let dna = Alphabet::dna();
    let mut id = 0usize;
    for &base in codon {
        let index = b"ACGT".iter().position(|&b| b == base)?;
        id = id * dna.size() + index;
    }
    Some(id)
}

/// Translates `dna` in its three forward reading frames. Each output
/// sequence has length `dna.len() / 3`; a trailing partial codon left over
/// at the end of a frame is simply dropped.
pub fn translate_three_frames(dna: &[u8]) -> [Vec<u8>; 3] {
    let codons = dna.len() / 3;
    let mut frames = [Vec::new(), Vec::new(), Vec::new()];

    for frame in frames.iter_mut() {
        frame.reserve(codons);
    }

    for i in 0..codons {
        for (offset, frame) in frames.iter_mut().enumerate() {
            let start = i * 3 + offset;
            if start + 3 > dna.len() {
                continue;
            }
            let codon = [dna[start], dna[start + 1], dna[start + 2]];
            match codon_id(&codon) {
                Some(id) => frame.push(TRANSLATE_UNIVERSAL[id]),
                None => {}
            }
        }
    }

    frames
}

/// Compares two DNA sequences by translating each into its three reading
/// frames, comparing every one of the nine frame pairs in amino-acid space,
/// then re-extending each amino-acid hit back in nucleotide space to get an
/// exact match length.
pub fn compare_by_translation(
    s1: &[u8],
    s2: &[u8],
    k: usize,
    window: usize,
    mismatch: usize,
    min_match: usize,
) -> Result<DotStore> {
    let amino = Alphabet::amino();
    let s1_frames = translate_three_frames(s1);
    let s2_frames = translate_three_frames(s2);

    let mut dots = DotStore::new();

    for (xframe, s1_amino) in s1_frames.iter().enumerate() {
        if s1_amino.len() < k {
            continue;
        }
        let index = TupleIndex::build(s1_amino, k, &amino)?;
        for (yframe, s2_amino) in s2_frames.iter().enumerate() {
            if s2_amino.len() < k {
                continue;
            }
            log::debug!("compare_by_translation: frame pair ({}, {})", xframe, yframe);
            // min_match == k here: every amino-level seed hit is re-verified
            // (and the real length threshold applied) against the
            // nucleotide sequences below, since synonymous codons can make
            // an amino-level match longer than its underlying DNA match.
            let hits = compare_with_index(
                &index,
                s1_amino,
                s2_amino,
                k,
                window.max(k),
                mismatch / 3,
                k,
                &amino,
            )?;

            for i in 0..hits.count() {
                let hit = hits.get_by_index(i).ok_or(Error::NotFound)?;
                let original_x = hit.x as usize * 3 + xframe;
                let original_y = hit.y as usize * 3 + yframe;
                let dna_alphabet = Alphabet::dna();
                let match_len =
                    extend_match(s1, original_x, s2, original_y, 0, window, mismatch, &dna_alphabet);
                if match_len >= min_match {
                    dots.append(original_x as i64, original_y as i64, match_len as i64);
                }
            }
        }
    }

    Ok(dots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_codons() {
        // ATG -> Methionine (M), per the universal genetic code.
        let frames = translate_three_frames(b"ATGATGATG");
        assert_eq!(frames[0], b"MMM");
    }

    #[test]
    fn trailing_overhang_is_dropped() {
        let frames = translate_three_frames(b"ATGATGAT");
        assert_eq!(frames[0].len(), 2);
    }

    #[test]
    fn compare_by_translation_finds_self_match() {
        let seq = b"ATGGCTGATTGGAAACGTATGGCTGATTGGAAACGT";
        let dots = compare_by_translation(seq, seq, 2, 4, 0, 6).unwrap();
        assert!(dots.count() > 0);
    }
}
