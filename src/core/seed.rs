//! Seed finder: slides a cursor along a read at a configured step, looking
//! for the first window whose k-mer code is present in the index.

use crate::core::index::{Index, PostingList};
use crate::core::kmer::{encode, INVALID_CODE};

/// Search `read` for the next seed hit starting at `*at`.
///
/// On a hit, returns the posting list and the read offset of the hit,
/// leaving `*at` pointing at that same offset — callers that want to
/// resume scanning past this seed must advance `*at` themselves (typically
/// `hit_at + step`) before calling again. On exhaustion, returns `None`;
/// `*at` is left past the last examined window, so a second call with the
/// same `step` is guaranteed not to find anything new and will not loop.
///
/// This function owns its entire internal step loop — it only returns on
/// a hit or on cursor exhaustion, so a caller can never observe a
/// "miss but cursor unchanged" state.
pub fn find_seed<'a>(
    index: &'a Index,
    read: &[u8],
    k: usize,
    step: usize,
    at: &mut usize,
) -> Option<(&'a PostingList, usize)> {
    let len = read.len();
    if len < k {
        return None;
    }
    let last = len - k;
    while *at <= last {
        let code = encode(&read[*at..*at + k]);
        if code != INVALID_CODE {
            if let Some(postings) = index.lookup(code) {
                return Some((postings, *at));
            }
        }
        *at += step;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::build;
    use crate::core::refdb::{Reference, Sequence};

    fn reference(bases: &[u8]) -> Reference {
        Reference {
            sequences: vec![Sequence {
                identifier: "chr1".to_string(),
                bases: bases.to_vec(),
                gc_fraction: 0.0,
            }],
        }
    }

    #[test]
    fn finds_first_hit_then_exhausts() {
        let reference = reference(b"ACGTACGTACGTACGTACGTACGT");
        let index = build(&reference, 4);
        let read = b"ACGT".to_vec();
        let mut at = 0usize;
        let (postings, hit_at) = find_seed(&index, &read, 4, 1, &mut at).unwrap();
        assert_eq!(hit_at, 0);
        assert!(!postings.is_empty());
    }

    #[test]
    fn returns_none_when_too_short() {
        let reference = reference(b"ACGTACGTACGT");
        let index = build(&reference, 11);
        let read = b"ACG".to_vec();
        let mut at = 0usize;
        assert!(find_seed(&index, &read, 11, 1, &mut at).is_none());
    }

    #[test]
    fn skips_positions_beyond_l_minus_k() {
        let reference = reference(b"ACGTACGTACGTACGTACGTACGT");
        let index = build(&reference, 11);
        // A read with no valid 11-mer anywhere but reaching exhaustion
        let read = b"NNNNNNNNNNN".to_vec();
        let mut at = 0usize;
        assert!(find_seed(&index, &read, 11, 1, &mut at).is_none());
        assert!(at > read.len() - 11);
    }
}
