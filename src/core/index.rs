//! Index builder: enumerates every valid k-mer across the reference,
//! groups postings by code, and exposes a binary-searchable sorted array.
//!
//! Despite the name, this is not a hash map: "hash" here refers to the
//! encoded k-mer value used as the sort/search key, not the data structure.

use smallvec::SmallVec;

use crate::core::kmer::{encode, INVALID_CODE};
use crate::core::refdb::Reference;

/// One occurrence of a k-mer in the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub seq_idx: u32,
    pub offset: u32,
}

/// All postings sharing a k-mer code. Same-sequence postings form
/// contiguous runs, a consequence of per-sequence-then-per-offset
/// enumeration order prior to the stable sort by code.
pub type PostingList = SmallVec<[Posting; 4]>;

struct Entry {
    code: u32,
    postings: PostingList,
}

pub struct Index {
    k: usize,
    entries: Vec<Entry>,
}

impl Index {
    pub fn k(&self) -> usize {
        self.k
    }

    /// Binary-search the sorted array for `code`, returning its posting
    /// list or `None` if the code never occurred in the reference.
    pub fn lookup(&self, code: u32) -> Option<&PostingList> {
        if code == INVALID_CODE {
            return None;
        }
        self.entries
            .binary_search_by_key(&code, |e| e.code)
            .ok()
            .map(|i| &self.entries[i].postings)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Build the index for every sequence in `reference` at seed length `k`.
pub fn build(reference: &Reference, k: usize) -> Index {
    let mut triples: Vec<(u32, u32, u32)> = Vec::new(); // (code, seq_idx, offset)

    for (seq_idx, seq) in reference.sequences.iter().enumerate() {
        let bases = &seq.bases;
        if bases.len() < k {
            continue;
        }
        for offset in 0..=(bases.len() - k) {
            let code = encode(&bases[offset..offset + k]);
            if code == INVALID_CODE {
                continue;
            }
            triples.push((code, seq_idx as u32, offset as u32));
        }
    }

    // Stable sort by (code, seq_idx, offset) — ties are already in this
    // order from enumeration, but sort_by is not guaranteed stable across
    // arbitrary key functions, so the full key is given explicitly.
    triples.sort_by_key(|&(code, seq_idx, offset)| (code, seq_idx, offset));

    let mut entries: Vec<Entry> = Vec::new();
    for (code, seq_idx, offset) in triples {
        match entries.last_mut() {
            Some(last) if last.code == code => {
                last.postings.push(Posting { seq_idx, offset });
            }
            _ => {
                let mut postings = PostingList::new();
                postings.push(Posting { seq_idx, offset });
                entries.push(Entry { code, postings });
            }
        }
    }

    Index { k, entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::refdb::Sequence;

    fn single_seq(bases: &[u8]) -> Reference {
        Reference {
            sequences: vec![Sequence {
                identifier: "chr1".to_string(),
                bases: bases.to_vec(),
                gc_fraction: 0.0,
            }],
        }
    }

    #[test]
    fn lookup_roundtrips_every_posting() {
        let reference = single_seq(b"ACGTACGTACGT");
        let k = 4;
        let index = build(&reference, k);
        for offset in 0..=(12 - k) {
            let code = encode(&reference.sequences[0].bases[offset..offset + k]);
            let postings = index.lookup(code).expect("code must be present");
            assert!(postings
                .iter()
                .any(|p| p.seq_idx == 0 && p.offset as usize == offset));
        }
    }

    #[test]
    fn absent_code_returns_none() {
        let reference = single_seq(b"AAAAAAAA");
        let index = build(&reference, 4);
        // TTTT never occurs
        assert!(index.lookup(encode(b"TTTT")).is_none());
    }

    #[test]
    fn codes_strictly_increasing() {
        let reference = single_seq(b"ACGTACGTTTTTGGGGCCCCAAAA");
        let index = build(&reference, 5);
        let codes: Vec<u32> = index.entries.iter().map(|e| e.code).collect();
        for w in codes.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn same_sequence_postings_are_contiguous() {
        let mut reference = single_seq(b"ACGTACGT");
        reference.sequences.push(Sequence {
            identifier: "chr2".to_string(),
            bases: b"ACGTACGT".to_vec(),
            gc_fraction: 0.0,
        });
        let index = build(&reference, 4);
        let code = encode(b"ACGT");
        let postings = index.lookup(code).unwrap();
        let seq_indices: Vec<u32> = postings.iter().map(|p| p.seq_idx).collect();
        let mut sorted = seq_indices.clone();
        sorted.sort_unstable();
        assert_eq!(seq_indices, sorted);
    }
}
