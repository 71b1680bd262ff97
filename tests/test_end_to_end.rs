#[cfg(test)]
mod tests {
    use kmerseed::core::index::build;
    use kmerseed::core::kmer::revcomp;
    use kmerseed::core::refdb::{Reference, Sequence};
    use kmerseed::core::resolve::{resolve_pair, resolve_single, LibMode, ResolveConfig, SingleStrand};

    /// The 24bp synthetic "chr1" used throughout the worked scenarios:
    /// ACGTACGTACGTACGTACGTACGT, k=11, step=1, m=0.
    fn chr1() -> Reference {
        Reference {
            sequences: vec![Sequence {
                identifier: "chr1".to_string(),
                bases: b"ACGTACGTACGTACGTACGTACGT".to_vec(),
                gc_fraction: 0.5,
            }],
        }
    }

    fn cfg(no_disjoin: bool) -> ResolveConfig {
        ResolveConfig {
            k: 11,
            step: 1,
            mismatch_percent: 0,
            ignore_n: false,
            no_disjoin,
            evals: 0,
        }
    }

    #[test]
    fn sf_single_end_maps_exact_read_at_zero() {
        let reference = chr1();
        let index = build(&reference, 11);
        let read = b"ACGTACGTACG"; // first 11bp of chr1
        let hit = resolve_single(&index, &reference, read, SingleStrand::Forward, &cfg(true))
            .expect("exact prefix must map");
        assert_eq!(hit.seq_idx, 0);
        assert_eq!(hit.start, 0);
        assert_eq!(hit.end, 11);
    }

    #[test]
    fn sr_single_end_maps_reverse_complement_input() {
        let reference = chr1();
        let index = build(&reference, 11);
        // SR reverse-complements the read before searching.
        let forward_hit_seq = b"ACGTACGTACG";
        let read = revcomp(forward_hit_seq);
        let hit = resolve_single(&index, &reference, &read, SingleStrand::Reverse, &cfg(true))
            .expect("SR must map the revcomp of an exact window");
        assert_eq!(hit.start, 0);
    }

    #[test]
    fn u_single_end_tries_both_strands() {
        // Two distinct homopolymer runs so a read only ever matches one
        // strand, unlike chr1's self-symmetric ACGT repeat.
        let reference = Reference {
            sequences: vec![Sequence {
                identifier: "chr2".to_string(),
                bases: b"GGGGGGGGGGGAAAAAAAAAAA".to_vec(),
                gc_fraction: 0.5,
            }],
        };
        let index = build(&reference, 11);
        // Forward search for this read fails (no Cs in the reference);
        // only its reverse complement (11 Gs) matches, at offset 0.
        let read = b"CCCCCCCCCCC";
        let hit = resolve_single(&index, &reference, read, SingleStrand::Both, &cfg(true))
            .expect("U must fall back to the reverse complement");
        assert_eq!(hit.start, 0);

        assert!(resolve_single(&index, &reference, read, SingleStrand::Forward, &cfg(true))
            .is_none());
    }

    #[test]
    fn isf_pair_maps_with_correct_strand_labels() {
        let reference = chr1();
        let index = build(&reference, 11);
        let r1 = b"ACGTACGTACG"; // maps forward at offset 0
        let r2 = b"CGTACGTACGT"; // ISF revcomps this internally; its own
                                  // revcomp maps at offset 12
        let hit = resolve_pair(&index, &reference, r1, r2, LibMode::Isf, &cfg(true))
            .expect("ISF pair must resolve on this synthetic reference");
        assert_eq!(hit.strand1, '+');
        assert_eq!(hit.strand2, '-');
        assert_eq!(hit.start1, 0);
        assert_eq!(hit.score, 0);
    }

    #[test]
    fn mismatch_budget_gates_acceptance_as_in_worked_examples() {
        let reference = chr1();
        let index = build(&reference, 11);
        // Longer than k=11 so a seed window can anchor clear of the
        // mismatch at the last position (a read exactly k long has only
        // one possible seed window, which would carry the mismatch itself).
        let read = b"ACGTACGTACGTACA"; // one mismatch vs ACGTACGTACGTACG

        let too_strict = ResolveConfig {
            mismatch_percent: 5, // floor(5*15/100) = 0
            ..cfg(true)
        };
        assert!(resolve_single(&index, &reference, read, SingleStrand::Forward, &too_strict)
            .is_none());

        let lenient = ResolveConfig {
            mismatch_percent: 7, // floor(7*15/100) = 1
            ..cfg(true)
        };
        let hit = resolve_single(&index, &reference, read, SingleStrand::Forward, &lenient)
            .expect("one mismatch within a one-mismatch budget must map");
        assert_eq!(hit.start, 0);
    }

    #[test]
    fn unrelated_read_never_maps() {
        let reference = chr1();
        let index = build(&reference, 11);
        let read = b"TTTTTTTTTTT";
        assert!(resolve_single(&index, &reference, read, SingleStrand::Both, &cfg(true)).is_none());
    }
}
