//! Pair resolver: the parametrized replacement for the original's
//! twelve-function table (one function per library-orientation ×
//! disjoin-policy combination). A single routine is keyed by orientation
//! (inward/outward/single), which directed sub-mode to try first, whether
//! to also try the other, disjoin-allowed, and an evals limit.

use crate::core::extend::{budget_for, count_mismatches_within_budget, extends_within_budget};
use crate::core::kmer::revcomp;
use crate::core::index::Index;
use crate::core::refdb::Reference;
use crate::core::seed::find_seed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibMode {
    Isf,
    Isr,
    Iu,
    Osf,
    Osr,
    Ou,
    Sf,
    Sr,
    U,
}

impl LibMode {
    pub fn parse(s: &str) -> Option<LibMode> {
        use LibMode::*;
        Some(match s {
            "ISF" => Isf,
            "ISR" => Isr,
            "IU" => Iu,
            "OSF" => Osf,
            "OSR" => Osr,
            "OU" => Ou,
            "SF" => Sf,
            "SR" => Sr,
            "U" => U,
            _ => return None,
        })
    }

    pub fn is_paired(self) -> bool {
        !matches!(self, LibMode::Sf | LibMode::Sr | LibMode::U)
    }
}

#[derive(Debug, Clone)]
pub struct ResolveConfig {
    pub k: usize,
    pub step: usize,
    pub mismatch_percent: u32,
    pub ignore_n: bool,
    pub no_disjoin: bool,
    pub evals: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Ordered,
    UnorderedSameSeq,
    Cross,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    seq_a: u32,
    start_a: usize,
    seq_b: u32,
    start_b: usize,
    mismatches: usize,
    bucket: Bucket,
}

#[derive(Debug, Clone, Copy)]
pub struct PairHit {
    pub seq1: u32,
    pub start1: usize,
    pub end1: usize,
    pub seq2: u32,
    pub start2: usize,
    pub end2: usize,
    pub score: u8,
    pub strand1: char,
    pub strand2: char,
}

#[derive(Debug, Clone, Copy)]
pub struct SingleHit {
    pub seq_idx: u32,
    pub start: usize,
    pub end: usize,
}

/// Sweep every (seed-on-`a`, seed-on-`b`) pairing, bucketing each
/// extension-passing candidate by how well it satisfies the orientation's
/// ordering constraint. `inward` selects the ordering direction; see
/// §4.6 in the design doc for the directed per-mode table.
fn collect_pair_candidates(
    index: &Index,
    reference: &Reference,
    a: &[u8],
    b: &[u8],
    cfg: &ResolveConfig,
    inward: bool,
) -> Vec<Candidate> {
    let budget_a = budget_for(cfg.mismatch_percent, a.len());
    let budget_b = budget_for(cfg.mismatch_percent, b.len());
    let mut out: Vec<Candidate> = Vec::new();

    let mut at_a = 0usize;
    while let Some((postings_a, hit_a)) = find_seed(index, a, cfg.k, cfg.step, &mut at_a) {
        for pa in postings_a.iter() {
            if (pa.offset as usize) < hit_a {
                continue;
            }
            let start_a = pa.offset as usize - hit_a;
            let seq_a_rec = reference.get(pa.seq_idx as usize);
            if start_a + a.len() > seq_a_rec.len() {
                continue;
            }
            let ca = if cfg.evals > 0 {
                match count_mismatches_within_budget(
                    &seq_a_rec.bases,
                    start_a,
                    a,
                    cfg.ignore_n,
                    budget_a,
                ) {
                    Some(c) => c,
                    None => continue,
                }
            } else if extends_within_budget(&seq_a_rec.bases, start_a, a, cfg.ignore_n, budget_a) {
                0
            } else {
                continue;
            };

            let mut at_b = 0usize;
            while let Some((postings_b, hit_b)) = find_seed(index, b, cfg.k, cfg.step, &mut at_b) {
                for pb in postings_b.iter() {
                    if (pb.offset as usize) < hit_b {
                        continue;
                    }
                    let start_b = pb.offset as usize - hit_b;
                    let seq_b_rec = reference.get(pb.seq_idx as usize);
                    if start_b + b.len() > seq_b_rec.len() {
                        continue;
                    }
                    let cb = if cfg.evals > 0 {
                        match count_mismatches_within_budget(
                            &seq_b_rec.bases,
                            start_b,
                            b,
                            cfg.ignore_n,
                            budget_b,
                        ) {
                            Some(c) => c,
                            None => continue,
                        }
                    } else if extends_within_budget(
                        &seq_b_rec.bases,
                        start_b,
                        b,
                        cfg.ignore_n,
                        budget_b,
                    ) {
                        0
                    } else {
                        continue;
                    };

                    let same_seq = pa.seq_idx == pb.seq_idx;
                    let ordered = same_seq
                        && if inward {
                            start_a <= start_b + b.len()
                        } else {
                            start_a >= start_b + b.len()
                        };
                    let cross_ok = !same_seq
                        && if inward {
                            pb.seq_idx >= pa.seq_idx
                        } else {
                            pb.seq_idx <= pa.seq_idx
                        };

                    let bucket = if ordered {
                        Some(Bucket::Ordered)
                    } else if same_seq && !cfg.no_disjoin {
                        Some(Bucket::UnorderedSameSeq)
                    } else if cross_ok && !cfg.no_disjoin {
                        Some(Bucket::Cross)
                    } else {
                        None
                    };

                    if let Some(bucket) = bucket {
                        out.push(Candidate {
                            seq_a: pa.seq_idx,
                            start_a,
                            seq_b: pb.seq_idx,
                            start_b,
                            mismatches: ca + cb,
                            bucket,
                        });
                        if cfg.evals == 0 && bucket == Bucket::Ordered {
                            return out;
                        }
                        if cfg.evals > 0
                            && out.iter().filter(|c| c.bucket == Bucket::Ordered).count()
                                >= cfg.evals
                        {
                            return out;
                        }
                    }
                }
                at_b = hit_b + cfg.step;
            }
        }
        at_a = hit_a + cfg.step;
    }
    out
}

fn pick_candidate(candidates: &[Candidate], cfg: &ResolveConfig) -> Option<Candidate> {
    if cfg.evals > 0 {
        candidates
            .iter()
            .filter(|c| c.bucket == Bucket::Ordered)
            .min_by_key(|c| c.mismatches)
            .copied()
    } else {
        candidates
            .iter()
            .find(|c| c.bucket == Bucket::Ordered)
            .or_else(|| candidates.iter().find(|c| c.bucket == Bucket::UnorderedSameSeq))
            .or_else(|| candidates.iter().find(|c| c.bucket == Bucket::Cross))
            .copied()
    }
}

fn try_directed(
    index: &Index,
    reference: &Reference,
    a: &[u8],
    b: &[u8],
    cfg: &ResolveConfig,
    inward: bool,
    strand1: char,
    strand2: char,
) -> Option<PairHit> {
    let candidates = collect_pair_candidates(index, reference, a, b, cfg, inward);
    let chosen = pick_candidate(&candidates, cfg)?;
    let score = if chosen.bucket == Bucket::Cross { 1 } else { 0 };
    Some(PairHit {
        seq1: chosen.seq_a,
        start1: chosen.start_a,
        end1: chosen.start_a + a.len(),
        seq2: chosen.seq_b,
        start2: chosen.start_b,
        end2: chosen.start_b + b.len(),
        score,
        strand1,
        strand2,
    })
}

/// Resolve one read pair under `mode`. `r1`/`r2` are the forward-strand
/// sequences exactly as read; reverse-complementing the required mate is
/// done internally per mode.
pub fn resolve_pair(
    index: &Index,
    reference: &Reference,
    r1: &[u8],
    r2: &[u8],
    mode: LibMode,
    cfg: &ResolveConfig,
) -> Option<PairHit> {
    let r1_rc = revcomp(r1);
    let r2_rc = revcomp(r2);
    match mode {
        LibMode::Isf => try_directed(index, reference, r1, &r2_rc, cfg, true, '+', '-'),
        LibMode::Isr => try_directed(index, reference, r2, &r1_rc, cfg, true, '-', '+'),
        LibMode::Iu => try_directed(index, reference, r1, &r2_rc, cfg, true, '+', '-')
            .or_else(|| try_directed(index, reference, r2, &r1_rc, cfg, true, '-', '+')),
        LibMode::Osf => try_directed(index, reference, r1, &r2_rc, cfg, false, '-', '+'),
        LibMode::Osr => try_directed(index, reference, r2, &r1_rc, cfg, false, '+', '-'),
        LibMode::Ou => try_directed(index, reference, r1, &r2_rc, cfg, false, '-', '+')
            .or_else(|| try_directed(index, reference, r2, &r1_rc, cfg, false, '+', '-')),
        LibMode::Sf | LibMode::Sr | LibMode::U => {
            unreachable!("single-end modes are resolved via resolve_single")
        }
    }
}

/// Which strand(s) of a single-end read to try, in order.
#[derive(Debug, Clone, Copy)]
pub enum SingleStrand {
    Forward,
    Reverse,
    Both,
}

fn collect_single_candidates(
    index: &Index,
    reference: &Reference,
    read: &[u8],
    cfg: &ResolveConfig,
) -> Vec<(u32, usize, usize)> {
    let budget = budget_for(cfg.mismatch_percent, read.len());
    let mut out = Vec::new();
    let mut at = 0usize;
    while let Some((postings, hit_at)) = find_seed(index, read, cfg.k, cfg.step, &mut at) {
        for p in postings.iter() {
            if (p.offset as usize) < hit_at {
                continue;
            }
            let start = p.offset as usize - hit_at;
            let seq_rec = reference.get(p.seq_idx as usize);
            if start + read.len() > seq_rec.len() {
                continue;
            }
            let mismatches = if cfg.evals > 0 {
                match count_mismatches_within_budget(
                    &seq_rec.bases,
                    start,
                    read,
                    cfg.ignore_n,
                    budget,
                ) {
                    Some(c) => c,
                    None => continue,
                }
            } else if extends_within_budget(&seq_rec.bases, start, read, cfg.ignore_n, budget) {
                0
            } else {
                continue;
            };
            out.push((p.seq_idx, start, mismatches));
            if cfg.evals == 0 {
                return out;
            }
            if out.len() >= cfg.evals.max(1) && cfg.evals > 0 {
                return out;
            }
        }
        at = hit_at + cfg.step;
    }
    out
}

/// Resolve a single-end read, trying the strand(s) `policy` selects.
pub fn resolve_single(
    index: &Index,
    reference: &Reference,
    read: &[u8],
    policy: SingleStrand,
    cfg: &ResolveConfig,
) -> Option<SingleHit> {
    let search = |seq: &[u8]| -> Option<SingleHit> {
        let candidates = collect_single_candidates(index, reference, seq, cfg);
        let best = if cfg.evals > 0 {
            candidates.into_iter().min_by_key(|&(_, _, m)| m)
        } else {
            candidates.into_iter().next()
        }?;
        Some(SingleHit {
            seq_idx: best.0,
            start: best.1,
            end: best.1 + read.len(),
        })
    };

    match policy {
        SingleStrand::Forward => search(read),
        SingleStrand::Reverse => search(&revcomp(read)),
        SingleStrand::Both => search(read).or_else(|| search(&revcomp(read))),
    }
}
