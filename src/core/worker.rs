//! Worker pool: spawns one OS thread per partition, each owning its own
//! stream handles and temporary output files; no locking, since the
//! index and reference are shared read-only.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::cli::Config;
use crate::core::fastq::{record_name, FastqReader};
use crate::core::gz::open_maybe_gz;
use crate::core::index::Index;
use crate::core::output::{write_bed, write_bedpe, write_fastq_record};
use crate::core::partition::Partition;
use crate::core::refdb::Reference;
use crate::core::resolve::{resolve_pair, resolve_single, LibMode, ResolveConfig, SingleStrand};

struct WorkerPaths {
    r1: Option<PathBuf>,
    r2: Option<PathBuf>,
    bed: Option<PathBuf>,
}

fn temp_path(basename: &Path, suffix: &str, thread_idx: usize) -> PathBuf {
    let mut p = basename.as_os_str().to_owned();
    p.push(format!("_{suffix}.thread{thread_idx}"));
    PathBuf::from(p)
}

/// Skip forward `target` decompressed bytes by reading and discarding —
/// gzip streams only support forward seeking by re-decompression.
fn skip_to(reader: &mut impl Read, target: u64) -> io::Result<()> {
    let mut remaining = target;
    let mut buf = [0u8; 64 * 1024];
    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        let n = reader.read(&mut buf[..want])?;
        if n == 0 {
            break;
        }
        remaining -= n as u64;
    }
    Ok(())
}

fn resolve_cfg(config: &Config) -> ResolveConfig {
    ResolveConfig {
        k: config.k,
        step: config.step,
        mismatch_percent: config.mismatch_percent,
        ignore_n: config.ignore_n,
        no_disjoin: config.no_disjoin,
        evals: config.evals,
    }
}

fn run_paired_worker(
    thread_idx: usize,
    partition: &Partition,
    config: &Config,
    index: &Index,
    reference: &Reference,
) -> io::Result<WorkerPaths> {
    let r1_path = config.input_r1.as_deref().expect("paired mode needs R1");
    let r2_path = config.input_r2.as_deref().expect("paired mode needs R2");

    let mut r1_reader = BufReader::new(open_maybe_gz(r1_path)?);
    let mut r2_reader = BufReader::new(open_maybe_gz(r2_path)?);
    skip_to(&mut r1_reader, partition.r1_start)?;
    skip_to(&mut r2_reader, partition.r2_start)?;

    let mut r1_fq = FastqReader::new(r1_reader);
    let mut r2_fq = FastqReader::new(r2_reader);

    let out_r1 = temp_path(&config.basename, "R1", thread_idx);
    let out_r2 = temp_path(&config.basename, "R2", thread_idx);
    let out_bed = temp_path(&config.basename, "BED", thread_idx);
    let mut fout_r1 = File::create(&out_r1)?;
    let mut fout_r2 = File::create(&out_r2)?;
    let mut fout_bed = File::create(&out_bed)?;

    let rcfg = resolve_cfg(config);
    let mut lines_consumed = 0u64;

    while lines_consumed < partition.line_count {
        let rec1 = match r1_fq.next_record()? {
            Some(r) => r,
            None => break,
        };
        let rec2 = match r2_fq.next_record()? {
            Some(r) => r,
            None => break,
        };
        lines_consumed += 4;

        let hit = resolve_pair(
            index,
            reference,
            &rec1.sequence,
            &rec2.sequence,
            config.lib,
            &rcfg,
        );

        match hit {
            None => {
                if config.fastq_out && config.diff {
                    write_fastq_record(&mut fout_r1, &rec1)?;
                    write_fastq_record(&mut fout_r2, &rec2)?;
                }
            }
            Some(hit) => {
                if config.fastq_out && !config.diff {
                    write_fastq_record(&mut fout_r1, &rec1)?;
                    write_fastq_record(&mut fout_r2, &rec2)?;
                }
                if config.bed_out && !config.diff {
                    let name = record_name(&rec1.header);
                    let chrom1 = &reference.get(hit.seq1 as usize).identifier;
                    let chrom2 = &reference.get(hit.seq2 as usize).identifier;
                    write_bedpe(
                        &mut fout_bed,
                        chrom1,
                        hit.start1,
                        hit.end1,
                        chrom2,
                        hit.start2,
                        hit.end2,
                        &name,
                        hit.score,
                        hit.strand1,
                        hit.strand2,
                    )?;
                }
            }
        }
    }

    Ok(WorkerPaths {
        r1: Some(out_r1),
        r2: Some(out_r2),
        bed: Some(out_bed),
    })
}

fn run_single_worker(
    thread_idx: usize,
    partition: &Partition,
    config: &Config,
    index: &Index,
    reference: &Reference,
) -> io::Result<WorkerPaths> {
    // The planner always treats whichever single file was supplied as its
    // primary stream, so its offsets land in `partition.r1_start`
    // regardless of whether that file is physically R1 or R2.
    let (path, strand_policy, out_suffix) = match config.lib {
        LibMode::Sf => {
            if config.input_r2.is_none() {
                (config.input_r1.as_deref().unwrap(), SingleStrand::Forward, "R1")
            } else {
                (config.input_r2.as_deref().unwrap(), SingleStrand::Reverse, "R2")
            }
        }
        LibMode::Sr => {
            if config.input_r2.is_none() {
                (config.input_r1.as_deref().unwrap(), SingleStrand::Reverse, "R1")
            } else {
                (config.input_r2.as_deref().unwrap(), SingleStrand::Forward, "R2")
            }
        }
        LibMode::U => {
            if config.input_r2.is_none() {
                (config.input_r1.as_deref().unwrap(), SingleStrand::Both, "R1")
            } else {
                (config.input_r2.as_deref().unwrap(), SingleStrand::Both, "R2")
            }
        }
        _ => unreachable!("run_single_worker only handles single-end modes"),
    };

    let mut reader = BufReader::new(open_maybe_gz(path)?);
    skip_to(&mut reader, partition.r1_start)?;
    let mut fq = FastqReader::new(reader);

    let out_path = temp_path(&config.basename, out_suffix, thread_idx);
    let out_bed = temp_path(&config.basename, "BED", thread_idx);
    let mut fout = File::create(&out_path)?;
    let mut fout_bed = File::create(&out_bed)?;

    let rcfg = resolve_cfg(config);
    let mut lines_consumed = 0u64;

    while lines_consumed < partition.line_count {
        let rec = match fq.next_record()? {
            Some(r) => r,
            None => break,
        };
        lines_consumed += 4;

        let hit = resolve_single(index, reference, &rec.sequence, strand_policy, &rcfg);

        match hit {
            None => {
                if config.fastq_out && config.diff {
                    write_fastq_record(&mut fout, &rec)?;
                }
            }
            Some(hit) => {
                if config.fastq_out && !config.diff {
                    write_fastq_record(&mut fout, &rec)?;
                }
                if config.bed_out && !config.diff {
                    let name = record_name(&rec.header);
                    let chrom = &reference.get(hit.seq_idx as usize).identifier;
                    write_bed(&mut fout_bed, chrom, hit.start, hit.end, &name)?;
                }
            }
        }
    }

    let (r1, r2) = if out_suffix == "R1" {
        (Some(out_path), None)
    } else {
        (None, Some(out_path))
    };
    Ok(WorkerPaths {
        r1,
        r2,
        bed: Some(out_bed),
    })
}

/// Final output paths, after concatenation; `None` means nothing was
/// written (or the concatenated file ended up empty and was removed).
pub struct RunOutputs {
    pub r1: Option<PathBuf>,
    pub r2: Option<PathBuf>,
    pub bed: Option<PathBuf>,
}

fn concat_and_cleanup(parts: &[Option<PathBuf>], final_path: &Path) -> io::Result<Option<PathBuf>> {
    let mut out = File::create(final_path)?;
    let mut wrote_any = false;
    for part in parts.iter().flatten() {
        let mut f = File::open(part)?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;
        if !buf.is_empty() {
            wrote_any = true;
        }
        out.write_all(&buf)?;
    }
    drop(out);
    for part in parts.iter().flatten() {
        fs::remove_file(part)?;
    }
    if wrote_any {
        Ok(Some(final_path.to_path_buf()))
    } else {
        fs::remove_file(final_path)?;
        Ok(None)
    }
}

/// Spawn one worker thread per partition, join them, then concatenate
/// per-worker temp files in thread-index order into the final outputs.
pub fn run(
    config: &Config,
    index: &Index,
    reference: &Reference,
    partitions: &[Partition],
) -> io::Result<RunOutputs> {
    let paired = config.lib.is_paired();

    let results: Vec<io::Result<WorkerPaths>> = std::thread::scope(|scope| {
        let handles: Vec<_> = partitions
            .iter()
            .enumerate()
            .map(|(thread_idx, partition)| {
                scope.spawn(move || {
                    if paired {
                        run_paired_worker(thread_idx, partition, config, index, reference)
                    } else {
                        run_single_worker(thread_idx, partition, config, index, reference)
                    }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect()
    });

    let mut r1_parts = Vec::new();
    let mut r2_parts = Vec::new();
    let mut bed_parts = Vec::new();
    for r in results {
        let paths = r?;
        r1_parts.push(paths.r1);
        r2_parts.push(paths.r2);
        bed_parts.push(paths.bed);
    }

    let mut r1_final = config.basename.as_os_str().to_owned();
    r1_final.push("_R1.fastq");
    let mut r2_final = config.basename.as_os_str().to_owned();
    r2_final.push("_R2.fastq");
    let mut bed_final = config.basename.as_os_str().to_owned();
    bed_final.push(".bed");

    let r1 = if r1_parts.iter().any(Option::is_some) {
        concat_and_cleanup(&r1_parts, Path::new(&r1_final))?
    } else {
        None
    };
    let r2 = if r2_parts.iter().any(Option::is_some) {
        concat_and_cleanup(&r2_parts, Path::new(&r2_final))?
    } else {
        None
    };
    let bed = concat_and_cleanup(&bed_parts, Path::new(&bed_final))?;

    Ok(RunOutputs { r1, r2, bed })
}
